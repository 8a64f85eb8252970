//! Delete command handlers.

use crate::api::{self, Mode, Session};
use crate::commands::Out;
use crate::{Config, Result};

/// Deletes one transaction by id.
///
/// Deletion is the only mutation the store supports for stored rows; there
/// is no edit operation. The caller sees the change on its next reload (the
/// client never patches local state).
pub async fn delete_transaction(config: Config, mode: Mode, id: &str) -> Result<Out<String>> {
    let session = Session::load(&config).await?;
    let mut store = api::store(&config, mode, &session).await?;
    store.delete_transaction(id).await?;
    Ok(Out::new(format!("Deleted transaction {id}"), id.to_string()))
}

/// Deletes one budget allocation by id.
///
/// Transactions recorded against the allocation's category are untouched;
/// they simply stop counting against any budget.
pub async fn delete_allocation(config: Config, mode: Mode, id: &str) -> Result<Out<String>> {
    let session = Session::load(&config).await?;
    let mut store = api::store(&config, mode, &session).await?;
    store.delete_allocation(id).await?;
    Ok(Out::new(format!("Deleted allocation {id}"), id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{monthly_summary, Period};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_delete_transaction_success() {
        let env = TestEnv::new().await;
        assert!(env.get_state().transactions.iter().any(|t| t.id == "txn-001"));

        let out = delete_transaction(env.config(), Mode::Test, "txn-001")
            .await
            .unwrap();
        assert!(out.message().contains("Deleted transaction txn-001"));
        assert_eq!(out.structure().unwrap(), "txn-001");

        // Reload yields a list without that id.
        let state = env.get_state();
        assert!(state.transactions.iter().all(|t| t.id != "txn-001"));
    }

    #[tokio::test]
    async fn test_delete_then_reload_matches_fresh_aggregation() {
        let env = TestEnv::new().await;
        let period = Period::new(7, 2025).unwrap();

        delete_transaction(env.config(), Mode::Test, "txn-010")
            .await
            .unwrap();

        // Totals recomputed over the reloaded list equal a fresh aggregation
        // over the remaining set.
        let state = env.get_state();
        let summary = monthly_summary(&state.transactions, &state.allocations, period);
        let expected_expense: rust_decimal::Decimal = state
            .transactions
            .iter()
            .filter(|t| period.contains(t.transaction_date) && t.is_expense())
            .map(|t| t.amount.value())
            .sum();
        assert_eq!(summary.total_expense, expected_expense);
        // txn-010 was the 850,000 Hiburan expense.
        assert!(summary
            .categories
            .iter()
            .find(|c| c.category == "Hiburan")
            .is_some_and(|c| c.spent.is_zero()));
    }

    #[tokio::test]
    async fn test_delete_missing_transaction_errors() {
        let env = TestEnv::new().await;
        let result = delete_transaction(env.config(), Mode::Test, "nope").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_allocation_success() {
        let env = TestEnv::new().await;

        let out = delete_allocation(env.config(), Mode::Test, "alloc-005")
            .await
            .unwrap();
        assert!(out.message().contains("Deleted allocation alloc-005"));

        let state = env.get_state();
        assert_eq!(state.allocations.len(), 4);
        assert!(state.allocations.iter().all(|a| a.id != "alloc-005"));
    }
}
