//! Add command handlers.

use crate::api::{self, Mode, Session};
use crate::args::{AddAllocationArgs, AddTransactionArgs};
use crate::commands::Out;
use crate::model::{total_percentage, Allocation, NewAllocation, NewTransaction, Transaction};
use crate::{Config, Result};
use anyhow::bail;
use chrono::Local;
use rust_decimal::Decimal;

/// Records a transaction in the hosted store.
///
/// The transaction is validated client-side (required category, non-negative
/// amount) before any store call. The date defaults to today. The store
/// assigns the row id, which is returned in the stored row.
///
/// # Errors
///
/// - Returns an error if validation fails; no store call is made.
/// - Returns an error if the store rejects the insert.
pub async fn add_transaction(
    config: Config,
    mode: Mode,
    args: AddTransactionArgs,
) -> Result<Out<Transaction>> {
    let session = Session::load(&config).await?;

    let new = NewTransaction {
        user_id: session.user_id().to_string(),
        transaction_type: args.transaction_type(),
        category: args.category().to_string(),
        amount: args.amount(),
        description: args.description().map(str::to_string),
        transaction_date: args
            .date()
            .unwrap_or_else(|| Local::now().date_naive()),
    };
    new.validate()?;

    let mut store = api::store(&config, mode, &session).await?;
    let row = store.insert_transaction(&new).await?;

    let message = format!(
        "Recorded {} of {} in '{}' on {} (id {})",
        row.transaction_type,
        row.amount.rupiah(),
        row.category,
        row.transaction_date,
        row.id
    );
    Ok(Out::new(message, row))
}

/// Creates a budget allocation in the hosted store.
///
/// The percentage must lie in (0, 100]. Because the store has no constraint
/// of its own, the handler re-fetches the allocation list and re-checks the
/// running total at submission time: the insert is rejected when the user's
/// percentages would exceed 100 in total.
///
/// # Errors
///
/// - Returns an error if validation fails or the ceiling would be exceeded;
///   no insert is made in either case.
/// - Returns an error if a store call fails.
pub async fn add_allocation(
    config: Config,
    mode: Mode,
    args: AddAllocationArgs,
) -> Result<Out<Allocation>> {
    let session = Session::load(&config).await?;

    let new = NewAllocation {
        user_id: session.user_id().to_string(),
        category: args.category().to_string(),
        percentage: args.percentage(),
    };
    new.validate()?;

    let mut store = api::store(&config, mode, &session).await?;
    let existing = store.select_allocations(session.user_id()).await?;
    let total = total_percentage(&existing);
    if total + new.percentage > Decimal::from(100) {
        bail!(
            "Adding {}% would push the allocation total past 100% (currently {}%)",
            new.percentage,
            total
        );
    }

    let row = store.insert_allocation(&new).await?;
    let message = format!(
        "Allocated {}% of monthly income to '{}' ({}% now allocated in total)",
        row.percentage,
        row.category,
        total + row.percentage
    );
    Ok(Out::new(message, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, TransactionType};
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn transaction_args(category: &str, amount: &str) -> AddTransactionArgs {
        AddTransactionArgs::new(
            TransactionType::Expense,
            category,
            Amount::from_str(amount).unwrap(),
            Some(NaiveDate::from_ymd_opt(2025, 7, 25).unwrap()),
            Some("catatan".to_string()),
        )
    }

    #[tokio::test]
    async fn test_add_transaction_success() {
        let env = TestEnv::new().await;

        let out = add_transaction(env.config(), Mode::Test, transaction_args("Makan", "125000"))
            .await
            .unwrap();

        assert!(out.message().contains("Recorded expense"));
        assert!(out.message().contains("Rp 125.000"));
        let row = out.structure().unwrap();
        assert!(!row.id.is_empty());
        assert_eq!(row.category, "Makan");
        assert_eq!(row.description.as_deref(), Some("catatan"));

        // The row is visible on reload.
        let state = env.get_state();
        assert!(state.transactions.iter().any(|t| t.id == row.id));
    }

    #[tokio::test]
    async fn test_add_transaction_defaults_to_today() {
        let env = TestEnv::new().await;
        let args = AddTransactionArgs::new(
            TransactionType::Income,
            "Gaji",
            Amount::from_str("1000000").unwrap(),
            None,
            None,
        );

        let out = add_transaction(env.config(), Mode::Test, args).await.unwrap();
        assert_eq!(
            out.structure().unwrap().transaction_date,
            Local::now().date_naive()
        );
    }

    #[tokio::test]
    async fn test_add_transaction_rejects_empty_category() {
        let env = TestEnv::new().await;
        let before = env.get_state();

        let result =
            add_transaction(env.config(), Mode::Test, transaction_args("  ", "125000")).await;

        assert!(result.is_err());
        // Validation failures never reach the store.
        assert_eq!(before.transactions, env.get_state().transactions);
    }

    #[tokio::test]
    async fn test_add_allocation_success() {
        let env = TestEnv::new().await;

        // The seed allocations total 85%.
        let args = AddAllocationArgs::new("Sodaqoh", Decimal::from(10));
        let out = add_allocation(env.config(), Mode::Test, args).await.unwrap();

        assert!(out.message().contains("Sodaqoh"));
        assert!(out.message().contains("95% now allocated"));
        assert_eq!(out.structure().unwrap().percentage, Decimal::from(10));
    }

    #[tokio::test]
    async fn test_add_allocation_enforces_ceiling() {
        let env = TestEnv::new().await;

        // 85% + 20% > 100%: rejected without an insert.
        let args = AddAllocationArgs::new("Sodaqoh", Decimal::from(20));
        let result = add_allocation(env.config(), Mode::Test, args).await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("past 100%"));
        assert_eq!(env.get_state().allocations.len(), 5);

        // Exactly reaching 100% is allowed.
        let args = AddAllocationArgs::new("Sodaqoh", Decimal::from(15));
        add_allocation(env.config(), Mode::Test, args).await.unwrap();

        // And any further addition is rejected.
        let args = AddAllocationArgs::new("Lainnya", Decimal::from(1));
        assert!(add_allocation(env.config(), Mode::Test, args)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_add_allocation_rejects_bad_percentage() {
        let env = TestEnv::new().await;

        for bad in ["0", "-5", "101"] {
            let args = AddAllocationArgs::new("X", Decimal::from_str(bad).unwrap());
            assert!(add_allocation(env.config(), Mode::Test, args).await.is_err());
        }
        assert_eq!(env.get_state().allocations.len(), 5);
    }
}
