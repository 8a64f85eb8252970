//! List command handlers.

use crate::api::{self, Mode, Session};
use crate::commands::Out;
use crate::model::{total_percentage, Allocation, Transaction};
use crate::report::Period;
use crate::{Config, Result};
use rust_decimal::Decimal;

/// Lists the transactions of one month, newest first.
///
/// The full transaction list is fetched and filtered client-side; the store
/// is only asked for owner equality.
pub async fn list_transactions(
    config: Config,
    mode: Mode,
    period: Period,
) -> Result<Out<Vec<Transaction>>> {
    let session = Session::load(&config).await?;
    let mut store = api::store(&config, mode, &session).await?;
    let all = store.select_transactions(session.user_id()).await?;

    let monthly: Vec<Transaction> = all
        .into_iter()
        .filter(|t| period.contains(t.transaction_date))
        .collect();

    if monthly.is_empty() {
        return Ok(Out::new(
            format!("No transactions in {} {}", period.name(), period.year()),
            monthly,
        ));
    }
    let message = render_transactions(&monthly, period);
    Ok(Out::new(message, monthly))
}

fn render_transactions(transactions: &[Transaction], period: Period) -> String {
    let mut lines = vec![
        format!("Transactions for {} {}", period.name(), period.year()),
        String::new(),
    ];
    for t in transactions {
        let sign = if t.is_income() { "+" } else { "-" };
        lines.push(format!(
            "  {}  {:>16}  {:<16}  {}  {}",
            t.transaction_date,
            format!("{sign}{}", t.amount.rupiah()),
            t.category,
            t.id,
            t.description.as_deref().unwrap_or(""),
        ));
    }
    lines.join("\n")
}

/// Lists the budget allocations with their running percentage total.
pub async fn list_allocations(config: Config, mode: Mode) -> Result<Out<Vec<Allocation>>> {
    let session = Session::load(&config).await?;
    let mut store = api::store(&config, mode, &session).await?;
    let allocations = store.select_allocations(session.user_id()).await?;

    if allocations.is_empty() {
        return Ok(Out::new("No allocations configured".to_string(), allocations));
    }
    let message = render_allocations(&allocations);
    Ok(Out::new(message, allocations))
}

fn render_allocations(allocations: &[Allocation]) -> String {
    let total = total_percentage(allocations);
    let mut lines = vec![
        format!("Budget allocations ({total}% of income allocated)"),
        String::new(),
    ];
    for a in allocations {
        lines.push(format!("  {:<16} {:>6}%  {}", a.category, a.percentage, a.id));
    }
    if total < Decimal::from(100) {
        lines.push(String::new());
        lines.push(format!(
            "  Note: {}% of income is unallocated",
            Decimal::from(100) - total
        ));
    }
    lines.join("\n")
}
