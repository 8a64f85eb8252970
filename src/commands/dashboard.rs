//! The monthly dashboard command.

use crate::api::{self, Mode, Session};
use crate::commands::{rupiah, Out};
use crate::report::{monthly_summary, MonthlySummary, Period};
use crate::{Config, Result};

/// Computes the dashboard for one month: starting balance, the month's income
/// and expense totals, the cumulative balance and per-category budget usage.
///
/// Both lists are fetched wholesale and aggregated client-side on every call;
/// nothing is cached between invocations.
pub async fn dashboard(config: Config, mode: Mode, period: Period) -> Result<Out<MonthlySummary>> {
    let session = Session::load(&config).await?;
    let mut store = api::store(&config, mode, &session).await?;
    let transactions = store.select_transactions(session.user_id()).await?;
    let allocations = store.select_allocations(session.user_id()).await?;

    let summary = monthly_summary(&transactions, &allocations, period);
    let message = render_dashboard(&summary);
    Ok(Out::new(message, summary))
}

fn render_dashboard(summary: &MonthlySummary) -> String {
    let period = summary.period;
    let mut lines = vec![
        format!("Dashboard for {} {}", period.name(), period.year()),
        String::new(),
        format!("  Starting balance      {:>16}", rupiah(summary.starting_balance)),
        format!("  Income this month     {:>16}", rupiah(summary.total_income)),
        format!("  Expenses this month   {:>16}", rupiah(summary.total_expense)),
        format!("  Cumulative balance    {:>16}", rupiah(summary.cumulative_balance)),
    ];

    if summary.has_over_budget {
        lines.push(String::new());
        lines.push("  WARNING: budget exceeded in one or more categories".to_string());
    }

    lines.push(String::new());
    if summary.categories.is_empty() {
        lines.push("  No allocations configured".to_string());
    } else {
        lines.push("  Budget usage:".to_string());
        for category in &summary.categories {
            lines.push(format!(
                "    {} ({}% of income)",
                category.category, category.percentage
            ));
            let status = if category.is_over_budget {
                format!("over budget by {}", rupiah(category.remaining.abs()))
            } else {
                format!("{} remaining", rupiah(category.remaining))
            };
            lines.push(format!(
                "      spent {} of {} ({}% used), {}",
                rupiah(category.spent),
                rupiah(category.allocated),
                category.percentage_used.round_dp(1),
                status
            ));
        }
    }
    lines.join("\n")
}
