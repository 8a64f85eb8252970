//! The yearly report command.

use crate::api::{self, Mode, Session};
use crate::commands::{rupiah, Out};
use crate::report::{available_years, yearly_report, Period, YearlyReport, MONTH_NAMES_SHORT};
use crate::{Config, Result};
use rust_decimal::Decimal;

/// Computes the yearly report: twelve month buckets, year totals and the
/// top-10 expense categories.
pub async fn report(config: Config, mode: Mode, year: i32) -> Result<Out<YearlyReport>> {
    let session = Session::load(&config).await?;
    let mut store = api::store(&config, mode, &session).await?;
    let transactions = store.select_transactions(session.user_id()).await?;

    let years = available_years(&transactions, Period::current().year());
    let report = yearly_report(&transactions, year);
    let message = render_report(&report, &years);
    Ok(Out::new(message, report))
}

fn render_report(report: &YearlyReport, years: &[i32]) -> String {
    let years: Vec<String> = years.iter().map(|y| y.to_string()).collect();
    let mut lines = vec![
        format!("Yearly report for {}", report.year),
        format!("Years with data: {}", years.join(", ")),
        String::new(),
        format!(
            "  {:<6}{:>16}{:>16}{:>16}",
            "Bulan", "Pemasukan", "Pengeluaran", "Saldo"
        ),
    ];
    for month in &report.months {
        lines.push(format!(
            "  {:<6}{:>16}{:>16}{:>16}",
            MONTH_NAMES_SHORT[month.month as usize - 1],
            amount_or_dash(month.income),
            amount_or_dash(month.expense),
            rupiah(month.balance),
        ));
    }
    lines.push(format!(
        "  {:<6}{:>16}{:>16}{:>16}",
        "Total",
        rupiah(report.total_income),
        rupiah(report.total_expense),
        rupiah(report.total_balance),
    ));

    if !report.top_categories.is_empty() {
        lines.push(String::new());
        lines.push("  Top expense categories:".to_string());
        for (rank, category) in report.top_categories.iter().enumerate() {
            lines.push(format!(
                "  {:>2}. {:<16}{:>16}",
                rank + 1,
                category.category,
                rupiah(category.amount)
            ));
        }
    }
    lines.join("\n")
}

/// Zero amounts render as a dash in the monthly table, the balance column
/// excepted.
fn amount_or_dash(value: Decimal) -> String {
    if value.is_zero() {
        "-".to_string()
    } else {
        rupiah(value)
    }
}
