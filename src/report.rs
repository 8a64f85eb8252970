//! Period aggregation over a user's transaction and allocation lists.
//!
//! Every figure here is recomputed from the full in-memory lists on each
//! call. Nothing is cached or stored; correctness depends only on date
//! comparison and exact category string matching.

use crate::model::{Allocation, Transaction};
use crate::Result;
use anyhow::bail;
use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

/// Month display names, as the app has always shown them.
pub const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Short month names for the yearly table.
pub const MONTH_NAMES_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// How many categories the yearly expense breakdown keeps.
const TOP_CATEGORY_COUNT: usize = 10;

/// A calendar month selection. `month` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    month: u32,
    year: i32,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            bail!("The month must be between 1 and 12 (got {month})");
        }
        Ok(Self { month, year })
    }

    /// The current local month.
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            month: today.month(),
            year: today.year(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month before this one, wrapping into the previous year.
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                month: 12,
                year: self.year - 1,
            }
        } else {
            Self {
                month: self.month - 1,
                year: self.year,
            }
        }
    }

    /// The month after this one, wrapping into the next year.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                month: 1,
                year: self.year + 1,
            }
        } else {
            Self {
                month: self.month + 1,
                year: self.year,
            }
        }
    }

    /// A transaction belongs to the period iff its date's calendar month and
    /// year equal the selection.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.year() == self.year
    }

    /// The last calendar day of the period, computed as the day before the
    /// first of the following month.
    pub fn last_day(&self) -> NaiveDate {
        let next = self.next();
        NaiveDate::from_ymd_opt(next.year, next.month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[self.month as usize - 1]
    }
}

/// Budget consumption for one allocation in the selected month. Derived,
/// never stored: `allocated` fluctuates retroactively as income transactions
/// for the month are added or removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpend {
    pub category: String,
    pub percentage: Decimal,
    pub spent: Decimal,
    pub allocated: Decimal,
    pub remaining: Decimal,
    pub percentage_used: Decimal,
    pub is_over_budget: bool,
}

/// The dashboard figures for one selected month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    pub period: Period,
    pub starting_balance: Decimal,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub cumulative_balance: Decimal,
    pub categories: Vec<CategorySpend>,
    pub has_over_budget: bool,
}

/// Net balance over every transaction dated on or before `through`.
fn balance_through(transactions: &[Transaction], through: NaiveDate) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.transaction_date <= through)
        .map(Transaction::signed_amount)
        .sum()
}

/// Computes the monthly dashboard summary: starting balance (through the end
/// of the previous month), the month's income and expense totals, the
/// cumulative balance (through the end of the selected month) and per-category
/// budget usage.
///
/// Empty inputs yield an all-zero summary, never an error.
pub fn monthly_summary(
    transactions: &[Transaction],
    allocations: &[Allocation],
    period: Period,
) -> MonthlySummary {
    let monthly: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| period.contains(t.transaction_date))
        .collect();

    let total_income: Decimal = monthly
        .iter()
        .filter(|t| t.is_income())
        .map(|t| t.amount.value())
        .sum();
    let total_expense: Decimal = monthly
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount.value())
        .sum();

    let cumulative_balance = balance_through(transactions, period.last_day());
    let starting_balance = balance_through(transactions, period.previous().last_day());

    let categories: Vec<CategorySpend> = allocations
        .iter()
        .map(|allocation| {
            let spent: Decimal = monthly
                .iter()
                .filter(|t| t.is_expense() && t.category == allocation.category)
                .map(|t| t.amount.value())
                .sum();
            let allocated = total_income * allocation.percentage / Decimal::ONE_HUNDRED;
            let remaining = allocated - spent;
            let percentage_used = if allocated > Decimal::ZERO {
                spent / allocated * Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            };
            CategorySpend {
                category: allocation.category.clone(),
                percentage: allocation.percentage,
                spent,
                allocated,
                remaining,
                percentage_used,
                is_over_budget: spent > allocated,
            }
        })
        .collect();

    let has_over_budget = categories.iter().any(|c| c.is_over_budget);

    MonthlySummary {
        period,
        starting_balance,
        total_income,
        total_expense,
        cumulative_balance,
        categories,
        has_over_budget,
    }
}

/// Income, expense and net balance for one calendar month of the report year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTotals {
    pub month: u32,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

/// A category's total expenses over the report year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

/// The yearly report: twelve month buckets, year totals and the largest
/// expense categories.
#[derive(Debug, Clone, Serialize)]
pub struct YearlyReport {
    pub year: i32,
    pub months: Vec<MonthTotals>,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub total_balance: Decimal,
    pub top_categories: Vec<CategoryTotal>,
}

/// Buckets the year's transactions into 12 calendar months and computes the
/// top-10 expense category breakdown plus year totals. A single linear pass
/// per metric, recomputed on every call.
pub fn yearly_report(transactions: &[Transaction], year: i32) -> YearlyReport {
    let yearly: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.transaction_date.year() == year)
        .collect();

    let months: Vec<MonthTotals> = (1..=12)
        .map(|month| {
            let income: Decimal = yearly
                .iter()
                .filter(|t| t.transaction_date.month() == month && t.is_income())
                .map(|t| t.amount.value())
                .sum();
            let expense: Decimal = yearly
                .iter()
                .filter(|t| t.transaction_date.month() == month && t.is_expense())
                .map(|t| t.amount.value())
                .sum();
            MonthTotals {
                month,
                income,
                expense,
                balance: income - expense,
            }
        })
        .collect();

    let total_income: Decimal = months.iter().map(|m| m.income).sum();
    let total_expense: Decimal = months.iter().map(|m| m.expense).sum();

    let mut by_category = std::collections::BTreeMap::<&str, Decimal>::new();
    for t in yearly.iter().filter(|t| t.is_expense()) {
        *by_category.entry(t.category.as_str()).or_default() += t.amount.value();
    }
    let mut top_categories: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            category: category.to_string(),
            amount,
        })
        .collect();
    top_categories.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.category.cmp(&b.category)));
    top_categories.truncate(TOP_CATEGORY_COUNT);

    YearlyReport {
        year,
        months,
        total_income,
        total_expense,
        total_balance: total_income - total_expense,
        top_categories,
    }
}

/// Years selectable in the report: from the earliest transaction year through
/// `current_year`, or just `current_year` when there is no history.
pub fn available_years(transactions: &[Transaction], current_year: i32) -> Vec<i32> {
    match transactions
        .iter()
        .map(|t| t.transaction_date.year())
        .min()
    {
        Some(first) => (first.min(current_year)..=current_year).collect(),
        None => vec![current_year],
    }
}
