use crate::model::Amount;
use crate::Result;
use anyhow::bail;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a transaction adds to or subtracts from the balance.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// A single row from the `transactions` resource. Rows are immutable once
/// stored; the only mutation the store supports is deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub amount: Amount,
    #[serde(default)]
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    /// The amount signed by transaction type: income positive, expense
    /// negative. Summing signed amounts yields a balance.
    pub fn signed_amount(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::Income => self.amount.value(),
            TransactionType::Expense => -self.amount.value(),
        }
    }
}

/// The insert payload for the `transactions` resource. The store assigns
/// `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    pub user_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
}

impl NewTransaction {
    /// Client-side validation, applied before any store call: the category is
    /// required and the amount must not be negative.
    pub fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            bail!("A transaction requires a category");
        }
        if self.amount.is_negative() {
            bail!(
                "A transaction amount cannot be negative (got {})",
                self.amount
            );
        }
        Ok(())
    }
}
