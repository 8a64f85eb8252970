//! Command handlers for the saldo CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod auth;
mod dashboard;
mod delete;
mod init;
mod insert;
mod list;
mod report;

use crate::model::group_id;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use auth::{auth_login, auth_verify};
pub use dashboard::dashboard;
pub use delete::{delete_allocation, delete_transaction};
pub use init::init;
pub use insert::{add_allocation, add_transaction};
pub use list::{list_allocations, list_transactions};
pub use report::report;

/// The output type for a command. This allows the command to return a
/// consistent message and, optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the
    /// command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as
    /// JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Renders a decimal the way the app displays money.
pub(crate) fn rupiah(value: Decimal) -> String {
    format!("Rp {}", group_id(value))
}
