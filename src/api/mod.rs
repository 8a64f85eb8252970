//! The seam between the app and the hosted data store.
//!
//! The hosted store exposes three row resources under row-level security:
//! `transactions`, `allocations` and `profiles`. The only operations the app
//! uses are select-all-by-owner, insert-one and delete-by-id; every other
//! filter and aggregation happens client-side after full retrieval.

mod rest;
mod session;
mod test_store;

pub use session::Session;
pub(crate) use test_store::{TestStore, TestStoreState, SEED_USER};

use crate::model::{Allocation, NewAllocation, NewTransaction, Profile, Transaction};
use crate::{Config, Result};
use anyhow::bail;
use chrono::Utc;

/// Selects between the live hosted store and the in-memory test store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Live,
    Test,
}

impl Mode {
    /// This allows for exercising the program without a live backend. When
    /// `SALDO_IN_TEST_MODE` is set and non-zero in length the mode will be
    /// `Mode::Test`, otherwise it will be `Mode::Live`.
    pub fn from_env() -> Self {
        match std::env::var("SALDO_IN_TEST_MODE") {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Live,
        }
    }
}

/// The operations the app needs from the hosted store.
#[async_trait::async_trait]
pub(crate) trait Store: Send {
    /// All of the user's transactions, ordered by transaction date descending.
    async fn select_transactions(&mut self, user_id: &str) -> Result<Vec<Transaction>>;

    /// Inserts one transaction and returns the stored row.
    async fn insert_transaction(&mut self, new: &NewTransaction) -> Result<Transaction>;

    /// Deletes one transaction by id. Errors when no such row exists.
    async fn delete_transaction(&mut self, id: &str) -> Result<()>;

    /// All of the user's allocations.
    async fn select_allocations(&mut self, user_id: &str) -> Result<Vec<Allocation>>;

    /// Inserts one allocation and returns the stored row.
    async fn insert_allocation(&mut self, new: &NewAllocation) -> Result<Allocation>;

    /// Deletes one allocation by id. Errors when no such row exists.
    async fn delete_allocation(&mut self, id: &str) -> Result<()>;

    /// The user's profile row, if one exists.
    async fn get_profile(&mut self, user_id: &str) -> Result<Option<Profile>>;
}

/// Creates a `Store` for the given mode, using `session` for authentication.
pub(crate) async fn store(
    config: &Config,
    mode: Mode,
    session: &Session,
) -> Result<Box<dyn Store + Send>> {
    match mode {
        Mode::Live => {
            if session.is_expired(Utc::now()) {
                bail!("Your session has expired. Run 'saldo auth login' to sign in again.");
            }
            Ok(Box::new(rest::RestStore::new(config, session.clone()).await?))
        }
        Mode::Test => Ok(Box::new(TestStore::new(config.project_ref()))),
    }
}
