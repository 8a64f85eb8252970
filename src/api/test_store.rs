//! Implements the `Store` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so
//! that we can run the whole app, top-to-bottom, without a live backend.
//! State is process-global and keyed by project ref, so mutations survive
//! across store instances the way rows in a real backend would.

use crate::api::Store;
use crate::model::{Allocation, NewAllocation, NewTransaction, Profile, Transaction};
use crate::Result;
use anyhow::bail;
use chrono::Utc;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;

/// The user id that owns the seed rows.
pub(crate) const SEED_USER: &str = "user-test";

/// The rows held by one test project.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TestStoreState {
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) allocations: Vec<Allocation>,
    pub(crate) profiles: Vec<Profile>,
}

static STATES: OnceLock<Mutex<HashMap<String, TestStoreState>>> = OnceLock::new();

fn states() -> &'static Mutex<HashMap<String, TestStoreState>> {
    STATES.get_or_init(|| Mutex::new(HashMap::new()))
}

/// An implementation of the `Store` trait that does not use a hosted backend.
/// A previously unseen project ref starts out seeded with the data in this
/// module.
pub(crate) struct TestStore {
    project_ref: String,
}

impl TestStore {
    pub(crate) fn new(project_ref: impl Into<String>) -> Self {
        Self {
            project_ref: project_ref.into(),
        }
    }

    /// Gets a copy of this project's current state.
    pub(crate) fn get_state(&self) -> TestStoreState {
        self.with_state(|state| state.clone())
    }

    /// Replaces this project's state.
    pub(crate) fn set_state(&self, new_state: TestStoreState) {
        self.with_state(|state| *state = new_state);
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut TestStoreState) -> T) -> T {
        let mut map = states()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let state = map
            .entry(self.project_ref.clone())
            .or_insert_with(default_state);
        f(state)
    }
}

#[async_trait::async_trait]
impl Store for TestStore {
    async fn select_transactions(&mut self, user_id: &str) -> Result<Vec<Transaction>> {
        self.with_state(|state| {
            let mut rows: Vec<Transaction> = state
                .transactions
                .iter()
                .filter(|t| t.user_id == user_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
            Ok(rows)
        })
    }

    async fn insert_transaction(&mut self, new: &NewTransaction) -> Result<Transaction> {
        let row = Transaction {
            id: Uuid::new_v4().to_string(),
            transaction_type: new.transaction_type,
            category: new.category.clone(),
            amount: new.amount,
            description: new.description.clone(),
            transaction_date: new.transaction_date,
            user_id: new.user_id.clone(),
            created_at: Some(Utc::now()),
        };
        self.with_state(|state| state.transactions.push(row.clone()));
        Ok(row)
    }

    async fn delete_transaction(&mut self, id: &str) -> Result<()> {
        self.with_state(|state| {
            match state.transactions.iter().position(|t| t.id == id) {
                Some(index) => {
                    state.transactions.remove(index);
                    Ok(())
                }
                None => bail!("No row with id '{id}' exists in transactions"),
            }
        })
    }

    async fn select_allocations(&mut self, user_id: &str) -> Result<Vec<Allocation>> {
        self.with_state(|state| {
            Ok(state
                .allocations
                .iter()
                .filter(|a| a.user_id == user_id)
                .cloned()
                .collect())
        })
    }

    async fn insert_allocation(&mut self, new: &NewAllocation) -> Result<Allocation> {
        let row = Allocation {
            id: Uuid::new_v4().to_string(),
            category: new.category.clone(),
            percentage: new.percentage,
            user_id: new.user_id.clone(),
        };
        self.with_state(|state| state.allocations.push(row.clone()));
        Ok(row)
    }

    async fn delete_allocation(&mut self, id: &str) -> Result<()> {
        self.with_state(|state| {
            match state.allocations.iter().position(|a| a.id == id) {
                Some(index) => {
                    state.allocations.remove(index);
                    Ok(())
                }
                None => bail!("No row with id '{id}' exists in allocations"),
            }
        })
    }

    async fn get_profile(&mut self, user_id: &str) -> Result<Option<Profile>> {
        self.with_state(|state| Ok(state.profiles.iter().find(|p| p.id == user_id).cloned()))
    }
}

/// Provides the seed data from this module.
fn default_state() -> TestStoreState {
    TestStoreState {
        transactions: load_transactions(TRANSACTION_DATA).unwrap(),
        allocations: load_allocations(ALLOCATION_DATA).unwrap(),
        profiles: vec![Profile {
            id: SEED_USER.to_string(),
            full_name: Some("Budi Santoso".to_string()),
        }],
    }
}

/// Loads transaction rows from a CSV-formatted string.
fn load_transactions(csv_data: &str) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(csv_data.as_bytes());
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let description = record.get(4).unwrap_or_default();
        rows.push(Transaction {
            id: record.get(0).unwrap_or_default().to_string(),
            transaction_type: record.get(1).unwrap_or_default().parse()?,
            category: record.get(2).unwrap_or_default().to_string(),
            amount: crate::model::Amount::from_str(record.get(3).unwrap_or_default())?,
            description: (!description.is_empty()).then(|| description.to_string()),
            transaction_date: record.get(5).unwrap_or_default().parse()?,
            user_id: record.get(6).unwrap_or_default().to_string(),
            created_at: None,
        });
    }
    Ok(rows)
}

/// Loads allocation rows from a CSV-formatted string.
fn load_allocations(csv_data: &str) -> Result<Vec<Allocation>> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(csv_data.as_bytes());
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(Allocation {
            id: record.get(0).unwrap_or_default().to_string(),
            category: record.get(1).unwrap_or_default().to_string(),
            percentage: rust_decimal::Decimal::from_str(record.get(2).unwrap_or_default())?,
            user_id: record.get(3).unwrap_or_default().to_string(),
        });
    }
    Ok(rows)
}

/// Seed transaction data.
const TRANSACTION_DATA: &str = r##"id,type,category,amount,description,transaction_date,user_id
txn-001,income,Gaji,8000000,Gaji bulanan,2025-06-01,user-test
txn-002,expense,Makan,1250000,Belanja bulanan,2025-06-03,user-test
txn-003,expense,Transportasi,450000,,2025-06-07,user-test
txn-004,expense,Hiburan,300000,Nonton bioskop,2025-06-14,user-test
txn-005,expense,Tagihan,750000,Listrik dan internet,2025-06-20,user-test
txn-006,income,Freelance,1500000,Proyek desain,2025-06-25,user-test
txn-007,income,Gaji,8000000,Gaji bulanan,2025-07-01,user-test
txn-008,expense,Makan,980000,Belanja bulanan,2025-07-02,user-test
txn-009,expense,Transportasi,520000,,2025-07-08,user-test
txn-010,expense,Hiburan,850000,Konser,2025-07-12,user-test
txn-011,expense,Tagihan,760000,Listrik dan internet,2025-07-18,user-test
txn-012,expense,Makan,420000,Makan di luar,2025-07-22,user-test
"##;

/// Seed allocation data.
const ALLOCATION_DATA: &str = r##"id,category,percentage,user_id
alloc-001,Makan,30,user-test
alloc-002,Transportasi,10,user-test
alloc-003,Hiburan,10,user-test
alloc-004,Tagihan,15,user-test
alloc-005,Nabung,20,user-test
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionType;
    use rust_decimal::Decimal;

    fn unique_ref(name: &str) -> String {
        format!("{name}-{}", Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_seed_data_loads() {
        let mut store = TestStore::new(unique_ref("seed"));
        let transactions = store.select_transactions(SEED_USER).await.unwrap();
        assert_eq!(transactions.len(), 12);
        // Ordered by date descending.
        assert!(transactions
            .windows(2)
            .all(|w| w[0].transaction_date >= w[1].transaction_date));

        let allocations = store.select_allocations(SEED_USER).await.unwrap();
        assert_eq!(allocations.len(), 5);
        assert_eq!(
            crate::model::total_percentage(&allocations),
            Decimal::from(85)
        );

        let profile = store.get_profile(SEED_USER).await.unwrap().unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("Budi Santoso"));
    }

    #[tokio::test]
    async fn test_select_filters_by_owner() {
        let mut store = TestStore::new(unique_ref("owner"));
        let rows = store.select_transactions("someone-else").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_delete_transaction() {
        let mut store = TestStore::new(unique_ref("txn"));
        let new = NewTransaction {
            user_id: SEED_USER.to_string(),
            transaction_type: TransactionType::Expense,
            category: "Makan".to_string(),
            amount: crate::model::Amount::new(Decimal::from(100_000)),
            description: None,
            transaction_date: "2025-07-30".parse().unwrap(),
        };

        let row = store.insert_transaction(&new).await.unwrap();
        assert!(!row.id.is_empty());
        assert!(row.created_at.is_some());

        let rows = store.select_transactions(SEED_USER).await.unwrap();
        assert_eq!(rows.len(), 13);

        store.delete_transaction(&row.id).await.unwrap();
        let rows = store.select_transactions(SEED_USER).await.unwrap();
        assert_eq!(rows.len(), 12);
        assert!(rows.iter().all(|t| t.id != row.id));
    }

    #[tokio::test]
    async fn test_delete_missing_row_errors() {
        let mut store = TestStore::new(unique_ref("missing"));
        let result = store.delete_transaction("no-such-id").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("no-such-id"));
    }

    #[tokio::test]
    async fn test_state_survives_across_instances() {
        let project_ref = unique_ref("shared");
        let new = NewAllocation {
            user_id: SEED_USER.to_string(),
            category: "Sodaqoh".to_string(),
            percentage: Decimal::from(5),
        };
        TestStore::new(&project_ref)
            .insert_allocation(&new)
            .await
            .unwrap();

        let mut second = TestStore::new(&project_ref);
        let allocations = second.select_allocations(SEED_USER).await.unwrap();
        assert_eq!(allocations.len(), 6);
    }

    #[tokio::test]
    async fn test_projects_are_isolated() {
        let mut a = TestStore::new(unique_ref("iso-a"));
        let mut b = TestStore::new(unique_ref("iso-b"));
        a.delete_allocation("alloc-001").await.unwrap();
        assert_eq!(a.select_allocations(SEED_USER).await.unwrap().len(), 4);
        assert_eq!(b.select_allocations(SEED_USER).await.unwrap().len(), 5);
    }
}
