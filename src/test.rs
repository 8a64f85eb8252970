//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::{Session, TestStore, TestStoreState, SEED_USER};
use crate::Config;
use tempfile::TempDir;
use uuid::Uuid;

/// Test environment that sets up a saldo home directory with a Config and a
/// stored session for the seed user. Each environment gets a unique project
/// ref, so its test-store state is isolated from other tests. Holds the
/// TempDir to keep the directory alive for the duration of the test.
pub(crate) struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with a Config and a signed-in seed user.
    pub(crate) async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("saldo");

        let rand = Uuid::new_v4().to_string().replace('-', "");
        let project_url = format!("https://{rand}.supabase.co");
        let config = Config::create(&root, &project_url, "test-api-key")
            .await
            .unwrap();

        let session = Session::for_test(SEED_USER);
        session.save(&config).await.unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub(crate) fn config(&self) -> Config {
        self.config.clone()
    }

    /// Gets the current state of the test store associated with this
    /// environment.
    pub(crate) fn get_state(&self) -> TestStoreState {
        TestStore::new(self.config.project_ref()).get_state()
    }

    /// Sets the state of the test store associated with this environment.
    pub(crate) fn set_state(&self, state: TestStoreState) {
        TestStore::new(self.config.project_ref()).set_state(state)
    }
}
