use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its `.secrets` subdirectory and:
/// - Creates an initial `config.json` file using `project_url`
/// - Writes `api_key` to its default location in the secrets directory.
///
/// # Arguments
/// - `saldo_home` - The directory that will be the root of the data
///   directory, e.g. `$HOME/saldo`
/// - `project_url` - The URL of the hosted-store project where the financial
///   data is stored, e.g. https://nlcpkxqmrafqyzfxzibw.supabase.co
/// - `api_key` - The project's publishable API key.
///
/// # Errors
/// - Returns an error if a configuration already exists.
/// - Returns an error if any file operation fails.
pub async fn init(saldo_home: &Path, project_url: &str, api_key: &str) -> Result<Out<()>> {
    let _config = Config::create(saldo_home, project_url, api_key)
        .await
        .context("Unable to create the data directory and config")?;
    Ok("Successfully created the saldo directory and config".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_config() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("saldo");

        let out = init(&home, "https://abc.supabase.co", "key-123")
            .await
            .unwrap();
        assert!(out.message().contains("Successfully created"));

        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.project_ref(), "abc");
        assert_eq!(config.api_key().await.unwrap(), "key-123");
    }

    #[tokio::test]
    async fn test_init_twice_fails() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("saldo");

        init(&home, "https://abc.supabase.co", "key-123")
            .await
            .unwrap();
        let result = init(&home, "https://abc.supabase.co", "key-123").await;
        assert!(result.is_err());
    }
}
