//! Configuration file handling.
//!
//! The configuration file is stored at `$SALDO_HOME/config.json` and holds
//! the hosted-store project URL plus the locations of the secret files (the
//! API key and the session token), both of which default to the `.secrets`
//! subdirectory.

use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "saldo";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const API_KEY_FILE: &str = "api_key";
const SESSION_JSON: &str = "session.json";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You
/// instantiate it by providing the path to `$SALDO_HOME` and from there it
/// loads `$SALDO_HOME/config.json`. It provides paths to the other items
/// expected in the data directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    project_ref: String,
}

impl Config {
    /// Creates the data directory and its `.secrets` subdirectory, writes an
    /// initial `config.json` for `project_url`, and stores `api_key` in its
    /// default secrets location with owner-only permissions.
    ///
    /// # Errors
    /// - Returns an error if a configuration already exists at `dir`.
    /// - Returns an error if `project_url` is not a valid URL.
    /// - Returns an error if any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        project_url: &str,
        api_key: &str,
    ) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the saldo home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            );
        }

        let project_ref = extract_project_ref(project_url)
            .context("Failed to extract the project ref from the project URL")?;

        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;
        utils::write_secret(secrets.join(API_KEY_FILE), api_key.trim()).await?;

        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            project_url: project_url.trim_end_matches('/').to_string(),
            api_key_path: None,
            session_path: None,
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets,
            config_path,
            config_file,
            project_ref,
        })
    }

    /// This will
    /// - validate that `saldo_home` and the config file exist
    /// - load the config file
    /// - validate that the secrets directory exists
    /// - return the loaded configuration object
    pub async fn load(saldo_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = saldo_home.into();
        let root = utils::canonicalize(&maybe_relative).await?;

        let _ = utils::read_dir(&root)
            .await
            .context("Saldo home is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let project_ref = extract_project_ref(&config_file.project_url)
            .context("Failed to extract the project ref from the project URL")?;

        let config = Self {
            root: root.clone(),
            secrets: root.join(SECRETS),
            config_path,
            config_file,
            project_ref,
        };
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    /// The hosted-store project URL with no trailing slash.
    pub fn project_url(&self) -> &str {
        &self.config_file.project_url
    }

    /// The subdomain identifying the hosted-store project. Keys the test
    /// store's state in test mode.
    pub fn project_ref(&self) -> &str {
        &self.project_ref
    }

    /// Returns the stored `api_key_path` if it is absolute, otherwise resolves
    /// the relative path.
    pub fn api_key_path(&self) -> PathBuf {
        self.resolve_secrets_file_path(self.config_file.api_key_path())
    }

    /// Returns the stored `session_path` if it is absolute, otherwise resolves
    /// the relative path.
    pub fn session_path(&self) -> PathBuf {
        self.resolve_secrets_file_path(self.config_file.session_path())
    }

    /// Reads the API key from its secrets file.
    pub async fn api_key(&self) -> Result<String> {
        let path = self.api_key_path();
        let key = utils::read(&path)
            .await
            .context("Unable to read the API key. Did you run 'saldo init'?")?;
        Ok(key.trim().to_string())
    }

    /// Checks if `p` is relative, and if so, resolves it. Returns it unchanged
    /// if it is absolute.
    fn resolve_secrets_file_path(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the
/// configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "saldo",
///   "config_version": 1,
///   "project_url": "https://nlcpkxqmrafqyzfxzibw.supabase.co",
///   "api_key_path": ".secrets/api_key",
///   "session_path": ".secrets/session.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "saldo"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// URL of the hosted-store project
    project_url: String,

    /// Path to the API key file (optional, relative to config.json or absolute)
    /// Defaults to $SALDO_HOME/.secrets/api_key if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key_path: Option<PathBuf>,

    /// Path to the session token file (optional, relative to config.json or absolute)
    /// Defaults to $SALDO_HOME/.secrets/session.json if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    session_path: Option<PathBuf>,
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Gets the API key path.
    ///
    /// If the path is relative, it should be interpreted as relative to the
    /// config.json file. If None, defaults to $SALDO_HOME/.secrets/api_key
    pub fn api_key_path(&self) -> PathBuf {
        self.api_key_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(API_KEY_FILE))
    }

    /// Gets the session path.
    ///
    /// If the path is relative, it should be interpreted as relative to the
    /// config.json file. If None, defaults to $SALDO_HOME/.secrets/session.json
    pub fn session_path(&self) -> PathBuf {
        self.session_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(SESSION_JSON))
    }
}

/// Extracts the project ref from a hosted-store project URL.
///
/// The ref is the first label of the host, e.g.
/// `https://nlcpkxqmrafqyzfxzibw.supabase.co` -> `nlcpkxqmrafqyzfxzibw`.
/// A host with no dots (e.g. a self-hosted `http://localhost:54321`) is its
/// own ref.
fn extract_project_ref(project_url: &str) -> Result<String> {
    let parsed = url::Url::parse(project_url)
        .with_context(|| format!("Invalid project URL '{project_url}'"))?;
    let host = parsed
        .host_str()
        .with_context(|| format!("The project URL '{project_url}' has no host"))?;
    let first_label = host.split('.').next().unwrap_or(host);
    if first_label.is_empty() {
        bail!("The project URL '{project_url}' has an empty host");
    }
    Ok(first_label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const URL: &str = "https://nlcpkxqmrafqyzfxzibw.supabase.co";

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("saldo_home");

        let config = Config::create(&home_dir, URL, "anon-key-123\n")
            .await
            .unwrap();

        assert_eq!(URL, config.project_url());
        assert_eq!("nlcpkxqmrafqyzfxzibw", config.project_ref());
        assert_eq!("anon-key-123", config.api_key().await.unwrap());
        assert!(config.secrets().is_dir());
    }

    #[tokio::test]
    async fn test_config_create_then_load() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("saldo_home");
        let created = Config::create(&home_dir, URL, "key").await.unwrap();

        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(created.project_url(), loaded.project_url());
        assert_eq!(created.project_ref(), loaded.project_ref());
        assert_eq!(created.session_path(), loaded.session_path());
    }

    #[tokio::test]
    async fn test_config_create_refuses_existing() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("saldo_home");
        Config::create(&home_dir, URL, "key").await.unwrap();

        let result = Config::create(&home_dir, URL, "key").await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("already exists"));
    }

    #[tokio::test]
    async fn test_config_create_strips_trailing_slash() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("saldo_home");
        let config = Config::create(&home_dir, "https://abc.supabase.co/", "key")
            .await
            .unwrap();
        assert_eq!("https://abc.supabase.co", config.project_url());
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path().join("nope")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.json");
        let json = r#"{
            "app_name": "saldo",
            "config_version": 1,
            "project_url": "https://minimal.supabase.co"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.project_url, "https://minimal.supabase.co");
        assert_eq!(
            config.api_key_path(),
            PathBuf::from(SECRETS).join(API_KEY_FILE)
        );
        assert_eq!(
            config.session_path(),
            PathBuf::from(SECRETS).join(SESSION_JSON)
        );
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.json");
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "project_url": "https://x.supabase.co"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_serialization_omits_none_fields() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("saldo_home");
        let config = Config::create(&home_dir, URL, "key").await.unwrap();

        let json = utils::read(config.config_path()).await.unwrap();
        assert!(!json.contains("api_key_path"));
        assert!(!json.contains("session_path"));
    }

    #[test]
    fn test_extract_project_ref() {
        assert_eq!(
            extract_project_ref("https://nlcpkxqmrafqyzfxzibw.supabase.co").unwrap(),
            "nlcpkxqmrafqyzfxzibw"
        );
        assert_eq!(
            extract_project_ref("http://localhost:54321").unwrap(),
            "localhost"
        );
        assert!(extract_project_ref("not a url").is_err());
        assert!(extract_project_ref("").is_err());
    }
}
