//! Session handling for the hosted store's token endpoint.
//!
//! Signing in exchanges an email and password for an access token at
//! `{project_url}/auth/v1/token?grant_type=password`. The resulting session
//! is persisted at `.secrets/session.json` with owner-only permissions.
//! There is no automatic refresh; an expired session asks the user to sign
//! in again.

use crate::{utils, Config, Result};
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The stored outcome of a successful sign-in: who the user is and the token
/// that authenticates their row access.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Session {
    access_token: String,
    user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    /// Unix timestamp at which the access token expires, when the token
    /// endpoint reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<i64>,
}

impl Session {
    /// Exchanges `email` and `password` for a session at the token endpoint.
    ///
    /// # Errors
    /// Returns an error when the endpoint is unreachable or rejects the
    /// credentials; the response body is included in the error.
    pub async fn sign_in(config: &Config, email: &str, password: &str) -> Result<Self> {
        let api_key = config.api_key().await?;
        let url = format!("{}/auth/v1/token?grant_type=password", config.project_url());

        let client = reqwest::Client::new();
        let response = client
            .post(&url)
            .header("apikey", &api_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .context("Failed to reach the token endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            bail!("Sign-in failed with status {status}: {body}");
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse the token endpoint response")?;

        Ok(Self {
            access_token: token.access_token,
            user_id: token.user.id,
            email: token.user.email,
            expires_at: token.expires_at,
        })
    }

    /// Loads the session from its secrets file.
    pub async fn load(config: &Config) -> Result<Self> {
        utils::deserialize(&config.session_path())
            .await
            .context("No session found. Run 'saldo auth login' to sign in.")
    }

    /// Saves the session to its secrets file with owner-only permissions.
    pub async fn save(&self, config: &Config) -> Result<()> {
        let data =
            serde_json::to_string_pretty(self).context("Unable to serialize the session")?;
        utils::write_secret(config.session_path(), data).await
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// True when the token carried an expiry and it has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now.timestamp(),
            None => false,
        }
    }

    #[cfg(test)]
    /// Creates a session without contacting the token endpoint.
    pub(crate) fn for_test(user_id: impl Into<String>) -> Self {
        Self {
            access_token: "test-token".to_string(),
            user_id: user_id.into(),
            email: Some("test@example.com".to_string()),
            expires_at: None,
        }
    }
}

/// The token endpoint's response, reduced to the fields the app keeps.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_config(dir: &TempDir) -> Config {
        Config::create(
            dir.path().join("saldo"),
            "https://abcdefghij.supabase.co",
            "anon-key",
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir).await;

        let session = Session::for_test("user-1");
        session.save(&config).await.unwrap();

        let loaded = Session::load(&config).await.unwrap();
        assert_eq!(session, loaded);
        assert_eq!(loaded.user_id(), "user-1");
        assert_eq!(loaded.email(), Some("test@example.com"));
    }

    #[tokio::test]
    async fn test_load_missing_session() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir).await;

        let result = Session::load(&config).await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("saldo auth login"));
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let mut session = Session::for_test("user-1");
        assert!(!session.is_expired(now));

        session.expires_at = Some(now.timestamp() - 1);
        assert!(session.is_expired(now));

        session.expires_at = Some(now.timestamp() + 3600);
        assert!(!session.is_expired(now));
    }

    #[test]
    fn test_parse_token_response() {
        let json = r#"{
            "access_token": "jwt-abc",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1750000000,
            "refresh_token": "r-123",
            "user": { "id": "user-1", "email": "a@b.co", "role": "authenticated" }
        }"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "jwt-abc");
        assert_eq!(token.expires_at, Some(1_750_000_000));
        assert_eq!(token.user.id, "user-1");
    }
}
