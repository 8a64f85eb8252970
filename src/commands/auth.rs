//! Authentication command handlers.
//!
//! This module implements the CLI commands for:
//! - `saldo auth login` - Exchange email and password for a session
//! - `saldo auth verify` - Verify the stored session

use crate::api::{self, Mode, Session};
use crate::commands::Out;
use crate::model::Profile;
use crate::{Config, Result};
use anyhow::{bail, Context};
use chrono::Utc;

/// Handles the `saldo auth login` command.
///
/// This is the ONLY command that contacts the token endpoint. The resulting
/// session is saved to the secrets directory with owner-only permissions.
///
/// # Errors
/// Returns an error if the token endpoint rejects the credentials or cannot
/// be reached.
pub async fn auth_login(config: &Config, email: &str, password: &str) -> Result<Out<()>> {
    let session = Session::sign_in(config, email, password)
        .await
        .context("Unable to sign in to the hosted store")?;
    session.save(config).await?;
    Ok(format!(
        "Signed in as {}",
        session.email().unwrap_or_else(|| session.user_id())
    )
    .into())
}

/// Handles the `saldo auth verify` command.
///
/// This command NEVER contacts the token endpoint or starts a sign-in. It
/// checks that a stored session exists and has not expired, then reads the
/// user's profile row through the store, which exercises the token against
/// row-level security.
///
/// # Errors
/// Returns an error telling the user to run `saldo auth login` when the
/// session is missing, expired or rejected by the store.
pub async fn auth_verify(config: &Config, mode: Mode) -> Result<Out<Profile>> {
    let session = Session::load(config).await.context(
        "Unable to use an existing session. \n\n\
        You should run 'saldo auth login' to sign in.",
    )?;
    if session.is_expired(Utc::now()) {
        bail!("Your session has expired. Run 'saldo auth login' to sign in again.");
    }

    let mut store = api::store(config, mode, &session).await?;
    let profile = store
        .get_profile(session.user_id())
        .await
        .context("The stored session was rejected by the store")?;

    let greeting = profile
        .as_ref()
        .and_then(|p| p.full_name.as_deref())
        .or_else(|| session.email())
        .unwrap_or_else(|| session.user_id())
        .to_string();
    let message = format!("Your session is valid! Signed in as {greeting}");
    Ok(match profile {
        Some(profile) => Out::new(message, profile),
        None => Out::new_message(message),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_verify_greets_by_profile_name() {
        let env = TestEnv::new().await;

        let out = auth_verify(&env.config(), Mode::Test).await.unwrap();
        assert!(out.message().contains("Your session is valid!"));
        assert!(out.message().contains("Budi Santoso"));
        assert_eq!(
            out.structure().unwrap().full_name.as_deref(),
            Some("Budi Santoso")
        );
    }

    #[tokio::test]
    async fn test_verify_without_session_fails() {
        let env = TestEnv::new().await;
        tokio::fs::remove_file(env.config().session_path())
            .await
            .unwrap();

        let result = auth_verify(&env.config(), Mode::Test).await;
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("saldo auth login"));
    }

    #[tokio::test]
    async fn test_verify_falls_back_to_email_without_profile() {
        let env = TestEnv::new().await;
        let mut state = env.get_state();
        state.profiles.clear();
        env.set_state(state);

        let out = auth_verify(&env.config(), Mode::Test).await.unwrap();
        assert!(out.message().contains("test@example.com"));
        assert!(out.structure().is_none());
    }
}
