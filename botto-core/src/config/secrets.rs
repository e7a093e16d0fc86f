//! Secrets configuration loaded from environment variables only.
//!
//! Sensitive values like the Discord bot token are never stored in the
//! settings file; they are read from the environment (with a `.env` file
//! picked up for development convenience).

use std::env;

/// Secrets loaded exclusively from environment variables.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// Discord bot token (env: DISCORD_BOT_TOKEN)
    pub discord_bot_token: String,
}

/// Errors that can occur when loading secrets
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("Missing required secret: {0}")]
    MissingSecret(&'static str),
}

impl Secrets {
    /// Load secrets from environment variables.
    ///
    /// Also loads a `.env` file if present (development convenience);
    /// production should rely on actual environment variables.
    pub fn from_env() -> Result<Self, SecretsError> {
        let _ = dotenvy::dotenv();

        Self::from_env_inner()
    }

    /// Internal method to load from environment without loading .env
    pub(crate) fn from_env_inner() -> Result<Self, SecretsError> {
        let discord_bot_token = env::var("DISCORD_BOT_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or(SecretsError::MissingSecret("DISCORD_BOT_TOKEN"))?;

        Ok(Self { discord_bot_token })
    }
}
