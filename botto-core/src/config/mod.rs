//! Configuration management for botto.
//!
//! Configuration is split the same way across every deployment:
//!
//! ## Secrets (Environment Variables)
//! - `DISCORD_BOT_TOKEN` - Discord bot token
//!
//! ## Settings (TOML File)
//! Located at `~/.config/botto/config.toml`:
//! ```toml
//! bot_scope = "botto"
//! should_reply = true
//! trigger_on_mention = true
//! triggers = ["^!motto\\b"]
//!
//! [rules]
//! matching = ["\\S"]
//! excluding = []
//!
//! [channels]
//! include = []
//! exclude = ["mod-backroom"]
//!
//! [reactions]
//! pending = "⏳"
//! approval = "👍"
//! ```

mod secrets;
mod settings;

pub use secrets::{Secrets, SecretsError};
pub use settings::{ChannelSettings, ReactionSettings, RuleSettings, Settings, SettingsError};

use crate::rules::{RuleError, RuleSet};

/// Combined configuration containing both secrets and settings.
///
/// Constructed once at startup and shared by reference for the process
/// lifetime; no component mutates it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secrets loaded from environment variables
    pub secrets: Secrets,
    /// Settings loaded from the TOML configuration file
    pub settings: Settings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Secrets error: {0}")]
    Secrets(#[from] SecretsError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// This loads:
    /// 1. Secrets from environment variables
    /// 2. Settings from the TOML file (creating defaults if needed)
    ///
    /// Trigger and rule patterns are compiled once here so a malformed
    /// pattern fails the process at startup instead of at first use.
    pub fn load() -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env()?;
        let settings = Settings::load()?;

        let config = Self { secrets, settings };
        config.rule_set()?;

        Ok(config)
    }

    /// Compile the configured trigger and validation patterns.
    pub fn rule_set(&self) -> Result<RuleSet, RuleError> {
        RuleSet::compile(&self.settings)
    }

    /// Get the Discord bot token.
    pub fn discord_bot_token(&self) -> &str {
        &self.secrets.discord_bot_token
    }

    /// Get the bot scope identifier.
    pub fn bot_scope(&self) -> &str {
        &self.settings.bot_scope
    }

    /// Whether outcome effects may include a text reply.
    pub fn should_reply(&self) -> bool {
        self.settings.should_reply
    }
}

/// Load .env file if it exists (for development convenience).
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}
