//! botto-core: configuration and pure decision logic for the botto motto bot.
//!
//! This crate has no Discord or database dependency. It provides:
//! - Configuration loading (secrets from env, settings from TOML)
//! - Message text normalization (stored form and comparison form)
//! - Nomination validation rules and trigger detection
//! - The outcome → effect table driving every user-visible reaction
//! - Profile emoji validation for the `!emoji` DM command

pub mod config;
pub mod emoji;
pub mod normalize;
pub mod outcome;
pub mod rules;

// Config re-exports
pub use config::{
    ChannelSettings, Config, ConfigError, ReactionSettings, RuleSettings, Secrets, SecretsError,
    Settings, SettingsError, load_dotenv,
};

pub use emoji::normalize_profile_emoji;
pub use normalize::{channel_mention_ids, clean_text, strict_normalize};
pub use outcome::{Effect, Outcome, ReactionKey, ReplyKind, effects_for};
pub use rules::{RuleError, RuleSet};
