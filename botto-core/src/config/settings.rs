//! Settings configuration loaded from TOML files.
//!
//! Non-sensitive configuration lives in TOML in the XDG config directory
//! (`~/.config/botto/config.toml`). A default file is written on first run
//! so a fresh deployment has something to edit.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::outcome::ReactionKey;

/// Settings loaded from the TOML configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Identifier partitioning records when several deployments share a store
    pub bot_scope: String,

    /// Whether outcome effects may include a text reply
    pub should_reply: bool,

    /// Whether an @-mention of the bot also counts as a nomination trigger
    pub trigger_on_mention: bool,

    /// When set, new mottos start unapproved and await moderator review
    pub human_moderation_required: bool,

    /// Age in hours after which an unconfirmed motto is swept
    pub delete_unapproved_after_hours: i64,

    /// Presence line shown as "Watching ..."
    pub watching_status: String,

    /// Leaderboard URL returned by `!link` (omit to disable the command)
    pub leaderboard_url: Option<String>,

    /// Channel name appended to the help text for follow-up questions
    pub support_channel: Option<String>,

    /// Nomination trigger patterns, matched from the start of the message
    pub triggers: Vec<String>,

    pub rules: RuleSettings,
    pub channels: ChannelSettings,
    pub reactions: ReactionSettings,
}

/// Inclusion/exclusion patterns a nominated message must satisfy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSettings {
    /// Every pattern must match somewhere in the candidate text
    pub matching: Vec<String>,
    /// No pattern may match anywhere in the candidate text
    pub excluding: Vec<String>,
}

/// Channel gating for nomination messages.
///
/// A non-empty `include` list restricts the bot to those channels;
/// otherwise every channel not in `exclude` is eligible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Emoji assignments for every reaction the bot adds or watches for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionSettings {
    pub pending: String,
    pub success: String,
    pub reject: String,
    pub skynet: String,
    pub fishing: String,
    pub invalid: String,
    pub repeat: String,
    pub deleted: String,
    pub unknown: String,
    pub invalid_emoji: String,
    pub valid_emoji: String,
    pub delete_confirmed: String,

    /// Emoji a nominee reacts with to confirm their motto
    pub approval: String,
    /// Emoji a member reacts with to confirm `!delete`
    pub confirm_delete: String,
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error reading settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize default settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot_scope: "botto".to_string(),
            should_reply: true,
            trigger_on_mention: true,
            human_moderation_required: false,
            delete_unapproved_after_hours: 24,
            watching_status: "for mottos".to_string(),
            leaderboard_url: None,
            support_channel: None,
            triggers: vec![r"^!motto\b".to_string()],
            rules: RuleSettings::default(),
            channels: ChannelSettings::default(),
            reactions: ReactionSettings::default(),
        }
    }
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            matching: vec![r"\S".to_string()],
            excluding: Vec::new(),
        }
    }
}

impl Default for ReactionSettings {
    fn default() -> Self {
        Self {
            pending: "⏳".to_string(),
            success: "📥".to_string(),
            reject: "❌".to_string(),
            skynet: "🤖".to_string(),
            fishing: "🎣".to_string(),
            invalid: "🙅".to_string(),
            repeat: "♻️".to_string(),
            deleted: "🗑️".to_string(),
            unknown: "❓".to_string(),
            invalid_emoji: "⚠️".to_string(),
            valid_emoji: "👍".to_string(),
            delete_confirmed: "✅".to_string(),
            approval: "👍".to_string(),
            confirm_delete: "🗑️".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the config file, writing defaults on first run.
    pub fn load() -> Result<Self, SettingsError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load settings from an explicit path (used by tests).
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            let defaults = Self::default();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, toml::to_string_pretty(&defaults)?)?;
            tracing::info!("Wrote default settings to {}", path.display());
            return Ok(defaults);
        }

        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Path to the settings file
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        let config_dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(config_dir.join("botto").join("config.toml"))
    }
}

impl ReactionSettings {
    /// Resolve a reaction key to its configured emoji.
    pub fn emoji(&self, key: ReactionKey) -> &str {
        match key {
            ReactionKey::Pending => &self.pending,
            ReactionKey::Success => &self.success,
            ReactionKey::Reject => &self.reject,
            ReactionKey::Skynet => &self.skynet,
            ReactionKey::Fishing => &self.fishing,
            ReactionKey::Invalid => &self.invalid,
            ReactionKey::Repeat => &self.repeat,
            ReactionKey::Deleted => &self.deleted,
            ReactionKey::Unknown => &self.unknown,
            ReactionKey::InvalidEmoji => &self.invalid_emoji,
            ReactionKey::ValidEmoji => &self.valid_emoji,
            ReactionKey::DeleteConfirmed => &self.delete_confirmed,
        }
    }
}

impl ChannelSettings {
    /// Whether the bot should process messages in the named channel.
    pub fn allows(&self, channel_name: &str) -> bool {
        if !self.include.is_empty() {
            return self.include.iter().any(|c| c == channel_name);
        }
        !self.exclude.iter().any(|c| c == channel_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip() {
        let defaults = Settings::default();
        let toml = toml::to_string_pretty(&defaults).unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();

        assert_eq!(parsed.bot_scope, "botto");
        assert!(parsed.should_reply);
        assert_eq!(parsed.delete_unapproved_after_hours, 24);
        assert_eq!(parsed.reactions.pending, "⏳");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: Settings = toml::from_str(
            r#"
            bot_scope = "botto-test"
            triggers = ["^!quote"]

            [reactions]
            pending = "👀"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.bot_scope, "botto-test");
        assert_eq!(parsed.triggers, vec!["^!quote".to_string()]);
        assert_eq!(parsed.reactions.pending, "👀");
        // Unspecified reaction keys keep their defaults
        assert_eq!(parsed.reactions.success, "📥");
        assert!(parsed.trigger_on_mention);
    }

    #[test]
    fn test_load_from_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.bot_scope, "botto");
        assert!(path.exists());

        // Second load reads the file it just wrote
        let again = Settings::load_from(&path).unwrap();
        assert_eq!(again.bot_scope, settings.bot_scope);
    }

    #[test]
    fn test_channel_gating() {
        let mut channels = ChannelSettings::default();
        assert!(channels.allows("general"));

        channels.exclude = vec!["mod-only".to_string()];
        assert!(channels.allows("general"));
        assert!(!channels.allows("mod-only"));

        channels.include = vec!["mottos".to_string()];
        assert!(channels.allows("mottos"));
        // Include list wins over exclude once non-empty
        assert!(!channels.allows("general"));
    }
}
