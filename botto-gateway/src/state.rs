//! Shared application state.

use std::sync::OnceLock;

use botto_core::{Config, RuleError, RuleSet};
use botto_store::BottoDbPool;

/// Identity details learned from the gateway's ready event.
#[derive(Debug)]
struct ReadyIdentity {
    user_id: u64,
    username: String,
    rules: RuleSet,
}

/// Immutable state shared by every event handler.
///
/// Configuration never changes after startup; the only late-bound piece
/// is the bot's own identity, which arrives with the ready event and is
/// set exactly once.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub db: BottoDbPool,
    base_rules: RuleSet,
    identity: OnceLock<ReadyIdentity>,
}

impl AppState {
    pub fn new(config: Config, db: BottoDbPool) -> Result<Self, RuleError> {
        let base_rules = config.rule_set()?;
        Ok(Self {
            config,
            db,
            base_rules,
            identity: OnceLock::new(),
        })
    }

    /// Record the bot's own identity once the gateway reports ready.
    ///
    /// With mention triggering enabled this is also the point the
    /// @-mention trigger can first be compiled.
    pub fn mark_ready(&self, user_id: u64, username: &str) {
        let rules = if self.config.settings.trigger_on_mention {
            self.base_rules.clone().with_mention_trigger(user_id)
        } else {
            self.base_rules.clone()
        };

        let _ = self.identity.set(ReadyIdentity {
            user_id,
            username: username.to_string(),
            rules,
        });
    }

    /// The bot's own user id, if the ready event has arrived.
    pub fn bot_user_id(&self) -> Option<u64> {
        self.identity.get().map(|i| i.user_id)
    }

    /// The bot's own username, if the ready event has arrived.
    pub fn bot_username(&self) -> Option<&str> {
        self.identity.get().map(|i| i.username.as_str())
    }

    /// The effective rule set (mention trigger included once ready).
    pub fn rules(&self) -> &RuleSet {
        self.identity
            .get()
            .map_or(&self.base_rules, |identity| &identity.rules)
    }
}
