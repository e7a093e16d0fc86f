//! Outcome → effect mapping.
//!
//! Every user-visible consequence of an event goes through this table.
//! Handlers decide an [`Outcome`]; the gateway's effect executor resolves
//! each [`ReactionKey`] through configuration and performs the platform
//! calls. No caller emits ad-hoc reactions.

use std::fmt;

/// Named result of handling one chat event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Motto recorded, awaiting author confirmation
    Pending,
    /// Author confirmed; motto text stored
    Stored,
    /// Candidate already exists in this scope
    Duplicate,
    /// The nominated message has been deleted
    Deleted,
    /// Nominated content failed the validation rules
    Invalid,
    /// Member tried to nominate their own message
    Fishing,
    /// The bot's own message was nominated
    Skynet,
    /// Nomination was not a reply to anything
    NotReply,
    /// Unrecognized DM content
    UnknownDm,
    /// `!emoji` argument is not a single standard emoji
    InvalidEmoji,
    /// `!emoji` accepted
    ValidEmoji,
    /// Account deletion confirmed and performed
    DeleteConfirmed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Outcome::Pending => "pending",
            Outcome::Stored => "stored",
            Outcome::Duplicate => "duplicate",
            Outcome::Deleted => "deleted",
            Outcome::Invalid => "invalid",
            Outcome::Fishing => "fishing",
            Outcome::Skynet => "skynet",
            Outcome::NotReply => "not_reply",
            Outcome::UnknownDm => "unknown_dm",
            Outcome::InvalidEmoji => "invalid_emoji",
            Outcome::ValidEmoji => "valid_emoji",
            Outcome::DeleteConfirmed => "delete_confirmed",
        };
        write!(f, "{name}")
    }
}

/// Configuration key for one reaction emoji the bot may add or remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKey {
    Pending,
    Success,
    Reject,
    Skynet,
    Fishing,
    Invalid,
    Repeat,
    Deleted,
    Unknown,
    InvalidEmoji,
    ValidEmoji,
    DeleteConfirmed,
}

/// Canned reply lines, rendered with context by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// "Skynet prevention"
    Skynet,
    /// "I see no motto!"
    NotReply,
    /// `"<motto>" will be considered!`
    Stored,
    /// Deletion-complete confirmation
    DataDeleted,
}

/// One ordered side effect of an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    AddReaction(ReactionKey),
    /// Remove the bot's own reaction of this kind
    RemoveOwnReaction(ReactionKey),
    /// Reply to the triggering message; gated on `should_reply`
    Reply(ReplyKind),
    /// Send a message to the channel unconditionally
    Send(ReplyKind),
}

/// The fixed, ordered effect list for an outcome.
pub fn effects_for(outcome: Outcome) -> &'static [Effect] {
    use Effect::{AddReaction as Add, RemoveOwnReaction as RemoveOwn, Reply, Send};
    use ReactionKey as Key;

    match outcome {
        Outcome::Pending => &[Add(Key::Pending)],
        Outcome::Stored => &[
            RemoveOwn(Key::Pending),
            Add(Key::Success),
            Reply(ReplyKind::Stored),
        ],
        Outcome::Duplicate => &[Add(Key::Repeat), RemoveOwn(Key::Pending)],
        Outcome::Deleted => &[
            Add(Key::Deleted),
            Add(Key::Reject),
            RemoveOwn(Key::Pending),
        ],
        Outcome::Invalid => &[Add(Key::Reject), Add(Key::Invalid)],
        Outcome::Fishing => &[Add(Key::Reject), Add(Key::Fishing)],
        Outcome::Skynet => &[
            Add(Key::Reject),
            Add(Key::Skynet),
            Reply(ReplyKind::Skynet),
        ],
        Outcome::NotReply => &[Add(Key::Unknown), Reply(ReplyKind::NotReply)],
        Outcome::UnknownDm => &[Add(Key::Unknown)],
        Outcome::InvalidEmoji => &[Add(Key::InvalidEmoji)],
        Outcome::ValidEmoji => &[Add(Key::ValidEmoji)],
        Outcome::DeleteConfirmed => &[
            RemoveOwn(Key::Pending),
            Add(Key::DeleteConfirmed),
            Send(ReplyKind::DataDeleted),
        ],
    }
}

impl ReplyKind {
    /// Render the reply line; `motto_text` feeds the stored-motto quote.
    pub fn render(&self, motto_text: Option<&str>) -> String {
        match self {
            ReplyKind::Skynet => "Skynet prevention".to_string(),
            ReplyKind::NotReply => "I see no motto!".to_string(),
            ReplyKind::Stored => {
                format!("\"{}\" will be considered!", motto_text.unwrap_or_default())
            }
            ReplyKind::DataDeleted => "All of your data has been removed. If you approve or \
                nominate another motto in future, your user data and any future approved mottos \
                will be captured again."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_only_adds_marker() {
        assert_eq!(
            effects_for(Outcome::Pending),
            &[Effect::AddReaction(ReactionKey::Pending)]
        );
    }

    #[test]
    fn test_stored_removes_marker_before_success() {
        let effects = effects_for(Outcome::Stored);
        assert_eq!(effects[0], Effect::RemoveOwnReaction(ReactionKey::Pending));
        assert_eq!(effects[1], Effect::AddReaction(ReactionKey::Success));
        assert_eq!(effects[2], Effect::Reply(ReplyKind::Stored));
    }

    #[test]
    fn test_every_outcome_has_effects() {
        for outcome in [
            Outcome::Pending,
            Outcome::Stored,
            Outcome::Duplicate,
            Outcome::Deleted,
            Outcome::Invalid,
            Outcome::Fishing,
            Outcome::Skynet,
            Outcome::NotReply,
            Outcome::UnknownDm,
            Outcome::InvalidEmoji,
            Outcome::ValidEmoji,
            Outcome::DeleteConfirmed,
        ] {
            assert!(!effects_for(outcome).is_empty(), "{outcome} has no effects");
        }
    }

    #[test]
    fn test_stored_reply_quotes_motto() {
        let line = ReplyKind::Stored.render(Some("Stay hungry"));
        assert_eq!(line, "\"Stay hungry\" will be considered!");
    }

    #[test]
    fn test_delete_confirmation_is_unconditional_send() {
        let effects = effects_for(Outcome::DeleteConfirmed);
        assert!(effects.contains(&Effect::Send(ReplyKind::DataDeleted)));
    }
}
