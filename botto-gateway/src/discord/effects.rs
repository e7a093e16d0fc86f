//! Executes outcome effects against Discord.
//!
//! The only place reactions are added or removed and replies are sent;
//! handlers hand over an [`Outcome`] and this module walks its effect
//! list. Individual platform calls are best-effort (a missing permission
//! must not abort the rest of the list), so failures are logged and
//! skipped.

use botto_core::{Effect, Outcome, ReactionSettings, effects_for};
use serenity::builder::CreateMessage;
use serenity::http::Http;
use serenity::model::channel::{MessageReference, ReactionType};
use serenity::model::id::{ChannelId, MessageId};
use tracing::debug;

fn unicode(emoji: &str) -> ReactionType {
    ReactionType::Unicode(emoji.to_string())
}

/// Apply the effect list for `outcome` to one message.
///
/// `motto_text` feeds the stored-motto reply quote; `should_reply` gates
/// reply effects (unconditional sends are not gated).
pub async fn apply_effects(
    http: &Http,
    reactions: &ReactionSettings,
    should_reply: bool,
    channel_id: ChannelId,
    message_id: MessageId,
    outcome: Outcome,
    motto_text: Option<&str>,
) {
    for effect in effects_for(outcome) {
        match effect {
            Effect::AddReaction(key) => {
                let reaction = unicode(reactions.emoji(*key));
                if let Err(e) = http.create_reaction(channel_id, message_id, &reaction).await {
                    debug!("Failed to add {:?} reaction: {}", key, e);
                }
            }
            Effect::RemoveOwnReaction(key) => {
                let reaction = unicode(reactions.emoji(*key));
                if let Err(e) = http.delete_reaction_me(channel_id, message_id, &reaction).await {
                    debug!("Failed to remove own {:?} reaction: {}", key, e);
                }
            }
            Effect::Reply(kind) => {
                if !should_reply {
                    continue;
                }
                let message = CreateMessage::new()
                    .content(kind.render(motto_text))
                    .reference_message(MessageReference::from((channel_id, message_id)));
                if let Err(e) = channel_id.send_message(http, message).await {
                    debug!("Failed to send reply for {}: {}", outcome, e);
                }
            }
            Effect::Send(kind) => {
                if let Err(e) = channel_id.say(http, kind.render(motto_text)).await {
                    debug!("Failed to send message for {}: {}", outcome, e);
                }
            }
        }
    }
}
