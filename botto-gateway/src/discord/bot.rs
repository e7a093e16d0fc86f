use std::collections::HashMap;
use std::sync::Arc;

use serenity::async_trait;
use serenity::gateway::ActivityData;
use serenity::model::channel::{Channel, Message, Reaction, ReactionType};
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, UserId};
use serenity::model::user::OnlineStatus;
use serenity::prelude::*;
use tracing::{debug, error, info};

use botto_core::{channel_mention_ids, clean_text};

use crate::dm::{self, DmAuthor, DmCommand, DmResponse};
use crate::lifecycle::{
    self, ApprovalEvent, DeleteConfirmEvent, NominationEvent, ReplySource, SourceMessage,
};
use crate::state::AppState;
use crate::sweeper;

use super::effects::apply_effects;

/// Discord event handler.
///
/// The handler only gathers event data and executes effects; every
/// decision lives in `lifecycle` and `dm` so it can run against plain
/// structs in tests.
pub struct Bot {
    pub(super) state: Arc<AppState>,
}

impl Bot {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

/// Server nickname when set, else the platform display name.
fn display_name_of(msg: &Message) -> String {
    msg.member
        .as_ref()
        .and_then(|member| member.nick.clone())
        .unwrap_or_else(|| msg.author.display_name().to_string())
}

/// Build the lifecycle view of a platform message, resolving channel
/// mentions to names for the stored form.
async fn source_message(ctx: &Context, msg: &Message) -> SourceMessage {
    let mut channel_names = HashMap::new();
    for id in channel_mention_ids(&msg.content) {
        if let Ok(Channel::Guild(channel)) = ChannelId::new(id).to_channel(ctx).await {
            channel_names.insert(id, channel.name);
        }
    }

    SourceMessage {
        id: msg.id.get(),
        content: msg.content.clone(),
        clean_content: clean_text(&msg.content, &channel_names),
        author_id: msg.author.id.get(),
        author_username: msg.author.name.clone(),
        author_display_name: display_name_of(msg),
        created_at: msg.timestamp.unix_timestamp(),
    }
}

/// Resolve a message's reply chain to an explicit source.
///
/// A missing reference is not-a-reply; a reference whose target can no
/// longer be fetched is a deleted reference.
async fn resolve_reply(ctx: &Context, msg: &Message) -> ReplySource {
    let Some(reference) = msg.message_reference.as_ref() else {
        return ReplySource::NotAReply;
    };

    if let Some(resolved) = msg.referenced_message.as_deref() {
        return ReplySource::Resolved(source_message(ctx, resolved).await);
    }

    let Some(message_id) = reference.message_id else {
        return ReplySource::NotAReply;
    };

    match reference.channel_id.message(&ctx.http, message_id).await {
        Ok(message) => ReplySource::Resolved(source_message(ctx, &message).await),
        Err(_) => ReplySource::Deleted,
    }
}

/// Username and display name for a reactor, from the reaction's member
/// payload when present, fetched otherwise.
async fn reactor_names(ctx: &Context, reaction: &Reaction, user_id: UserId) -> (String, String) {
    if let Some(member) = &reaction.member {
        let display = member
            .nick
            .clone()
            .unwrap_or_else(|| member.user.display_name().to_string());
        return (member.user.name.clone(), display);
    }

    match user_id.to_user(&ctx.http).await {
        Ok(user) => {
            let display = user.display_name().to_string();
            (user.name.clone(), display)
        }
        Err(_) => (user_id.to_string(), user_id.to_string()),
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.guild_id.is_none() {
            self.handle_dm(&ctx, &msg).await;
            return;
        }

        let state = &self.state;

        let channel_name = match msg.channel_id.to_channel(&ctx).await {
            Ok(Channel::Guild(channel)) => channel.name,
            Ok(_) => return,
            Err(e) => {
                debug!("Failed to fetch channel {}: {}", msg.channel_id, e);
                return;
            }
        };

        if !state.config.settings.channels.allows(&channel_name) {
            return;
        }

        sweeper::maybe_sweep(
            state.db.pool(),
            state.config.settings.delete_unapproved_after_hours,
        )
        .await;

        if !state.rules().is_trigger(&msg.content) {
            return;
        }

        let event = NominationEvent {
            nominator_id: msg.author.id.get(),
            nominator_username: msg.author.name.clone(),
            nominator_display_name: display_name_of(&msg),
            author_is_bot: state.bot_user_id() == Some(msg.author.id.get()),
            reply: resolve_reply(&ctx, &msg).await,
        };

        match lifecycle::handle_nomination(state.db.pool(), &state.config, state.rules(), &event)
            .await
        {
            Ok(outcome) => {
                apply_effects(
                    &ctx.http,
                    &state.config.settings.reactions,
                    state.config.should_reply(),
                    msg.channel_id,
                    msg.id,
                    outcome,
                    None,
                )
                .await;
            }
            Err(e) => {
                error!("Failed to process nomination for message {}: {}", msg.id, e);
            }
        }
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        let state = &self.state;

        let ReactionType::Unicode(emoji) = &reaction.emoji else {
            return;
        };

        let reactions_cfg = &state.config.settings.reactions;
        let is_approval = *emoji == reactions_cfg.approval;
        let is_confirm_delete = *emoji == reactions_cfg.confirm_delete;
        if !is_approval && !is_confirm_delete {
            return;
        }

        let Some(user_id) = reaction.user_id else {
            return;
        };
        if state.bot_user_id() == Some(user_id.get()) {
            return;
        }

        info!("Reaction received: {} on message {}", emoji, reaction.message_id);

        let msg = match reaction.channel_id.message(&ctx.http, reaction.message_id).await {
            Ok(message) => message,
            Err(e) => {
                debug!("Failed to fetch reacted message {}: {}", reaction.message_id, e);
                return;
            }
        };

        let has_pending_marker = msg.reactions.iter().any(|r| {
            r.me && matches!(&r.reaction_type, ReactionType::Unicode(u) if *u == reactions_cfg.pending)
        });

        // The approval flow and the account-deletion flow share the
        // pending marker; channel type tells them apart.
        if reaction.guild_id.is_none() {
            if !is_confirm_delete {
                return;
            }

            let event = DeleteConfirmEvent {
                reactor_id: user_id.get(),
                prompt_author_is_bot: state.bot_user_id() == Some(msg.author.id.get()),
                is_dm: true,
                has_pending_marker,
                request: resolve_reply(&ctx, &msg).await,
            };

            match lifecycle::handle_delete_confirmation(state.db.pool(), &state.config, &event)
                .await
            {
                Ok(Some(outcome)) => {
                    apply_effects(
                        &ctx.http,
                        reactions_cfg,
                        state.config.should_reply(),
                        msg.channel_id,
                        msg.id,
                        outcome,
                        None,
                    )
                    .await;
                }
                Ok(None) => {}
                Err(e) => {
                    error!("Failed to process delete confirmation on {}: {}", msg.id, e);
                }
            }
            return;
        }

        if !is_approval {
            return;
        }

        let (reactor_username, reactor_display_name) =
            reactor_names(&ctx, &reaction, user_id).await;

        let event = ApprovalEvent {
            reactor_id: user_id.get(),
            reactor_username,
            reactor_display_name,
            has_pending_marker,
            nominator_id: msg.author.id.get(),
            nominator_username: msg.author.name.clone(),
            nominator_display_name: display_name_of(&msg),
            reply: resolve_reply(&ctx, &msg).await,
        };

        match lifecycle::handle_approval(state.db.pool(), &state.config, &event).await {
            Ok(Some(outcome)) => {
                let motto_text = match &event.reply {
                    ReplySource::Resolved(source) => Some(source.content.clone()),
                    ReplySource::NotAReply | ReplySource::Deleted => None,
                };
                apply_effects(
                    &ctx.http,
                    reactions_cfg,
                    state.config.should_reply(),
                    msg.channel_id,
                    msg.id,
                    outcome,
                    motto_text.as_deref(),
                )
                .await;
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to process approval on message {}: {}", msg.id, e);
            }
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Connected as {}", ready.user.name);

        self.state.mark_ready(ready.user.id.get(), &ready.user.name);

        ctx.set_presence(
            Some(ActivityData::watching(
                self.state.config.settings.watching_status.clone(),
            )),
            OnlineStatus::Online,
        );
    }
}

impl Bot {
    async fn handle_dm(&self, ctx: &Context, msg: &Message) {
        let state = &self.state;

        if msg.author.bot || state.bot_user_id() == Some(msg.author.id.get()) {
            return;
        }

        info!(
            "Received direct message (ID: {}) from {}: {}",
            msg.id, msg.author.name, msg.content
        );

        let command = DmCommand::parse(&msg.content);
        let author = DmAuthor {
            discord_id: msg.author.id.get(),
            username: msg.author.name.clone(),
        };
        let bot_username = state.bot_username().unwrap_or("the bot").to_string();

        let response =
            dm::run_dm_command(state.db.pool(), &state.config, command, &author, &bot_username)
                .await;

        match response {
            Ok(DmResponse::Text(text)) => {
                if let Err(e) = msg.channel_id.say(&ctx.http, text).await {
                    error!("Failed to send DM response to {}: {}", msg.author.name, e);
                }
            }
            Ok(DmResponse::Outcome(outcome)) => {
                apply_effects(
                    &ctx.http,
                    &state.config.settings.reactions,
                    state.config.should_reply(),
                    msg.channel_id,
                    msg.id,
                    outcome,
                    None,
                )
                .await;
            }
            Ok(DmResponse::DeletePrompt(prompt)) => match msg.reply(&ctx.http, prompt).await {
                Ok(sent) => {
                    let pending = ReactionType::Unicode(
                        state.config.settings.reactions.pending.clone(),
                    );
                    if let Err(e) = sent.react(&ctx.http, pending).await {
                        debug!("Failed to mark delete prompt pending: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to send delete prompt to {}: {}", msg.author.name, e);
                }
            },
            Err(e) => {
                error!("Failed to process DM {}: {}", msg.id, e);
            }
        }
    }
}
