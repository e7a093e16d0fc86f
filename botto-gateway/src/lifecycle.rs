//! The motto lifecycle state machine.
//!
//! A motto moves through nomination → pending → {approved, duplicate,
//! deleted, expired}. Every transition is driven by an external event;
//! the functions here take plain event data plus the store pool and
//! return an [`Outcome`], so the whole machine runs in tests without a
//! Discord connection. The serenity handler gathers the event data and
//! hands each outcome to the effect executor.

use botto_core::{Config, Outcome, RuleSet, strict_normalize};
use botto_store::{MemberRepository, MottoRepository, StoreResult};
use sqlx::SqlitePool;
use tracing::{debug, info};

/// The message a nomination or approval ultimately points at.
#[derive(Debug, Clone)]
pub struct SourceMessage {
    pub id: u64,
    /// Raw platform content
    pub content: String,
    /// Content with channel mentions and custom emoji substituted
    pub clean_content: String,
    pub author_id: u64,
    pub author_username: String,
    pub author_display_name: String,
    /// Platform timestamp of the message, epoch seconds
    pub created_at: i64,
}

/// Where a reply chain leads.
///
/// Distinguishing a missing reference from a deleted one keeps the two
/// very different rejection paths explicit.
#[derive(Debug, Clone)]
pub enum ReplySource {
    /// The message is not a reply at all
    NotAReply,
    /// The message replies to something that has since been deleted
    Deleted,
    Resolved(SourceMessage),
}

/// A trigger message observed in an eligible guild channel.
#[derive(Debug)]
pub struct NominationEvent {
    pub nominator_id: u64,
    pub nominator_username: String,
    pub nominator_display_name: String,
    /// The trigger message was authored by the bot account itself
    pub author_is_bot: bool,
    pub reply: ReplySource,
}

/// An approval-emoji reaction on a message carrying state.
#[derive(Debug)]
pub struct ApprovalEvent {
    pub reactor_id: u64,
    pub reactor_username: String,
    pub reactor_display_name: String,
    /// The reacted message carries the bot's own pending marker
    pub has_pending_marker: bool,
    /// Author of the reacted (nomination) message
    pub nominator_id: u64,
    pub nominator_username: String,
    pub nominator_display_name: String,
    /// The nominated message the reacted message replies to
    pub reply: ReplySource,
}

/// A confirm-delete reaction on a message in a DM channel.
#[derive(Debug)]
pub struct DeleteConfirmEvent {
    pub reactor_id: u64,
    /// The reacted message is the bot's own confirmation prompt
    pub prompt_author_is_bot: bool,
    pub is_dm: bool,
    pub has_pending_marker: bool,
    /// The message the prompt replies to (the member's `!delete`)
    pub request: ReplySource,
}

/// Process a nomination trigger message.
///
/// Guard order follows the established flow: skynet → not-a-reply →
/// invalid → fishing → duplicate → record pending. A deleted reply
/// target at this stage has nothing left to nominate and is treated as
/// not-a-reply.
pub async fn handle_nomination(
    pool: &SqlitePool,
    config: &Config,
    rules: &RuleSet,
    event: &NominationEvent,
) -> StoreResult<Outcome> {
    if event.author_is_bot {
        info!("{} attempted to activate Skynet!", event.nominator_username);
        return Ok(Outcome::Skynet);
    }

    let source = match &event.reply {
        ReplySource::Resolved(source) => source,
        ReplySource::NotAReply | ReplySource::Deleted => {
            info!("Nomination from {} was not a reply", event.nominator_username);
            return Ok(Outcome::NotReply);
        }
    };

    if !rules.is_valid_candidate(&source.content) {
        info!(
            "Nomination from {} is invalid according to rules",
            event.nominator_username
        );
        return Ok(Outcome::Invalid);
    }

    if source.author_id == event.nominator_id {
        info!("Motto fishing from: {}", event.nominator_username);
        return Ok(Outcome::Fishing);
    }

    info!("Motto suggestion incoming: {:?}", source.content);

    let scope = config.bot_scope();
    let message_id = source.id.to_string();
    let norm = strict_normalize(&source.clean_content);

    if MottoRepository::find_duplicate(pool, scope, &norm, &message_id, true)
        .await?
        .is_some()
    {
        debug!("Ignoring motto, it's a duplicate");
        return Ok(Outcome::Duplicate);
    }

    let nominee = MemberRepository::get_or_create(
        pool,
        scope,
        &source.author_id.to_string(),
        &source.author_username,
    )
    .await?;
    let nominator = MemberRepository::get_or_create(
        pool,
        scope,
        &event.nominator_id.to_string(),
        &event.nominator_username,
    )
    .await?;

    MottoRepository::create_pending(
        pool,
        scope,
        &message_id,
        source.created_at,
        &nominee.id,
        &nominator.id,
        !config.settings.human_moderation_required,
    )
    .await?;

    MemberRepository::sync_name(
        pool,
        &nominee,
        &source.author_username,
        &source.author_display_name,
    )
    .await?;
    MemberRepository::sync_name(
        pool,
        &nominator,
        &event.nominator_username,
        &event.nominator_display_name,
    )
    .await?;

    Ok(Outcome::Pending)
}

/// Process an approval reaction on a nomination message.
///
/// Returns `None` for stale or irrelevant events that must produce no
/// visible effect at all: missing pending marker, a reactor other than
/// the nominee, or a reaction with no matching record.
pub async fn handle_approval(
    pool: &SqlitePool,
    config: &Config,
    event: &ApprovalEvent,
) -> StoreResult<Option<Outcome>> {
    if !event.has_pending_marker {
        debug!("Ignoring approval on a message not pending approval");
        return Ok(None);
    }

    let source = match &event.reply {
        ReplySource::Resolved(source) => source,
        ReplySource::Deleted => {
            debug!("Ignoring approval for a message that's been deleted");
            return Ok(Some(Outcome::Deleted));
        }
        ReplySource::NotAReply => {
            debug!("Ignoring approval on a message with no reply target");
            return Ok(None);
        }
    };

    if source.author_id != event.reactor_id {
        debug!("Ignoring approval from somebody other than the motto author");
        return Ok(None);
    }

    let scope = config.bot_scope();
    let message_id = source.id.to_string();

    let Some(motto) = MottoRepository::find_by_message_id(pool, scope, &message_id).await? else {
        debug!("No motto record for message {}, ignoring stale event", message_id);
        return Ok(None);
    };

    let norm = strict_normalize(&source.clean_content);

    if MottoRepository::find_duplicate(pool, scope, &norm, &message_id, false)
        .await?
        .is_some()
    {
        MottoRepository::delete(pool, &motto.id).await?;
        return Ok(Some(Outcome::Duplicate));
    }

    MottoRepository::approve_with_text(pool, &motto.id, &source.clean_content, &norm).await?;

    // Names refresh here, not at nomination time, so late nickname edits
    // are captured with the approval.
    let nominee = MemberRepository::get_or_create(
        pool,
        scope,
        &event.reactor_id.to_string(),
        &event.reactor_username,
    )
    .await?;
    let nominator = MemberRepository::get_or_create(
        pool,
        scope,
        &event.nominator_id.to_string(),
        &event.nominator_username,
    )
    .await?;
    MemberRepository::sync_name(
        pool,
        &nominee,
        &event.reactor_username,
        &event.reactor_display_name,
    )
    .await?;
    MemberRepository::sync_name(
        pool,
        &nominator,
        &event.nominator_username,
        &event.nominator_display_name,
    )
    .await?;

    Ok(Some(Outcome::Stored))
}

/// Process a confirm-delete reaction on the bot's `!delete` prompt.
///
/// The same pending marker correlates this flow and motto approval; the
/// DM channel type is what tells them apart. All guards must hold:
/// bot-authored prompt, DM channel, marker present, the prompt replies
/// to a literal `!delete`, and the reactor is its author.
pub async fn handle_delete_confirmation(
    pool: &SqlitePool,
    config: &Config,
    event: &DeleteConfirmEvent,
) -> StoreResult<Option<Outcome>> {
    if !event.prompt_author_is_bot {
        debug!("Ignoring delete confirmation on a message not by the bot");
        return Ok(None);
    }
    if !event.is_dm {
        debug!("Ignoring delete confirmation outside a DM");
        return Ok(None);
    }

    let request = match &event.request {
        ReplySource::Resolved(request) => request,
        ReplySource::NotAReply | ReplySource::Deleted => {
            debug!("Ignoring reaction to a prompt not replying to !delete");
            return Ok(None);
        }
    };

    if request.content.trim().to_lowercase() != "!delete" {
        debug!("Ignoring reaction to a prompt not replying to !delete");
        return Ok(None);
    }
    if request.author_id != event.reactor_id {
        debug!("Ignoring delete confirmation from somebody else's DM prompt");
        return Ok(None);
    }
    if !event.has_pending_marker {
        debug!("Ignoring delete confirmation with no pending marker");
        return Ok(None);
    }

    let scope = config.bot_scope();
    if let Some(member) =
        MemberRepository::find_by_discord_id(pool, scope, &event.reactor_id.to_string()).await?
    {
        let removed = MemberRepository::remove_with_mottos(pool, &member).await?;
        info!(
            "Removed member {} and {} mottos on request",
            member.username, removed
        );
    }

    Ok(Some(Outcome::DeleteConfirmed))
}
