//! Motto records, duplicate detection and expiry pruning.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::query::{Filter, bind_all, bind_all_as};

/// Motto record
///
/// `text` is empty exactly while the motto awaits author confirmation;
/// `norm_text` is the strict-normalized comparison form and is maintained
/// alongside `text` on every write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Motto {
    pub id: String,
    pub message_id: String,
    pub text: String,
    pub norm_text: String,
    pub created_at: i64,
    pub member_id: String,
    pub nominated_by: Option<String>,
    pub approved: bool,
    pub approved_by_author: bool,
    pub bot_scope: String,
}

const MOTTO_COLUMNS: &str = "id, message_id, text, norm_text, created_at, member_id, \
     nominated_by, approved, approved_by_author, bot_scope";

/// Motto repository for store operations
pub struct MottoRepository;

impl MottoRepository {
    /// Record a fresh nomination awaiting author confirmation.
    ///
    /// `created_at` is the nominated message's own timestamp, which the
    /// expiry sweeper measures age against.
    pub async fn create_pending(
        pool: &SqlitePool,
        bot_scope: &str,
        message_id: &str,
        created_at: i64,
        member_id: &str,
        nominated_by: &str,
        approved: bool,
    ) -> StoreResult<Motto> {
        let id = format!("mot_{}", Uuid::new_v4());

        sqlx::query(
            "INSERT INTO mottos (id, message_id, text, norm_text, created_at, member_id, \
             nominated_by, approved, approved_by_author, bot_scope)
             VALUES (?, ?, '', '', ?, ?, ?, ?, 0, ?)",
        )
        .bind(&id)
        .bind(message_id)
        .bind(created_at)
        .bind(member_id)
        .bind(nominated_by)
        .bind(approved)
        .bind(bot_scope)
        .execute(pool)
        .await?;

        info!("Recorded pending motto {} for message {}", id, message_id);

        Self::find_by_message_id(pool, bot_scope, message_id)
            .await?
            .ok_or(StoreError::MottoNotFound(id))
    }

    /// Look up a motto by its source message id within one bot scope.
    pub async fn find_by_message_id(
        pool: &SqlitePool,
        bot_scope: &str,
        message_id: &str,
    ) -> StoreResult<Option<Motto>> {
        Self::match_one(
            pool,
            Filter::and([
                Filter::eq("bot_scope", bot_scope),
                Filter::eq("message_id", message_id),
            ]),
        )
        .await
    }

    /// Find a stored motto the candidate would duplicate.
    ///
    /// Matches on strict-normalized text within the scope; with
    /// `match_own_message` the candidate's own message id also counts,
    /// which is how a still-pending motto (whose stored text is empty)
    /// recognizes a repeat nomination of the same message.
    pub async fn find_duplicate(
        pool: &SqlitePool,
        bot_scope: &str,
        norm_text: &str,
        message_id: &str,
        match_own_message: bool,
    ) -> StoreResult<Option<Motto>> {
        let text_match = Filter::and([
            Filter::eq("bot_scope", bot_scope),
            Filter::eq("norm_text", norm_text),
        ]);

        let filter = if match_own_message {
            Filter::or([
                text_match,
                Filter::and([
                    Filter::eq("bot_scope", bot_scope),
                    Filter::eq("message_id", message_id),
                ]),
            ])
        } else {
            text_match
        };

        Self::match_one(pool, filter).await
    }

    /// Store the author-approved text and mark the confirmation.
    pub async fn approve_with_text(
        pool: &SqlitePool,
        id: &str,
        text: &str,
        norm_text: &str,
    ) -> StoreResult<()> {
        sqlx::query(
            "UPDATE mottos SET text = ?, norm_text = ?, approved_by_author = 1 WHERE id = ?",
        )
        .bind(text)
        .bind(norm_text)
        .bind(id)
        .execute(pool)
        .await?;

        info!("Stored approved motto {}", id);
        Ok(())
    }

    /// Delete one motto.
    pub async fn delete(pool: &SqlitePool, id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM mottos WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        debug!("Deleted motto {}", id);
        Ok(())
    }

    /// Delete every motto owned by a member; returns the count removed.
    pub async fn delete_for_member(pool: &SqlitePool, member_id: &str) -> StoreResult<u64> {
        let deleted = sqlx::query("DELETE FROM mottos WHERE member_id = ?")
            .bind(member_id)
            .execute(pool)
            .await?
            .rows_affected();

        debug!("Deleted {} mottos for member {}", deleted, member_id);
        Ok(deleted)
    }

    /// Delete unconfirmed mottos older than the cutoff, across all
    /// scopes visible in this store; returns the count removed.
    pub async fn delete_stale_pending(pool: &SqlitePool, cutoff: i64) -> StoreResult<u64> {
        let mut binds = Vec::new();
        let condition = Filter::and([Filter::eq("text", ""), Filter::lt("created_at", cutoff)])
            .render(&mut binds);
        let sql = format!("DELETE FROM mottos WHERE {condition}");

        let deleted = bind_all(sqlx::query(&sql), binds)
            .execute(pool)
            .await?
            .rows_affected();

        if deleted > 0 {
            info!("Swept {} stale pending mottos", deleted);
        }
        Ok(deleted)
    }

    /// First motto matching the filter, if any.
    pub async fn match_one(pool: &SqlitePool, filter: Filter) -> StoreResult<Option<Motto>> {
        let mut binds = Vec::new();
        let condition = filter.render(&mut binds);
        let sql = format!("SELECT {MOTTO_COLUMNS} FROM mottos WHERE {condition} LIMIT 1");

        let row = bind_all_as(sqlx::query_as::<_, MottoRow>(&sql), binds)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Motto::from))
    }

    /// All mottos matching the filter.
    pub async fn query_all(pool: &SqlitePool, filter: Filter) -> StoreResult<Vec<Motto>> {
        let mut binds = Vec::new();
        let condition = filter.render(&mut binds);
        let sql = format!(
            "SELECT {MOTTO_COLUMNS} FROM mottos WHERE {condition} ORDER BY created_at ASC"
        );

        let rows = bind_all_as(sqlx::query_as::<_, MottoRow>(&sql), binds)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(Motto::from).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MottoRow {
    id: String,
    message_id: String,
    text: String,
    norm_text: String,
    created_at: i64,
    member_id: String,
    nominated_by: Option<String>,
    approved: i64,
    approved_by_author: i64,
    bot_scope: String,
}

impl From<MottoRow> for Motto {
    fn from(row: MottoRow) -> Self {
        Motto {
            id: row.id,
            message_id: row.message_id,
            text: row.text,
            norm_text: row.norm_text,
            created_at: row.created_at,
            member_id: row.member_id,
            nominated_by: row.nominated_by,
            approved: row.approved != 0,
            approved_by_author: row.approved_by_author != 0,
            bot_scope: row.bot_scope,
        }
    }
}
