//! Member records and identity reconciliation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::query::{Filter, bind_all_as};

/// Member record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub discord_id: String,
    pub username: String,
    pub nickname: Option<String>,
    pub use_nickname: bool,
    pub emoji: String,
    pub support: bool,
    pub bot_scope: String,
    pub created_at: i64,
    pub updated_at: i64,
}

const MEMBER_COLUMNS: &str = "id, discord_id, username, nickname, use_nickname, emoji, support, \
     bot_scope, created_at, updated_at";

/// Member repository for store operations
pub struct MemberRepository;

impl MemberRepository {
    /// Look up a member by platform id within one bot scope.
    pub async fn find_by_discord_id(
        pool: &SqlitePool,
        bot_scope: &str,
        discord_id: &str,
    ) -> StoreResult<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE discord_id = ? AND bot_scope = ?"
        ))
        .bind(discord_id)
        .bind(bot_scope)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Member::from))
    }

    /// Get an existing member or create one on first contact.
    ///
    /// New records carry only the platform id and username; nickname,
    /// emoji and support status start empty. Idempotent: a second call
    /// for the same member performs no mutation.
    pub async fn get_or_create(
        pool: &SqlitePool,
        bot_scope: &str,
        discord_id: &str,
        username: &str,
    ) -> StoreResult<Member> {
        if let Some(member) = Self::find_by_discord_id(pool, bot_scope, discord_id).await? {
            debug!("Found existing member: {}", member.id);
            return Ok(member);
        }

        let id = format!("mem_{}", Uuid::new_v4());
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO members (id, discord_id, username, use_nickname, emoji, support, \
             bot_scope, created_at, updated_at)
             VALUES (?, ?, ?, 0, '', 0, ?, ?, ?)",
        )
        .bind(&id)
        .bind(discord_id)
        .bind(username)
        .bind(bot_scope)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        info!("Created member {} for discord id {}", id, discord_id);

        Self::find_by_discord_id(pool, bot_scope, discord_id)
            .await?
            .ok_or_else(|| StoreError::MemberNotFound(id))
    }

    /// Reconcile stored names against the platform's current ones.
    ///
    /// `display_name` is the server nickname when set, else the display
    /// name. Performs at most one write, and only when a field drifted:
    /// - username follows the platform username;
    /// - with the nickname preference on, the nickname follows the
    ///   platform display name unless unchanged or equal to the stored
    ///   username (redundant storage);
    /// - with the preference off, a leftover stored nickname is cleared.
    ///
    /// Returns whether an update was written.
    pub async fn sync_name(
        pool: &SqlitePool,
        member: &Member,
        username: &str,
        display_name: &str,
    ) -> StoreResult<bool> {
        let new_username = if member.username != username {
            Some(username.to_string())
        } else {
            None
        };

        let new_nickname: Option<Option<String>> = if member.use_nickname {
            let drifted = member.nickname.as_deref() != Some(display_name);
            if drifted && display_name != member.username {
                Some(Some(display_name.to_string()))
            } else {
                None
            }
        } else if member.nickname.is_some() {
            Some(None)
        } else {
            None
        };

        if new_username.is_none() && new_nickname.is_none() {
            return Ok(false);
        }

        let final_username = new_username.unwrap_or_else(|| member.username.clone());
        let final_nickname = new_nickname.unwrap_or_else(|| member.nickname.clone());

        debug!(
            "Syncing names for {}: username={:?} nickname={:?}",
            member.id, final_username, final_nickname
        );

        sqlx::query("UPDATE members SET username = ?, nickname = ?, updated_at = ? WHERE id = ?")
            .bind(final_username)
            .bind(final_nickname)
            .bind(Utc::now().timestamp())
            .bind(&member.id)
            .execute(pool)
            .await?;

        Ok(true)
    }

    /// Set the nickname-preference flag; turning it off clears any
    /// stored nickname.
    pub async fn set_use_nickname(pool: &SqlitePool, member_id: &str, on: bool) -> StoreResult<()> {
        let now = Utc::now().timestamp();
        if on {
            sqlx::query("UPDATE members SET use_nickname = 1, updated_at = ? WHERE id = ?")
                .bind(now)
                .bind(member_id)
                .execute(pool)
                .await?;
        } else {
            sqlx::query(
                "UPDATE members SET use_nickname = 0, nickname = NULL, updated_at = ? WHERE id = ?",
            )
            .bind(now)
            .bind(member_id)
            .execute(pool)
            .await?;
        }

        info!("Set nickname preference for {}: {}", member_id, on);
        Ok(())
    }

    /// Conditional single-field emoji update; no-op when unchanged.
    pub async fn set_emoji(pool: &SqlitePool, member: &Member, emoji: &str) -> StoreResult<bool> {
        if member.emoji == emoji {
            return Ok(false);
        }

        sqlx::query("UPDATE members SET emoji = ?, updated_at = ? WHERE id = ?")
            .bind(emoji)
            .bind(Utc::now().timestamp())
            .bind(&member.id)
            .execute(pool)
            .await?;

        debug!("Updated emoji for {}: {:?}", member.id, emoji);
        Ok(true)
    }

    /// Members flagged as help-desk volunteers, ordered by username.
    pub async fn support_members(pool: &SqlitePool) -> StoreResult<Vec<Member>> {
        let mut binds = Vec::new();
        let condition = Filter::eq("support", true).render(&mut binds);
        let sql = format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE {condition} ORDER BY username ASC"
        );

        let rows = bind_all_as(sqlx::query_as::<_, MemberRow>(&sql), binds)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(Member::from).collect())
    }

    /// Delete a member and every motto owned by them.
    ///
    /// Mottos they nominated for other members are kept; only the
    /// attribution is cleared (schema-level SET NULL).
    pub async fn remove_with_mottos(pool: &SqlitePool, member: &Member) -> StoreResult<u64> {
        let deleted = sqlx::query("DELETE FROM mottos WHERE member_id = ?")
            .bind(&member.id)
            .execute(pool)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(&member.id)
            .execute(pool)
            .await?;

        info!(
            "Removed member {} ({}) and {} mottos",
            member.id, member.username, deleted
        );
        Ok(deleted)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    id: String,
    discord_id: String,
    username: String,
    nickname: Option<String>,
    use_nickname: i64,
    emoji: String,
    support: i64,
    bot_scope: String,
    created_at: i64,
    updated_at: i64,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Member {
            id: row.id,
            discord_id: row.discord_id,
            username: row.username,
            nickname: row.nickname,
            use_nickname: row.use_nickname != 0,
            emoji: row.emoji,
            support: row.support != 0,
            bot_scope: row.bot_scope,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_pool;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let member = MemberRepository::get_or_create(pool, "botto", "100", "alex")
            .await
            .unwrap();
        assert_eq!(member.discord_id, "100");
        assert_eq!(member.username, "alex");
        assert!(!member.support);
        assert!(member.nickname.is_none());

        let again = MemberRepository::get_or_create(pool, "botto", "100", "renamed")
            .await
            .unwrap();

        // Second call returns the same record without mutation
        assert_eq!(again.id, member.id);
        assert_eq!(again.username, "alex");
        assert_eq!(again.updated_at, member.updated_at);
    }

    #[tokio::test]
    async fn test_scope_partitions_members() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let a = MemberRepository::get_or_create(pool, "scope-a", "100", "alex")
            .await
            .unwrap();
        let b = MemberRepository::get_or_create(pool, "scope-b", "100", "alex")
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_sync_name_username_drift() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let member = MemberRepository::get_or_create(pool, "botto", "100", "alex")
            .await
            .unwrap();

        let updated = MemberRepository::sync_name(pool, &member, "alex2", "alex2")
            .await
            .unwrap();
        assert!(updated);

        let member = MemberRepository::find_by_discord_id(pool, "botto", "100")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member.username, "alex2");

        // No drift, no write
        let updated = MemberRepository::sync_name(pool, &member, "alex2", "alex2")
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_sync_name_nickname_rules() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let member = MemberRepository::get_or_create(pool, "botto", "100", "alex")
            .await
            .unwrap();
        MemberRepository::set_use_nickname(pool, &member.id, true)
            .await
            .unwrap();
        let member = MemberRepository::find_by_discord_id(pool, "botto", "100")
            .await
            .unwrap()
            .unwrap();

        // Nickname equal to the username is not stored
        let updated = MemberRepository::sync_name(pool, &member, "alex", "alex")
            .await
            .unwrap();
        assert!(!updated);

        // A real server nickname is stored
        let updated = MemberRepository::sync_name(pool, &member, "alex", "The Alex")
            .await
            .unwrap();
        assert!(updated);
        let member = MemberRepository::find_by_discord_id(pool, "botto", "100")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member.nickname.as_deref(), Some("The Alex"));

        // Preference off clears the leftover nickname on the next sync
        MemberRepository::set_use_nickname(pool, &member.id, false)
            .await
            .unwrap();
        let member = MemberRepository::find_by_discord_id(pool, "botto", "100")
            .await
            .unwrap()
            .unwrap();
        assert!(member.nickname.is_none());
        assert!(!member.use_nickname);
    }

    #[tokio::test]
    async fn test_set_emoji_conditional() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let member = MemberRepository::get_or_create(pool, "botto", "100", "alex")
            .await
            .unwrap();

        assert!(MemberRepository::set_emoji(pool, &member, "😀").await.unwrap());

        let member = MemberRepository::find_by_discord_id(pool, "botto", "100")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member.emoji, "😀");

        // Unchanged value is a no-op
        assert!(!MemberRepository::set_emoji(pool, &member, "😀").await.unwrap());

        // Clearing works the same way
        assert!(MemberRepository::set_emoji(pool, &member, "").await.unwrap());
    }

    #[tokio::test]
    async fn test_support_members_sorted() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let zoe = MemberRepository::get_or_create(pool, "botto", "1", "zoe")
            .await
            .unwrap();
        let amy = MemberRepository::get_or_create(pool, "botto", "2", "amy")
            .await
            .unwrap();
        MemberRepository::get_or_create(pool, "botto", "3", "norma")
            .await
            .unwrap();

        for id in [&zoe.id, &amy.id] {
            sqlx::query("UPDATE members SET support = 1 WHERE id = ?")
                .bind(id)
                .execute(pool)
                .await
                .unwrap();
        }

        let support = MemberRepository::support_members(pool).await.unwrap();
        let names: Vec<&str> = support.iter().map(|m| m.username.as_str()).collect();
        assert_eq!(names, vec!["amy", "zoe"]);
    }
}
