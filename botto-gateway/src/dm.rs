//! The private-message command surface.
//!
//! Commands are case-insensitive, whitespace-trimmed, dispatched on the
//! first token. Parsing is separated from execution so the grammar is
//! testable on its own; execution reuses the identity resolver and
//! returns a [`DmResponse`] for the transport layer to deliver.

use botto_core::{Config, Outcome, normalize_profile_emoji};
use botto_store::{Member, MemberRepository, StoreResult};
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Argument to `!nick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NickOption {
    On,
    Off,
    /// Missing or unrecognized; answered with usage text
    Other,
}

/// A parsed DM command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DmCommand {
    Help,
    Version,
    Link,
    Nick(NickOption),
    Delete,
    /// `!emoji` with no value clears the stored emoji
    Emoji(Option<String>),
    Unknown,
}

impl DmCommand {
    /// Parse trimmed DM content into a command.
    pub fn parse(content: &str) -> Self {
        let trimmed = content.trim();
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let head = parts.next().unwrap_or("").to_lowercase();
        let rest = parts.next().map(str::trim).unwrap_or("");

        match head.as_str() {
            "!help" | "help" | "help!" | "halp" | "halp!" | "!halp" if rest.is_empty() => {
                DmCommand::Help
            }
            "!version" if rest.is_empty() => DmCommand::Version,
            "!link" if rest.is_empty() => DmCommand::Link,
            "!nick" => DmCommand::Nick(match rest.to_lowercase().as_str() {
                "on" => NickOption::On,
                "off" => NickOption::Off,
                _ => NickOption::Other,
            }),
            "!delete" if rest.is_empty() => DmCommand::Delete,
            "!emoji" => {
                if rest.is_empty() {
                    DmCommand::Emoji(None)
                } else {
                    DmCommand::Emoji(Some(rest.to_string()))
                }
            }
            _ => DmCommand::Unknown,
        }
    }
}

/// The DM author, as far as the command processor needs to know them.
#[derive(Debug)]
pub struct DmAuthor {
    pub discord_id: u64,
    pub username: String,
}

/// What the transport layer should do with a processed command.
#[derive(Debug, PartialEq, Eq)]
pub enum DmResponse {
    /// Send this text to the DM channel
    Text(String),
    /// Apply this outcome's effects to the triggering message
    Outcome(Outcome),
    /// Reply with this prompt and mark it with the pending reaction
    DeletePrompt(String),
}

/// Execute a parsed DM command.
pub async fn run_dm_command(
    pool: &SqlitePool,
    config: &Config,
    command: DmCommand,
    author: &DmAuthor,
    bot_username: &str,
) -> StoreResult<DmResponse> {
    match command {
        DmCommand::Help => {
            let support = MemberRepository::support_members(pool).await?;
            Ok(DmResponse::Text(help_text(config, &support, bot_username)))
        }

        DmCommand::Version => {
            let version = env!("CARGO_PKG_VERSION");
            Ok(DmResponse::Text(format!(
                "Version: {} ({})",
                version,
                config.bot_scope()
            )))
        }

        DmCommand::Link => match &config.settings.leaderboard_url {
            Some(url) => Ok(DmResponse::Text(url.clone())),
            None => Ok(DmResponse::Outcome(Outcome::UnknownDm)),
        },

        DmCommand::Nick(NickOption::On) => {
            let member = resolve(pool, config, author).await?;
            MemberRepository::set_use_nickname(pool, &member.id, true).await?;
            Ok(DmResponse::Text(
                "The leaderboard will now display your server-specific nickname instead of \
                 your Discord username. To return to your username, type `!nick off`."
                    .to_string(),
            ))
        }

        DmCommand::Nick(NickOption::Off) => {
            let member = resolve(pool, config, author).await?;
            MemberRepository::set_use_nickname(pool, &member.id, false).await?;
            Ok(DmResponse::Text(
                "The leaderboard will now display your Discord username instead of your \
                 server-specific nickname. To return to your nickname, type `!nick on`."
                    .to_string(),
            ))
        }

        DmCommand::Nick(NickOption::Other) => Ok(DmResponse::Text(
            "To display your server-specific nickname on the leaderboard, type `!nick on`. \
             To use your Discord username, type `!nick off`."
                .to_string(),
        )),

        DmCommand::Delete => Ok(DmResponse::DeletePrompt(format!(
            "Are you sure you want to delete all your data from the leaderboard? This will \
             include any mottos of yours that were nominated by other people. If so, react \
             to this message with {}. Otherwise, ignore this message.",
            config.settings.reactions.confirm_delete
        ))),

        DmCommand::Emoji(None) => {
            debug!("Clearing emoji for {}", author.username);
            let member = resolve(pool, config, author).await?;
            MemberRepository::set_emoji(pool, &member, "").await?;
            Ok(DmResponse::Outcome(Outcome::ValidEmoji))
        }

        DmCommand::Emoji(Some(value)) => match normalize_profile_emoji(&value) {
            Some(emoji) => {
                debug!("Updating emoji for {}: {:?}", author.username, emoji);
                let member = resolve(pool, config, author).await?;
                MemberRepository::set_emoji(pool, &member, &emoji).await?;
                Ok(DmResponse::Outcome(Outcome::ValidEmoji))
            }
            None => {
                info!("Invalid emoji requested by {}", author.username);
                Ok(DmResponse::Outcome(Outcome::InvalidEmoji))
            }
        },

        DmCommand::Unknown => Ok(DmResponse::Outcome(Outcome::UnknownDm)),
    }
}

async fn resolve(pool: &SqlitePool, config: &Config, author: &DmAuthor) -> StoreResult<Member> {
    MemberRepository::get_or_create(
        pool,
        config.bot_scope(),
        &author.discord_id.to_string(),
        &author.username,
    )
    .await
}

fn help_text(config: &Config, support: &[Member], bot_username: &str) -> String {
    let trigger = if config.settings.trigger_on_mention {
        format!("@{bot_username}")
    } else {
        "a trigger word".to_string()
    };

    let mut help = format!(
        "Reply to a great motto in the supported channels with {trigger} to tell me about \
         it! (Note: you can't nominate yourself.)\n\
         \n\
         You can DM me the following commands:\n\
         `!link`: Get a link to the leaderboard.\n\
         `!emoji <emoji>`: Set your emoji on the leaderboard. A response of {invalid_emoji} \
         means the emoji you requested is not valid.\n\
         `!emoji`: Clear your emoji from the leaderboard.\n\
         `!nick on`: Use your server-specific nickname on the leaderboard instead of your \
         Discord username. Nickname changes will auto-update the next time you approve a \
         motto.\n\
         `!nick off`: Use your Discord username on the leaderboard instead of your \
         server-specific nickname.\n\
         `!delete`: Remove all your data from the bot. Confirmation is required.",
        invalid_emoji = config.settings.reactions.invalid_emoji,
    );

    let mentions: Vec<String> = support
        .iter()
        .map(|member| format!("<@{}>", member.discord_id))
        .collect();
    let channel = config.settings.support_channel.as_deref();

    if channel.is_some() || !mentions.is_empty() {
        let mut addition = "\nIf your question was not answered here, please".to_string();
        if let Some(channel) = channel {
            addition.push_str(&format!(" ask for help in #{channel}"));
            if !mentions.is_empty() {
                addition.push_str(", or");
            }
        }
        if !mentions.is_empty() {
            addition.push_str(&format!(
                " DM one of the following users: {}. They are happy to receive your DMs \
                 about the bot without prior permission but otherwise usual rules apply",
                mentions.join(", ")
            ));
        }
        addition.push('.');
        help.push_str(&addition);
    }

    help
}

#[cfg(test)]
mod tests {
    use super::*;
    use botto_core::{Secrets, Settings};
    use botto_store::test_helpers::create_test_pool;

    fn test_config() -> Config {
        Config {
            secrets: Secrets {
                discord_bot_token: "test-token".to_string(),
            },
            settings: Settings::default(),
        }
    }

    fn author() -> DmAuthor {
        DmAuthor {
            discord_id: 100,
            username: "alex".to_string(),
        }
    }

    #[test]
    fn test_parse_help_variants() {
        for input in ["!help", "help", "HELP!", "  halp  ", "halp!", "!Halp"] {
            assert_eq!(DmCommand::parse(input), DmCommand::Help, "input {input:?}");
        }
        assert_eq!(DmCommand::parse("help me please"), DmCommand::Unknown);
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(DmCommand::parse("!version"), DmCommand::Version);
        assert_eq!(DmCommand::parse("!LINK"), DmCommand::Link);
        assert_eq!(DmCommand::parse(" !delete "), DmCommand::Delete);
        assert_eq!(DmCommand::parse("!delete everything"), DmCommand::Unknown);
        assert_eq!(DmCommand::parse("hello there"), DmCommand::Unknown);
    }

    #[test]
    fn test_parse_nick() {
        assert_eq!(DmCommand::parse("!nick on"), DmCommand::Nick(NickOption::On));
        assert_eq!(DmCommand::parse("!nick OFF"), DmCommand::Nick(NickOption::Off));
        assert_eq!(DmCommand::parse("!nick"), DmCommand::Nick(NickOption::Other));
        assert_eq!(
            DmCommand::parse("!nick sideways"),
            DmCommand::Nick(NickOption::Other)
        );
    }

    #[test]
    fn test_parse_emoji() {
        assert_eq!(DmCommand::parse("!emoji"), DmCommand::Emoji(None));
        assert_eq!(
            DmCommand::parse("!emoji 😀"),
            DmCommand::Emoji(Some("😀".to_string()))
        );
    }

    #[tokio::test]
    async fn test_emoji_set_and_clear() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();
        let config = test_config();

        // Scenario D: a valid emoji is accepted and stored
        let response = run_dm_command(
            pool,
            &config,
            DmCommand::parse("!emoji 😀"),
            &author(),
            "botto",
        )
        .await
        .unwrap();
        assert_eq!(response, DmResponse::Outcome(Outcome::ValidEmoji));

        let member = MemberRepository::find_by_discord_id(pool, "botto", "100")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member.emoji, "😀");

        // Bare `!emoji` clears it again
        let response =
            run_dm_command(pool, &config, DmCommand::parse("!emoji"), &author(), "botto")
                .await
                .unwrap();
        assert_eq!(response, DmResponse::Outcome(Outcome::ValidEmoji));

        let member = MemberRepository::find_by_discord_id(pool, "botto", "100")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member.emoji, "");
    }

    #[tokio::test]
    async fn test_invalid_emoji_makes_no_store_mutation() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();
        let config = test_config();

        let response = run_dm_command(
            pool,
            &config,
            DmCommand::parse("!emoji 🏳️‍🌈extra"),
            &author(),
            "botto",
        )
        .await
        .unwrap();
        assert_eq!(response, DmResponse::Outcome(Outcome::InvalidEmoji));

        // Not even a member record is created for a rejected emoji
        assert!(
            MemberRepository::find_by_discord_id(pool, "botto", "100")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_nick_toggle() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();
        let config = test_config();

        let response = run_dm_command(
            pool,
            &config,
            DmCommand::Nick(NickOption::On),
            &author(),
            "botto",
        )
        .await
        .unwrap();
        assert!(matches!(response, DmResponse::Text(text) if text.contains("!nick off")));

        let member = MemberRepository::find_by_discord_id(pool, "botto", "100")
            .await
            .unwrap()
            .unwrap();
        assert!(member.use_nickname);

        run_dm_command(
            pool,
            &config,
            DmCommand::Nick(NickOption::Off),
            &author(),
            "botto",
        )
        .await
        .unwrap();

        let member = MemberRepository::find_by_discord_id(pool, "botto", "100")
            .await
            .unwrap()
            .unwrap();
        assert!(!member.use_nickname);
    }

    #[tokio::test]
    async fn test_link_configured_and_not() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();

        let mut config = test_config();
        let response = run_dm_command(pool, &config, DmCommand::Link, &author(), "botto")
            .await
            .unwrap();
        assert_eq!(response, DmResponse::Outcome(Outcome::UnknownDm));

        config.settings.leaderboard_url = Some("https://example.org/board".to_string());
        let response = run_dm_command(pool, &config, DmCommand::Link, &author(), "botto")
            .await
            .unwrap();
        assert_eq!(
            response,
            DmResponse::Text("https://example.org/board".to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_prompt_names_the_reaction() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();
        let config = test_config();

        let response = run_dm_command(pool, &config, DmCommand::Delete, &author(), "botto")
            .await
            .unwrap();
        match response {
            DmResponse::DeletePrompt(text) => {
                assert!(text.contains(&config.settings.reactions.confirm_delete));
            }
            other => panic!("expected a delete prompt, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_help_mentions_support() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();
        let mut config = test_config();
        config.settings.support_channel = Some("support".to_string());

        let volunteer = MemberRepository::get_or_create(pool, "botto", "300", "vol")
            .await
            .unwrap();
        sqlx::query("UPDATE members SET support = 1 WHERE id = ?")
            .bind(&volunteer.id)
            .execute(pool)
            .await
            .unwrap();

        let response = run_dm_command(pool, &config, DmCommand::Help, &author(), "botto")
            .await
            .unwrap();
        match response {
            DmResponse::Text(text) => {
                assert!(text.contains("@botto"), "mention trigger in help");
                assert!(text.contains("#support"));
                assert!(text.contains("<@300>"));
            }
            other => panic!("expected help text, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_dm() {
        let db = create_test_pool().await.unwrap();
        let pool = db.pool();
        let config = test_config();

        let response = run_dm_command(
            pool,
            &config,
            DmCommand::parse("what do you do?"),
            &author(),
            "botto",
        )
        .await
        .unwrap();
        assert_eq!(response, DmResponse::Outcome(Outcome::UnknownDm));
    }
}
