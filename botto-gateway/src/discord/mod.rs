mod bot;
pub mod effects;

use std::sync::Arc;

use serenity::prelude::*;
use tracing::info;

pub use bot::Bot;

use crate::state::AppState;

/// Start the Discord client.
pub async fn start_discord_bot(state: Arc<AppState>) -> Result<Client, DiscordError> {
    info!("Starting Discord bot...");

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::DIRECT_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT;

    let token = state.config.discord_bot_token().to_string();
    let bot = Bot::new(state);

    let client = Client::builder(&token, intents)
        .event_handler(bot)
        .await
        .map_err(|e| DiscordError::ClientError(e.to_string()))?;

    Ok(client)
}

/// Discord-related errors
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("Failed to create Discord client: {0}")]
    ClientError(String),
}
