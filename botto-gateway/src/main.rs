use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use botto_gateway::discord::start_discord_bot;
use botto_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = botto_core::Config::load()?;
    info!(
        "{}",
        if config.should_reply() {
            "Replies are enabled"
        } else {
            "Replies are disabled"
        }
    );
    info!("Responding to phrases: {:?}", config.settings.triggers);
    info!(
        "Rules: matching {:?}, excluding {:?}",
        config.settings.rules.matching, config.settings.rules.excluding
    );

    // Initialize the record store
    let db = botto_store::BottoDbPool::new().await?;

    // Create shared application state
    let state = Arc::new(AppState::new(config, db)?);

    // Run the Discord client (this blocks until shutdown)
    let mut client = start_discord_bot(Arc::clone(&state)).await?;
    client.start().await?;

    Ok(())
}
