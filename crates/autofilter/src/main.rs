mod health;

use std::sync::Arc;
use std::time::Duration;

use catalog::InMemoryCatalog;
use session::SessionCache;
use telegram::{BotConfig, BotContext};
use teloxide::prelude::*;
use tracing_subscriber::EnvFilter;

/// How often expired session entries are dropped
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn spawn_session_sweep(sessions: SessionCache) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, live = sessions.len(), "Swept expired sessions");
            }
        }
    })
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    let _ = dotenv::dotenv();
    init_tracing();

    let mut config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize the bot from environment variables
    let bot = Bot::from_env();

    match bot.get_me().await {
        Ok(me) => config.bot_username = me.username().to_string(),
        Err(e) => {
            tracing::error!("Failed to reach Telegram, check TELOXIDE_TOKEN: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = telegram::telegram::set_bot_commands(&bot).await {
        tracing::warn!("Failed to register bot commands: {}", e);
    }

    let port = config.port;
    let username = config.bot_username.clone();
    let ctx = BotContext::new(Arc::new(bot.clone()), Arc::new(InMemoryCatalog::new()), config);

    spawn_session_sweep(ctx.sessions.clone());
    tokio::spawn(health::serve(ctx.clone(), port));

    tracing::info!(username = %username, "Bot started successfully");

    Dispatcher::builder(bot, telegram::telegram::schema())
        .dependencies(dptree::deps![ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
