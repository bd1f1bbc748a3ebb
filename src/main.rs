// This is the entry point of the Telegram moderation bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (storage)
// - `telegram/` = Telegram-specific adapters (transport, commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Telegram dispatcher
// 4. Hand every message update to the moderation pipeline

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "telegram/telegram_layer.rs"]
mod telegram;

mod config;

use crate::config::Config;
use crate::core::moderation::{ModerationService, NoticeScheduler};
use crate::core::transport::ChatTransport;
use crate::infra::moderation::InMemoryWarnStore;
use crate::telegram::transport::TelegramTransport;
use crate::telegram::AppState;
use std::sync::Arc;
use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default: info for everything; override with RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Config::load()?);
    let bot = Bot::new(config.telegram_bot_token.clone());

    // Wire up the services: one transport, one warning ledger, one
    // decision engine, one notice cleanup scheduler.
    let transport: Arc<dyn ChatTransport> = Arc::new(TelegramTransport::new(bot.clone()));
    let moderation = Arc::new(ModerationService::new(InMemoryWarnStore::new()));
    let notices = NoticeScheduler::new(Arc::clone(&transport));

    let state = Arc::new(AppState {
        config,
        moderation,
        transport,
        notices,
    });

    tracing::info!("Starting bot...");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(telegram::message_handler::handle_update));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
