use std::sync::Arc;

use teloxide::{dispatching::Dispatcher as TgDispatcher, dptree, prelude::*};
use tracing::{info, warn};

use tgf_core::{
    config::Config,
    dispatch::Dispatcher,
    domain::RelayMode,
    journal::Journal,
    routing::RoutingTable,
};

use crate::{handlers, TelegramRelay};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// Connect, verify the routing table against live chats, then serve inbound
/// updates until the process is interrupted.
pub async fn run_polling(
    cfg: Arc<Config>,
    table: Arc<RoutingTable>,
    journal: Arc<Journal>,
    mode: RelayMode,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => info!("relay started as @{}", me.username()),
        Err(e) => warn!(error = %e, "get_me failed, continuing anyway"),
    }
    info!(
        rules = table.rule_count(),
        destinations = table.destination_count(),
        mode = ?mode,
        "routing table loaded"
    );

    let relay = Arc::new(TelegramRelay::new(bot.clone()));
    let dispatcher = Arc::new(Dispatcher::new(table, relay, mode, journal.clone()));

    dispatcher.verify_endpoints().await;
    journal.mark_connected();

    let state = Arc::new(AppState {
        dispatcher: dispatcher.clone(),
    });

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handlers::handle_message))
        .branch(Update::filter_channel_post().endpoint(handlers::handle_message));

    TgDispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    journal.mark_disconnected();
    info!("relay stopped");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Shutdown relies on teloxide's ctrl-c support, which is feature-gated;
    // building the dispatcher with it enabled keeps that wiring honest.
    #[tokio::test]
    async fn dispatcher_builds_with_ctrlc_handler() {
        let bot = Bot::new("0:TEST");
        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_channel_post().endpoint(handlers::handle_message));

        let _dispatcher = TgDispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build();
    }
}
