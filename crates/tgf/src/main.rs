use std::sync::Arc;

use clap::Parser;
use tracing::error;

use tgf_core::{
    config::Config,
    domain::RelayMode,
    journal::Journal,
    routing::RoutingTable,
};
use tgf_dashboard::DashboardState;

/// Telegram message relay: forwards new messages from source chats to their
/// configured destinations.
#[derive(Debug, Parser)]
#[command(name = "tgf", about = "Telegram message relay")]
struct Args {
    /// Relay as fresh messages with no "Forwarded from ..." attribution.
    #[arg(short = 'r', long)]
    remove_forward_signature: bool,

    /// Log to file only; keep the console quiet.
    #[arg(short = 'q', long)]
    disable_console_log: bool,

    /// Dashboard web server port.
    #[arg(short = 'p', long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), tgf_core::Error> {
    let args = Args::parse();

    let cfg = Arc::new(Config::load()?);
    tgf_core::logging::init("tgf", &cfg.log_file, !args.disable_console_log)?;

    // Build the routing table before touching the network; a malformed
    // configuration must never start a partially-configured relay.
    let table = match RoutingTable::from_config(
        cfg.forwarding_rules.as_deref(),
        cfg.legacy_pair,
    ) {
        Ok(table) => Arc::new(table),
        Err(e) => {
            error!("{e}");
            return Err(e);
        }
    };

    let mode = if args.remove_forward_signature {
        RelayMode::Copy
    } else {
        RelayMode::Forward
    };

    let journal = Arc::new(Journal::new(cfg.history_limit));

    let dashboard = DashboardState {
        table: table.clone(),
        journal: journal.clone(),
    };
    tokio::spawn(async move {
        if let Err(e) = tgf_dashboard::serve(dashboard, args.port).await {
            error!(error = %e, "dashboard server stopped");
        }
    });

    tgf_telegram::router::run_polling(cfg, table, journal, mode)
        .await
        .map_err(|e| tgf_core::Error::External(format!("telegram relay failed: {e}")))?;

    Ok(())
}
