//! Read-only status dashboard.
//!
//! Small axum server exposing the relay's state: connection status, the
//! resolved routing table, and the recent message feed from the journal.
//! Runs as a background task; losing it never takes down the relay.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    response::{Html, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use tracing::info;

use tgf_core::{
    journal::{Journal, RelayRecord},
    routing::RoutingTable,
};

const MESSAGE_FEED_LIMIT: usize = 50;

#[derive(Clone)]
pub struct DashboardState {
    pub table: Arc<RoutingTable>,
    pub journal: Arc<Journal>,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    connected: bool,
    uptime: String,
    total_messages: u64,
    rule_count: usize,
    source_count: usize,
    target_count: usize,
}

#[derive(Debug, Serialize)]
struct EndpointInfo {
    id: i64,
    name: String,
}

#[derive(Debug, Serialize)]
struct RuleInfo {
    source: EndpointInfo,
    targets: Vec<EndpointInfo>,
}

#[derive(Debug, Serialize)]
struct RulesResponse {
    rules: Vec<RuleInfo>,
}

#[derive(Debug, Serialize)]
struct MessagesResponse {
    messages: Vec<RelayRecord>,
}

pub fn router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/status", get(status))
        .route("/api/rules", get(rules))
        .route("/api/messages", get(messages))
        .with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(state: DashboardState, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("dashboard listening on http://localhost:{port}");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../assets/dashboard.html"))
}

async fn status(State(state): State<DashboardState>) -> Json<StatusResponse> {
    let stats = state.journal.stats();
    Json(StatusResponse {
        connected: stats.connected,
        uptime: stats.uptime,
        total_messages: stats.total_messages,
        rule_count: state.table.rule_count(),
        source_count: state.table.rule_count(),
        target_count: state.table.destination_count(),
    })
}

async fn rules(State(state): State<DashboardState>) -> Json<RulesResponse> {
    let rules = state
        .table
        .rules()
        .map(|(source, dests)| RuleInfo {
            source: endpoint_info(&state.journal, source),
            targets: dests
                .iter()
                .map(|d| endpoint_info(&state.journal, *d))
                .collect(),
        })
        .collect();

    Json(RulesResponse { rules })
}

async fn messages(State(state): State<DashboardState>) -> Json<MessagesResponse> {
    Json(MessagesResponse {
        messages: state.journal.recent(MESSAGE_FEED_LIMIT),
    })
}

fn endpoint_info(journal: &Journal, id: tgf_core::domain::ChatId) -> EndpointInfo {
    EndpointInfo {
        id: id.0,
        name: journal.label(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tgf_core::{
        domain::ChatId,
        journal::RelayStatus,
    };

    fn state(rules: &str) -> DashboardState {
        DashboardState {
            table: Arc::new(RoutingTable::parse_rules(rules).unwrap()),
            journal: Arc::new(Journal::new(10)),
        }
    }

    #[tokio::test]
    async fn status_reports_table_shape() {
        let s = state("1:2:3,4:2");
        let Json(resp) = status(State(s)).await;

        assert!(!resp.connected);
        assert_eq!(resp.rule_count, 2);
        assert_eq!(resp.source_count, 2);
        assert_eq!(resp.target_count, 2);
        assert_eq!(resp.total_messages, 0);
    }

    #[tokio::test]
    async fn rules_use_resolved_labels() {
        let s = state("1:2");
        s.journal.set_label(ChatId(1), "Source Chat");

        let Json(resp) = rules(State(s)).await;
        assert_eq!(resp.rules.len(), 1);
        assert_eq!(resp.rules[0].source.name, "Source Chat");
        assert_eq!(resp.rules[0].targets[0].name, "2");
    }

    #[tokio::test]
    async fn messages_feed_is_newest_first_and_capped() {
        let s = state("1:2");
        for i in 0..60 {
            s.journal
                .record(ChatId(1), ChatId(2), Some(&format!("m{i}")), RelayStatus::Success);
        }

        let Json(resp) = messages(State(s)).await;
        // Journal capacity (10) is the binding limit here, not the feed cap.
        assert_eq!(resp.messages.len(), 10);
        assert_eq!(resp.messages[0].preview, "m59");
    }
}
