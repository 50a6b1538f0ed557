//! Dispatcher: one inbound message in, zero or more sends out.
//!
//! Looks up the originating endpoint in the routing table and issues exactly
//! one send per mapped destination. Failures are isolated per destination:
//! a delivery error to one chat is logged and journaled, then dispatch moves
//! on to the rest. No retry is layered on top of the platform client.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    domain::{MessageRef, RelayMode},
    journal::{Journal, RelayStatus},
    port::RelayPort,
    routing::RoutingTable,
};

pub struct Dispatcher {
    table: Arc<RoutingTable>,
    port: Arc<dyn RelayPort>,
    mode: RelayMode,
    journal: Arc<Journal>,
}

/// Per-event tally, for logs and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl Dispatcher {
    pub fn new(
        table: Arc<RoutingTable>,
        port: Arc<dyn RelayPort>,
        mode: RelayMode,
        journal: Arc<Journal>,
    ) -> Self {
        Self {
            table,
            port,
            mode,
            journal,
        }
    }

    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Relay one inbound message. A source with no routing entry is a no-op,
    /// not an error. `preview` is the message text, used only for the journal.
    pub async fn dispatch(&self, inbound: MessageRef, preview: Option<&str>) -> DispatchOutcome {
        let source = inbound.chat_id;
        let mut outcome = DispatchOutcome::default();

        let Some(destinations) = self.table.destinations(source) else {
            debug!(source = source.0, "no routing rule for source, ignoring");
            return outcome;
        };

        for &target in destinations {
            outcome.attempted += 1;

            let sent = match self.mode {
                RelayMode::Forward => self.port.forward_message(target, inbound).await,
                RelayMode::Copy => self.port.copy_message(target, inbound).await,
            };

            match sent {
                Ok(()) => {
                    outcome.delivered += 1;
                    info!(
                        source = source.0,
                        target = target.0,
                        mode = ?self.mode,
                        "relayed message"
                    );
                    self.journal
                        .record(source, target, preview, RelayStatus::Success);
                }
                Err(e) => {
                    outcome.failed += 1;
                    warn!(
                        source = source.0,
                        target = target.0,
                        error = %e,
                        "failed to relay message"
                    );
                    self.journal
                        .record(source, target, preview, RelayStatus::Error);
                }
            }
        }

        outcome
    }

    /// Startup sanity check: resolve every endpoint in the table to a live
    /// chat. Unresolvable endpoints only warn, since the remaining rules may
    /// still be valid; resolved labels are cached for logs and the dashboard.
    pub async fn verify_endpoints(&self) {
        for id in self.table.endpoints() {
            match self.port.describe_endpoint(id).await {
                Ok(label) => {
                    debug!(endpoint = id.0, label = %label, "resolved endpoint");
                    self.journal.set_label(id, label);
                }
                Err(e) => {
                    warn!(endpoint = id.0, error = %e, "cannot resolve endpoint, rule may be dead");
                }
            }
        }

        for (source, dests) in self.table.rules() {
            let targets = dests
                .iter()
                .map(|d| self.journal.label(*d))
                .collect::<Vec<_>>()
                .join(", ");
            info!("rule: {} -> {}", self.journal.label(source), targets);
        }
    }
}
