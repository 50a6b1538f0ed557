use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    Result,
};

/// Hexagonal port for the chat platform.
///
/// Telegram (teloxide) is the first implementation; the shape is small enough
/// that another platform adapter could sit behind it with no core changes.
/// Retry and rate-limit handling belong to the implementation: the dispatcher
/// issues at most one call per destination per inbound event.
#[async_trait]
pub trait RelayPort: Send + Sync {
    /// Native forward: destination sees the origin attribution.
    async fn forward_message(&self, to: ChatId, msg: MessageRef) -> Result<()>;

    /// Re-send the message content as a fresh message, no attribution.
    async fn copy_message(&self, to: ChatId, msg: MessageRef) -> Result<()>;

    /// Resolve an endpoint id to a human-readable label (title or username).
    /// Errors mean the chat is unknown or inaccessible to this session.
    async fn describe_endpoint(&self, id: ChatId) -> Result<String>;
}
