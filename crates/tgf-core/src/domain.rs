//! Platform identifiers used across the relay.
//!
//! Endpoint ids are opaque signed integers. By Telegram convention negative
//! values are groups/channels and positive values are private chats; the relay
//! never branches on the sign.

use std::fmt;

/// Telegram chat id (numeric). This is the endpoint identifier the routing
/// table is keyed by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message. For an inbound event, `chat_id`
/// is the originating endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// How a message is re-emitted to a destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayMode {
    /// Native forward: destination sees the "Forwarded from ..." attribution.
    Forward,
    /// Copy as a fresh message: no origin attribution.
    Copy,
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
