//! Inbound update handling.
//!
//! One handler: map a new message (or channel post) to a `MessageRef` and hand
//! it to the core dispatcher. The routing table decides whether anything is
//! sent; a source with no rule is silently ignored.

use std::sync::Arc;

use teloxide::prelude::*;

use tgf_core::domain::{ChatId, MessageId, MessageRef};

use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let inbound = MessageRef {
        chat_id: ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
    };
    let preview = msg.text().or_else(|| msg.caption());

    state.dispatcher.dispatch(inbound, preview).await;

    Ok(())
}
