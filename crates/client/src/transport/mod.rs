//! Transport port and its adapters.
//!
//! The battle flow controller only ever sees [`BattleTransport`]; whether
//! intents travel over a request/response round trip or a live socket is
//! an adapter concern. Both adapters deliver inbound traffic through the
//! same channel so the controller has a single receive path.

pub mod http;
pub mod socket;

#[cfg(any(test, feature = "testing"))]
pub mod fake;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use clashcard_domain::RoundOutcome;
use clashcard_protocol::{IntentMessage, ServerMessage};

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Failed to connect to battle server: {0}")]
    Connect(String),

    #[error("Failed to send intent: {0}")]
    Send(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Transport is not connected")]
    NotConnected,

    #[error("Server rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// What a successful send produced.
///
/// Poll mode resolves the round inline with the request; push mode always
/// queues, with the result arriving later on the inbound channel.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    Resolved(Box<RoundOutcome>),
    Queued,
}

/// One connected battle link.
///
/// `connect` hands back the inbound channel; the adapter keeps the sender
/// half and forwards server traffic in receipt order. After the link drops
/// the adapter pushes [`ServerMessage::Disconnected`] exactly once and the
/// channel closes.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BattleTransport: Send {
    async fn connect(&mut self)
        -> Result<mpsc::UnboundedReceiver<ServerMessage>, TransportError>;

    async fn send_intent(&mut self, intent: IntentMessage)
        -> Result<SendOutcome, TransportError>;

    async fn close(&mut self);
}
