//! Scripted in-memory transport for controller and runtime tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use clashcard_protocol::{IntentMessage, ServerMessage};

use super::{BattleTransport, SendOutcome, TransportError};

/// Test double: records every sent intent, answers sends from a script,
/// and lets the test inject server pushes at will.
///
/// The handle owns the only push sender, so dropping it closes the
/// inbound channel the way a dead link would.
pub struct FakeTransport {
    sent: Arc<Mutex<Vec<IntentMessage>>>,
    script: Arc<Mutex<VecDeque<Result<SendOutcome, TransportError>>>>,
    push_rx: Option<mpsc::UnboundedReceiver<ServerMessage>>,
    closed: Arc<AtomicBool>,
}

/// Test-side handle onto a [`FakeTransport`] that has been handed to the
/// code under test.
#[derive(Clone)]
pub struct FakeHandle {
    sent: Arc<Mutex<Vec<IntentMessage>>>,
    script: Arc<Mutex<VecDeque<Result<SendOutcome, TransportError>>>>,
    push_tx: mpsc::UnboundedSender<ServerMessage>,
    closed: Arc<AtomicBool>,
}

impl FakeTransport {
    pub fn new() -> (Self, FakeHandle) {
        let (push_tx, push_rx) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(Vec::new()));
        let script = Arc::new(Mutex::new(VecDeque::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let handle = FakeHandle {
            sent: Arc::clone(&sent),
            script: Arc::clone(&script),
            push_tx,
            closed: Arc::clone(&closed),
        };
        let transport = Self {
            sent,
            script,
            push_rx: Some(push_rx),
            closed,
        };
        (transport, handle)
    }
}

impl FakeHandle {
    /// Queue the response for the next `send_intent` call. Unscripted
    /// sends answer `Queued`.
    pub fn script_send(&self, response: Result<SendOutcome, TransportError>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(response);
        }
    }

    /// Inject a server push onto the inbound channel.
    pub fn push(&self, message: ServerMessage) {
        let _ = self.push_tx.send(message);
    }

    pub fn sent_intents(&self) -> Vec<IntentMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BattleTransport for FakeTransport {
    async fn connect(
        &mut self,
    ) -> Result<mpsc::UnboundedReceiver<ServerMessage>, TransportError> {
        self.push_rx
            .take()
            .ok_or_else(|| TransportError::Connect("already connected".to_string()))
    }

    async fn send_intent(
        &mut self,
        intent: IntentMessage,
    ) -> Result<SendOutcome, TransportError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(intent);
        }
        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        scripted.unwrap_or(Ok(SendOutcome::Queued))
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
