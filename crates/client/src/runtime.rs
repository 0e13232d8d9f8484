//! Battle runtime: the single driver task.
//!
//! Everything that mutates match state (intents, server pushes, staged
//! animation events) is funneled through one `select!` loop, so the
//! controller never needs locks and ordering is the order this loop saw
//! things in. The presentation layer keeps a [`BattleHandle`]: intents go
//! in through a channel, views come out through a watch.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use clashcard_domain::UserIntent;
use clashcard_protocol::ServerMessage;

use crate::audio::AudioPort;
use crate::config::ClientConfig;
use crate::controller::{BattleController, StageEvent};
use crate::store::MatchView;
use crate::transport::http::PollTransport;
use crate::transport::socket::PushTransport;
use crate::transport::BattleTransport;

/// Presentation-side handle to a running battle.
#[derive(Clone)]
pub struct BattleHandle {
    intent_tx: mpsc::UnboundedSender<UserIntent>,
    view_rx: watch::Receiver<MatchView>,
}

impl BattleHandle {
    /// Queue an intent for the driver task. Returns false once the
    /// runtime has shut down.
    pub fn submit(&self, intent: UserIntent) -> bool {
        self.intent_tx.send(intent).is_ok()
    }

    pub fn view(&self) -> MatchView {
        self.view_rx.borrow().clone()
    }

    /// Subscribe to view updates; every mutation publishes.
    pub fn views(&self) -> watch::Receiver<MatchView> {
        self.view_rx.clone()
    }
}

pub struct BattleRuntime {
    controller: BattleController,
    intent_rx: mpsc::UnboundedReceiver<UserIntent>,
    stage_rx: mpsc::UnboundedReceiver<StageEvent>,
}

impl BattleRuntime {
    pub fn new(
        transport: Box<dyn BattleTransport>,
        config: &ClientConfig,
        audio: Arc<dyn AudioPort>,
    ) -> (Self, BattleHandle) {
        let (stage_tx, stage_rx) = mpsc::unbounded_channel();
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (controller, view_rx) =
            BattleController::new(transport, config.timings, audio, stage_tx);
        let runtime = Self {
            controller,
            intent_rx,
            stage_rx,
        };
        let handle = BattleHandle { intent_tx, view_rx };
        (runtime, handle)
    }

    /// Pick the transport off the URL scheme: `ws(s)` is push mode,
    /// anything else polls.
    pub fn from_config(
        config: &ClientConfig,
        audio: Arc<dyn AudioPort>,
    ) -> (Self, BattleHandle) {
        let transport: Box<dyn BattleTransport> = match config.server_url.scheme() {
            "ws" | "wss" => Box::new(PushTransport::new(config)),
            _ => Box::new(PollTransport::new(config)),
        };
        Self::new(transport, config, audio)
    }

    /// Drive the battle until the match screen goes away (token
    /// cancelled, every handle dropped) or the loop has nothing left to
    /// receive from.
    pub async fn run(mut self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let mut push_rx = self.controller.connect().await?;
        let mut push_open = true;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Battle runtime shutting down");
                    break;
                }
                intent = self.intent_rx.recv() => {
                    match intent {
                        Some(intent) => {
                            if let Err(err) = self.controller.handle_intent(intent).await {
                                warn!(%err, "Rejected user intent");
                            }
                        }
                        None => {
                            info!("All battle handles dropped");
                            break;
                        }
                    }
                }
                message = push_rx.recv(), if push_open => {
                    match message {
                        Some(message) => self.controller.handle_server_message(message),
                        None => {
                            // The adapter pushes Disconnected before the
                            // channel closes; this covers an adapter that
                            // did not get the chance.
                            push_open = false;
                            self.controller
                                .handle_server_message(ServerMessage::Disconnected);
                        }
                    }
                }
                Some(event) = self.stage_rx.recv() => {
                    self.controller.handle_stage(event);
                }
            }
        }

        self.controller.shutdown().await;
        Ok(())
    }
}
