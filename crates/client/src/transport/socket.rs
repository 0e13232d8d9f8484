//! Push-mode transport (PvP battles) using tokio-tungstenite.
//!
//! The socket is split once on connect: a write task drains an outbound
//! channel, a read task parses text frames and forwards them in receipt
//! order. When the link drops for any reason the read task pushes one
//! [`ServerMessage::Disconnected`] and exits; reconnect handshakes are a
//! server feature this protocol does not have.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use url::Url;

use clashcard_protocol::{IntentMessage, ServerMessage};

use crate::config::ClientConfig;

use super::{BattleTransport, SendOutcome, TransportError};

pub struct PushTransport {
    url: Url,
    auth_token: Option<String>,
    write_tx: Option<mpsc::UnboundedSender<Message>>,
    shutdown: CancellationToken,
}

impl PushTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            url: config.server_url.clone(),
            auth_token: config.auth_token.clone(),
            write_tx: None,
            shutdown: CancellationToken::new(),
        }
    }
}

#[async_trait]
impl BattleTransport for PushTransport {
    async fn connect(
        &mut self,
    ) -> Result<mpsc::UnboundedReceiver<ServerMessage>, TransportError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|err| TransportError::Connect(err.to_string()))?;

        // The server reads the session token out of the subprotocol slot;
        // browsers cannot set arbitrary headers on a socket upgrade and
        // the native client follows the same contract.
        if let Some(token) = &self.auth_token {
            let value = HeaderValue::from_str(token)
                .map_err(|err| TransportError::Connect(err.to_string()))?;
            request
                .headers_mut()
                .insert("Sec-WebSocket-Protocol", value);
        }

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;
        tracing::info!(url = %self.url, "Connected to battle server");

        let (mut write, mut read) = stream.split();
        let (write_tx, mut write_rx) = mpsc::unbounded_channel::<Message>();
        let (push_tx, push_rx) = mpsc::unbounded_channel::<ServerMessage>();

        self.shutdown = CancellationToken::new();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            while let Some(frame) = write_rx.recv().await {
                if let Err(err) = write.send(frame).await {
                    tracing::error!("Failed to send frame: {err}");
                    break;
                }
            }
        });

        tokio::spawn(async move {
            loop {
                let frame = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    frame = read.next() => frame,
                };
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match clashcard_protocol::parse_server_message(&text) {
                            Ok(message) => {
                                if push_tx.send(message).is_err() {
                                    // Receiver gone, the battle screen closed.
                                    break;
                                }
                            }
                            Err(err) => {
                                tracing::warn!("Dropping malformed frame: {err}");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("Battle server closed the connection");
                        let _ = push_tx.send(ServerMessage::Disconnected);
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::error!("WebSocket error: {err}");
                        let _ = push_tx.send(ServerMessage::Disconnected);
                        break;
                    }
                }
            }
        });

        self.write_tx = Some(write_tx);
        Ok(push_rx)
    }

    async fn send_intent(
        &mut self,
        intent: IntentMessage,
    ) -> Result<SendOutcome, TransportError> {
        let tx = self.write_tx.as_ref().ok_or(TransportError::NotConnected)?;
        let text = clashcard_protocol::encode_intent(&intent)
            .map_err(|err| TransportError::Send(err.to_string()))?;
        tx.send(Message::Text(text))
            .map_err(|_| TransportError::Send("connection closed".to_string()))?;
        // Push mode never resolves inline; the round result arrives on the
        // inbound channel.
        Ok(SendOutcome::Queued)
    }

    async fn close(&mut self) {
        if let Some(tx) = self.write_tx.take() {
            let _ = tx.send(Message::Close(None));
        }
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_before_connect_is_rejected() {
        let config = ClientConfig::new(Url::parse("ws://localhost:8080/ws").expect("url"));
        let mut transport = PushTransport::new(&config);
        let result = transport.send_intent(IntentMessage::UseTrueSight).await;
        assert!(matches!(result, Err(TransportError::NotConnected)));
    }

    #[tokio::test]
    async fn test_connect_failure_surfaces_as_connect_error() {
        // Nothing listens on this port.
        let config = ClientConfig::new(Url::parse("ws://127.0.0.1:1/ws").expect("url"));
        let mut transport = PushTransport::new(&config);
        let result = transport.connect().await;
        assert!(matches!(result, Err(TransportError::Connect(_))));
    }
}
