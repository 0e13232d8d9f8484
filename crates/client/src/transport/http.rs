//! Poll-mode transport (bot and campaign battles).
//!
//! Solo modes run request/response: the match is created by one POST and
//! every played card comes back with the full round result in the reply.
//! There is no server push, so the adapter owns the inbound channel and
//! feeds it from response payloads to keep the controller's receive path
//! identical to push mode.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;
use url::Url;

use clashcard_protocol::{IntentMessage, ServerMessage};

use crate::config::ClientConfig;

use super::{BattleTransport, SendOutcome, TransportError};

pub struct PollTransport {
    http: reqwest::Client,
    base: Url,
    auth_token: Option<String>,
    request_timeout: std::time::Duration,
    push_tx: Option<mpsc::UnboundedSender<ServerMessage>>,
}

impl PollTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: config.server_url.clone(),
            auth_token: config.auth_token.clone(),
            request_timeout: config.request_timeout,
            push_tx: None,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base
            .join(path)
            .map_err(|err| TransportError::Connect(err.to_string()))
    }

    async fn post_message(
        &self,
        url: Url,
        body: Option<&IntentMessage>,
    ) -> Result<ServerMessage, TransportError> {
        // Per-request cap; without it a hung server stalls the driver
        // loop on this await.
        let mut request = self.http.post(url).timeout(self.request_timeout);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Send(err.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| TransportError::Send(err.to_string()))?;
        if !status.is_success() {
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        clashcard_protocol::parse_server_message(&text)
            .map_err(|err| TransportError::Send(err.to_string()))
    }
}

#[async_trait]
impl BattleTransport for PollTransport {
    async fn connect(
        &mut self,
    ) -> Result<mpsc::UnboundedReceiver<ServerMessage>, TransportError> {
        let url = self.endpoint("api/battle/start")?;
        debug!(%url, "Starting poll-mode battle");
        let message = self.post_message(url, None).await.map_err(|err| match err {
            TransportError::Timeout => TransportError::Timeout,
            other => TransportError::Connect(other.to_string()),
        })?;

        // The start response is the initial payload; route it through the
        // inbound channel so connect-then-receive reads the same in both
        // modes.
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(message);
        self.push_tx = Some(tx);
        Ok(rx)
    }

    async fn send_intent(
        &mut self,
        intent: IntentMessage,
    ) -> Result<SendOutcome, TransportError> {
        let tx = self
            .push_tx
            .as_ref()
            .ok_or(TransportError::NotConnected)?
            .clone();
        let url = self.endpoint("api/battle/play")?;
        let message = self.post_message(url, Some(&intent)).await?;

        match message {
            ServerMessage::RoundResult(outcome) => Ok(SendOutcome::Resolved(Box::new(outcome))),
            other => {
                // True-sight replies and the like: deliver through the
                // inbound channel like a push.
                let _ = tx.send(other);
                Ok(SendOutcome::Queued)
            }
        }
    }

    async fn close(&mut self) {
        // Nothing to tear down server-side; dropping the sender closes the
        // inbound channel.
        self.push_tx = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_against_base() {
        let config = ClientConfig::new(Url::parse("http://localhost:8080/").expect("url"));
        let transport = PollTransport::new(&config);
        let url = transport.endpoint("api/battle/start").expect("join");
        assert_eq!(url.as_str(), "http://localhost:8080/api/battle/start");
    }

    #[tokio::test]
    async fn test_send_before_connect_is_rejected() {
        let config = ClientConfig::new(Url::parse("http://localhost:8080/").expect("url"));
        let mut transport = PollTransport::new(&config);
        let result = transport
            .send_intent(IntentMessage::UseTrueSight)
            .await;
        assert!(matches!(result, Err(TransportError::NotConnected)));
    }

    #[tokio::test]
    async fn test_unresponsive_server_times_out() {
        use std::time::Duration;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        // Accept connections and hold them open without ever answering.
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let url = Url::parse(&format!("http://{addr}/")).expect("url");
        let config = ClientConfig::new(url).with_request_timeout(Duration::from_millis(200));
        let mut transport = PollTransport::new(&config);

        let result = tokio::time::timeout(Duration::from_secs(5), transport.connect())
            .await
            .expect("request capped by its own timeout");
        assert!(matches!(result, Err(TransportError::Timeout)));
    }
}
