//! Client configuration.

use std::time::Duration;

use url::Url;

/// How long each animation stage holds before the next fires.
///
/// Defaults reproduce the original screens' timeout chain; tests swap in
/// [`TimingProfile::instant`] so nothing actually waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingProfile {
    /// Card flip after both choices are in.
    pub reveal_hold: Duration,
    /// Attack animation before damage text shows.
    pub damage_text_hold: Duration,
    /// Damage text on screen before the draw starts.
    pub hp_hold: Duration,
    /// Draw animation before control returns to the player.
    pub draw_hold: Duration,
    /// True-sight overlay (result or alert) before it clears itself.
    pub true_sight_hold: Duration,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self {
            reveal_hold: Duration::from_millis(1000),
            damage_text_hold: Duration::from_millis(300),
            hp_hold: Duration::from_millis(1500),
            draw_hold: Duration::from_millis(600),
            true_sight_hold: Duration::from_millis(3000),
        }
    }
}

impl TimingProfile {
    /// All holds zero. For tests.
    pub fn instant() -> Self {
        Self {
            reveal_hold: Duration::ZERO,
            damage_text_hold: Duration::ZERO,
            hp_hold: Duration::ZERO,
            draw_hold: Duration::ZERO,
            true_sight_hold: Duration::ZERO,
        }
    }
}

/// Default cap on one poll-mode request round trip.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Connection settings for one battle screen.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the game server (`http(s)://` for poll mode,
    /// `ws(s)://` for push mode).
    pub server_url: Url,
    /// Session token, sent the way the server expects per transport.
    pub auth_token: Option<String>,
    /// Cap on a single request round trip in poll mode. Without it a
    /// hung server would stall the driver loop on `send_intent`.
    pub request_timeout: Duration,
    pub timings: TimingProfile,
}

impl ClientConfig {
    pub fn new(server_url: Url) -> Self {
        Self {
            server_url,
            auth_token: None,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            timings: TimingProfile::default(),
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_timings(mut self, timings: TimingProfile) -> Self {
        self.timings = timings;
        self
    }

    /// Read settings from the environment (`CLASHCARD_SERVER_URL`,
    /// `CLASHCARD_AUTH_TOKEN`, `CLASHCARD_REQUEST_TIMEOUT_MS`), falling
    /// back to the local dev server.
    pub fn from_env() -> anyhow::Result<Self> {
        let raw = std::env::var("CLASHCARD_SERVER_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let server_url = Url::parse(&raw)?;
        let mut config = Self::new(server_url);
        if let Ok(token) = std::env::var("CLASHCARD_AUTH_TOKEN") {
            config.auth_token = Some(token);
        }
        if let Ok(raw) = std::env::var("CLASHCARD_REQUEST_TIMEOUT_MS") {
            config.request_timeout = Duration::from_millis(raw.parse()?);
        }
        Ok(config)
    }
}
