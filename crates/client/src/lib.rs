//! Clashcard battle client core.
//!
//! One implementation of the battle loop every mode shares (bot, campaign,
//! PvP): an explicit phase machine gating input, a snapshot store
//! reconciling optimistic edits against authoritative round results, a
//! cancel-safe animation scheduler, and a transport port with poll (HTTP)
//! and push (WebSocket) adapters behind it.
//!
//! The presentation layer talks to a [`runtime::BattleHandle`]: intents go
//! in, read-only [`store::MatchView`] values come out through a watch
//! channel. Every mutation of match state happens on the runtime's driver
//! task.

pub mod audio;
pub mod config;
pub mod controller;
pub mod runtime;
pub mod scheduler;
pub mod store;
pub mod transport;

pub use audio::{AudioCue, AudioPort, BgmTrack, NullAudio};
pub use config::{ClientConfig, TimingProfile};
pub use controller::{BattleController, FlowError};
pub use runtime::{BattleHandle, BattleRuntime};
pub use scheduler::{AnimationScheduler, SequenceHandle, SequencePhase};
pub use store::{BoardView, MatchView, SnapshotStore};
pub use transport::http::PollTransport;
pub use transport::socket::PushTransport;
pub use transport::{BattleTransport, SendOutcome, TransportError};
