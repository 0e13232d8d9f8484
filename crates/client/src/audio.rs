//! Audio port.
//!
//! The controller fires cues at fixed points of the battle flow; what a
//! cue sounds like (or whether anything plays at all) is the adapter's
//! business. This replaces the old screens' habit of reaching into a
//! global sound manager from arbitrary effect hooks.

use std::sync::Arc;

/// One-shot sound effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// A card left a hand or deck (play, reveal, draw).
    CardMoved,
    Hit,
    Evade,
    Win,
    Lose,
}

/// Looping background tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BgmTrack {
    Battle,
}

pub trait AudioPort: Send + Sync {
    fn play(&self, cue: AudioCue);
    fn start_bgm(&self, track: BgmTrack);
    fn stop_bgm(&self);
}

/// Silent adapter, the default when no audio backend is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioPort for NullAudio {
    fn play(&self, _cue: AudioCue) {}
    fn start_bgm(&self, _track: BgmTrack) {}
    fn stop_bgm(&self) {}
}

pub fn null_audio() -> Arc<dyn AudioPort> {
    Arc::new(NullAudio)
}

#[cfg(any(test, feature = "testing"))]
pub mod recording {
    //! Cue-recording adapter for tests.

    use std::sync::{Arc, Mutex};

    use super::{AudioCue, AudioPort, BgmTrack};

    #[derive(Default)]
    pub struct RecordingAudio {
        cues: Mutex<Vec<AudioCue>>,
    }

    impl RecordingAudio {
        pub fn shared() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn cues(&self) -> Vec<AudioCue> {
            self.cues.lock().map(|cues| cues.clone()).unwrap_or_default()
        }
    }

    impl AudioPort for RecordingAudio {
        fn play(&self, cue: AudioCue) {
            if let Ok(mut cues) = self.cues.lock() {
                cues.push(cue);
            }
        }

        fn start_bgm(&self, _track: BgmTrack) {}
        fn stop_bgm(&self) {}
    }
}
