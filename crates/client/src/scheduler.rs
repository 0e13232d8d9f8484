//! Animation scheduler.
//!
//! Runs a fixed, ordered timeline of timed stages for a resolved round
//! (reveal → damage → draw) on its own task. The only contract the rest
//! of the client relies on: stages fire strictly in order, and after
//! `cancel()` no further `apply` runs. The old screens built this out of
//! nested `setTimeout`s per screen, which is where the dangling
//! floating-card timers came from.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// One stage of a sequence: a side effect plus how long to hold before
/// the next stage fires.
pub struct SequencePhase {
    apply: Box<dyn FnOnce() + Send>,
    hold: Duration,
}

impl SequencePhase {
    pub fn new(hold: Duration, apply: impl FnOnce() + Send + 'static) -> Self {
        Self {
            apply: Box::new(apply),
            hold,
        }
    }
}

/// Handle to a running sequence.
///
/// Dropping the handle does NOT cancel the sequence; teardown must call
/// `cancel()` explicitly. A stray drop silently killing the round
/// animation would be worse than the leak it prevents.
#[derive(Debug, Clone)]
pub struct SequenceHandle {
    token: CancellationToken,
}

impl SequenceHandle {
    /// Halt the sequence before its next `apply` fires.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

pub struct AnimationScheduler;

impl AnimationScheduler {
    /// Execute `phases` in order: each stage's `apply` fires, then the
    /// scheduler waits out the stage's hold before moving on.
    pub fn run_sequence(phases: Vec<SequencePhase>) -> SequenceHandle {
        let token = CancellationToken::new();
        let task_token = token.clone();

        tokio::spawn(async move {
            for phase in phases {
                if task_token.is_cancelled() {
                    break;
                }
                (phase.apply)();
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = tokio::time::sleep(phase.hold) => {}
                }
            }
        });

        SequenceHandle { token }
    }
}
