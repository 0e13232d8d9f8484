//! Battle flow controller.
//!
//! Owns the phase machine and is the only writer of match state. Intents
//! from the presentation layer and messages from the transport both land
//! here; anything arriving in the wrong phase is rejected (intents) or
//! logged and dropped (stale server traffic) instead of corrupting the
//! round in flight.
//!
//! Animation stages do not mutate state from the scheduler task. Each
//! stage's apply sends a [`StageEvent`] back through a channel the driver
//! task drains, so every mutation still happens in one place.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use clashcard_domain::{
    CardId, DamageReport, EndDetail, MatchPhase, MatchResult, PostGame, RoundOutcome, UserIntent,
    Winner,
};
use clashcard_protocol::{IntentMessage, ServerMessage};

use crate::audio::{AudioCue, AudioPort, BgmTrack};
use crate::config::TimingProfile;
use crate::scheduler::{AnimationScheduler, SequenceHandle, SequencePhase};
use crate::store::{MatchView, SnapshotStore};
use crate::transport::{BattleTransport, SendOutcome, TransportError};

/// Timed stage of a resolved round (or an overlay expiry). Sent by the
/// scheduler, handled on the driver task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    Reveal,
    DamageText,
    ApplyHp,
    Draw,
    RoundDone,
    TrueSightExpired,
    TrueSightAlertExpired,
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Intent not allowed in phase {phase}")]
    IntentNotAllowed { phase: MatchPhase },

    #[error("Card {0} is not in hand")]
    CardNotInHand(CardId),

    #[error("No true sight charges left")]
    NoChargesLeft,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub struct BattleController {
    store: SnapshotStore,
    transport: Box<dyn BattleTransport>,
    audio: Arc<dyn AudioPort>,
    timings: TimingProfile,
    stage_tx: mpsc::UnboundedSender<StageEvent>,
    round_seq: Option<SequenceHandle>,
    reveal_seq: Option<SequenceHandle>,
    alert_seq: Option<SequenceHandle>,
    /// The outcome currently being staged. Held until `RoundDone`.
    pending_outcome: Option<RoundOutcome>,
}

impl BattleController {
    pub fn new(
        transport: Box<dyn BattleTransport>,
        timings: TimingProfile,
        audio: Arc<dyn AudioPort>,
        stage_tx: mpsc::UnboundedSender<StageEvent>,
    ) -> (Self, watch::Receiver<MatchView>) {
        let (store, view_rx) = SnapshotStore::new();
        let controller = Self {
            store,
            transport,
            audio,
            timings,
            stage_tx,
            round_seq: None,
            reveal_seq: None,
            alert_seq: None,
            pending_outcome: None,
        };
        (controller, view_rx)
    }

    pub async fn connect(
        &mut self,
    ) -> Result<mpsc::UnboundedReceiver<ServerMessage>, TransportError> {
        self.transport.connect().await
    }

    /// Gate, send, then apply optimistically. The send goes out first so
    /// a transport failure leaves the hand untouched and the intent
    /// retryable.
    pub async fn handle_intent(&mut self, intent: UserIntent) -> Result<(), FlowError> {
        let phase = self.store.phase();
        if !phase.accepts_user_intent() {
            return Err(FlowError::IntentNotAllowed { phase });
        }

        match intent {
            UserIntent::PlayCard { card_id } => {
                let Some(card) = self.store.local_card(&card_id) else {
                    return Err(FlowError::CardNotInHand(card_id));
                };

                let outcome = self
                    .transport
                    .send_intent(IntentMessage::PlayCard { card_id })
                    .await?;

                self.store.apply_optimistic_play(card);
                self.transition(MatchPhase::LocalChoiceLocked);
                self.audio.play(AudioCue::CardMoved);

                if let SendOutcome::Resolved(outcome) = outcome {
                    self.accept_outcome(*outcome);
                }
                Ok(())
            }
            UserIntent::UseTrueSight => {
                if self.store.local_true_sight_charges() == 0 {
                    return Err(FlowError::NoChargesLeft);
                }
                // No optimistic decrement: the charge count comes back
                // server-confirmed in the true_sight_result.
                self.transport
                    .send_intent(IntentMessage::UseTrueSight)
                    .await?;
                Ok(())
            }
        }
    }

    pub fn handle_server_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::SlotAssigned { slot } => {
                debug!(%slot, "Assigned battle slot");
            }
            ServerMessage::InitialData(data) => {
                let phase = self.store.phase();
                if !matches!(
                    phase,
                    MatchPhase::Connecting | MatchPhase::AwaitingOpponent
                ) {
                    warn!(%phase, "Dropping initialData outside handshake");
                    return;
                }
                self.store.initialize(data);
                self.transition(MatchPhase::AwaitingLocalChoice);
                self.audio.start_bgm(BgmTrack::Battle);
            }
            ServerMessage::OpponentChoiceStatus { opponent_ready } => {
                if !opponent_ready {
                    return;
                }
                let phase = self.store.phase();
                if !matches!(
                    phase,
                    MatchPhase::AwaitingLocalChoice | MatchPhase::LocalChoiceLocked
                ) {
                    warn!(%phase, "Dropping stale opponent choice status");
                    return;
                }
                self.store.confirm_opponent_played();
                self.audio.play(AudioCue::CardMoved);
            }
            ServerMessage::RoundResult(outcome) => {
                let phase = self.store.phase();
                match phase {
                    MatchPhase::LocalChoiceLocked | MatchPhase::BothChosen => {
                        self.accept_outcome(outcome);
                    }
                    // A terminal result can land without a staged round
                    // (opponent ran out of cards, forfeit race). End the
                    // match without the reveal timeline.
                    _ if outcome.terminal && !phase.is_terminal() => {
                        self.store.apply_authoritative(&outcome);
                        let post = outcome
                            .post_game
                            .unwrap_or_else(|| fallback_post_game(outcome.winner));
                        self.end_match(post);
                    }
                    _ => {
                        warn!(%phase, "Dropping stale round result");
                    }
                }
            }
            ServerMessage::TrueSightResult {
                opponent_counter,
                charges_left,
            } => {
                self.store.show_true_sight(opponent_counter, charges_left);
                if let Some(seq) = self.reveal_seq.take() {
                    seq.cancel();
                }
                self.reveal_seq = Some(self.overlay_expiry(StageEvent::TrueSightExpired));
            }
            ServerMessage::TrueSightAlert => {
                self.store.alert_true_sight();
                if let Some(seq) = self.alert_seq.take() {
                    seq.cancel();
                }
                self.alert_seq = Some(self.overlay_expiry(StageEvent::TrueSightAlertExpired));
            }
            ServerMessage::OpponentLeft | ServerMessage::Disconnected => {
                if self.store.phase().is_terminal() {
                    return;
                }
                self.end_match(PostGame::forfeit_win());
            }
            ServerMessage::Error { message } => {
                tracing::error!(%message, "Server reported an error");
            }
            ServerMessage::Unknown => {
                debug!("Ignoring unknown server message");
            }
        }
    }

    /// Advance one timed stage of the current round.
    pub fn handle_stage(&mut self, event: StageEvent) {
        // Overlay expiries are phase-independent.
        match event {
            StageEvent::TrueSightExpired => {
                self.store.clear_true_sight();
                return;
            }
            StageEvent::TrueSightAlertExpired => {
                self.store.clear_true_sight_alert();
                return;
            }
            _ => {}
        }

        // A cancelled sequence can have an event already in flight.
        if self.store.phase().is_terminal() {
            return;
        }
        let Some(outcome) = self.pending_outcome.clone() else {
            warn!(?event, "Stage event with no round in flight");
            return;
        };

        match event {
            StageEvent::Reveal => {
                self.store
                    .reveal_opponent_card(outcome.opponent.card_played.clone());
                self.audio.play(AudioCue::CardMoved);
            }
            StageEvent::DamageText => {
                self.transition(MatchPhase::ApplyingDamage);
                // What each side *takes* is what the other side dealt.
                self.store.set_round_damage(
                    outcome.winner,
                    outcome.opponent.damage_dealt,
                    outcome.local.damage_dealt,
                );
                for dealt in [outcome.local.damage_dealt, outcome.opponent.damage_dealt] {
                    match dealt {
                        DamageReport::Hit(_) => self.audio.play(AudioCue::Hit),
                        DamageReport::Evaded => self.audio.play(AudioCue::Evade),
                        DamageReport::None => {}
                    }
                }
            }
            StageEvent::ApplyHp => {
                self.store.apply_hp(outcome.local.hp, outcome.opponent.hp);
            }
            StageEvent::Draw => {
                self.store.apply_authoritative(&outcome);
                if outcome.terminal {
                    let post = outcome
                        .post_game
                        .unwrap_or_else(|| fallback_post_game(outcome.winner));
                    self.pending_outcome = None;
                    self.end_match(post);
                } else {
                    self.transition(MatchPhase::Drawing);
                    self.audio.play(AudioCue::CardMoved);
                }
            }
            StageEvent::RoundDone => {
                self.pending_outcome = None;
                self.store.clear_board();
                self.transition(MatchPhase::AwaitingLocalChoice);
            }
            StageEvent::TrueSightExpired | StageEvent::TrueSightAlertExpired => {}
        }
    }

    pub async fn shutdown(&mut self) {
        self.cancel_sequences();
        self.transport.close().await;
        self.audio.stop_bgm();
    }

    /// Take an authoritative round result and start its staged reveal.
    fn accept_outcome(&mut self, outcome: RoundOutcome) {
        if self.store.phase() == MatchPhase::LocalChoiceLocked {
            // The result itself proves the opponent chose; the push notice
            // may have been skipped (poll mode) or lost the race.
            self.store.confirm_opponent_played();
            self.transition(MatchPhase::BothChosen);
        }

        if self.store.local_holds(&outcome.local.card_played.id) {
            warn!(
                card = %outcome.local.card_played.id,
                "Round result names a card still in hand"
            );
        }

        self.transition(MatchPhase::Resolving);
        self.pending_outcome = Some(outcome);

        if let Some(seq) = self.round_seq.take() {
            seq.cancel();
        }
        let t = self.timings;
        let phases = vec![
            self.stage(t.reveal_hold, StageEvent::Reveal),
            self.stage(t.damage_text_hold, StageEvent::DamageText),
            self.stage(t.hp_hold, StageEvent::ApplyHp),
            self.stage(t.draw_hold, StageEvent::Draw),
            self.stage(Duration::ZERO, StageEvent::RoundDone),
        ];
        self.round_seq = Some(AnimationScheduler::run_sequence(phases));
    }

    fn end_match(&mut self, post_game: PostGame) {
        self.cancel_sequences();
        self.transition(MatchPhase::MatchEnded);
        match post_game.result {
            MatchResult::Win => self.audio.play(AudioCue::Win),
            MatchResult::Lose => self.audio.play(AudioCue::Lose),
            MatchResult::Draw => {}
        }
        self.store.set_post_game(post_game);
    }

    fn transition(&mut self, next: MatchPhase) {
        let current = self.store.phase();
        if current.may_advance_to(next) {
            debug!(%current, %next, "Phase transition");
            self.store.set_phase(next);
        } else {
            warn!(%current, %next, "Ignoring illegal phase transition");
        }
    }

    fn cancel_sequences(&mut self) {
        for seq in [
            self.round_seq.take(),
            self.reveal_seq.take(),
            self.alert_seq.take(),
        ]
        .into_iter()
        .flatten()
        {
            seq.cancel();
        }
    }

    fn stage(&self, hold: Duration, event: StageEvent) -> SequencePhase {
        let tx = self.stage_tx.clone();
        SequencePhase::new(hold, move || {
            let _ = tx.send(event);
        })
    }

    /// Overlay timeline: hold the overlay, then fire its expiry event.
    fn overlay_expiry(&self, event: StageEvent) -> SequenceHandle {
        let phases = vec![
            SequencePhase::new(self.timings.true_sight_hold, || {}),
            self.stage(Duration::ZERO, event),
        ];
        AnimationScheduler::run_sequence(phases)
    }
}

/// Summary for a terminal round that arrived without one. Should not
/// happen against a well-behaved server.
fn fallback_post_game(winner: Winner) -> PostGame {
    warn!("Terminal round result without postgame payload");
    let (result, detail) = match winner {
        Winner::Local => (MatchResult::Win, EndDetail::OpponentOutOfHp),
        Winner::Opponent => (MatchResult::Lose, EndDetail::LocalOutOfHp),
        Winner::Draw => (MatchResult::Draw, EndDetail::BothOutOfHp),
    };
    PostGame {
        result,
        detail,
        reward_exp: 0,
        reward_gold: 0,
        level_up: 0,
        stat_gain: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::recording::RecordingAudio;
    use crate::transport::fake::{FakeHandle, FakeTransport};
    use clashcard_domain::{
        Card, CardCounter, CardKind, ClassTag, LocalSide, OpponentOutcome, OpponentSide, Profile,
        SideOutcome, SpecialEvent, UnitStat,
    };
    use clashcard_protocol::InitialData;

    struct Harness {
        controller: BattleController,
        stage_rx: mpsc::UnboundedReceiver<StageEvent>,
        view_rx: watch::Receiver<MatchView>,
        transport: FakeHandle,
        audio: Arc<RecordingAudio>,
    }

    fn harness() -> Harness {
        let (transport, handle) = FakeTransport::new();
        let audio = RecordingAudio::shared();
        let (stage_tx, stage_rx) = mpsc::unbounded_channel();
        let (controller, view_rx) = BattleController::new(
            Box::new(transport),
            TimingProfile::instant(),
            Arc::clone(&audio) as Arc<dyn AudioPort>,
            stage_tx,
        );
        Harness {
            controller,
            stage_rx,
            view_rx,
            transport: handle,
            audio,
        }
    }

    impl Harness {
        /// Pump scheduler-emitted stage events until the timeline goes
        /// quiet.
        async fn drain_stages(&mut self) {
            loop {
                let next = tokio::time::timeout(
                    Duration::from_millis(100),
                    self.stage_rx.recv(),
                );
                match next.await {
                    Ok(Some(event)) => self.controller.handle_stage(event),
                    _ => break,
                }
            }
        }

        fn view(&self) -> MatchView {
            self.view_rx.borrow().clone()
        }

        fn start_match(&mut self) {
            self.controller
                .handle_server_message(ServerMessage::InitialData(initial_data()));
        }
    }

    fn profile(name: &str, class_tag: ClassTag) -> Profile {
        Profile {
            name: name.to_string(),
            level: 3,
            stat: UnitStat {
                atk: 10,
                def: 4,
                spd: 6,
                hp: 50,
            },
            class_tag,
        }
    }

    fn initial_data() -> InitialData {
        InitialData {
            local: LocalSide {
                profile: profile("hero", ClassTag::Mage),
                hp: 50,
                max_hp: 50,
                hand: vec![
                    Card::new("c-1", CardKind::Rock),
                    Card::new("c-2", CardKind::Paper),
                    Card::new("c-3", CardKind::Scissors),
                ],
                card_counter: CardCounter::new(3, 3, 3),
                true_sight_charges: 1,
            },
            opponent: OpponentSide {
                profile: profile("rival", ClassTag::Warrior),
                hp: 60,
                max_hp: 60,
                hand_size: 3,
                card_counter: CardCounter::new(3, 3, 3),
                true_sight_charges: 2,
            },
        }
    }

    fn round_outcome(terminal: bool) -> RoundOutcome {
        RoundOutcome {
            terminal,
            winner: Winner::Local,
            local: SideOutcome {
                hp: 45,
                hand: vec![
                    Card::new("c-2", CardKind::Paper),
                    Card::new("c-3", CardKind::Scissors),
                    Card::new("c-7", CardKind::Rock),
                ],
                card_played: Card::new("c-1", CardKind::Rock),
                damage_dealt: DamageReport::Hit(8),
                card_counter: CardCounter::new(2, 3, 3),
                true_sight_charges: 1,
                special_event: SpecialEvent::Nothing,
            },
            opponent: OpponentOutcome {
                hp: if terminal { -2 } else { 52 },
                hand_size: 3,
                card_played: Card::new("x-1", CardKind::Scissors),
                damage_dealt: DamageReport::Hit(5),
                card_counter: CardCounter::new(3, 2, 3),
                true_sight_charges: 2,
                special_event: SpecialEvent::Nothing,
            },
            post_game: terminal.then(|| PostGame {
                result: MatchResult::Win,
                detail: EndDetail::OpponentOutOfHp,
                reward_exp: 120,
                reward_gold: 30,
                level_up: 0,
                stat_gain: UnitStat::default(),
            }),
        }
    }

    fn play_intent(card: &str) -> UserIntent {
        UserIntent::PlayCard {
            card_id: CardId::new(card),
        }
    }

    #[tokio::test]
    async fn test_handshake_reaches_awaiting_choice() {
        let mut h = harness();
        assert_eq!(h.view().phase, MatchPhase::Connecting);

        h.start_match();

        let view = h.view();
        assert_eq!(view.phase, MatchPhase::AwaitingLocalChoice);
        assert_eq!(view.snapshot.expect("snapshot").local.hand.len(), 3);
    }

    #[tokio::test]
    async fn test_full_round_returns_to_awaiting_choice() {
        let mut h = harness();
        h.start_match();

        h.controller
            .handle_intent(play_intent("c-1"))
            .await
            .expect("play");
        assert_eq!(h.view().phase, MatchPhase::LocalChoiceLocked);
        assert_eq!(h.transport.sent_intents().len(), 1);

        h.controller
            .handle_server_message(ServerMessage::OpponentChoiceStatus {
                opponent_ready: true,
            });
        let snap = h.view().snapshot.expect("snapshot");
        assert_eq!(snap.opponent.hand_size, 2);

        h.controller
            .handle_server_message(ServerMessage::RoundResult(round_outcome(false)));
        h.drain_stages().await;

        let view = h.view();
        assert_eq!(view.phase, MatchPhase::AwaitingLocalChoice);
        assert_eq!(view.board, Default::default());
        let snap = view.snapshot.expect("snapshot");
        assert_eq!(snap.local.hp, 45);
        assert_eq!(snap.local.hand.len(), 3);
        assert_eq!(snap.opponent.hp, 52);
        assert_eq!(snap.opponent.hand_size, 3);
    }

    #[tokio::test]
    async fn test_round_result_without_choice_notice_still_resolves() {
        let mut h = harness();
        h.start_match();
        h.controller
            .handle_intent(play_intent("c-1"))
            .await
            .expect("play");

        // Poll mode: no opponent_choice_status ever arrives.
        h.controller
            .handle_server_message(ServerMessage::RoundResult(round_outcome(false)));
        h.drain_stages().await;

        assert_eq!(h.view().phase, MatchPhase::AwaitingLocalChoice);
    }

    #[tokio::test]
    async fn test_resolved_send_outcome_drives_the_round() {
        let mut h = harness();
        h.start_match();
        h.transport.script_send(Ok(SendOutcome::Resolved(Box::new(
            round_outcome(false),
        ))));

        h.controller
            .handle_intent(play_intent("c-1"))
            .await
            .expect("play");
        h.drain_stages().await;

        assert_eq!(h.view().phase, MatchPhase::AwaitingLocalChoice);
        assert_eq!(h.view().snapshot.expect("snapshot").local.hp, 45);
    }

    #[tokio::test]
    async fn test_terminal_round_ends_the_match() {
        let mut h = harness();
        h.start_match();
        h.controller
            .handle_intent(play_intent("c-1"))
            .await
            .expect("play");

        h.controller
            .handle_server_message(ServerMessage::RoundResult(round_outcome(true)));
        h.drain_stages().await;

        let view = h.view();
        assert_eq!(view.phase, MatchPhase::MatchEnded);
        let post = view.post_game.expect("postgame");
        assert_eq!(post.result, MatchResult::Win);
        assert_eq!(post.reward_exp, 120);
        // Opponent HP clamped at zero even though the server reported -2.
        assert_eq!(view.snapshot.expect("snapshot").opponent.hp, 0);
        assert!(h.audio.cues().contains(&AudioCue::Win));
    }

    #[tokio::test]
    async fn test_intent_rejected_outside_choice_phase() {
        let mut h = harness();
        h.start_match();
        h.controller
            .handle_intent(play_intent("c-1"))
            .await
            .expect("play");

        let err = h
            .controller
            .handle_intent(play_intent("c-2"))
            .await
            .expect_err("second play must be rejected");
        assert!(matches!(
            err,
            FlowError::IntentNotAllowed {
                phase: MatchPhase::LocalChoiceLocked
            }
        ));
        // Only the first intent went out.
        assert_eq!(h.transport.sent_intents().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_card_rejected_without_send() {
        let mut h = harness();
        h.start_match();

        let err = h
            .controller
            .handle_intent(play_intent("c-99"))
            .await
            .expect_err("unknown card");
        assert!(matches!(err, FlowError::CardNotInHand(_)));
        assert!(h.transport.sent_intents().is_empty());
    }

    #[tokio::test]
    async fn test_failed_send_leaves_hand_untouched() {
        let mut h = harness();
        h.start_match();
        h.transport
            .script_send(Err(TransportError::Send("boom".to_string())));

        let err = h
            .controller
            .handle_intent(play_intent("c-1"))
            .await
            .expect_err("send failure");
        assert!(matches!(err, FlowError::Transport(_)));

        let view = h.view();
        assert_eq!(view.phase, MatchPhase::AwaitingLocalChoice);
        assert_eq!(view.snapshot.expect("snapshot").local.hand.len(), 3);
        assert!(view.board.local_played.is_none());
    }

    #[tokio::test]
    async fn test_stale_round_result_is_dropped() {
        let mut h = harness();
        h.start_match();

        // Non-terminal result while still free to act: stale, ignored.
        h.controller
            .handle_server_message(ServerMessage::RoundResult(round_outcome(false)));
        h.drain_stages().await;

        let view = h.view();
        assert_eq!(view.phase, MatchPhase::AwaitingLocalChoice);
        assert_eq!(view.snapshot.expect("snapshot").local.hp, 50);
    }

    #[tokio::test]
    async fn test_choice_status_during_resolve_is_stale() {
        let mut h = harness();
        h.start_match();
        h.controller
            .handle_intent(play_intent("c-1"))
            .await
            .expect("play");
        h.controller
            .handle_server_message(ServerMessage::RoundResult(round_outcome(false)));

        // Staging has begun; a late choice notice must change nothing.
        let before = h.view();
        h.controller
            .handle_server_message(ServerMessage::OpponentChoiceStatus {
                opponent_ready: true,
            });
        assert_eq!(h.view(), before);

        h.drain_stages().await;
        assert_eq!(h.view().phase, MatchPhase::AwaitingLocalChoice);
    }

    #[tokio::test]
    async fn test_terminal_result_honored_from_any_phase() {
        let mut h = harness();
        h.start_match();

        h.controller
            .handle_server_message(ServerMessage::RoundResult(round_outcome(true)));

        let view = h.view();
        assert_eq!(view.phase, MatchPhase::MatchEnded);
        assert!(view.post_game.is_some());
    }

    #[tokio::test]
    async fn test_opponent_left_is_a_forfeit_win() {
        let mut h = harness();
        h.start_match();
        h.controller
            .handle_intent(play_intent("c-1"))
            .await
            .expect("play");

        h.controller.handle_server_message(ServerMessage::OpponentLeft);

        let view = h.view();
        assert_eq!(view.phase, MatchPhase::MatchEnded);
        let post = view.post_game.expect("postgame");
        assert_eq!(post.result, MatchResult::Win);
        assert_eq!(post.detail, EndDetail::OpponentLeft);
        assert_eq!(post.reward_exp, 0);

        // Anything after the forfeit is ignored.
        h.controller
            .handle_server_message(ServerMessage::RoundResult(round_outcome(false)));
        h.drain_stages().await;
        assert_eq!(h.view().phase, MatchPhase::MatchEnded);
    }

    #[tokio::test]
    async fn test_disconnect_matches_opponent_left() {
        let mut h = harness();
        h.start_match();

        h.controller
            .handle_server_message(ServerMessage::Disconnected);

        let view = h.view();
        assert_eq!(view.phase, MatchPhase::MatchEnded);
        assert_eq!(
            view.post_game.expect("postgame").detail,
            EndDetail::OpponentLeft
        );
    }

    #[tokio::test]
    async fn test_true_sight_flow() {
        let mut h = harness();
        h.start_match();

        h.controller
            .handle_intent(UserIntent::UseTrueSight)
            .await
            .expect("cast");
        assert_eq!(
            h.transport.sent_intents(),
            vec![IntentMessage::UseTrueSight]
        );

        h.controller
            .handle_server_message(ServerMessage::TrueSightResult {
                opponent_counter: CardCounter::new(2, 0, 1),
                charges_left: 0,
            });
        let view = h.view();
        assert_eq!(view.true_sight_reveal, Some(CardCounter::new(2, 0, 1)));
        assert_eq!(
            view.snapshot.expect("snapshot").local.true_sight_charges,
            0
        );

        h.drain_stages().await;
        assert_eq!(h.view().true_sight_reveal, None);

        // Charges are spent; another cast is rejected locally.
        let err = h
            .controller
            .handle_intent(UserIntent::UseTrueSight)
            .await
            .expect_err("no charges");
        assert!(matches!(err, FlowError::NoChargesLeft));
    }

    #[tokio::test]
    async fn test_true_sight_alert_debits_display_and_expires() {
        let mut h = harness();
        h.start_match();

        h.controller
            .handle_server_message(ServerMessage::TrueSightAlert);
        let view = h.view();
        assert!(view.true_sight_alert);
        assert_eq!(
            view.snapshot.expect("snapshot").opponent.true_sight_charges,
            1
        );

        h.drain_stages().await;
        assert!(!h.view().true_sight_alert);
    }

    #[tokio::test]
    async fn test_damage_cues_fire_during_staging() {
        let mut h = harness();
        h.start_match();
        h.controller
            .handle_intent(play_intent("c-1"))
            .await
            .expect("play");
        h.controller
            .handle_server_message(ServerMessage::RoundResult(round_outcome(false)));
        h.drain_stages().await;

        let cues = h.audio.cues();
        assert!(cues.contains(&AudioCue::Hit));
    }
}
