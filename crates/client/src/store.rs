//! Match snapshot store.
//!
//! Holds the last-known-authoritative `MatchSnapshot` plus the current
//! optimistic edits, and publishes a merged, read-only [`MatchView`]
//! through a watch channel. All mutators are crate-private: only the
//! battle flow controller writes here. The old screens mutated the same
//! state from half a dozen effect hooks each.

use tokio::sync::watch;

use clashcard_domain::{
    Card, CardCounter, CardId, DamageReport, MatchPhase, MatchSnapshot, PostGame, RoundOutcome,
    Winner,
};
use clashcard_protocol::InitialData;

/// What currently sits on the board, plus round flavor for the
/// presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardView {
    /// The local player's played card (real kind; it is their own card).
    pub local_played: Option<Card>,
    /// The opponent's played card. Concealed until the reveal stage.
    pub opponent_played: Option<Card>,
    /// Damage the local side took this round, once the damage stage ran.
    pub local_damage_taken: Option<DamageReport>,
    /// Damage the opponent took this round.
    pub opponent_damage_taken: Option<DamageReport>,
    pub round_winner: Option<Winner>,
}

/// Read-only projection handed to the presentation layer. Rendering is a
/// pure function of one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchView {
    pub phase: MatchPhase,
    /// Merged snapshot (authoritative state with optimistic edits
    /// applied). `None` until the initial handshake lands.
    pub snapshot: Option<MatchSnapshot>,
    pub board: BoardView,
    /// Opponent hand composition while a true-sight reveal is showing.
    pub true_sight_reveal: Option<CardCounter>,
    /// The opponent used true sight on us; show the alert overlay.
    pub true_sight_alert: bool,
    pub post_game: Option<PostGame>,
}

impl MatchView {
    fn initial() -> Self {
        Self {
            phase: MatchPhase::Connecting,
            snapshot: None,
            board: BoardView::default(),
            true_sight_reveal: None,
            true_sight_alert: false,
            post_game: None,
        }
    }
}

/// Local edits applied ahead of server confirmation. Always discarded
/// wholesale when an authoritative payload lands.
#[derive(Debug, Default)]
struct OptimisticEdits {
    /// Card removed from the local hand at play time, before the round
    /// result confirms it.
    played_card: Option<CardId>,
    /// The opponent's confirmed selection; their displayed hand count
    /// drops by one until the authoritative hand size arrives.
    opponent_played: bool,
    /// Display-only decrement of the opponent's true-sight charges after
    /// a `true_sight_alert`; reconciled by the next round result.
    opponent_charge_debit: u32,
}

pub struct SnapshotStore {
    phase: MatchPhase,
    authoritative: Option<MatchSnapshot>,
    optimistic: OptimisticEdits,
    board: BoardView,
    true_sight_reveal: Option<CardCounter>,
    true_sight_alert: bool,
    post_game: Option<PostGame>,
    tx: watch::Sender<MatchView>,
}

impl SnapshotStore {
    pub fn new() -> (Self, watch::Receiver<MatchView>) {
        let (tx, rx) = watch::channel(MatchView::initial());
        let store = Self {
            phase: MatchPhase::Connecting,
            authoritative: None,
            optimistic: OptimisticEdits::default(),
            board: BoardView::default(),
            true_sight_reveal: None,
            true_sight_alert: false,
            post_game: None,
            tx,
        };
        (store, rx)
    }

    // -------------------------------------------------------------------
    // Read side
    // -------------------------------------------------------------------

    /// Merge authoritative state and optimistic edits into the view the
    /// presentation layer sees.
    pub fn view(&self) -> MatchView {
        let snapshot = self.authoritative.as_ref().map(|auth| {
            let mut merged = auth.clone();
            if let Some(played) = &self.optimistic.played_card {
                merged.local.hand.retain(|card| &card.id != played);
            }
            if self.optimistic.opponent_played {
                merged.opponent.hand_size = merged.opponent.hand_size.saturating_sub(1);
            }
            merged.opponent.true_sight_charges = merged
                .opponent
                .true_sight_charges
                .saturating_sub(self.optimistic.opponent_charge_debit);
            merged
        });

        MatchView {
            phase: self.phase,
            snapshot,
            board: self.board.clone(),
            true_sight_reveal: self.true_sight_reveal,
            true_sight_alert: self.true_sight_alert,
            post_game: self.post_game.clone(),
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn has_snapshot(&self) -> bool {
        self.authoritative.is_some()
    }

    /// Whether the merged local hand still holds `card_id`.
    pub fn local_holds(&self, card_id: &CardId) -> bool {
        if self.optimistic.played_card.as_ref() == Some(card_id) {
            return false;
        }
        self.authoritative
            .as_ref()
            .is_some_and(|snap| snap.local.holds_card(card_id))
    }

    pub fn local_card(&self, card_id: &CardId) -> Option<Card> {
        self.authoritative
            .as_ref()
            .and_then(|snap| snap.local.find_card(card_id).cloned())
    }

    pub fn local_true_sight_charges(&self) -> u32 {
        self.authoritative
            .as_ref()
            .map_or(0, |snap| snap.local.true_sight_charges)
    }

    // -------------------------------------------------------------------
    // Mutators (controller only)
    // -------------------------------------------------------------------

    pub(crate) fn set_phase(&mut self, phase: MatchPhase) {
        self.phase = phase;
        self.publish();
    }

    pub(crate) fn initialize(&mut self, data: InitialData) {
        self.authoritative = Some(MatchSnapshot {
            local: data.local,
            opponent: data.opponent,
        });
        self.optimistic = OptimisticEdits::default();
        self.board = BoardView::default();
        self.post_game = None;
        self.publish();
    }

    /// Record the local play ahead of confirmation: the card leaves the
    /// merged hand and lands on the board.
    pub(crate) fn apply_optimistic_play(&mut self, card: Card) {
        self.optimistic.played_card = Some(card.id.clone());
        self.board.local_played = Some(card);
        self.publish();
    }

    /// The opponent's choice is confirmed (push notice, or a round result
    /// that beat the notice). Their displayed hand shrinks by one and a
    /// concealed card appears on the board. Idempotent.
    pub(crate) fn confirm_opponent_played(&mut self) {
        if self.optimistic.opponent_played {
            return;
        }
        self.optimistic.opponent_played = true;
        if self.board.opponent_played.is_none() {
            self.board.opponent_played = Some(Card::concealed("opponent-choice"));
        }
        self.publish();
    }

    /// Reveal stage: swap the concealed board card for the real one.
    pub(crate) fn reveal_opponent_card(&mut self, card: Card) {
        self.board.opponent_played = Some(card);
        self.publish();
    }

    /// Damage stage: expose per-side damage text and the round winner.
    pub(crate) fn set_round_damage(
        &mut self,
        winner: Winner,
        local_taken: DamageReport,
        opponent_taken: DamageReport,
    ) {
        self.board.round_winner = Some(winner);
        self.board.local_damage_taken = Some(local_taken);
        self.board.opponent_damage_taken = Some(opponent_taken);
        self.publish();
    }

    /// HP application stage. Values are the server's raw numbers; the
    /// snapshot clamps into `[0, max_hp]`.
    pub(crate) fn apply_hp(&mut self, local_hp: i64, opponent_hp: i64) {
        if let Some(snap) = self.authoritative.as_mut() {
            snap.local.set_hp(local_hp);
            snap.opponent.set_hp(opponent_hp);
        }
        self.publish();
    }

    /// Overwrite every post-round field from the authoritative outcome
    /// and drop all optimistic edits. This is an overwrite, not a merge:
    /// whatever the client believed, the server's payload wins.
    pub(crate) fn apply_authoritative(&mut self, outcome: &RoundOutcome) {
        if let Some(snap) = self.authoritative.as_mut() {
            snap.local.set_hp(outcome.local.hp);
            snap.local.hand = outcome.local.hand.clone();
            snap.local.card_counter = outcome.local.card_counter;
            snap.local.true_sight_charges = outcome.local.true_sight_charges;

            snap.opponent.set_hp(outcome.opponent.hp);
            snap.opponent.hand_size = outcome.opponent.hand_size;
            snap.opponent.card_counter = outcome.opponent.card_counter;
            snap.opponent.true_sight_charges = outcome.opponent.true_sight_charges;
        }
        self.optimistic = OptimisticEdits::default();
        self.publish();
    }

    /// End of round: clear played cards and damage text.
    pub(crate) fn clear_board(&mut self) {
        self.board = BoardView::default();
        self.publish();
    }

    /// True-sight response for the caster. The charge count is the
    /// server-confirmed remainder, never a local decrement.
    pub(crate) fn show_true_sight(&mut self, counter: CardCounter, charges_left: u32) {
        self.true_sight_reveal = Some(counter);
        if let Some(snap) = self.authoritative.as_mut() {
            snap.local.true_sight_charges = charges_left;
        }
        self.publish();
    }

    pub(crate) fn clear_true_sight(&mut self) {
        self.true_sight_reveal = None;
        self.publish();
    }

    /// The opponent used true sight on us. Their displayed charge count
    /// drops by one; the authoritative value arrives with the next round
    /// result.
    pub(crate) fn alert_true_sight(&mut self) {
        self.true_sight_alert = true;
        self.optimistic.opponent_charge_debit += 1;
        self.publish();
    }

    pub(crate) fn clear_true_sight_alert(&mut self) {
        self.true_sight_alert = false;
        self.publish();
    }

    pub(crate) fn set_post_game(&mut self, post_game: PostGame) {
        self.post_game = Some(post_game);
        self.publish();
    }

    fn publish(&self) {
        // Receivers may all be gone during teardown; nothing to do then.
        let _ = self.tx.send(self.view());
    }
}
