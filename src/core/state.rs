//! Game state: an immutable snapshot of one game.
//!
//! ## Phase
//!
//! The named state of the per-game state machine:
//!
//! ```text
//! PICK_CASE → ROUND → OFFER → (COUNTER_OFFER) → { ROUND | FINAL_REVEAL } → RESULT
//! ```
//!
//! ## GameState
//!
//! Complete game state:
//! - Phase and round index
//! - Containers (id, amount, opened) and the player's container
//! - Banker offer, counteroffer and final result
//! - This round's open countdown
//!
//! `GameState` is a value. The engine never mutates one; every transition
//! produces a new state and leaves the old one intact. Containers and opened
//! ids live in `im` persistent collections so those copies are O(1).

use im::{OrdSet, Vector};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::container::{Container, ContainerId};
use crate::error::{GameError, Result};

/// Stack buffer sized for the largest supported game.
pub type AmountBuf = SmallVec<[i64; 25]>;

/// Stack buffer of container ids sized for the largest supported game.
pub type IdBuf = SmallVec<[ContainerId; 25]>;

/// Phase of the game state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Waiting for the player to claim a container.
    PickCase,
    /// Choosing and opening containers.
    Round,
    /// A banker offer is on the table.
    Offer,
    /// The player has countered; waiting for the banker's decision.
    CounterOffer,
    /// Two containers remain: keep or swap.
    FinalReveal,
    /// Terminal.
    Result,
}

impl Phase {
    /// Upper-case name used in messages and transcripts.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Phase::PickCase => "PICK_CASE",
            Phase::Round => "ROUND",
            Phase::Offer => "OFFER",
            Phase::CounterOffer => "COUNTER_OFFER",
            Phase::FinalReveal => "FINAL_REVEAL",
            Phase::Result => "RESULT",
        }
    }

    /// Check if no further actions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Phase::Result)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable snapshot of a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    phase: Phase,
    round_index: u32,
    containers: Vector<Container>,
    player_container: Option<ContainerId>,
    opened_ids: OrdSet<ContainerId>,
    current_offer: Option<i64>,
    counter_offer: Option<i64>,
    result: Option<i64>,
    to_open_this_round: usize,
    round_quota: Option<usize>,
}

impl GameState {
    /// Deal `amounts` into containers `1..=N` in the given order.
    pub(crate) fn initial(amounts: impl IntoIterator<Item = i64>) -> Self {
        let containers = amounts
            .into_iter()
            .zip(1u32..)
            .map(|(amount, id)| Container::new(ContainerId::new(id), amount))
            .collect();

        Self {
            phase: Phase::PickCase,
            round_index: 0,
            containers,
            player_container: None,
            opened_ids: OrdSet::new(),
            current_offer: None,
            counter_offer: None,
            result: None,
            to_open_this_round: 0,
            round_quota: None,
        }
    }

    // === Accessors ===

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Rounds completed by declining (0 at game start).
    #[must_use]
    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    /// All containers, ordered by id.
    #[must_use]
    pub fn containers(&self) -> &Vector<Container> {
        &self.containers
    }

    /// Number of containers in this game.
    #[must_use]
    pub fn case_count(&self) -> usize {
        self.containers.len()
    }

    /// Look up a container by id.
    #[must_use]
    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        if id.is_valid(self.case_count()) {
            self.containers.get(id.index())
        } else {
            None
        }
    }

    /// Amount held by a container.
    #[must_use]
    pub fn amount_of(&self, id: ContainerId) -> Option<i64> {
        self.container(id).map(|c| c.amount)
    }

    /// The player's container, once picked.
    #[must_use]
    pub fn player_container(&self) -> Option<ContainerId> {
        self.player_container
    }

    /// Ids opened so far.
    #[must_use]
    pub fn opened_ids(&self) -> &OrdSet<ContainerId> {
        &self.opened_ids
    }

    /// Check if a container has been opened.
    #[must_use]
    pub fn is_opened(&self, id: ContainerId) -> bool {
        self.opened_ids.contains(&id)
    }

    /// The banker's offer currently on the table.
    #[must_use]
    pub fn current_offer(&self) -> Option<i64> {
        self.current_offer
    }

    /// The player's pending counteroffer.
    #[must_use]
    pub fn counter_offer(&self) -> Option<i64> {
        self.counter_offer
    }

    /// Final winnings, set only in `RESULT`.
    #[must_use]
    pub fn result(&self) -> Option<i64> {
        self.result
    }

    /// Containers still to open before an offer may be computed.
    #[must_use]
    pub fn to_open_this_round(&self) -> usize {
        self.to_open_this_round
    }

    /// Open-count chosen for this round, if any.
    #[must_use]
    pub fn round_quota(&self) -> Option<usize> {
        self.round_quota
    }

    /// Check if the game is over.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    // === Derived Views ===

    /// Unopened containers, including the player's own.
    pub fn unopened(&self) -> impl Iterator<Item = &Container> + '_ {
        self.containers.iter().filter(|c| !c.opened)
    }

    /// Number of unopened containers, including the player's own.
    #[must_use]
    pub fn unopened_count(&self) -> usize {
        self.case_count() - self.opened_ids.len()
    }

    /// Number of unopened containers other than the player's.
    #[must_use]
    pub fn unopened_excluding_player(&self) -> usize {
        self.unopened()
            .filter(|c| Some(c.id) != self.player_container)
            .count()
    }

    /// Amounts still in play, in container order.
    #[must_use]
    pub fn remaining_amounts(&self) -> AmountBuf {
        self.unopened().map(|c| c.amount).collect()
    }

    /// Ids still in play, ascending.
    #[must_use]
    pub fn remaining_ids(&self) -> IdBuf {
        self.unopened().map(|c| c.id).collect()
    }

    /// Mean of the amounts still in play.
    #[must_use]
    pub fn expected_value(&self) -> Option<f64> {
        let n = self.unopened_count();
        if n == 0 {
            return None;
        }
        let sum: i128 = self.unopened().map(|c| i128::from(c.amount)).sum();
        Some(sum as f64 / n as f64)
    }

    /// Largest amount still in play.
    #[must_use]
    pub fn max_remaining(&self) -> Option<i64> {
        self.unopened().map(|c| c.amount).max()
    }

    // === Invariants ===

    /// Verify the structural invariants of a game state.
    pub fn check_invariants(&self) -> Result<()> {
        let n = self.case_count();

        for (index, c) in self.containers.iter().enumerate() {
            if c.id.index() != index {
                return Err(GameError::IllegalState(format!(
                    "container {} stored at slot {}",
                    c.id, index
                )));
            }
            if c.opened != self.opened_ids.contains(&c.id) {
                return Err(GameError::IllegalState(format!(
                    "container {} opened flag disagrees with opened set",
                    c.id
                )));
            }
        }

        if let Some(bad) = self.opened_ids.iter().find(|id| !id.is_valid(n)) {
            return Err(GameError::IllegalState(format!("opened id {} out of range", bad)));
        }

        match self.player_container {
            Some(id) if self.is_opened(id) && !self.is_terminal() => {
                return Err(GameError::IllegalState(format!(
                    "player container {} was opened",
                    id
                )));
            }
            Some(_) if self.phase == Phase::PickCase => {
                return Err(GameError::IllegalState(
                    "player container set during PICK_CASE".into(),
                ));
            }
            None if self.phase != Phase::PickCase => {
                return Err(GameError::IllegalState(format!(
                    "no player container in {}",
                    self.phase
                )));
            }
            _ => {}
        }

        if self.result.is_some() != self.is_terminal() {
            return Err(GameError::IllegalState(format!(
                "result {:?} inconsistent with phase {}",
                self.result, self.phase
            )));
        }

        if self.to_open_this_round > self.round_quota.unwrap_or(0) {
            return Err(GameError::IllegalState(format!(
                "countdown {} exceeds round quota {:?}",
                self.to_open_this_round, self.round_quota
            )));
        }

        if self.to_open_this_round > self.unopened_excluding_player() {
            return Err(GameError::IllegalState(format!(
                "countdown {} exceeds closed containers",
                self.to_open_this_round
            )));
        }

        Ok(())
    }

    // === Transitions ===
    //
    // Each helper changes only the fields of its own transition.

    pub(crate) fn with_player_container(&self, id: ContainerId) -> Self {
        Self {
            phase: Phase::Round,
            player_container: Some(id),
            ..self.clone()
        }
    }

    pub(crate) fn with_round_quota(&self, k: usize) -> Self {
        Self {
            to_open_this_round: k,
            round_quota: Some(k),
            ..self.clone()
        }
    }

    pub(crate) fn with_opened(&self, id: ContainerId) -> Self {
        let containers = match self.containers.get(id.index()) {
            Some(c) => self.containers.update(id.index(), c.into_opened()),
            None => self.containers.clone(),
        };

        Self {
            containers,
            opened_ids: self.opened_ids.update(id),
            to_open_this_round: self.to_open_this_round.saturating_sub(1),
            ..self.clone()
        }
    }

    pub(crate) fn with_offer(&self, offer: i64) -> Self {
        Self {
            phase: Phase::Offer,
            current_offer: Some(offer),
            counter_offer: None,
            ..self.clone()
        }
    }

    pub(crate) fn with_counter_offer(&self, counter: i64) -> Self {
        Self {
            phase: Phase::CounterOffer,
            counter_offer: Some(counter),
            ..self.clone()
        }
    }

    pub(crate) fn next_round(&self) -> Self {
        Self {
            phase: Phase::Round,
            round_index: self.round_index + 1,
            current_offer: None,
            counter_offer: None,
            to_open_this_round: 0,
            round_quota: None,
            ..self.clone()
        }
    }

    pub(crate) fn to_final_reveal(&self) -> Self {
        Self {
            phase: Phase::FinalReveal,
            current_offer: None,
            counter_offer: None,
            to_open_this_round: 0,
            round_quota: None,
            ..self.clone()
        }
    }

    pub(crate) fn with_result(&self, amount: i64) -> Self {
        Self {
            phase: Phase::Result,
            result: Some(amount),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dealt() -> GameState {
        GameState::initial([500, 100, 5_000, 200, 1_000])
    }

    #[test]
    fn test_initial_state() {
        let state = dealt();

        assert_eq!(state.phase(), Phase::PickCase);
        assert_eq!(state.round_index(), 0);
        assert_eq!(state.case_count(), 5);
        assert_eq!(state.player_container(), None);
        assert!(state.opened_ids().is_empty());
        assert_eq!(state.amount_of(ContainerId::new(3)), Some(5_000));
        assert_eq!(state.amount_of(ContainerId::new(6)), None);
        assert_eq!(state.amount_of(ContainerId::new(0)), None);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_pick_and_open() {
        let state = dealt().with_player_container(ContainerId::new(1));
        assert_eq!(state.phase(), Phase::Round);
        assert_eq!(state.unopened_excluding_player(), 4);

        let state = state.with_round_quota(2);
        assert_eq!(state.to_open_this_round(), 2);
        assert_eq!(state.round_quota(), Some(2));

        let state = state.with_opened(ContainerId::new(3));
        assert!(state.is_opened(ContainerId::new(3)));
        assert!(state.container(ContainerId::new(3)).unwrap().opened);
        assert_eq!(state.to_open_this_round(), 1);
        assert_eq!(state.unopened_count(), 4);
        assert_eq!(state.remaining_amounts().as_slice(), &[500, 100, 200, 1_000]);
        assert_eq!(state.max_remaining(), Some(1_000));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_transitions_leave_original_untouched() {
        let before = dealt().with_player_container(ContainerId::new(2)).with_round_quota(1);
        let after = before.with_opened(ContainerId::new(4));

        assert!(!before.is_opened(ContainerId::new(4)));
        assert_eq!(before.to_open_this_round(), 1);
        assert!(after.is_opened(ContainerId::new(4)));
    }

    #[test]
    fn test_expected_value() {
        let state = dealt();
        assert_eq!(state.expected_value(), Some(1_360.0));

        let state = state
            .with_player_container(ContainerId::new(1))
            .with_round_quota(1)
            .with_opened(ContainerId::new(3));
        assert_eq!(state.expected_value(), Some(450.0));
    }

    #[test]
    fn test_offer_round_cycle() {
        let state = dealt()
            .with_player_container(ContainerId::new(1))
            .with_round_quota(1)
            .with_opened(ContainerId::new(2))
            .with_offer(300);
        assert_eq!(state.phase(), Phase::Offer);
        assert_eq!(state.current_offer(), Some(300));

        let countered = state.with_counter_offer(400);
        assert_eq!(countered.phase(), Phase::CounterOffer);
        assert_eq!(countered.current_offer(), Some(300));
        assert_eq!(countered.counter_offer(), Some(400));

        let next = countered.next_round();
        assert_eq!(next.phase(), Phase::Round);
        assert_eq!(next.round_index(), 1);
        assert_eq!(next.current_offer(), None);
        assert_eq!(next.counter_offer(), None);
        assert_eq!(next.round_quota(), None);
        assert_eq!(next.opened_ids().len(), 1);
        assert!(next.check_invariants().is_ok());
    }

    #[test]
    fn test_result_only_in_terminal_phase() {
        let state = dealt().with_player_container(ContainerId::new(1));
        let done = state.with_result(500);
        assert!(done.is_terminal());
        assert_eq!(done.result(), Some(500));
        assert!(done.check_invariants().is_ok());
    }

    #[test]
    fn test_invariant_violation_detected() {
        // Opening the player's container is structurally forbidden.
        let state = dealt()
            .with_player_container(ContainerId::new(1))
            .with_round_quota(1)
            .with_opened(ContainerId::new(1));
        assert!(matches!(
            state.check_invariants(),
            Err(GameError::IllegalState(_))
        ));
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::PickCase.to_string(), "PICK_CASE");
        assert_eq!(Phase::CounterOffer.to_string(), "COUNTER_OFFER");
        assert!(Phase::Result.is_terminal());
        assert!(!Phase::FinalReveal.is_terminal());
    }

    #[test]
    fn test_state_serde() {
        let state = dealt().with_player_container(ContainerId::new(5));
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
