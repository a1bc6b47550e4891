//! The game engine: phase state machine over immutable `GameState` values.
//!
//! Every operation takes the current state by reference, validates phase and
//! arguments, and returns a new state. On error the caller keeps its current
//! state; nothing is mutated.

use tracing::{debug, info};

use crate::core::{Action, ContainerId, GameConfig, GameRng, GameState, Phase};
use crate::error::{GameError, Result};
use crate::policy::{
    BankerOfferPolicy, OfferContext, OfferPolicy, PerRoundPolicy, PrizeLadder, RoundPolicy,
    StandardLadder,
};

/// Counter acceptance factor at round 0.
pub const COUNTER_BASE_FACTOR: f64 = 0.95;

/// Counter acceptance factor growth per round.
pub const COUNTER_FACTOR_PER_ROUND: f64 = 0.03;

/// Counter acceptance factor ceiling.
pub const COUNTER_MAX_FACTOR: f64 = 1.10;

/// Highest counteroffer the banker accepts on EV grounds in a given round.
///
/// `ceil(ev * min(1.10, 0.95 + 0.03 * round))`.
#[must_use]
pub fn counter_threshold(ev: f64, round_index: u32) -> i64 {
    let factor = (COUNTER_BASE_FACTOR + COUNTER_FACTOR_PER_ROUND * f64::from(round_index))
        .min(COUNTER_MAX_FACTOR);
    (ev * factor).ceil() as i64
}

/// State-machine driver for one game configuration.
///
/// Generic over its collaborators so they are injected as typed values:
/// the prize ladder, the round policy and the offer policy. Owns exactly one
/// seeded RNG, drawn from only by [`Engine::start`], so one engine plays one
/// game.
#[derive(Debug)]
pub struct Engine<L = StandardLadder, R = PerRoundPolicy, O = BankerOfferPolicy> {
    config: GameConfig,
    ladder: L,
    round_policy: R,
    offer_policy: O,
    rng: GameRng,
}

impl Engine {
    /// Create an engine with the standard ladder and default policies.
    pub fn new(case_count: usize, seed: u64) -> Result<Self> {
        Self::from_config(GameConfig::new(case_count).with_seed(seed))
    }

    /// Create an engine with default policies from a configuration.
    pub fn from_config(config: GameConfig) -> Result<Self> {
        Self::with_policies(
            config,
            StandardLadder,
            PerRoundPolicy,
            BankerOfferPolicy::default(),
        )
    }
}

impl<L: PrizeLadder> Engine<L> {
    /// Create an engine with a custom ladder and default policies.
    pub fn with_ladder(config: GameConfig, ladder: L) -> Result<Self> {
        Self::with_policies(config, ladder, PerRoundPolicy, BankerOfferPolicy::default())
    }
}

impl<L: PrizeLadder, R: RoundPolicy, O: OfferPolicy> Engine<L, R, O> {
    /// Create an engine with explicit collaborators.
    ///
    /// Validates the configuration eagerly: the case count must be supported
    /// and the ladder must supply exactly that many positive amounts.
    pub fn with_policies(
        config: GameConfig,
        ladder: L,
        round_policy: R,
        offer_policy: O,
    ) -> Result<Self> {
        config.validate()?;
        let amounts = ladder.amounts_for(config.case_count)?;
        check_ladder(&amounts, config.case_count)?;

        Ok(Self {
            rng: GameRng::new(config.seed),
            config,
            ladder,
            round_policy,
            offer_policy,
        })
    }

    /// The configuration this engine was built with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The prize ladder.
    #[must_use]
    pub fn ladder(&self) -> &L {
        &self.ladder
    }

    /// The round policy.
    #[must_use]
    pub fn round_policy(&self) -> &R {
        &self.round_policy
    }

    /// The offer policy.
    #[must_use]
    pub fn offer_policy(&self) -> &O {
        &self.offer_policy
    }

    // === Operations ===

    /// Deal the engine's game.
    ///
    /// Shuffles the ladder amounts into containers `1..=N` and enters
    /// `PICK_CASE`. The RNG serves exactly one game: once it has been drawn
    /// from, further calls fail with `IllegalState`. Build a new engine for
    /// the next game.
    pub fn start(&mut self) -> Result<GameState> {
        if self.rng.draws() > 0 {
            return Err(GameError::IllegalState(
                "engine has already dealt its game; create a new engine to play again".into(),
            ));
        }
        let mut amounts = self.ladder.amounts_for(self.config.case_count)?;
        check_ladder(&amounts, self.config.case_count)?;
        self.rng.shuffle(&mut amounts);

        info!(
            cases = self.config.case_count,
            seed = self.config.seed,
            "dealt new game"
        );
        checked(GameState::initial(amounts))
    }

    /// Claim the player's container.
    pub fn pick_player_case(&self, state: &GameState, id: ContainerId) -> Result<GameState> {
        require_phase(state, Phase::PickCase, "pick_player_case")?;
        require_valid_id(state, id)?;

        let next = state.with_player_container(id);
        debug!(%id, "player picked container");

        // With two containers no round can be played.
        if next.unopened_count() <= 2 {
            return checked(next.to_final_reveal());
        }
        checked(next)
    }

    /// Choose how many containers to open this round.
    pub fn choose_to_open(&self, state: &GameState, k: usize) -> Result<GameState> {
        require_phase(state, Phase::Round, "choose_to_open")?;
        if state.round_quota().is_some() {
            return Err(GameError::InvalidPhase {
                operation: "choose_to_open",
                expected: "ROUND before an open-count is chosen",
                actual: state.phase(),
            });
        }

        let available = state.unopened_excluding_player();
        if k > available || !self.round_policy.is_allowed(available, k) {
            return Err(GameError::InvalidArgument(format!(
                "cannot open {} containers with {} closed besides yours",
                k, available
            )));
        }

        debug!(k, available, round = state.round_index(), "round open-count chosen");
        checked(state.with_round_quota(k))
    }

    /// Open one container and reveal its amount.
    pub fn open_case(&self, state: &GameState, id: ContainerId) -> Result<GameState> {
        require_phase(state, Phase::Round, "open_case")?;
        if state.to_open_this_round() == 0 {
            return Err(GameError::InvalidPhase {
                operation: "open_case",
                expected: "ROUND with containers left to open",
                actual: state.phase(),
            });
        }
        require_valid_id(state, id)?;
        if state.player_container() == Some(id) {
            return Err(GameError::InvalidArgument(format!(
                "cannot open your own container {}",
                id
            )));
        }
        if state.is_opened(id) {
            return Err(GameError::InvalidArgument(format!(
                "container {} is already open",
                id
            )));
        }

        let next = state.with_opened(id);
        debug!(
            %id,
            amount = next.amount_of(id),
            left = next.to_open_this_round(),
            "opened container"
        );
        checked(next)
    }

    /// Ask the banker for an offer once this round's opens are done.
    pub fn compute_offer(&self, state: &GameState) -> Result<GameState> {
        require_phase(state, Phase::Round, "compute_offer")?;
        if state.round_quota().is_none() || state.to_open_this_round() > 0 {
            return Err(GameError::InvalidPhase {
                operation: "compute_offer",
                expected: "ROUND with every container for this round opened",
                actual: state.phase(),
            });
        }

        // The player's own container is still in play.
        let remaining = state.remaining_amounts();
        let ctx = OfferContext::new(
            state.case_count(),
            &remaining,
            state.opened_ids().len(),
            state.current_offer(),
        )?;
        let offer = self.offer_policy.offer(&ctx)?;

        debug!(offer, remaining = remaining.len(), "banker offer");
        checked(state.with_offer(offer))
    }

    /// Take the banker's offer.
    pub fn accept_deal(&self, state: &GameState) -> Result<GameState> {
        require_phase(state, Phase::Offer, "accept_deal")?;
        let offer = state
            .current_offer()
            .ok_or_else(|| GameError::IllegalState("offer phase without an offer".into()))?;

        info!(result = offer, "deal accepted");
        checked(state.with_result(offer))
    }

    /// Refuse the banker's offer and continue.
    pub fn decline_deal(&self, state: &GameState) -> Result<GameState> {
        require_phase(state, Phase::Offer, "decline_deal")?;
        debug!(round = state.round_index(), "no deal");
        checked(continue_game(state))
    }

    /// Propose a counteroffer.
    ///
    /// Only positivity is checked here; feasibility is the banker's call in
    /// [`Engine::resolve_counter`].
    pub fn propose_counter(&self, state: &GameState, amount: i64) -> Result<GameState> {
        require_phase(state, Phase::Offer, "propose_counter")?;
        if amount <= 0 {
            return Err(GameError::InvalidArgument(format!(
                "counteroffer must be positive, got {}",
                amount
            )));
        }

        debug!(amount, "counteroffer proposed");
        checked(state.with_counter_offer(amount))
    }

    /// Let the banker accept or reject the counteroffer.
    ///
    /// Accepted outright at or below the current offer. Otherwise accepted
    /// iff it does not exceed the largest amount in play nor
    /// [`counter_threshold`] of the EV. A rejection continues the game like
    /// [`Engine::decline_deal`].
    pub fn resolve_counter(&self, state: &GameState) -> Result<GameState> {
        require_phase(state, Phase::CounterOffer, "resolve_counter")?;
        let counter = state
            .counter_offer()
            .ok_or_else(|| GameError::IllegalState("counteroffer phase without a counter".into()))?;

        if state.current_offer().is_some_and(|offer| counter <= offer) {
            info!(result = counter, "counteroffer at or below offer accepted");
            return checked(state.with_result(counter));
        }

        let ev = state
            .expected_value()
            .ok_or_else(|| GameError::IllegalState("no containers in play".into()))?;
        let max_remaining = state.max_remaining().unwrap_or(0);
        let threshold = counter_threshold(ev, state.round_index());

        if counter <= max_remaining && counter <= threshold {
            info!(result = counter, threshold, "counteroffer accepted");
            return checked(state.with_result(counter));
        }

        debug!(counter, threshold, max_remaining, "counteroffer rejected");
        checked(continue_game(state))
    }

    /// Final decision between the player's container and the last other one.
    pub fn reveal_final(&self, state: &GameState, swap: bool) -> Result<GameState> {
        require_phase(state, Phase::FinalReveal, "reveal_final")?;
        let player = state
            .player_container()
            .ok_or_else(|| GameError::IllegalState("final reveal without a player container".into()))?;

        let unopened = state.remaining_ids();
        if unopened.len() != 2 || !unopened.contains(&player) {
            return Err(GameError::IllegalState(format!(
                "final reveal requires the player's and exactly one other container, found {:?}",
                unopened.as_slice()
            )));
        }
        let other = unopened
            .iter()
            .copied()
            .find(|&id| id != player)
            .ok_or_else(|| GameError::IllegalState("no other container left".into()))?;

        let chosen = if swap { other } else { player };
        let amount = state
            .amount_of(chosen)
            .ok_or_else(|| GameError::IllegalState(format!("container {} missing", chosen)))?;

        info!(%chosen, swap, result = amount, "final reveal");
        checked(state.with_result(amount))
    }

    /// Apply one action.
    pub fn apply(&self, state: &GameState, action: &Action) -> Result<GameState> {
        match *action {
            Action::PickCase(id) => self.pick_player_case(state, id),
            Action::ChooseToOpen(k) => self.choose_to_open(state, k),
            Action::OpenCase(id) => self.open_case(state, id),
            Action::ComputeOffer => self.compute_offer(state),
            Action::AcceptDeal => self.accept_deal(state),
            Action::DeclineDeal => self.decline_deal(state),
            Action::ProposeCounter(amount) => self.propose_counter(state, amount),
            Action::ResolveCounter => self.resolve_counter(state),
            Action::RevealFinal { swap } => self.reveal_final(state, swap),
        }
    }

    /// Deal the engine's game and apply `actions` in order.
    pub fn replay<'a>(
        &mut self,
        actions: impl IntoIterator<Item = &'a Action>,
    ) -> Result<GameState> {
        let mut state = self.start()?;
        for action in actions {
            state = self.apply(&state, action)?;
        }
        Ok(state)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn require_phase(state: &GameState, expected: Phase, operation: &'static str) -> Result<()> {
    if state.phase() != expected {
        return Err(GameError::InvalidPhase {
            operation,
            expected: expected.name(),
            actual: state.phase(),
        });
    }
    Ok(())
}

fn require_valid_id(state: &GameState, id: ContainerId) -> Result<()> {
    if !id.is_valid(state.case_count()) {
        return Err(GameError::InvalidArgument(format!(
            "container id {} out of range 1..={}",
            id.raw(),
            state.case_count()
        )));
    }
    Ok(())
}

fn check_ladder(amounts: &[i64], case_count: usize) -> Result<()> {
    if amounts.len() != case_count {
        return Err(GameError::Configuration(format!(
            "ladder supplied {} amounts for {} containers",
            amounts.len(),
            case_count
        )));
    }
    if let Some(bad) = amounts.iter().find(|&&a| a <= 0) {
        return Err(GameError::Configuration(format!(
            "ladder amounts must be positive, got {}",
            bad
        )));
    }
    if amounts.iter().try_fold(0i64, |acc, &a| acc.checked_add(a)).is_none() {
        return Err(GameError::Configuration(
            "ladder total does not fit in a 64-bit amount".into(),
        ));
    }
    Ok(())
}

/// After a refused offer: final reveal at two containers, else next round.
fn continue_game(state: &GameState) -> GameState {
    if state.unopened_count() <= 2 {
        state.to_final_reveal()
    } else {
        state.next_round()
    }
}

fn checked(state: GameState) -> Result<GameState> {
    if cfg!(debug_assertions) {
        state.check_invariants()?;
    }
    Ok(state)
}
