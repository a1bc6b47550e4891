//! Banker offer pricing.
//!
//! The banker offers a fraction of the expected value (EV) of the amounts
//! still in play. The fraction grows as the board empties, and high variance
//! is penalized early in the game:
//!
//! ```text
//! progress = clamp(1 - remaining / initial, 0, 1)
//! risk     = stddev / max(1, EV)
//! ratio    = clamp(lerp(start, end, progress) - w * clamp(risk, 0, 2) * (1 - progress),
//!                  min_ratio, max_ratio)
//! offer    = human_round(clamp(EV * ratio, min + pad, max - pad))
//! ```
//!
//! The result is always within `[min(remaining), max(remaining)]`.

use serde::{Deserialize, Serialize};

use crate::core::{MAX_CASES, MIN_CASES};
use crate::error::{GameError, Result};

/// Input to an offer computation.
#[derive(Clone, Copy, Debug)]
pub struct OfferContext<'a> {
    initial_case_count: usize,
    remaining_amounts: &'a [i64],
    opened_so_far: usize,
    last_offer: Option<i64>,
}

impl<'a> OfferContext<'a> {
    /// Validate and build an offer context.
    ///
    /// Fails if `remaining_amounts` is empty or `initial_case_count` is
    /// outside the supported range.
    pub fn new(
        initial_case_count: usize,
        remaining_amounts: &'a [i64],
        opened_so_far: usize,
        last_offer: Option<i64>,
    ) -> Result<Self> {
        if !(MIN_CASES..=MAX_CASES).contains(&initial_case_count) {
            return Err(GameError::InvalidArgument(format!(
                "initial case count must be in [{}, {}], got {}",
                MIN_CASES, MAX_CASES, initial_case_count
            )));
        }
        if remaining_amounts.is_empty() {
            return Err(GameError::InvalidArgument(
                "remaining amounts must be non-empty".into(),
            ));
        }
        Ok(Self {
            initial_case_count,
            remaining_amounts,
            opened_so_far,
            last_offer,
        })
    }

    /// Containers at game start.
    #[must_use]
    pub fn initial_case_count(&self) -> usize {
        self.initial_case_count
    }

    /// Amounts still in play (unordered).
    #[must_use]
    pub fn remaining_amounts(&self) -> &'a [i64] {
        self.remaining_amounts
    }

    /// Containers opened so far.
    #[must_use]
    pub fn opened_so_far(&self) -> usize {
        self.opened_so_far
    }

    /// The most recent banker offer, if any.
    #[must_use]
    pub fn last_offer(&self) -> Option<i64> {
        self.last_offer
    }
}

/// Computes the banker's buy-out offer.
pub trait OfferPolicy {
    /// Offer in whole currency units.
    fn offer(&self, ctx: &OfferContext<'_>) -> Result<i64>;
}

impl<O: OfferPolicy + ?Sized> OfferPolicy for &O {
    fn offer(&self, ctx: &OfferContext<'_>) -> Result<i64> {
        (**self).offer(ctx)
    }
}

/// The TV-style banker curve.
///
/// Conservative early, converging toward EV late, with show-banker rounding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BankerOfferPolicy {
    /// Ratio to EV at game start.
    pub start_ratio: f64,
    /// Ratio to EV as the board empties.
    pub end_ratio: f64,
    /// Floor on the final ratio.
    pub min_ratio: f64,
    /// Hard ceiling on the final ratio.
    pub max_ratio: f64,
    /// Never offer below `min + min_pad_frac * (max - min)`.
    pub min_pad_frac: f64,
    /// Never offer above `max - max_pad_frac * (max - min)`.
    pub max_pad_frac: f64,
    /// Weight of the early-game variance penalty.
    pub risk_weight: f64,
    /// Round to coarse, hand-picked looking steps.
    pub human_rounding: bool,
}

impl Default for BankerOfferPolicy {
    fn default() -> Self {
        Self {
            start_ratio: 0.55,
            end_ratio: 0.93,
            min_ratio: 0.46,
            max_ratio: 0.97,
            min_pad_frac: 0.05,
            max_pad_frac: 0.02,
            risk_weight: 0.15,
            human_rounding: true,
        }
    }
}

impl BankerOfferPolicy {
    /// Ratio of offer to EV before padding and rounding.
    #[must_use]
    pub fn ratio(&self, progress: f64, risk: f64) -> f64 {
        let penalty = self.risk_weight * clamp(risk, 0.0, 2.0) * (1.0 - progress);
        clamp(
            lerp(self.start_ratio, self.end_ratio, progress) - penalty,
            self.min_ratio,
            self.max_ratio,
        )
    }
}

impl OfferPolicy for BankerOfferPolicy {
    fn offer(&self, ctx: &OfferContext<'_>) -> Result<i64> {
        let amounts = ctx.remaining_amounts();
        let n = amounts.len();

        let (min, max) = amounts
            .iter()
            .fold((i64::MAX, i64::MIN), |(lo, hi), &a| (lo.min(a), hi.max(a)));
        let ev = mean(amounts);

        // Degenerate: nothing to price.
        if ev <= 0.0 || min == max {
            return Ok(max);
        }

        let progress = clamp(1.0 - n as f64 / ctx.initial_case_count() as f64, 0.0, 1.0);
        let risk = stddev(amounts, ev) / ev.max(1.0);
        let ratio = self.ratio(progress, risk);

        let range = (max - min) as f64;
        let floor = min as f64 + range * self.min_pad_frac;
        let ceiling = max as f64 - range * self.max_pad_frac;
        let mut offer = clamp(ev * ratio, floor, ceiling).round() as i64;

        if self.human_rounding {
            offer = human_round(offer);
        }

        Ok(offer.clamp(min, max))
    }
}

/// Round like a show banker: big numbers in coarse steps.
#[must_use]
pub fn human_round(amount: i64) -> i64 {
    let quantum = match amount {
        a if a >= 100_000 => 5_000,
        a if a >= 50_000 => 2_500,
        a if a >= 10_000 => 1_000,
        a if a >= 5_000 => 500,
        a if a >= 1_000 => 250,
        a if a >= 500 => 50,
        a if a >= 100 => 10,
        _ => return amount,
    };
    // Saturates near i64::MAX, rounding down to the last representable step.
    (amount.saturating_add(quantum / 2) / quantum) * quantum
}

// Summed wide so large ladders cannot overflow.
fn mean(xs: &[i64]) -> f64 {
    let sum: i128 = xs.iter().map(|&x| i128::from(x)).sum();
    sum as f64 / xs.len() as f64
}

/// Population standard deviation.
fn stddev(xs: &[i64], mean: f64) -> f64 {
    let acc: f64 = xs
        .iter()
        .map(|&x| {
            let d = x as f64 - mean;
            d * d
        })
        .sum();
    (acc / xs.len() as f64).sqrt()
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

// Unlike f64::clamp, never panics on inverted bounds from odd tunables.
fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(x))
}
