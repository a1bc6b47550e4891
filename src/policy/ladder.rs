//! Prize ladders: the monetary amounts dealt into containers.
//!
//! The ladder is configuration, not engine logic. The engine only requires
//! that a ladder returns exactly `case_count` positive amounts; order does not
//! matter because the engine shuffles them.

use crate::core::{MAX_CASES, MIN_CASES};
use crate::error::{GameError, Result};

/// Supplies the prize amounts for a game of a given size.
pub trait PrizeLadder {
    /// Amounts for `case_count` containers, ascending by convention.
    fn amounts_for(&self, case_count: usize) -> Result<Vec<i64>>;
}

/// Canonical 10-container ladder.
pub const LADDER_10: [i64; 10] = [1, 10, 50, 100, 500, 1_000, 5_000, 10_000, 25_000, 50_000];

/// Canonical 25-container ladder.
pub const LADDER_25: [i64; 25] = [
    1, 5, 10, 25, 50, 75, 100, 200, 300, 400, 500, 750, 1_000, 5_000, 10_000, 25_000, 50_000,
    75_000, 100_000, 200_000, 300_000, 400_000, 500_000, 750_000, 1_000_000,
];

/// The standard ladders.
///
/// 10 and 25 containers use their canonical ladders. Every other supported
/// count takes the lowest `case_count` values of the 25-container ladder.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardLadder;

impl PrizeLadder for StandardLadder {
    fn amounts_for(&self, case_count: usize) -> Result<Vec<i64>> {
        match case_count {
            10 => Ok(LADDER_10.to_vec()),
            n if (MIN_CASES..=MAX_CASES).contains(&n) => Ok(LADDER_25[..n].to_vec()),
            n => Err(GameError::Configuration(format!(
                "unsupported case count: {}",
                n
            ))),
        }
    }
}

/// A ladder supplied as configuration.
///
/// Holds any number of positive amounts; a game of `N` containers uses the
/// lowest `N` of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedLadder {
    amounts: Vec<i64>,
}

impl FixedLadder {
    /// Create a ladder from amounts in any order.
    pub fn new(amounts: impl Into<Vec<i64>>) -> Result<Self> {
        let mut amounts = amounts.into();
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
        amounts.sort_unstable();
        Ok(Self { amounts })
    }

    /// All amounts, ascending.
    #[must_use]
    pub fn amounts(&self) -> &[i64] {
        &self.amounts
    }
}

impl PrizeLadder for FixedLadder {
    fn amounts_for(&self, case_count: usize) -> Result<Vec<i64>> {
        if case_count > self.amounts.len() {
            return Err(GameError::Configuration(format!(
                "ladder has {} amounts, {} containers requested",
                self.amounts.len(),
                case_count
            )));
        }
        Ok(self.amounts[..case_count].to_vec())
    }
}

impl<L: PrizeLadder + ?Sized> PrizeLadder for &L {
    fn amounts_for(&self, case_count: usize) -> Result<Vec<i64>> {
        (**self).amounts_for(case_count)
    }
}
