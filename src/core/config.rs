//! Game configuration.
//!
//! Drivers configure a game at startup by providing:
//! - the number of containers (`case_count`)
//! - the seed for the shuffle
//!
//! Prize amounts and policies are supplied separately as typed collaborators
//! (see `crate::policy`); the engine never hardcodes them.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Smallest supported game.
pub const MIN_CASES: usize = 2;

/// Largest supported game.
pub const MAX_CASES: usize = 25;

/// Default number of containers.
pub const DEFAULT_CASES: usize = 10;

/// Default shuffle seed.
pub const DEFAULT_SEED: u64 = 42;

/// Complete game configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of containers (2-25).
    pub case_count: usize,

    /// Seed for the deterministic shuffle.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            case_count: DEFAULT_CASES,
            seed: DEFAULT_SEED,
        }
    }
}

impl GameConfig {
    /// Create a configuration for `case_count` containers with the default seed.
    #[must_use]
    pub fn new(case_count: usize) -> Self {
        Self {
            case_count,
            ..Self::default()
        }
    }

    /// Set the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check that the case count is supported.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_CASES..=MAX_CASES).contains(&self.case_count) {
            return Err(GameError::Configuration(format!(
                "case count must be in [{}, {}], got {}",
                MIN_CASES, MAX_CASES, self.case_count
            )));
        }
        Ok(())
    }
}
