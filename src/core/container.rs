//! Container identification and records.
//!
//! Every container (briefcase) in a game has a unique `ContainerId`.
//!
//! ## ID Layout
//!
//! IDs are 1-based and dense: a game with `case_count` containers uses ids
//! `1..=case_count`. The id set is fixed at game start and never changes.
//!
//! ```
//! use deal_engine::core::ContainerId;
//!
//! let case_count = 5;
//!
//! assert!(ContainerId::new(1).is_valid(case_count));
//! assert!(ContainerId::new(5).is_valid(case_count));
//! assert!(!ContainerId::new(0).is_valid(case_count));
//! assert!(!ContainerId::new(6).is_valid(case_count));
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a container within one game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub u32);

impl ContainerId {
    /// Create a container ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Zero-based slot of this container in the game's container sequence.
    ///
    /// Only meaningful for ids that pass `is_valid`.
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0 as usize).wrapping_sub(1)
    }

    /// Check if this id names a container in a game of `case_count`.
    #[must_use]
    pub const fn is_valid(self, case_count: usize) -> bool {
        self.0 >= 1 && (self.0 as usize) <= case_count
    }

    /// Iterate over all container ids for a game.
    pub fn all(case_count: usize) -> impl Iterator<Item = ContainerId> {
        (1..=case_count as u32).map(ContainerId)
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for ContainerId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A container holding one hidden monetary amount.
///
/// `opened` flips from false to true exactly once and never reverts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Stable id for the life of the game.
    pub id: ContainerId,
    /// Amount in whole currency units.
    pub amount: i64,
    /// Whether the amount has been revealed.
    pub opened: bool,
}

impl Container {
    /// Create an unopened container.
    #[must_use]
    pub const fn new(id: ContainerId, amount: i64) -> Self {
        Self {
            id,
            amount,
            opened: false,
        }
    }

    #[must_use]
    pub(crate) const fn into_opened(self) -> Self {
        Self {
            opened: true,
            ..self
        }
    }
}
