//! Error types for engine operations.
//!
//! Every engine operation validates its input eagerly and reports failure as a
//! `GameError`. A failed call never produces a new state, so the caller's
//! current `GameState` stays valid for a retry.

use thiserror::Error;

use crate::core::Phase;

/// Errors that can occur while configuring or playing a game.
#[derive(Debug, Error)]
pub enum GameError {
    /// Invalid case count, ladder size mismatch, or unsupported setup.
    ///
    /// Raised at construction time; fatal to starting a game.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Operation invoked while the state machine is not in the required phase.
    ///
    /// Always a caller bug. Re-derive a valid action from the current phase.
    #[error("{operation} requires {expected}, but the game is in {actual}")]
    InvalidPhase {
        operation: &'static str,
        expected: &'static str,
        actual: Phase,
    },

    /// Out-of-range container id, non-positive counter, disallowed open-count.
    ///
    /// Interactive drivers should re-prompt.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An invariant was violated where it should be structurally impossible.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// Transcript output failed.
    #[error("transcript i/o: {0}")]
    Io(#[from] std::io::Error),

    /// Transcript serialization failed.
    #[error("transcript serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GameError {
    /// Whether an interactive driver can recover by asking for new input.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, GameError::InvalidArgument(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GameError>;
