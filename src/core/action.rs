//! Action representation: one variant per engine operation.
//!
//! Actions let a driver describe a whole game as data: a list of actions can
//! be replayed against a fresh engine with the same seed to reproduce the
//! game exactly.
//!
//! ## Example
//!
//! ```
//! use deal_engine::core::{Action, ContainerId};
//!
//! let script = [
//!     Action::PickCase(ContainerId::new(1)),
//!     Action::ChooseToOpen(2),
//!     Action::OpenCase(ContainerId::new(2)),
//!     Action::OpenCase(ContainerId::new(3)),
//!     Action::ComputeOffer,
//!     Action::AcceptDeal,
//! ];
//! assert_eq!(script[2].to_string(), "open #2");
//! ```

use serde::{Deserialize, Serialize};

use super::container::ContainerId;

/// A single player or banker action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Action {
    /// Claim a container as the player's own.
    PickCase(ContainerId),
    /// Choose how many containers to open this round.
    ChooseToOpen(usize),
    /// Open one container.
    OpenCase(ContainerId),
    /// Ask the banker for an offer.
    ComputeOffer,
    /// Take the banker's offer.
    AcceptDeal,
    /// Refuse the banker's offer.
    DeclineDeal,
    /// Propose a counteroffer.
    ProposeCounter(i64),
    /// Let the banker decide on the counteroffer.
    ResolveCounter,
    /// Final decision: keep the player's container or swap it.
    RevealFinal {
        /// Take the other container instead of the player's.
        swap: bool,
    },
}

impl Action {
    /// Name of the engine operation this action invokes.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Action::PickCase(_) => "pick_player_case",
            Action::ChooseToOpen(_) => "choose_to_open",
            Action::OpenCase(_) => "open_case",
            Action::ComputeOffer => "compute_offer",
            Action::AcceptDeal => "accept_deal",
            Action::DeclineDeal => "decline_deal",
            Action::ProposeCounter(_) => "propose_counter",
            Action::ResolveCounter => "resolve_counter",
            Action::RevealFinal { .. } => "reveal_final",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::PickCase(id) => write!(f, "pick {}", id),
            Action::ChooseToOpen(k) => write!(f, "open {} this round", k),
            Action::OpenCase(id) => write!(f, "open {}", id),
            Action::ComputeOffer => f.write_str("banker offer"),
            Action::AcceptDeal => f.write_str("deal"),
            Action::DeclineDeal => f.write_str("no deal"),
            Action::ProposeCounter(amount) => write!(f, "counter {}", amount),
            Action::ResolveCounter => f.write_str("banker decides"),
            Action::RevealFinal { swap: true } => f.write_str("swap"),
            Action::RevealFinal { swap: false } => f.write_str("keep"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_equality() {
        let a1 = Action::OpenCase(ContainerId::new(5));
        let a2 = Action::OpenCase(ContainerId::new(5));
        let a3 = Action::OpenCase(ContainerId::new(6));
        let a4 = Action::PickCase(ContainerId::new(5));

        assert_eq!(a1, a2);
        assert_ne!(a1, a3);
        assert_ne!(a1, a4);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::PickCase(ContainerId::new(3)).to_string(), "pick #3");
        assert_eq!(Action::ChooseToOpen(2).to_string(), "open 2 this round");
        assert_eq!(Action::ProposeCounter(7_500).to_string(), "counter 7500");
        assert_eq!(Action::RevealFinal { swap: true }.to_string(), "swap");
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(Action::ComputeOffer.operation(), "compute_offer");
        assert_eq!(Action::RevealFinal { swap: false }.operation(), "reveal_final");
    }

    #[test]
    fn test_action_serialization() {
        let actions = [
            Action::PickCase(ContainerId::new(1)),
            Action::ChooseToOpen(3),
            Action::ProposeCounter(1_000),
            Action::DeclineDeal,
            Action::RevealFinal { swap: true },
        ];

        for action in actions {
            let json = serde_json::to_string(&action).unwrap();
            let deserialized: Action = serde_json::from_str(&json).unwrap();
            assert_eq!(action, deserialized);
        }

        let json = serde_json::to_string(&Action::OpenCase(ContainerId::new(4))).unwrap();
        assert_eq!(json, r#"{"type":"open_case","value":4}"#);
    }
}
