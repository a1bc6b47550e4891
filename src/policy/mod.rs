//! Configuration-supplied collaborators of the engine.
//!
//! Policies are trait-based so drivers can swap them:
//! - `PrizeLadder`: Which amounts are dealt (standard, fixed)
//! - `RoundPolicy`: How many containers may be opened per round
//! - `OfferPolicy`: How the banker prices a buy-out
//!
//! The engine receives each one as a typed parameter at construction.

pub mod ladder;
pub mod round;
pub mod offer;

pub use ladder::{FixedLadder, PrizeLadder, StandardLadder, LADDER_10, LADDER_25};
pub use round::{PerRoundPolicy, RoundPolicy};
pub use offer::{human_round, BankerOfferPolicy, OfferContext, OfferPolicy};
