//! Core game types: containers, state, actions, RNG, configuration.
//!
//! This module contains the building blocks the engine and its drivers share.
//! Prize amounts and pricing rules live in `crate::policy`, not here.

pub mod container;
pub mod rng;
pub mod config;
pub mod action;
pub mod state;

pub use container::{Container, ContainerId};
pub use rng::GameRng;
pub use config::{GameConfig, DEFAULT_CASES, DEFAULT_SEED, MAX_CASES, MIN_CASES};
pub use action::Action;
pub use state::{AmountBuf, GameState, IdBuf, Phase};
