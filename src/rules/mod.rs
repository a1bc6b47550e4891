//! The game engine.
//!
//! `Engine` owns the configuration, the collaborating policies and the
//! seeded RNG. It validates and applies operations:
//! - Phase preconditions for each operation
//! - Argument checks (container ids, open-counts, counteroffers)
//! - Banker offers and counteroffer decisions
//!
//! States are values; the engine only reads the state it is given.

pub mod engine;

pub use engine::{counter_threshold, Engine};
