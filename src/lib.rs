//! # deal-engine
//!
//! A deterministic Deal or No Deal game engine with banker offer pricing.
//!
//! ## Design Principles
//!
//! 1. **States Are Values**: Every operation takes a `GameState` by reference
//!    and returns a new one. A failed operation leaves the caller's state
//!    untouched, so interactive drivers can simply re-prompt.
//!
//! 2. **Deterministic**: The shuffle comes from a seeded ChaCha RNG owned by
//!    the engine. The same case count and seed always deal the same game.
//!
//! 3. **Configuration Over Convention**: Prize ladders, round rules and the
//!    banker's pricing are typed collaborators injected at construction.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) state cloning via `im-rs`.
//!
//! - **Phase State Machine**: `PICK_CASE → ROUND → OFFER → (COUNTER_OFFER)
//!   → { ROUND | FINAL_REVEAL } → RESULT`, validated on every call.
//!
//! ## Modules
//!
//! - `core`: Container ids, state, actions, RNG, configuration
//! - `policy`: Prize ladders, round policies, banker offers
//! - `rules`: The engine
//! - `transcript`: JSON and CSV game records
//! - `session`: Line-oriented interactive play
//!
//! ## Example
//!
//! ```
//! use deal_engine::core::{ContainerId, Phase};
//! use deal_engine::rules::Engine;
//!
//! let mut engine = Engine::new(10, 42)?;
//! let state = engine.start()?;
//! let state = engine.pick_player_case(&state, ContainerId::new(3))?;
//! let state = engine.choose_to_open(&state, 1)?;
//! let state = engine.open_case(&state, ContainerId::new(1))?;
//! let state = engine.compute_offer(&state)?;
//! assert_eq!(state.phase(), Phase::Offer);
//!
//! let done = engine.accept_deal(&state)?;
//! assert_eq!(done.result(), state.current_offer());
//! # Ok::<(), deal_engine::GameError>(())
//! ```

pub mod core;
pub mod error;
pub mod policy;
pub mod rules;
pub mod session;
pub mod transcript;

// Re-export commonly used types
pub use crate::core::{
    Action, Container, ContainerId, GameConfig, GameRng, GameState, Phase,
};

pub use crate::error::{GameError, Result};

pub use crate::policy::{
    BankerOfferPolicy, FixedLadder, OfferContext, OfferPolicy, PerRoundPolicy, PrizeLadder,
    RoundPolicy, StandardLadder,
};

pub use crate::rules::Engine;

pub use crate::transcript::{
    CsvTranscriptWriter, JsonTranscriptWriter, Recorder, Step, StepKind, TranscriptHeader,
    TranscriptWriter,
};
