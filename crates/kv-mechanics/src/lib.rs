//! Check mechanics for the Kaltvik narrative engine.
//!
//! Provides the 2d6 [`DiceEngine`] (forced or injected-random rolls,
//! outcome classification, difficulty bands, partial-success costs) and the
//! [`CheckRegistry`] that enforces one-shot red checks and skill-gated white
//! check retries across a playthrough.

pub mod dice;
pub mod error;
pub mod registry;

pub use dice::{
    Cost, CriticalThresholds, DiceEngine, Difficulty, FixedSource, RandomSource, RollOptions,
    RollOutcome, SeededSource, Tier,
};
pub use error::{MechError, MechResult};
pub use registry::{AttemptResult, BlockReason, CheckKind, CheckRecord, CheckRegistry};
