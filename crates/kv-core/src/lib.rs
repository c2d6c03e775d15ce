//! Core state types for the Kaltvik narrative engine.
//!
//! This crate defines the read-only view of player state that every
//! resolution stage consumes, plus the interpretive [`Lens`] used to pick
//! text variants. It owns no game logic; the game-state module builds a
//! [`Snapshot`] (or implements [`StateView`] itself) and hands it to the
//! mechanics and narrative crates.

/// Interpretive worldviews and dominant-lens scoring.
pub mod lens;
/// The read-only state view and its concrete snapshot implementation.
pub mod state;

/// Re-export lens types.
pub use lens::{Lens, LensWeights};
/// Re-export state types.
pub use state::{Snapshot, StateView};
