//! Narrative resolution for the Kaltvik engine.
//!
//! Gates content behind [`ConditionNode`]s, resolves checks through the
//! mechanics crate and composes layered text with the [`TextComposer`]. The
//! [`NarrativeResolver`] ties the three together for scenes, dialogue
//! choices and theories. Everything here reads player state through
//! [`kv_core::StateView`] and never writes it back.

/// Choice lists as the UI sees them.
pub mod choice;
/// Layered text composition and the composition trail.
pub mod composer;
/// Condition trees and predicates.
pub mod condition;
/// Resolver configuration.
pub mod config;
/// Stress-driven text distortion.
pub mod distortion;
/// Error types used throughout the crate.
pub mod error;
/// The gate, check and render orchestrator.
pub mod resolver;
/// Scenes, choices and theories with their checks and outcome texts.
pub mod target;
/// Authored text specs, lens variants and inserts.
pub mod text;

pub use choice::ChoiceView;
pub use composer::{ComposedText, CompositionTrail, TextComposer};
pub use condition::{ConditionNode, Predicate};
pub use config::ResolverConfig;
pub use error::{NarrativeError, NarrativeResult};
pub use resolver::{NarrativeResolver, Phase, Resolution, Resolved};
pub use target::{Branch, Branches, CheckDescriptor, Target, TargetKind, Transition};
pub use text::{Anchor, LensVariants, TextInsert, TextSpec};
