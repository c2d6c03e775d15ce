//! Resolver configuration.

use kv_core::LensWeights;
use kv_mechanics::CriticalThresholds;
use serde::{Deserialize, Serialize};

use crate::error::NarrativeResult;

/// Configuration for a [`crate::NarrativeResolver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Seed for rolls, partial-success costs and distortion.
    pub seed: u64,
    /// Whether near misses become partial successes.
    pub allow_partial: bool,
    /// Natural sum at or above which a roll is a critical success.
    pub critical_success_at: i32,
    /// Natural sum at or below which a roll is a critical failure.
    pub critical_failure_at: i32,
    /// Distortion intensity at or below which text is left untouched.
    pub distortion_floor: f64,
    /// Weights for dominant lens scoring.
    pub lens_weights: LensWeights,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            allow_partial: true,
            critical_success_at: 12,
            critical_failure_at: 2,
            distortion_floor: 0.05,
            lens_weights: LensWeights::default(),
        }
    }
}

impl ResolverConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> NarrativeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable partial successes.
    pub fn with_partial(mut self, allow: bool) -> Self {
        self.allow_partial = allow;
        self
    }

    /// Set the critical thresholds.
    pub fn with_critical(mut self, success_at: i32, failure_at: i32) -> Self {
        self.critical_success_at = success_at;
        self.critical_failure_at = failure_at;
        self
    }

    /// Set the distortion floor.
    pub fn with_distortion_floor(mut self, floor: f64) -> Self {
        self.distortion_floor = floor;
        self
    }

    /// Set the lens weights.
    pub fn with_lens_weights(mut self, weights: LensWeights) -> Self {
        self.lens_weights = weights;
        self
    }

    /// The critical thresholds as the dice engine expects them.
    pub fn thresholds(&self) -> CriticalThresholds {
        CriticalThresholds {
            success_at: self.critical_success_at,
            failure_at: self.critical_failure_at,
        }
    }
}
