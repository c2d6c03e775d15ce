//! 2d6 rolling and check resolution.
//!
//! The [`DiceEngine`] rolls two six-sided dice (or takes a forced natural
//! sum), adds a modifier and classifies the total against a difficulty. It
//! has no knowledge of check ids or locking; that lives in
//! [`crate::registry`]. Randomness is always injected through a
//! [`RandomSource`].

pub mod cost;
pub mod difficulty;
pub mod roll;

pub use cost::Cost;
pub use difficulty::Difficulty;
pub use roll::{CriticalThresholds, RollOutcome, Tier};

use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHasher;

/// A source of uniform random numbers in `[0, 1)`.
pub trait RandomSource {
    /// The next value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Roll one die with the given number of sides.
    fn roll_die(&mut self, sides: u32) -> i32 {
        let unit = self.next_f64().clamp(0.0, 1.0 - f64::EPSILON);
        (unit * f64::from(sides)).floor() as i32 + 1
    }
}

/// A seeded pseudo-random source for reproducible play.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    /// Create a source from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededSource {
    fn next_f64(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// A replay source that cycles through recorded values.
#[derive(Debug, Clone, Default)]
pub struct FixedSource {
    values: Vec<f64>,
    position: usize,
}

impl FixedSource {
    /// Create a source that yields `values` in order, then starts over.
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            position: 0,
        }
    }

    /// A source whose consecutive pairs roll exactly `faces` on a d6.
    pub fn from_faces(faces: &[i32]) -> Self {
        let values = faces
            .iter()
            .map(|&f| (f64::from(f.clamp(1, 6)) - 0.5) / 6.0)
            .collect();
        Self::new(values)
    }
}

impl RandomSource for FixedSource {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}

/// Stable 64-bit hash of a key, used to derive per-check and per-text seeds.
pub fn stable_hash(key: &str) -> u64 {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Options for a single roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollOptions {
    /// Whether a near miss becomes a partial success.
    pub allow_partial: bool,
    /// Natural sum to use instead of rolling (clamped to 2-12).
    pub forced_roll: Option<i32>,
}

impl Default for RollOptions {
    fn default() -> Self {
        Self {
            allow_partial: true,
            forced_roll: None,
        }
    }
}

impl RollOptions {
    /// Force the natural sum.
    pub fn forced(mut self, natural: i32) -> Self {
        self.forced_roll = Some(natural);
        self
    }

    /// Enable or disable partial successes.
    pub fn with_partial(mut self, allow: bool) -> Self {
        self.allow_partial = allow;
        self
    }
}

/// Resolves 2d6 checks against a difficulty.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiceEngine {
    thresholds: CriticalThresholds,
}

impl DiceEngine {
    /// Create an engine with custom critical thresholds.
    pub fn new(thresholds: CriticalThresholds) -> Self {
        Self { thresholds }
    }

    /// The critical thresholds in use.
    pub fn thresholds(&self) -> CriticalThresholds {
        self.thresholds
    }

    /// Split a forced natural sum into two valid faces.
    pub fn decompose(natural: i32) -> [i32; 2] {
        let natural = natural.clamp(2, 12);
        let low = natural / 2;
        [low, natural - low]
    }

    /// Roll (or force) 2d6, apply the modifier and classify the result.
    ///
    /// The source is not consumed when a roll is forced.
    pub fn resolve(
        &self,
        source: &mut dyn RandomSource,
        modifier: i32,
        difficulty: i32,
        options: &RollOptions,
    ) -> RollOutcome {
        let (faces, forced) = match options.forced_roll {
            Some(natural) => (Self::decompose(natural), true),
            None => ([source.roll_die(6), source.roll_die(6)], false),
        };

        let natural = faces[0] + faces[1];
        let total = natural.saturating_add(modifier);
        let margin = total.saturating_sub(difficulty);
        let tier = Tier::classify(natural, margin, options.allow_partial, self.thresholds);

        tracing::debug!(
            natural,
            modifier,
            total,
            difficulty,
            margin,
            forced,
            tier = %tier,
            "resolved 2d6 roll"
        );

        RollOutcome {
            faces,
            natural,
            modifier,
            total,
            difficulty,
            margin,
            tier,
            doubles: faces[0] == faces[1],
            forced,
            costs: Vec::new(),
        }
    }
}
