//! Roll outcomes and their classification.

use serde::{Deserialize, Serialize};

use super::cost::Cost;

/// Natural-roll thresholds that override margin-based classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalThresholds {
    /// A natural sum at or above this is a critical success (default 12).
    pub success_at: i32,
    /// A natural sum at or below this is a critical failure (default 2).
    pub failure_at: i32,
}

impl Default for CriticalThresholds {
    fn default() -> Self {
        Self {
            success_at: 12,
            failure_at: 2,
        }
    }
}

/// The classification tier of a resolved check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Natural critical roll; succeeds regardless of margin.
    CriticalSuccess,
    /// Total met or beat the difficulty.
    Success,
    /// Missed by one or two; the goal is achieved at a cost.
    PartialSuccess,
    /// A plain miss.
    Failure,
    /// Natural fumble; fails regardless of margin.
    CriticalFailure,
}

impl Tier {
    /// Classify a roll from its natural sum and margin.
    ///
    /// Critical thresholds are checked first, then the margin: `>= 0` is a
    /// success, `-2..0` a partial success when partials are allowed, anything
    /// else a failure.
    pub fn classify(
        natural: i32,
        margin: i32,
        allow_partial: bool,
        thresholds: CriticalThresholds,
    ) -> Self {
        if natural >= thresholds.success_at {
            Self::CriticalSuccess
        } else if natural <= thresholds.failure_at {
            Self::CriticalFailure
        } else if margin >= 0 {
            Self::Success
        } else if margin >= -2 && allow_partial {
            Self::PartialSuccess
        } else {
            Self::Failure
        }
    }

    /// Whether this tier counts as a full success.
    pub fn is_success(self) -> bool {
        matches!(self, Self::CriticalSuccess | Self::Success)
    }

    /// Short symbol for compact display.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::CriticalSuccess => "++",
            Self::Success => "+",
            Self::PartialSuccess => "~",
            Self::Failure => "-",
            Self::CriticalFailure => "--",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CriticalSuccess => write!(f, "Critical Success"),
            Self::Success => write!(f, "Success"),
            Self::PartialSuccess => write!(f, "Partial Success"),
            Self::Failure => write!(f, "Failure"),
            Self::CriticalFailure => write!(f, "Critical Failure"),
        }
    }
}

/// The complete, immutable result of one 2d6 check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    /// The two die faces.
    pub faces: [i32; 2],
    /// Sum of the faces.
    pub natural: i32,
    /// Modifier added to the natural sum.
    pub modifier: i32,
    /// `natural + modifier`, saturating at the `i32` bounds.
    pub total: i32,
    /// The difficulty the total was compared against.
    pub difficulty: i32,
    /// `total - difficulty`, saturating at the `i32` bounds.
    pub margin: i32,
    /// Classification tier.
    pub tier: Tier,
    /// Both faces show the same value. Flavor only.
    pub doubles: bool,
    /// The natural sum was supplied rather than rolled.
    pub forced: bool,
    /// Costs attached to a partial success.
    pub costs: Vec<Cost>,
}

impl RollOutcome {
    /// Attach partial-success costs.
    pub fn with_costs(mut self, costs: Vec<Cost>) -> Self {
        self.costs = costs;
        self
    }
}

impl std::fmt::Display for RollOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}][{}] = {}, modifier {:+}, total {} vs DC {}: {} (margin {:+})",
            self.faces[0],
            self.faces[1],
            self.natural,
            self.modifier,
            self.total,
            self.difficulty,
            self.tier,
            self.margin
        )
    }
}
