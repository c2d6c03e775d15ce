//! Named difficulty bands.

use serde::{Deserialize, Serialize};

/// Standard difficulty classes for 2d6 checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// DC 5.
    Trivial,
    /// DC 7.
    Easy,
    /// DC 9.
    Standard,
    /// DC 11.
    Hard,
    /// DC 13.
    Extreme,
    /// DC 15.
    Legendary,
}

impl Difficulty {
    /// The numeric difficulty class.
    pub fn dc(self) -> i32 {
        match self {
            Self::Trivial => 5,
            Self::Easy => 7,
            Self::Standard => 9,
            Self::Hard => 11,
            Self::Extreme => 13,
            Self::Legendary => 15,
        }
    }

    /// The band a raw DC falls into.
    pub fn describe(dc: i32) -> Self {
        match dc {
            i32::MIN..=5 => Self::Trivial,
            6..=7 => Self::Easy,
            8..=9 => Self::Standard,
            10..=11 => Self::Hard,
            12..=13 => Self::Extreme,
            _ => Self::Legendary,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trivial => write!(f, "Trivial"),
            Self::Easy => write!(f, "Easy"),
            Self::Standard => write!(f, "Standard"),
            Self::Hard => write!(f, "Hard"),
            Self::Extreme => write!(f, "Extreme"),
            Self::Legendary => write!(f, "Legendary"),
        }
    }
}
