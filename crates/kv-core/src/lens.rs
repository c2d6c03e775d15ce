//! Interpretive worldviews.
//!
//! A [`Lens`] is the player's dominant way of reading events. Text specs can
//! carry one variant per lens; the composer substitutes the variant for the
//! base text when one exists.

use serde::{Deserialize, Serialize};

use crate::state::StateView;

/// The player's dominant interpretive worldview.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Lens {
    /// Sees the supernatural behind events.
    Believer,
    /// Looks for the rational explanation.
    Skeptic,
    /// Sees echoes of personal history.
    Haunted,
    /// No worldview dominates.
    #[default]
    Neutral,
}

impl Lens {
    /// All lenses, in scoring order.
    pub const ALL: [Lens; 4] = [Lens::Believer, Lens::Skeptic, Lens::Haunted, Lens::Neutral];

    /// Parse a lens from a tag like "believer" or "Skeptic".
    pub fn from_str_tag(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "believer" => Some(Self::Believer),
            "skeptic" => Some(Self::Skeptic),
            "haunted" => Some(Self::Haunted),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    /// The lowercase tag for this lens.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Believer => "believer",
            Self::Skeptic => "skeptic",
            Self::Haunted => "haunted",
            Self::Neutral => "neutral",
        }
    }

    /// Compute the dominant lens from attributes, skills and active theories.
    ///
    /// Each worldview scores twice its anchor attribute plus its skills and
    /// theory bonuses. The leader must beat the runner-up by at least
    /// `weights.lead_margin`, otherwise the result is [`Lens::Neutral`].
    pub fn dominant(view: &dyn StateView, weights: &LensWeights) -> Lens {
        let score = |attribute: &str, skills: &[String], theories: &[String]| {
            let active = theories.iter().filter(|t| view.theory_active(t)).count();
            let theory_points =
                i32::try_from(active).map_or(i32::MAX, |n| n.saturating_mul(weights.theory_bonus));
            skills
                .iter()
                .fold(view.attribute(attribute).saturating_mul(2), |total, s| {
                    total.saturating_add(view.skill(s))
                })
                .saturating_add(theory_points)
        };

        let scores = [
            (
                Lens::Believer,
                score(
                    &weights.believer_attribute,
                    &weights.believer_skills,
                    &weights.believer_theories,
                ),
            ),
            (
                Lens::Skeptic,
                score(
                    &weights.skeptic_attribute,
                    &weights.skeptic_skills,
                    &weights.skeptic_theories,
                ),
            ),
            (
                Lens::Haunted,
                score(
                    &weights.haunted_attribute,
                    &weights.haunted_skills,
                    &weights.haunted_theories,
                ),
            ),
        ];

        // First maximum wins ties, matching the scoring order.
        let mut leader = scores[0];
        for candidate in &scores[1..] {
            if candidate.1 > leader.1 {
                leader = *candidate;
            }
        }
        let runner_up = scores
            .iter()
            .filter(|(lens, _)| *lens != leader.0)
            .map(|(_, s)| *s)
            .max()
            .unwrap_or(0);

        if leader.1 >= runner_up.saturating_add(weights.lead_margin) {
            leader.0
        } else {
            Lens::Neutral
        }
    }
}

impl std::fmt::Display for Lens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weights used by [`Lens::dominant`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensWeights {
    /// Attribute anchoring the believer score.
    pub believer_attribute: String,
    /// Skills added to the believer score.
    pub believer_skills: Vec<String>,
    /// Theories that push toward belief.
    pub believer_theories: Vec<String>,
    /// Attribute anchoring the skeptic score.
    pub skeptic_attribute: String,
    /// Skills added to the skeptic score.
    pub skeptic_skills: Vec<String>,
    /// Theories that push toward skepticism.
    pub skeptic_theories: Vec<String>,
    /// Attribute anchoring the haunted score.
    pub haunted_attribute: String,
    /// Skills added to the haunted score.
    pub haunted_skills: Vec<String>,
    /// Theories that push toward the haunted reading.
    pub haunted_theories: Vec<String>,
    /// Points each active matching theory adds.
    pub theory_bonus: i32,
    /// Lead over the runner-up required to leave neutral.
    pub lead_margin: i32,
}

impl Default for LensWeights {
    fn default() -> Self {
        Self {
            believer_attribute: "INTUITION".to_string(),
            believer_skills: vec!["Paranormal Sensitivity".to_string(), "Instinct".to_string()],
            believer_theories: vec!["i_want_to_believe".to_string()],
            skeptic_attribute: "REASON".to_string(),
            skeptic_skills: vec!["Logic".to_string(), "Skepticism".to_string()],
            skeptic_theories: vec!["there_is_a_rational_explanation".to_string()],
            haunted_attribute: "PRESENCE".to_string(),
            haunted_skills: Vec::new(),
            haunted_theories: Vec::new(),
            theory_bonus: 4,
            lead_margin: 3,
        }
    }
}
