//! Costs paid for a partial success.
//!
//! A partial success achieves the goal but draws one or two costs from a
//! table keyed by the skill being tested. The draw is seeded from the check
//! id, so replaying the same check always costs the same.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::stable_hash;

/// A consequence attached to a partial success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cost {
    /// The attempt takes longer than expected.
    Time,
    /// Something notices the attempt.
    Attention,
    /// The player's methods raise suspicion.
    Trust,
    /// The player strains themselves.
    Injury,
    /// Supplies are spent.
    Resource,
    /// Others may have heard.
    Noise,
    /// Traces of the investigation are left behind.
    Evidence,
}

impl Cost {
    /// Player-facing description of the cost.
    pub fn description(self) -> &'static str {
        match self {
            Self::Time => "This takes longer than expected. (+15 minutes)",
            Self::Attention => "Something notices your attempt. (+5 Attention)",
            Self::Trust => "Your methods raise suspicion. (-5 Trust)",
            Self::Injury => "You strain yourself in the attempt. (Minor injury)",
            Self::Resource => "You expend resources in the attempt.",
            Self::Noise => "You make noise. Others may have heard.",
            Self::Evidence => "You leave traces of your investigation.",
        }
    }

    /// The costs a skill tends to incur.
    pub fn table_for(skill: &str) -> &'static [Cost] {
        match skill {
            "Stealth" => &[Self::Noise, Self::Attention],
            "Forensics" => &[Self::Time, Self::Evidence],
            "Athletics" => &[Self::Injury, Self::Time],
            "Charm" => &[Self::Trust, Self::Time],
            "Interrogation" => &[Self::Trust, Self::Attention],
            "Firearms" => &[Self::Resource, Self::Noise],
            "Research" => &[Self::Time],
            "Survival" => &[Self::Resource, Self::Injury],
            _ => &[Self::Time, Self::Attention],
        }
    }

    /// Draw the costs for a partial success missed by `margin`.
    ///
    /// One cost at margin -1, otherwise two (capped by the table size). The
    /// draw is a pure function of `skill`, `margin`, `key` and `seed`.
    pub fn draw(skill: &str, margin: i32, key: &str, seed: u64) -> Vec<Cost> {
        let mut pool = Self::table_for(skill).to_vec();
        let count = if margin == -1 { 1 } else { 2 };
        let mut rng = StdRng::seed_from_u64(stable_hash(key) ^ seed);
        pool.shuffle(&mut rng);
        pool.truncate(count.min(pool.len()));
        pool
    }
}

impl std::fmt::Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_tables() {
        assert_eq!(Cost::table_for("Stealth"), &[Cost::Noise, Cost::Attention]);
        assert_eq!(Cost::table_for("Research"), &[Cost::Time]);
        assert_eq!(Cost::table_for("Astrology"), &[Cost::Time, Cost::Attention]);
    }

    #[test]
    fn count_follows_margin() {
        assert_eq!(Cost::draw("Forensics", -1, "check_a", 42).len(), 1);
        assert_eq!(Cost::draw("Forensics", -2, "check_a", 42).len(), 2);
        assert_eq!(Cost::draw("Research", -2, "check_a", 42).len(), 1);
    }

    #[test]
    fn draw_is_deterministic_per_key() {
        let a = Cost::draw("Stealth", -1, "vault_door", 7);
        let b = Cost::draw("Stealth", -1, "vault_door", 7);
        assert_eq!(a, b);
    }

    #[test]
    fn drawn_costs_come_from_table() {
        for key in ["a", "b", "c", "d", "e"] {
            for cost in Cost::draw("Charm", -2, key, 1) {
                assert!(Cost::table_for("Charm").contains(&cost));
            }
        }
    }

    #[test]
    fn display_uses_description() {
        assert_eq!(
            Cost::Noise.to_string(),
            "You make noise. Others may have heard."
        );
    }
}
