//! Check locking across a playthrough.
//!
//! Every identified check gets a [`CheckRecord`] the first time it is
//! rolled. Red checks can never be rolled again. White checks relock after
//! each attempt and only reopen once the relevant skill has improved past
//! the level recorded at the last attempt. A white check that succeeded
//! stays closed for good.
//!
//! The registry is the only mutable state in the resolution pipeline and is
//! persisted with the save file as a plain `id -> record` map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dice::RollOutcome;
use crate::error::MechResult;

/// Retry semantics for an identified check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    /// May be attempted at most once, ever.
    Red,
    /// May be retried once the skill level improves.
    #[default]
    White,
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::White => write!(f, "white"),
        }
    }
}

/// What the registry remembers about an attempted check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRecord {
    /// Retry semantics recorded at the attempt.
    pub kind: CheckKind,
    /// Skill level when the check was attempted.
    pub skill_level_at_attempt: i32,
    /// Whether the attempt was a full success.
    pub succeeded: bool,
}

/// Why an attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// A red check was already attempted.
    PermanentlyResolved,
    /// A white check was already passed.
    AlreadySucceeded,
    /// A white check failed and the skill has not improved since.
    NoImprovement,
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermanentlyResolved => write!(f, "permanently resolved"),
            Self::AlreadySucceeded => write!(f, "already succeeded"),
            Self::NoImprovement => write!(f, "no improvement"),
        }
    }
}

/// The result of asking the registry to attempt a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    /// The check was rolled.
    Rolled(RollOutcome),
    /// The check is locked; nothing was rolled.
    Blocked(BlockReason),
}

impl AttemptResult {
    /// Whether the attempt was refused.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }

    /// The roll, if one happened.
    pub fn outcome(&self) -> Option<&RollOutcome> {
        match self {
            Self::Rolled(outcome) => Some(outcome),
            Self::Blocked(_) => None,
        }
    }

    /// The block reason, if the attempt was refused.
    pub fn block_reason(&self) -> Option<BlockReason> {
        match self {
            Self::Rolled(_) => None,
            Self::Blocked(reason) => Some(*reason),
        }
    }
}

/// Tracks attempted checks by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckRegistry {
    records: BTreeMap<String, CheckRecord>,
}

impl CheckRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt a check, rolling through `roll` only if the check is open.
    ///
    /// Checks without an id bypass the registry and always roll. A white
    /// check whose skill improved has its old record replaced by the new
    /// attempt.
    pub fn attempt<F>(
        &mut self,
        check_id: Option<&str>,
        kind: CheckKind,
        current_skill_level: i32,
        roll: F,
    ) -> AttemptResult
    where
        F: FnOnce() -> RollOutcome,
    {
        let Some(id) = check_id else {
            return AttemptResult::Rolled(roll());
        };

        if let Some(reason) = self.block_reason(id, current_skill_level) {
            tracing::debug!(check_id = id, %reason, "check attempt blocked");
            return AttemptResult::Blocked(reason);
        }

        let outcome = roll();
        let record = CheckRecord {
            kind,
            skill_level_at_attempt: current_skill_level,
            succeeded: outcome.tier.is_success(),
        };
        if self.records.insert(id.to_string(), record).is_some() {
            tracing::debug!(check_id = id, current_skill_level, "white check reopened");
        }
        tracing::debug!(
            check_id = id,
            %kind,
            succeeded = record.succeeded,
            "check attempt recorded"
        );
        AttemptResult::Rolled(outcome)
    }

    /// Why a check would be blocked at this skill level, without recording
    /// anything.
    pub fn block_reason(&self, check_id: &str, current_skill_level: i32) -> Option<BlockReason> {
        let record = self.records.get(check_id)?;
        match record.kind {
            CheckKind::Red => Some(BlockReason::PermanentlyResolved),
            CheckKind::White if record.succeeded => Some(BlockReason::AlreadySucceeded),
            CheckKind::White if current_skill_level <= record.skill_level_at_attempt => {
                Some(BlockReason::NoImprovement)
            }
            CheckKind::White => None,
        }
    }

    /// Whether a check is currently locked at this skill level.
    pub fn is_locked(&self, check_id: &str, current_skill_level: i32) -> bool {
        self.block_reason(check_id, current_skill_level).is_some()
    }

    /// The record for a check id.
    pub fn record(&self, check_id: &str) -> Option<&CheckRecord> {
        self.records.get(check_id)
    }

    /// Iterate over all records in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CheckRecord)> {
        self.records.iter().map(|(id, r)| (id.as_str(), r))
    }

    /// Number of recorded checks.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no checks have been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Forget every record (new playthrough).
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Encode the registry for a save file.
    pub fn to_json(&self) -> MechResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a registry from a save file.
    pub fn from_json(json: &str) -> MechResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::{DiceEngine, FixedSource, RollOptions};

    fn roll(natural: i32, modifier: i32, difficulty: i32) -> impl FnOnce() -> RollOutcome {
        move || {
            DiceEngine::default().resolve(
                &mut FixedSource::default(),
                modifier,
                difficulty,
                &RollOptions::default().forced(natural),
            )
        }
    }

    #[test]
    fn first_attempt_rolls_and_records() {
        let mut reg = CheckRegistry::new();
        let result = reg.attempt(Some("cellar"), CheckKind::White, 2, roll(8, 2, 9));
        assert!(!result.is_blocked());
        assert_eq!(result.outcome().map(|o| o.total), Some(10));

        let record = reg.record("cellar").unwrap();
        assert_eq!(record.kind, CheckKind::White);
        assert_eq!(record.skill_level_at_attempt, 2);
        assert!(record.succeeded);
    }

    #[test]
    fn red_check_blocks_after_failure() {
        let mut reg = CheckRegistry::new();
        reg.attempt(Some("seance"), CheckKind::Red, 1, roll(4, 1, 11));
        let again = reg.attempt(Some("seance"), CheckKind::Red, 6, roll(12, 6, 11));
        assert_eq!(again, AttemptResult::Blocked(BlockReason::PermanentlyResolved));
    }

    #[test]
    fn red_check_blocks_after_success() {
        let mut reg = CheckRegistry::new();
        reg.attempt(Some("seance"), CheckKind::Red, 1, roll(12, 1, 11));
        let again = reg.attempt(Some("seance"), CheckKind::Red, 1, roll(12, 1, 11));
        assert_eq!(
            again.block_reason(),
            Some(BlockReason::PermanentlyResolved)
        );
    }

    #[test]
    fn white_check_needs_improvement() {
        let mut reg = CheckRegistry::new();
        let first = reg.attempt(Some("lock"), CheckKind::White, 2, roll(4, 2, 11));
        assert!(!first.outcome().unwrap().tier.is_success());

        let same = reg.attempt(Some("lock"), CheckKind::White, 2, roll(12, 2, 11));
        assert_eq!(same, AttemptResult::Blocked(BlockReason::NoImprovement));

        let improved = reg.attempt(Some("lock"), CheckKind::White, 3, roll(9, 3, 11));
        assert!(!improved.is_blocked());
        assert_eq!(reg.record("lock").unwrap().skill_level_at_attempt, 3);
        assert!(reg.record("lock").unwrap().succeeded);
    }

    #[test]
    fn white_success_is_never_retried() {
        let mut reg = CheckRegistry::new();
        reg.attempt(Some("lock"), CheckKind::White, 2, roll(10, 2, 9));
        let again = reg.attempt(Some("lock"), CheckKind::White, 5, roll(10, 5, 9));
        assert_eq!(again, AttemptResult::Blocked(BlockReason::AlreadySucceeded));
    }

    #[test]
    fn partial_success_does_not_count_as_succeeded() {
        let mut reg = CheckRegistry::new();
        let result = reg.attempt(Some("lock"), CheckKind::White, 2, roll(8, 2, 11));
        assert_eq!(
            result.outcome().map(|o| o.tier),
            Some(crate::dice::Tier::PartialSuccess)
        );
        assert!(!reg.record("lock").unwrap().succeeded);
        assert!(!reg.is_locked("lock", 3));
    }

    #[test]
    fn blocked_attempt_does_not_roll() {
        let mut reg = CheckRegistry::new();
        reg.attempt(Some("x"), CheckKind::Red, 0, roll(7, 0, 9));
        let mut rolled = false;
        reg.attempt(Some("x"), CheckKind::Red, 0, || {
            rolled = true;
            roll(7, 0, 9)()
        });
        assert!(!rolled);
    }

    #[test]
    fn anonymous_checks_bypass_registry() {
        let mut reg = CheckRegistry::new();
        for _ in 0..3 {
            let r = reg.attempt(None, CheckKind::Red, 0, roll(7, 0, 9));
            assert!(!r.is_blocked());
        }
        assert!(reg.is_empty());
    }

    #[test]
    fn json_round_trip_preserves_decisions() {
        let mut reg = CheckRegistry::new();
        reg.attempt(Some("red_one"), CheckKind::Red, 1, roll(4, 1, 9));
        reg.attempt(Some("white_fail"), CheckKind::White, 2, roll(4, 2, 11));
        reg.attempt(Some("white_pass"), CheckKind::White, 2, roll(10, 2, 9));

        let json = reg.to_json().unwrap();
        let restored = CheckRegistry::from_json(&json).unwrap();
        assert_eq!(restored, reg);

        for level in 0..5 {
            for id in ["red_one", "white_fail", "white_pass", "unseen"] {
                assert_eq!(
                    restored.block_reason(id, level),
                    reg.block_reason(id, level)
                );
            }
        }
    }

    #[test]
    fn persisted_layout_is_a_plain_map() {
        let mut reg = CheckRegistry::new();
        reg.attempt(Some("door"), CheckKind::Red, 3, roll(10, 3, 9));
        assert_eq!(
            reg.to_json().unwrap(),
            r#"{"door":{"kind":"red","skill_level_at_attempt":3,"succeeded":true}}"#
        );
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(CheckRegistry::from_json("{\"door\": 3}").is_err());
    }

    #[test]
    fn block_reason_display() {
        assert_eq!(
            BlockReason::PermanentlyResolved.to_string(),
            "permanently resolved"
        );
        assert_eq!(BlockReason::AlreadySucceeded.to_string(), "already succeeded");
        assert_eq!(BlockReason::NoImprovement.to_string(), "no improvement");
    }
}
