//! Condition evaluation for scene entry, dialogue choices, theories and
//! text inserts.
//!
//! A [`ConditionNode`] is a boolean tree over a closed set of
//! [`Predicate`]s. Evaluation reads a [`StateView`] and nothing else: it
//! never mutates state, keeps no counters and never panics. Unknown keys
//! read as their minimum. A tree containing an unknown predicate kind
//! evaluates to `false` as a whole, even under `not`.

use kv_core::StateView;
use serde::{Deserialize, Serialize};

/// A leaf test against player state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Skill level is at least `level`.
    SkillAtLeast {
        /// Skill name.
        skill: String,
        /// Minimum level.
        level: i32,
    },
    /// Skill level is below `level`.
    SkillBelow {
        /// Skill name.
        skill: String,
        /// Exclusive upper bound.
        level: i32,
    },
    /// Attribute value is at least `value`.
    AttributeAtLeast {
        /// Attribute name.
        attribute: String,
        /// Minimum value.
        value: i32,
    },
    /// The inventory holds an item.
    HasItem {
        /// Item id.
        item: String,
    },
    /// A story flag is set.
    FlagSet {
        /// Flag name.
        flag: String,
    },
    /// A theory is active on the board.
    TheoryActive {
        /// Theory id.
        theory: String,
    },
    /// A theory has been disproven.
    TheoryDisproven {
        /// Theory id.
        theory: String,
    },
    /// Attention is strictly above `value`.
    AttentionAbove {
        /// Threshold.
        value: f64,
    },
    /// Attention is strictly below `value`.
    AttentionBelow {
        /// Threshold.
        value: f64,
    },
    /// Sanity is strictly above `value`.
    SanityAbove {
        /// Threshold.
        value: f64,
    },
    /// Sanity is strictly below `value`.
    SanityBelow {
        /// Threshold.
        value: f64,
    },
    /// Reality is strictly above `value`.
    RealityAbove {
        /// Threshold.
        value: f64,
    },
    /// Reality is strictly below `value`.
    RealityBelow {
        /// Threshold.
        value: f64,
    },
    /// Sanity lies in `[min, max]`.
    SanityRange {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// Reality lies in `[min, max]`.
    RealityRange {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// Attention lies in `[min, max]`.
    AttentionRange {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// The hour falls in `[start_hour, end_hour)`, wrapping past midnight
    /// when `start_hour > end_hour`.
    TimeOfDay {
        /// First hour of the window.
        start_hour: u32,
        /// First hour after the window.
        end_hour: u32,
    },
    /// A predicate kind this build does not know. Always false.
    #[serde(other)]
    Unknown,
}

impl Predicate {
    /// Evaluate the predicate against the view.
    pub fn evaluate(&self, view: &dyn StateView) -> bool {
        match self {
            Self::SkillAtLeast { skill, level } => view.skill(skill) >= *level,
            Self::SkillBelow { skill, level } => view.skill(skill) < *level,
            Self::AttributeAtLeast { attribute, value } => view.attribute(attribute) >= *value,
            Self::HasItem { item } => view.has_item(item),
            Self::FlagSet { flag } => view.has_flag(flag),
            Self::TheoryActive { theory } => view.theory_active(theory),
            Self::TheoryDisproven { theory } => view.theory_disproven(theory),
            Self::AttentionAbove { value } => view.attention() > *value,
            Self::AttentionBelow { value } => view.attention() < *value,
            Self::SanityAbove { value } => view.sanity() > *value,
            Self::SanityBelow { value } => view.sanity() < *value,
            Self::RealityAbove { value } => view.reality() > *value,
            Self::RealityBelow { value } => view.reality() < *value,
            Self::SanityRange { min, max } => (*min..=*max).contains(&view.sanity()),
            Self::RealityRange { min, max } => (*min..=*max).contains(&view.reality()),
            Self::AttentionRange { min, max } => (*min..=*max).contains(&view.attention()),
            Self::TimeOfDay {
                start_hour,
                end_hour,
            } => {
                let hour = view.hour();
                if start_hour <= end_hour {
                    (*start_hour..*end_hour).contains(&hour)
                } else {
                    hour >= *start_hour || hour < *end_hour
                }
            }
            Self::Unknown => false,
        }
    }

    /// Player-facing description of what this predicate demands.
    ///
    /// With `negated` set, describes the opposite requirement.
    pub fn describe(&self, negated: bool) -> String {
        match (self, negated) {
            (Self::SkillAtLeast { skill, level }, false)
            | (Self::SkillBelow { skill, level }, true) => format!("requires {skill} {level}"),
            (Self::SkillAtLeast { skill, level }, true)
            | (Self::SkillBelow { skill, level }, false) => {
                format!("requires {skill} below {level}")
            }
            (Self::AttributeAtLeast { attribute, value }, false) => {
                format!("requires {attribute} {value}")
            }
            (Self::AttributeAtLeast { attribute, value }, true) => {
                format!("requires {attribute} below {value}")
            }
            (Self::HasItem { item }, false) => format!("requires {item}"),
            (Self::HasItem { item }, true) => format!("cannot carry {item}"),
            (Self::FlagSet { flag }, false) => format!("requires {flag}"),
            (Self::FlagSet { flag }, true) => format!("blocked by {flag}"),
            (Self::TheoryActive { theory }, false) => format!("requires theory {theory}"),
            (Self::TheoryActive { theory }, true) => format!("blocked by theory {theory}"),
            (Self::TheoryDisproven { theory }, false) => {
                format!("requires theory {theory} disproven")
            }
            (Self::TheoryDisproven { theory }, true) => {
                format!("blocked by disproven theory {theory}")
            }
            (Self::AttentionAbove { value }, false) => format!("requires attention above {value}"),
            (Self::AttentionAbove { value }, true) => format!("requires attention at most {value}"),
            (Self::AttentionBelow { value }, false) => format!("requires attention below {value}"),
            (Self::AttentionBelow { value }, true) => {
                format!("requires attention at least {value}")
            }
            (Self::SanityAbove { value }, false) => format!("requires sanity above {value}"),
            (Self::SanityAbove { value }, true) => format!("requires sanity at most {value}"),
            (Self::SanityBelow { value }, false) => format!("requires sanity below {value}"),
            (Self::SanityBelow { value }, true) => format!("requires sanity at least {value}"),
            (Self::RealityAbove { value }, false) => format!("requires reality above {value}"),
            (Self::RealityAbove { value }, true) => format!("requires reality at most {value}"),
            (Self::RealityBelow { value }, false) => format!("requires reality below {value}"),
            (Self::RealityBelow { value }, true) => format!("requires reality at least {value}"),
            (Self::SanityRange { min, max }, false) => {
                format!("requires sanity between {min} and {max}")
            }
            (Self::SanityRange { min, max }, true) => {
                format!("requires sanity outside {min} to {max}")
            }
            (Self::RealityRange { min, max }, false) => {
                format!("requires reality between {min} and {max}")
            }
            (Self::RealityRange { min, max }, true) => {
                format!("requires reality outside {min} to {max}")
            }
            (Self::AttentionRange { min, max }, false) => {
                format!("requires attention between {min} and {max}")
            }
            (Self::AttentionRange { min, max }, true) => {
                format!("requires attention outside {min} to {max}")
            }
            (
                Self::TimeOfDay {
                    start_hour,
                    end_hour,
                },
                false,
            ) => format!("only between {start_hour:02}:00 and {end_hour:02}:00"),
            (
                Self::TimeOfDay {
                    start_hour,
                    end_hour,
                },
                true,
            ) => format!("not between {start_hour:02}:00 and {end_hour:02}:00"),
            (Self::Unknown, _) => "unavailable".to_string(),
        }
    }
}

/// A boolean expression over [`Predicate`]s.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionNode {
    /// All children hold. Empty is true.
    #[serde(alias = "and", alias = "AND")]
    All(Vec<ConditionNode>),
    /// At least one child holds. Empty is false.
    #[serde(alias = "or", alias = "OR")]
    Any(Vec<ConditionNode>),
    /// The child does not hold.
    #[serde(alias = "NOT")]
    Not(Box<ConditionNode>),
    /// A leaf predicate.
    Predicate(Predicate),
    /// Always true.
    #[default]
    Always,
}

impl ConditionNode {
    /// Wrap a predicate.
    pub fn leaf(predicate: Predicate) -> Self {
        Self::Predicate(predicate)
    }

    /// Negate a node.
    pub fn negate(node: ConditionNode) -> Self {
        Self::Not(Box::new(node))
    }

    /// `skill >= level`.
    pub fn skill_at_least(skill: impl Into<String>, level: i32) -> Self {
        Self::leaf(Predicate::SkillAtLeast {
            skill: skill.into(),
            level,
        })
    }

    /// The flag is set.
    pub fn flag_set(flag: impl Into<String>) -> Self {
        Self::leaf(Predicate::FlagSet { flag: flag.into() })
    }

    /// The item is carried.
    pub fn has_item(item: impl Into<String>) -> Self {
        Self::leaf(Predicate::HasItem { item: item.into() })
    }

    /// The theory is active.
    pub fn theory_active(theory: impl Into<String>) -> Self {
        Self::leaf(Predicate::TheoryActive {
            theory: theory.into(),
        })
    }

    /// Evaluate the tree, short-circuiting `All` and `Any`.
    ///
    /// Any unknown predicate anywhere in the tree makes the whole tree false.
    pub fn evaluate(&self, view: &dyn StateView) -> bool {
        if self.has_unknown() {
            tracing::warn!("condition with unknown predicate kind evaluated as false");
            return false;
        }
        self.holds(view)
    }

    /// Whether the tree contains a predicate kind this build does not know.
    pub fn has_unknown(&self) -> bool {
        match self {
            Self::All(children) | Self::Any(children) => children.iter().any(Self::has_unknown),
            Self::Not(inner) => inner.has_unknown(),
            Self::Predicate(p) => *p == Predicate::Unknown,
            Self::Always => false,
        }
    }

    fn holds(&self, view: &dyn StateView) -> bool {
        match self {
            Self::All(children) => children.iter().all(|c| c.holds(view)),
            Self::Any(children) => children.iter().any(|c| c.holds(view)),
            Self::Not(inner) => !inner.holds(view),
            Self::Predicate(p) => p.evaluate(view),
            Self::Always => true,
        }
    }

    /// Evaluate the tree and explain a failure.
    ///
    /// The reason comes from the first failing leaf, described from the
    /// player's point of view. Agrees with [`ConditionNode::evaluate`].
    pub fn check(&self, view: &dyn StateView) -> Result<(), String> {
        if self.has_unknown() {
            return Err(Predicate::Unknown.describe(false));
        }
        match self.failure(view, false) {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }

    fn failure(&self, view: &dyn StateView, negated: bool) -> Option<String> {
        match (self, negated) {
            (Self::Always, false) => None,
            (Self::Always, true) => Some("never available".to_string()),
            (Self::Predicate(p), _) => {
                if p.evaluate(view) != negated {
                    None
                } else {
                    Some(p.describe(negated))
                }
            }
            (Self::Not(inner), _) => inner.failure(view, !negated),
            // NOT(ANY) is ALL of the negated children.
            (Self::All(children), false) | (Self::Any(children), true) => children
                .iter()
                .find_map(|c| c.failure(view, negated)),
            // NOT(ALL) is ANY of the negated children.
            (Self::Any(children), false) | (Self::All(children), true) => {
                let mut first = None;
                for child in children {
                    match child.failure(view, negated) {
                        None => return None,
                        Some(reason) => {
                            first.get_or_insert(reason);
                        }
                    }
                }
                Some(first.unwrap_or_else(|| "never available".to_string()))
            }
        }
    }
}
