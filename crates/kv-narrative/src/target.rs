//! Resolvable content: scenes, dialogue choices and theories.

use kv_core::StateView;
use kv_mechanics::{CheckKind, Tier};
use serde::{Deserialize, Serialize};

use crate::condition::ConditionNode;
use crate::text::TextSpec;

/// What a target represents in the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Entering a scene.
    #[default]
    Scene,
    /// Picking a dialogue or action choice.
    Choice,
    /// Internalising a theory.
    Theory,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scene => write!(f, "scene"),
            Self::Choice => write!(f, "choice"),
            Self::Theory => write!(f, "theory"),
        }
    }
}

/// A skill check attached to a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckDescriptor {
    /// Skill whose level feeds the modifier.
    pub skill: String,
    /// Difficulty class.
    pub difficulty: i32,
    /// Registry id. Checks without one are never locked.
    #[serde(default)]
    pub check_id: Option<String>,
    /// Retry semantics.
    #[serde(default)]
    pub kind: CheckKind,
    /// Situational bonus added to the skill level.
    #[serde(default)]
    pub bonus: i32,
}

impl CheckDescriptor {
    /// Create an unidentified check.
    pub fn new(skill: impl Into<String>, difficulty: i32) -> Self {
        Self {
            skill: skill.into(),
            difficulty,
            check_id: None,
            kind: CheckKind::White,
            bonus: 0,
        }
    }

    /// Register the check under an id.
    pub fn with_id(mut self, check_id: impl Into<String>) -> Self {
        self.check_id = Some(check_id.into());
        self
    }

    /// Set the retry semantics.
    pub fn with_kind(mut self, kind: CheckKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the situational bonus.
    pub fn with_bonus(mut self, bonus: i32) -> Self {
        self.bonus = bonus;
        self
    }

    /// Current skill level.
    pub fn skill_level(&self, view: &dyn StateView) -> i32 {
        view.skill(&self.skill)
    }

    /// `skill level + bonus`, saturating at the `i32` bounds.
    pub fn modifier(&self, view: &dyn StateView) -> i32 {
        self.skill_level(view).saturating_add(self.bonus)
    }

    /// Key used to seed partial-success costs.
    pub fn cost_key(&self) -> &str {
        self.check_id.as_deref().unwrap_or(&self.skill)
    }
}

/// Which outcome text was rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    /// Success, or no check at all.
    Success,
    /// Partial success.
    Partial,
    /// Failure.
    Failure,
}

impl Branch {
    /// Select a branch for a tier. Partial successes fall back to the
    /// failure branch when no partial text exists.
    pub fn for_tier(tier: Tier, has_partial: bool) -> Self {
        match tier {
            Tier::CriticalSuccess | Tier::Success => Self::Success,
            Tier::PartialSuccess if has_partial => Self::Partial,
            _ => Self::Failure,
        }
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Partial => write!(f, "partial"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// Outcome texts for a target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branches {
    /// Rendered on success, and for targets without a check.
    pub success: TextSpec,
    /// Rendered on partial success when present.
    pub partial: Option<TextSpec>,
    /// Rendered on failure.
    pub failure: TextSpec,
}

impl Branches {
    /// The text for a branch.
    pub fn get(&self, branch: Branch) -> &TextSpec {
        match branch {
            Branch::Success => &self.success,
            Branch::Partial => self.partial.as_ref().unwrap_or(&self.failure),
            Branch::Failure => &self.failure,
        }
    }
}

/// A conditional edge to another scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// When this edge is taken.
    #[serde(default)]
    pub condition: ConditionNode,
    /// Scene id to move to.
    pub next_scene: String,
}

impl Transition {
    /// Create a conditional transition.
    pub fn new(condition: ConditionNode, next_scene: impl Into<String>) -> Self {
        Self {
            condition,
            next_scene: next_scene.into(),
        }
    }
}

/// A scene, choice or theory the player can try to resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Content id.
    pub id: String,
    /// What the target represents.
    #[serde(default)]
    pub kind: TargetKind,
    /// Label shown in choice lists.
    #[serde(default)]
    pub label: String,
    /// Gate evaluated before anything else.
    #[serde(default)]
    pub condition: ConditionNode,
    /// Optional skill check.
    #[serde(default)]
    pub check: Option<CheckDescriptor>,
    /// Outcome texts.
    #[serde(default)]
    pub text: Branches,
    /// Unconditional next scene. Takes precedence over `transitions`.
    #[serde(default)]
    pub next_scene: Option<String>,
    /// Conditional next scenes, first match wins.
    #[serde(default)]
    pub transitions: Vec<Transition>,
    /// Next scene when no transition matches.
    #[serde(default)]
    pub default_scene: Option<String>,
}

impl Target {
    fn new(id: impl Into<String>, kind: TargetKind, text: TextSpec) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            kind,
            condition: ConditionNode::Always,
            check: None,
            text: Branches {
                success: text,
                ..Branches::default()
            },
            next_scene: None,
            transitions: Vec::new(),
            default_scene: None,
        }
    }

    /// A scene with its entry text.
    pub fn scene(id: impl Into<String>, text: TextSpec) -> Self {
        Self::new(id, TargetKind::Scene, text)
    }

    /// A choice with a label and its success text.
    pub fn choice(id: impl Into<String>, label: impl Into<String>, text: TextSpec) -> Self {
        let mut target = Self::new(id, TargetKind::Choice, text);
        target.label = label.into();
        target
    }

    /// A theory with its internalisation text.
    pub fn theory(id: impl Into<String>, text: TextSpec) -> Self {
        Self::new(id, TargetKind::Theory, text)
    }

    /// Set the gate.
    pub fn with_condition(mut self, condition: ConditionNode) -> Self {
        self.condition = condition;
        self
    }

    /// Attach a check.
    pub fn with_check(mut self, check: CheckDescriptor) -> Self {
        self.check = Some(check);
        self
    }

    /// Set the partial-success text.
    pub fn with_partial(mut self, text: TextSpec) -> Self {
        self.text.partial = Some(text);
        self
    }

    /// Set the failure text.
    pub fn with_failure(mut self, text: TextSpec) -> Self {
        self.text.failure = text;
        self
    }

    /// Always move to a scene afterwards.
    pub fn with_next_scene(mut self, scene: impl Into<String>) -> Self {
        self.next_scene = Some(scene.into());
        self
    }

    /// Append a conditional transition.
    pub fn with_transition(mut self, condition: ConditionNode, scene: impl Into<String>) -> Self {
        self.transitions.push(Transition::new(condition, scene));
        self
    }

    /// Set the fallback scene.
    pub fn with_default_scene(mut self, scene: impl Into<String>) -> Self {
        self.default_scene = Some(scene.into());
        self
    }

    /// The scene to move to afterwards, if any.
    ///
    /// `next_scene` wins, then the first transition whose condition holds,
    /// then `default_scene`.
    pub fn next_scene_for(&self, view: &dyn StateView) -> Option<&str> {
        if let Some(scene) = self.next_scene.as_deref() {
            return Some(scene);
        }
        self.transitions
            .iter()
            .find(|t| t.condition.evaluate(view))
            .map(|t| t.next_scene.as_str())
            .or_else(|| self.default_scene.as_deref())
    }
}
