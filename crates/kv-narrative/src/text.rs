//! Authored text content: a base passage, per-lens variants and
//! conditional inserts.

use kv_core::Lens;
use serde::{Deserialize, Serialize};

use crate::condition::ConditionNode;

/// Where an insert is spliced into the composed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// On its own line after the selected text.
    AfterBase,
    /// On its own line after the selected text, following `AfterBase` inserts.
    AfterLens,
    /// As a paragraph after the n-th (0-based) paragraph of the selected text.
    AfterParagraph(usize),
    /// As the closing paragraph, just before the choice list.
    BeforeChoices,
}

impl Anchor {
    /// Parse an anchor tag like `AFTER_LENS` or `AFTER_PARAGRAPH:2`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim() {
            "AFTER_BASE" => Some(Self::AfterBase),
            "AFTER_LENS" => Some(Self::AfterLens),
            "BEFORE_CHOICES" => Some(Self::BeforeChoices),
            other => {
                let index = other.strip_prefix("AFTER_PARAGRAPH:")?;
                index.trim().parse().ok().map(Self::AfterParagraph)
            }
        }
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AfterBase => write!(f, "AFTER_BASE"),
            Self::AfterLens => write!(f, "AFTER_LENS"),
            Self::AfterParagraph(n) => write!(f, "AFTER_PARAGRAPH:{n}"),
            Self::BeforeChoices => write!(f, "BEFORE_CHOICES"),
        }
    }
}

fn default_anchor() -> String {
    Anchor::AfterLens.to_string()
}

/// A conditional fragment spliced into a passage.
///
/// The anchor stays a raw tag so that content with a malformed anchor still
/// loads; the composer skips it with a warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextInsert {
    /// Identifier reported in the composition trail.
    pub id: String,
    /// Condition under which the insert appears.
    #[serde(default)]
    pub condition: ConditionNode,
    /// The fragment.
    #[serde(default)]
    pub text: Option<String>,
    /// Anchor tag, see [`Anchor::parse`].
    #[serde(default = "default_anchor", alias = "insert_at")]
    pub anchor: String,
}

impl TextInsert {
    /// Create an unconditional insert.
    pub fn new(id: impl Into<String>, anchor: Anchor, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            condition: ConditionNode::Always,
            text: Some(text.into()),
            anchor: anchor.to_string(),
        }
    }

    /// Set the condition.
    pub fn with_condition(mut self, condition: ConditionNode) -> Self {
        self.condition = condition;
        self
    }
}

/// Per-lens replacements for the base text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensVariants {
    /// Text for the believer lens.
    pub believer: Option<String>,
    /// Text for the skeptic lens.
    pub skeptic: Option<String>,
    /// Text for the haunted lens.
    pub haunted: Option<String>,
    /// Text for the neutral lens.
    pub neutral: Option<String>,
}

impl LensVariants {
    /// The variant for a lens, if authored.
    pub fn get(&self, lens: Lens) -> Option<&str> {
        match lens {
            Lens::Believer => self.believer.as_deref(),
            Lens::Skeptic => self.skeptic.as_deref(),
            Lens::Haunted => self.haunted.as_deref(),
            Lens::Neutral => self.neutral.as_deref(),
        }
    }

    /// Set the variant for a lens.
    pub fn set(&mut self, lens: Lens, text: impl Into<String>) {
        let slot = match lens {
            Lens::Believer => &mut self.believer,
            Lens::Skeptic => &mut self.skeptic,
            Lens::Haunted => &mut self.haunted,
            Lens::Neutral => &mut self.neutral,
        };
        *slot = Some(text.into());
    }
}

/// A layered passage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSpec {
    /// The base passage.
    pub base: Option<String>,
    /// Lens-specific replacements for the base.
    pub lens_variants: LensVariants,
    /// Inserts in declaration order.
    pub inserts: Vec<TextInsert>,
}

impl TextSpec {
    /// Create a spec with a base passage.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
            ..Self::default()
        }
    }

    /// Add a lens variant.
    pub fn with_variant(mut self, lens: Lens, text: impl Into<String>) -> Self {
        self.lens_variants.set(lens, text);
        self
    }

    /// Append an insert.
    pub fn with_insert(mut self, insert: TextInsert) -> Self {
        self.inserts.push(insert);
        self
    }
}
