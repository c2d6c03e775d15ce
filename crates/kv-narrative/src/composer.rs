//! Layered text composition.
//!
//! A [`TextComposer`] turns a [`TextSpec`] into final prose for one lens and
//! one snapshot: lens substitution, conditional inserts spliced at their
//! anchors, then the distortion pass. It holds no per-call state, so
//! composing the same spec against the same snapshot always yields the
//! same [`ComposedText`].

use kv_core::{Lens, StateView};

use crate::config::ResolverConfig;
use crate::distortion::{self, Distorter};
use crate::text::{Anchor, TextSpec};

/// How a [`ComposedText`] came to be.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionTrail {
    lens: Option<Lens>,
    inserts: Vec<String>,
    distorted: bool,
    intensity: f64,
    raw_text: String,
    warnings: Vec<String>,
}

impl CompositionTrail {
    /// The lens whose variant replaced the base, if any.
    pub fn lens(&self) -> Option<Lens> {
        self.lens
    }

    /// Ids of the inserts that were applied, in declaration order.
    pub fn inserts(&self) -> &[String] {
        &self.inserts
    }

    /// Whether the distortion pass changed the text.
    pub fn distorted(&self) -> bool {
        self.distorted
    }

    /// Distortion intensity computed from the snapshot.
    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    /// The composed text before the distortion pass.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Content problems found while composing.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Final prose plus its composition trail.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedText {
    text: String,
    trail: CompositionTrail,
}

impl ComposedText {
    /// The composed prose.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// How the prose was built.
    pub fn trail(&self) -> &CompositionTrail {
        &self.trail
    }

    /// Consume into the prose.
    pub fn into_text(self) -> String {
        self.text
    }
}

impl std::fmt::Display for ComposedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Composes [`TextSpec`]s into [`ComposedText`].
#[derive(Debug, Clone, Copy)]
pub struct TextComposer {
    distorter: Distorter,
}

impl Default for TextComposer {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}

impl TextComposer {
    /// Create a composer with a distortion floor and seed.
    pub fn new(distortion_floor: f64, seed: u64) -> Self {
        Self {
            distorter: Distorter::new(distortion_floor, seed),
        }
    }

    /// Create a composer from resolver settings.
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.distortion_floor, config.seed)
    }

    /// Compose a passage for a lens against a snapshot.
    pub fn compose(&self, spec: &TextSpec, lens: Lens, view: &dyn StateView) -> ComposedText {
        let mut warnings = Vec::new();

        let base = match spec.base.as_deref() {
            Some(base) => base,
            None => {
                tracing::warn!("text spec has no base text");
                warnings.push("missing base text".to_string());
                ""
            }
        };
        let (selected, lens_used) = match spec.lens_variants.get(lens) {
            Some(variant) => (variant, Some(lens)),
            None => (base, None),
        };

        let mut body = selected.to_string();
        let mut after_base = Vec::new();
        let mut after_lens = Vec::new();
        let mut before_choices = Vec::new();
        let mut applied = Vec::new();

        for insert in &spec.inserts {
            let Some(text) = insert.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
            else {
                tracing::warn!(insert = %insert.id, "skipping insert without text");
                warnings.push(format!("insert {}: missing text", insert.id));
                continue;
            };
            let Some(anchor) = Anchor::parse(&insert.anchor) else {
                tracing::warn!(insert = %insert.id, anchor = %insert.anchor, "skipping insert with unknown anchor");
                warnings.push(format!("insert {}: unknown anchor {}", insert.id, insert.anchor));
                continue;
            };
            if !insert.condition.evaluate(view) {
                continue;
            }
            match anchor {
                Anchor::AfterParagraph(n) => {
                    // Indexes the body as spliced so far, earlier paragraph
                    // inserts included.
                    let ends = paragraph_ends(&body);
                    let Some(&end) = ends.get(n) else {
                        tracing::warn!(
                            insert = %insert.id,
                            paragraph = n,
                            paragraphs = ends.len(),
                            "paragraph anchor out of range"
                        );
                        warnings.push(format!(
                            "insert {}: paragraph {n} out of range ({} paragraphs)",
                            insert.id,
                            ends.len()
                        ));
                        continue;
                    };
                    body.insert_str(end, &format!("\n\n{text}"));
                }
                Anchor::AfterBase => after_base.push(text),
                Anchor::AfterLens => after_lens.push(text),
                Anchor::BeforeChoices => before_choices.push(text),
            }
            applied.push(insert.id.clone());
        }

        let mut text = body;
        for line in after_base.into_iter().chain(after_lens) {
            append(&mut text, "\n", line);
        }
        for paragraph in before_choices {
            append(&mut text, "\n\n", paragraph);
        }

        let intensity = distortion::intensity(view, lens);
        let distorted_text = self.distorter.distort(&text, intensity, view);
        let distorted = distorted_text != text;

        ComposedText {
            text: distorted_text,
            trail: CompositionTrail {
                lens: lens_used,
                inserts: applied,
                distorted,
                intensity,
                raw_text: text,
                warnings,
            },
        }
    }
}

fn append(text: &mut String, separator: &str, piece: &str) {
    let kept = text.trim_end().len();
    text.truncate(kept);
    if !text.is_empty() {
        text.push_str(separator);
    }
    text.push_str(piece);
}

/// Byte offset just past the last non-blank line of each paragraph.
/// Paragraphs are separated by one or more blank lines.
fn paragraph_ends(text: &str) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut open = None;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim().is_empty() {
            if let Some(end) = open.take() {
                ends.push(end);
            }
        } else {
            open = Some(offset + content.len());
        }
        offset += line.len();
    }
    ends.extend(open);
    ends
}
