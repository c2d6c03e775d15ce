//! Stress-driven text distortion.
//!
//! Low sanity, eroded reality and fear raise an intensity in `[0, 1]`. Above
//! a floor, a fixed sequence of [`DistortionRule`]s rewrites the passage.
//! Each rule draws from its own `StdRng` seeded by the passage, the
//! configured seed, the hour and the sanity value, so a given snapshot
//! always distorts a passage the same way.

use kv_core::{Lens, StateView};
use kv_mechanics::dice::stable_hash;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Unsettling replacements for ordinary words.
const VOCABULARY: &[(&str, &[&str])] = &[
    ("door", &["mouth", "barrier", "lid"]),
    ("window", &["eye", "lens", "hole"]),
    ("light", &["glare", "radiation", "burning gaze"]),
    ("shadow", &["void", "stain", "living darkness"]),
    ("tree", &["claw", "spire", "reaching limb"]),
    ("sky", &["lid", "abyss", "ceiling"]),
    ("wall", &["skin", "membrane", "barrier"]),
    ("floor", &["flesh", "ground", "depths"]),
    ("hope", &["delusion", "lie", "trap"]),
    ("memory", &["scar", "ghost", "tape"]),
    ("friend", &["stranger", "agent", "actor"]),
    ("enemy", &["truth", "reflection", "self"]),
];

const REDACTION: char = '\u{2588}';

/// One distortion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistortionRule {
    /// Swap vocabulary words for unsettling replacements.
    Substitute,
    /// Shuffle the interior letters of long words.
    Scramble,
    /// Black out whole sentences.
    Redact,
}

impl DistortionRule {
    /// Rules in the order they run.
    pub const ORDER: [DistortionRule; 3] = [Self::Substitute, Self::Scramble, Self::Redact];

    /// Intensity at which the rule starts firing.
    pub fn activation(self) -> f64 {
        match self {
            Self::Substitute => 0.2,
            Self::Scramble => 0.5,
            Self::Redact => 0.8,
        }
    }

    /// Per-token probability at an intensity. Zero below activation and
    /// non-decreasing above it.
    pub fn chance(self, intensity: f64) -> f64 {
        if intensity < self.activation() {
            return 0.0;
        }
        let chance = match self {
            Self::Substitute => (intensity - 0.1) * 0.4,
            Self::Scramble => (intensity - 0.4) * 0.3,
            Self::Redact => (intensity - 0.7) * 0.5,
        };
        chance.clamp(0.0, 1.0)
    }

    /// Apply the rule line by line, preserving line breaks.
    pub fn apply(self, text: &str, intensity: f64, rng: &mut StdRng) -> String {
        let chance = self.chance(intensity);
        if chance <= 0.0 {
            return text.to_string();
        }
        text.split('\n')
            .map(|line| match self {
                Self::Substitute => map_words(line, |word| substitute(word, chance, rng)),
                Self::Scramble => map_words(line, |word| scramble(word, chance, rng)),
                Self::Redact => redact(line, chance, rng),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Distortion intensity for a snapshot.
///
/// The worse of lost sanity and lost reality, plus up to 0.3 from fear.
/// Believers past the halfway mark see a little more.
pub fn intensity(view: &dyn StateView, lens: Lens) -> f64 {
    let sanity_loss = ((100.0 - view.sanity()) / 100.0).max(0.0);
    let reality_loss = ((100.0 - view.reality()) / 100.0).max(0.0);
    let base = sanity_loss.max(reality_loss);
    let fear = (view.fear() / 100.0).clamp(0.0, 1.0) * 0.3;
    let mut total = base + fear;
    if lens == Lens::Believer && base > 0.5 {
        total += 0.1;
    }
    total.clamp(0.0, 1.0)
}

/// Applies the distortion rules above a floor.
#[derive(Debug, Clone, Copy)]
pub struct Distorter {
    floor: f64,
    seed: u64,
}

impl Distorter {
    /// Create a distorter with a floor and base seed.
    pub fn new(floor: f64, seed: u64) -> Self {
        Self { floor, seed }
    }

    /// The intensity floor.
    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Seed for distorting a passage under a snapshot.
    pub fn seed_for(&self, text: &str, view: &dyn StateView) -> u64 {
        let hour = u64::from(view.hour());
        let sanity = view.sanity().clamp(0.0, 100.0).round() as u64;
        stable_hash(text) ^ self.seed.rotate_left(17) ^ (hour << 40) ^ (sanity << 48)
    }

    /// Distort a passage at the given intensity.
    ///
    /// Returns the text unchanged at or below the floor.
    pub fn distort(&self, text: &str, intensity: f64, view: &dyn StateView) -> String {
        if intensity <= self.floor {
            return text.to_string();
        }
        let seed = self.seed_for(text, view);
        let mut current = text.to_string();
        for (i, rule) in DistortionRule::ORDER.iter().enumerate() {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            current = rule.apply(&current, intensity, &mut rng);
        }
        current
    }
}

/// Rewrite each space-separated word, keeping surrounding punctuation.
fn map_words(line: &str, mut f: impl FnMut(&str) -> Option<String>) -> String {
    line.split(' ')
        .map(|token| {
            let rest = token.trim_start_matches(|c: char| !c.is_alphanumeric());
            let prefix = &token[..token.len() - rest.len()];
            let core = rest.trim_end_matches(|c: char| !c.is_alphanumeric());
            let suffix = &rest[core.len()..];
            if core.is_empty() {
                return token.to_string();
            }
            match f(core) {
                Some(replacement) => format!("{prefix}{replacement}{suffix}"),
                None => token.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn substitute(word: &str, chance: f64, rng: &mut StdRng) -> Option<String> {
    let lower = word.to_lowercase();
    let (_, replacements) = VOCABULARY.iter().find(|(key, _)| *key == lower)?;
    if rng.random::<f64>() >= chance {
        return None;
    }
    let replacement = replacements[rng.random_range(0..replacements.len())];
    Some(match_case(word, replacement))
}

fn match_case(original: &str, replacement: &str) -> String {
    let mut chars = original.chars();
    let first_upper = chars.next().is_some_and(char::is_uppercase);
    let all_upper = first_upper && original.chars().count() > 1 && chars.all(char::is_uppercase);
    if all_upper {
        replacement.to_uppercase()
    } else if first_upper {
        let mut out = replacement.chars();
        match out.next() {
            Some(c) => c.to_uppercase().chain(out).collect(),
            None => String::new(),
        }
    } else {
        replacement.to_string()
    }
}

fn scramble(word: &str, chance: f64, rng: &mut StdRng) -> Option<String> {
    let mut chars: Vec<char> = word.chars().collect();
    if chars.len() <= 4 || !chars.iter().all(|c| c.is_alphabetic()) {
        return None;
    }
    if rng.random::<f64>() >= chance {
        return None;
    }
    let last = chars.len() - 1;
    chars[1..last].shuffle(rng);
    Some(chars.into_iter().collect())
}

fn redact(line: &str, chance: f64, rng: &mut StdRng) -> String {
    let mut out = String::with_capacity(line.len());
    for sentence in sentences(line) {
        if !sentence.trim().is_empty() && rng.random::<f64>() < chance {
            out.extend(
                sentence
                    .chars()
                    .map(|c| if c.is_whitespace() { c } else { REDACTION }),
            );
        } else {
            out.push_str(sentence);
        }
    }
    out
}

/// Split a line into sentences, each keeping its terminator and the
/// whitespace that follows it.
fn sentences(line: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut chars = line.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
            if at_boundary {
                let mut end = i + c.len_utf8();
                while let Some((j, next)) = chars.peek().copied() {
                    if !next.is_whitespace() {
                        break;
                    }
                    end = j + next.len_utf8();
                    chars.next();
                }
                parts.push(&line[start..end]);
                start = end;
            }
        }
    }
    if start < line.len() {
        parts.push(&line[start..]);
    }
    parts
}
