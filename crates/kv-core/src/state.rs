//! Read-only player state consumed by gating, resolution and composition.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A read-only view of the player's accumulated state.
///
/// Lookups never fail: unknown skills and attributes read as 0, unknown
/// flags, items and theories read as absent.
pub trait StateView {
    /// Effective level of a skill (0 when unknown).
    fn skill(&self, name: &str) -> i32;
    /// Value of an attribute (0 when unknown).
    fn attribute(&self, name: &str) -> i32;
    /// Whether a story flag is set.
    fn has_flag(&self, flag: &str) -> bool;
    /// Whether the inventory holds an item with this id.
    fn has_item(&self, item: &str) -> bool;
    /// Whether a theory with this id is active on the board.
    fn theory_active(&self, theory: &str) -> bool;
    /// Whether a theory with this id has been disproven.
    fn theory_disproven(&self, _theory: &str) -> bool {
        false
    }
    /// Sanity meter, 0 (broken) to 100 (lucid).
    fn sanity(&self) -> f64;
    /// Reality meter, 0 (unmoored) to 100 (grounded).
    fn reality(&self) -> f64;
    /// Attention the entity is paying to the player, 0 to 100.
    fn attention(&self) -> f64;
    /// Fear level, 0 to 100.
    fn fear(&self) -> f64 {
        0.0
    }
    /// Simulated hour of day, 0 to 23.
    fn hour(&self) -> u32;
}

/// A concrete, serializable snapshot of player state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Skill levels by name.
    pub skills: BTreeMap<String, i32>,
    /// Attribute values by name.
    pub attributes: BTreeMap<String, i32>,
    /// Story flags that are set.
    pub flags: BTreeSet<String>,
    /// Inventory item ids.
    pub inventory: BTreeSet<String>,
    /// Active theory ids.
    pub theories: BTreeSet<String>,
    /// Disproven theory ids.
    pub disproven: BTreeSet<String>,
    /// Sanity meter.
    pub sanity: f64,
    /// Reality meter.
    pub reality: f64,
    /// Attention meter.
    pub attention: f64,
    /// Fear level.
    pub fear: f64,
    /// Hour of day.
    pub hour: u32,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            skills: BTreeMap::new(),
            attributes: BTreeMap::new(),
            flags: BTreeSet::new(),
            inventory: BTreeSet::new(),
            theories: BTreeSet::new(),
            disproven: BTreeSet::new(),
            sanity: 100.0,
            reality: 100.0,
            attention: 0.0,
            fear: 0.0,
            hour: 12,
        }
    }
}

impl Snapshot {
    /// Create a lucid, grounded snapshot at noon with nothing learned.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a skill level.
    pub fn with_skill(mut self, name: impl Into<String>, level: i32) -> Self {
        self.skills.insert(name.into(), level);
        self
    }

    /// Set an attribute value.
    pub fn with_attribute(mut self, name: impl Into<String>, value: i32) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Set a story flag.
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    /// Add an inventory item.
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.inventory.insert(item.into());
        self
    }

    /// Activate a theory.
    pub fn with_theory(mut self, theory: impl Into<String>) -> Self {
        self.theories.insert(theory.into());
        self
    }

    /// Mark a theory as disproven.
    pub fn with_disproven(mut self, theory: impl Into<String>) -> Self {
        self.disproven.insert(theory.into());
        self
    }

    /// Set the sanity meter (clamped to 0-100).
    pub fn with_sanity(mut self, sanity: f64) -> Self {
        self.sanity = sanity.clamp(0.0, 100.0);
        self
    }

    /// Set the reality meter (clamped to 0-100).
    pub fn with_reality(mut self, reality: f64) -> Self {
        self.reality = reality.clamp(0.0, 100.0);
        self
    }

    /// Set the attention meter (clamped to 0-100).
    pub fn with_attention(mut self, attention: f64) -> Self {
        self.attention = attention.clamp(0.0, 100.0);
        self
    }

    /// Set the fear level (clamped to 0-100).
    pub fn with_fear(mut self, fear: f64) -> Self {
        self.fear = fear.clamp(0.0, 100.0);
        self
    }

    /// Set the hour of day (wrapped to 0-23).
    pub fn with_hour(mut self, hour: u32) -> Self {
        self.hour = hour % 24;
        self
    }
}

impl StateView for Snapshot {
    fn skill(&self, name: &str) -> i32 {
        self.skills.get(name).copied().unwrap_or(0)
    }

    fn attribute(&self, name: &str) -> i32 {
        self.attributes.get(name).copied().unwrap_or(0)
    }

    fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    fn has_item(&self, item: &str) -> bool {
        self.inventory.contains(item)
    }

    fn theory_active(&self, theory: &str) -> bool {
        self.theories.contains(theory)
    }

    fn theory_disproven(&self, theory: &str) -> bool {
        self.disproven.contains(theory)
    }

    fn sanity(&self) -> f64 {
        self.sanity
    }

    fn reality(&self) -> f64 {
        self.reality
    }

    fn attention(&self) -> f64 {
        self.attention
    }

    fn fear(&self) -> f64 {
        self.fear
    }

    fn hour(&self) -> u32 {
        self.hour
    }
}
