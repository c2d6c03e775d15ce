//! The orchestrator: gate, check, render.
//!
//! [`NarrativeResolver`] takes a [`Target`] through
//! `Idle -> Gating -> Resolving -> Rendering -> Idle`. Gating failures never
//! touch the registry. Locked checks come back as
//! [`Resolution::Blocked`] rather than as failures. The resolver never
//! mutates the snapshot; the caller applies the branch, outcome and costs.

use kv_core::{Lens, StateView};
use kv_mechanics::{
    AttemptResult, BlockReason, CheckRegistry, Cost, DiceEngine, RandomSource, RollOptions,
    RollOutcome, SeededSource, Tier,
};

use crate::choice::ChoiceView;
use crate::composer::{ComposedText, TextComposer};
use crate::config::ResolverConfig;
use crate::error::NarrativeResult;
use crate::target::{Branch, CheckDescriptor, Target, TargetKind};
use crate::text::TextSpec;

/// Where the resolver is within one interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for input.
    #[default]
    Idle,
    /// Evaluating the target's condition.
    Gating,
    /// Rolling the target's check.
    Resolving,
    /// Composing the selected text.
    Rendering,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Gating => write!(f, "gating"),
            Self::Resolving => write!(f, "resolving"),
            Self::Rendering => write!(f, "rendering"),
        }
    }
}

/// A successfully resolved target.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// Target id.
    pub target: String,
    /// Target kind.
    pub kind: TargetKind,
    /// Branch that was rendered.
    pub branch: Branch,
    /// The roll, when the target carried a check.
    pub outcome: Option<RollOutcome>,
    /// The rendered text.
    pub text: ComposedText,
    /// Scene to move to afterwards, if the target names one.
    pub next_scene: Option<String>,
}

impl Resolved {
    /// Partial-success costs for the caller to apply.
    pub fn costs(&self) -> &[Cost] {
        self.outcome
            .as_ref()
            .map(|o| o.costs.as_slice())
            .unwrap_or_default()
    }
}

/// The result of resolving a target.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The target's condition failed. No check was attempted.
    Rejected {
        /// Target id.
        target: String,
        /// Player-facing reason.
        reason: String,
    },
    /// The target's check is locked in the registry.
    Blocked {
        /// Target id.
        target: String,
        /// The locked check id.
        check_id: String,
        /// Why the registry refused.
        reason: BlockReason,
    },
    /// The target resolved and its text was rendered.
    Resolved(Box<Resolved>),
}

impl Resolution {
    /// Whether the target was rejected at the gate.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Whether the check was locked.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// The resolved target, if any.
    pub fn resolved(&self) -> Option<&Resolved> {
        match self {
            Self::Resolved(resolved) => Some(&**resolved),
            _ => None,
        }
    }

    /// The roll outcome, if a check was rolled.
    pub fn outcome(&self) -> Option<&RollOutcome> {
        self.resolved().and_then(|r| r.outcome.as_ref())
    }

    /// The rendered text, if any.
    pub fn text(&self) -> Option<&str> {
        self.resolved().map(|r| r.text.text())
    }
}

/// Runs gate, check and render for targets.
pub struct NarrativeResolver {
    config: ResolverConfig,
    dice: DiceEngine,
    composer: TextComposer,
    registry: CheckRegistry,
    source: Box<dyn RandomSource>,
    phase: Phase,
}

impl NarrativeResolver {
    /// Create a resolver rolling from a source seeded by `config.seed`.
    pub fn new(config: ResolverConfig) -> Self {
        let source = Box::new(SeededSource::new(config.seed));
        Self::with_source(config, source)
    }

    /// Create a resolver with an injected random source.
    pub fn with_source(config: ResolverConfig, source: Box<dyn RandomSource>) -> Self {
        Self {
            dice: DiceEngine::new(config.thresholds()),
            composer: TextComposer::from_config(&config),
            registry: CheckRegistry::new(),
            source,
            phase: Phase::Idle,
            config,
        }
    }

    /// Start from an existing registry.
    pub fn with_registry(mut self, registry: CheckRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The current phase. Always `Idle` between calls.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The check registry.
    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Encode the registry for a save file.
    pub fn save_registry(&self) -> NarrativeResult<String> {
        Ok(self.registry.to_json()?)
    }

    /// Replace the registry from a save file.
    pub fn load_registry(&mut self, json: &str) -> NarrativeResult<()> {
        self.registry = CheckRegistry::from_json(json)?;
        Ok(())
    }

    /// Forget every attempted check (new playthrough).
    pub fn reset_registry(&mut self) {
        self.registry.clear();
    }

    /// The dominant lens for a snapshot under the configured weights.
    pub fn dominant_lens(&self, view: &dyn StateView) -> Lens {
        Lens::dominant(view, &self.config.lens_weights)
    }

    /// Resolve a target with a random roll.
    pub fn resolve(&mut self, target: &Target, lens: Lens, view: &dyn StateView) -> Resolution {
        self.run(target, lens, view, None)
    }

    /// Resolve a target with a forced natural sum.
    pub fn resolve_forced(
        &mut self,
        target: &Target,
        lens: Lens,
        view: &dyn StateView,
        natural: i32,
    ) -> Resolution {
        self.run(target, lens, view, Some(natural))
    }

    /// Attempt a check through the registry without any target around it.
    ///
    /// Partial successes carry their costs.
    pub fn attempt(
        &mut self,
        check: &CheckDescriptor,
        view: &dyn StateView,
        forced: Option<i32>,
    ) -> AttemptResult {
        let level = check.skill_level(view);
        let modifier = check.modifier(view);
        let options = self.roll_options(forced);
        let seed = self.config.seed;
        let dice = &self.dice;
        let source = &mut self.source;
        self.registry
            .attempt(check.check_id.as_deref(), check.kind, level, || {
                let outcome = dice.resolve(source.as_mut(), modifier, check.difficulty, &options);
                if outcome.tier == Tier::PartialSuccess {
                    let costs = Cost::draw(&check.skill, outcome.margin, check.cost_key(), seed);
                    outcome.with_costs(costs)
                } else {
                    outcome
                }
            })
    }

    /// An ad hoc roll that bypasses the registry.
    pub fn roll(&mut self, modifier: i32, difficulty: i32, forced: Option<i32>) -> RollOutcome {
        let options = self.roll_options(forced);
        self.dice
            .resolve(self.source.as_mut(), modifier, difficulty, &options)
    }

    /// Compose a passage without touching the registry or the phase.
    pub fn preview(&self, spec: &TextSpec, lens: Lens, view: &dyn StateView) -> ComposedText {
        self.composer.compose(spec, lens, view)
    }

    /// Render a choice list.
    ///
    /// Choices whose condition fails, or whose check is locked, are listed
    /// disabled with a reason.
    pub fn choices(&self, targets: &[Target], view: &dyn StateView) -> Vec<ChoiceView> {
        targets
            .iter()
            .map(|target| {
                if let Err(reason) = target.condition.check(view) {
                    return ChoiceView::disabled(&target.id, &target.label, reason);
                }
                let locked = target.check.as_ref().and_then(|check| {
                    let id = check.check_id.as_deref()?;
                    self.registry.block_reason(id, check.skill_level(view))
                });
                match locked {
                    Some(reason) => {
                        ChoiceView::disabled(&target.id, &target.label, reason.to_string())
                    }
                    None => ChoiceView::enabled(&target.id, &target.label),
                }
            })
            .collect()
    }

    fn roll_options(&self, forced: Option<i32>) -> RollOptions {
        RollOptions {
            allow_partial: self.config.allow_partial,
            forced_roll: forced,
        }
    }

    fn enter(&mut self, phase: Phase, target: &str) {
        tracing::debug!(target_id = target, from = %self.phase, to = %phase, "resolver phase");
        self.phase = phase;
    }

    fn run(
        &mut self,
        target: &Target,
        lens: Lens,
        view: &dyn StateView,
        forced: Option<i32>,
    ) -> Resolution {
        self.enter(Phase::Gating, &target.id);
        if let Err(reason) = target.condition.check(view) {
            self.enter(Phase::Idle, &target.id);
            return Resolution::Rejected {
                target: target.id.clone(),
                reason,
            };
        }

        let (branch, outcome) = match &target.check {
            None => (Branch::Success, None),
            Some(check) => {
                self.enter(Phase::Resolving, &target.id);
                match self.attempt(check, view, forced) {
                    AttemptResult::Blocked(reason) => {
                        self.enter(Phase::Idle, &target.id);
                        return Resolution::Blocked {
                            target: target.id.clone(),
                            check_id: check.check_id.clone().unwrap_or_default(),
                            reason,
                        };
                    }
                    AttemptResult::Rolled(outcome) => {
                        let branch = Branch::for_tier(outcome.tier, target.text.partial.is_some());
                        (branch, Some(outcome))
                    }
                }
            }
        };

        self.enter(Phase::Rendering, &target.id);
        let text = self.composer.compose(target.text.get(branch), lens, view);
        let next_scene = target.next_scene_for(view).map(str::to_string);
        self.enter(Phase::Idle, &target.id);

        Resolution::Resolved(Box::new(Resolved {
            target: target.id.clone(),
            kind: target.kind,
            branch,
            outcome,
            text,
            next_scene,
        }))
    }
}
