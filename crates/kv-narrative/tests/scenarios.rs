//! End-to-end resolution scenarios.

use kv_core::{Lens, Snapshot};
use kv_mechanics::{BlockReason, CheckKind, Tier};
use kv_narrative::{
    Anchor, Branch, CheckDescriptor, ConditionNode, NarrativeResolver, Resolution,
    ResolverConfig, Target, TargetKind, TextInsert, TextSpec,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("kv_narrative=debug,kv_mechanics=debug")
        .try_init();
}

fn resolver() -> NarrativeResolver {
    init_tracing();
    NarrativeResolver::new(ResolverConfig::default())
}

fn examine(difficulty: i32) -> Target {
    Target::choice("examine", "Examine the logbook", TextSpec::new("The entries stop mid-line."))
        .with_check(CheckDescriptor::new("Forensics", difficulty))
        .with_partial(TextSpec::new("The ink is smudged, but one date stands out."))
        .with_failure(TextSpec::new("Just a logbook."))
}

#[test]
fn scenario_a_success_by_one() {
    let snap = Snapshot::new().with_skill("Forensics", 2);
    let resolution = resolver().resolve_forced(&examine(9), Lens::Neutral, &snap, 8);
    let outcome = resolution.outcome().unwrap();
    assert_eq!(outcome.total, 10);
    assert_eq!(outcome.margin, 1);
    assert_eq!(outcome.tier, Tier::Success);
    assert!(outcome.forced);
    assert_eq!(resolution.text(), Some("The entries stop mid-line."));
}

#[test]
fn scenario_b_partial_success() {
    let snap = Snapshot::new().with_skill("Forensics", 2);
    let resolution = resolver().resolve_forced(&examine(11), Lens::Neutral, &snap, 8);
    let resolved = resolution.resolved().unwrap();
    let outcome = resolved.outcome.as_ref().unwrap();
    assert_eq!(outcome.total, 10);
    assert_eq!(outcome.margin, -1);
    assert_eq!(outcome.tier, Tier::PartialSuccess);
    assert_eq!(resolved.branch, Branch::Partial);
    assert_eq!(resolved.costs().len(), 1);
    assert_eq!(
        resolution.text(),
        Some("The ink is smudged, but one date stands out.")
    );
}

#[test]
fn scenario_c_natural_twelve() {
    let snap = Snapshot::new().with_skill("Forensics", 0);
    let resolution = resolver().resolve_forced(&examine(20), Lens::Neutral, &snap, 12);
    let outcome = resolution.outcome().unwrap();
    assert_eq!(outcome.tier, Tier::CriticalSuccess);
    assert_eq!(outcome.faces, [6, 6]);
    assert!(outcome.doubles);
    assert_eq!(resolution.resolved().unwrap().branch, Branch::Success);
}

#[test]
fn scenario_d_conditional_insert_applied_once() {
    let snap = Snapshot::new().with_skill("Forensics", 6);
    let spec = TextSpec::new("A body lies on the rocks.\n\nThe tide is coming in.").with_insert(
        TextInsert::new(
            "forensics_detail",
            Anchor::AfterParagraph(0),
            "[Forensics] The bruising is hours old.",
        )
        .with_condition(ConditionNode::skill_at_least("Forensics", 5)),
    );
    let resolver = resolver();
    let first = resolver.preview(&spec, Lens::Neutral, &snap);
    let second = resolver.preview(&spec, Lens::Neutral, &snap);

    assert_eq!(first.text().matches("[Forensics]").count(), 1);
    assert_eq!(first.trail().inserts(), ["forensics_detail".to_string()]);
    assert_eq!(first, second);

    let below = resolver.preview(&spec, Lens::Neutral, &Snapshot::new().with_skill("Forensics", 4));
    assert!(!below.text().contains("[Forensics]"));
}

#[test]
fn red_check_is_one_shot() {
    let mut resolver = resolver();
    let snap = Snapshot::new().with_skill("Interrogation", 1);
    let confront = Target::choice("confront", "Confront the keeper", TextSpec::new("He breaks."))
        .with_check(
            CheckDescriptor::new("Interrogation", 11)
                .with_id("keeper_confession")
                .with_kind(CheckKind::Red),
        )
        .with_failure(TextSpec::new("He shuts the door on you."));

    let first = resolver.resolve_forced(&confront, Lens::Neutral, &snap, 5);
    assert_eq!(first.text(), Some("He shuts the door on you."));

    let better = snap.clone().with_skill("Interrogation", 6);
    for natural in [2, 7, 12] {
        let again = resolver.resolve_forced(&confront, Lens::Neutral, &better, natural);
        assert_eq!(
            again,
            Resolution::Blocked {
                target: "confront".to_string(),
                check_id: "keeper_confession".to_string(),
                reason: BlockReason::PermanentlyResolved,
            }
        );
    }
    assert_eq!(resolver.registry().len(), 1);
}

#[test]
fn white_check_reopens_on_improvement() {
    let mut resolver = resolver();
    let desk = Target::scene("desk", TextSpec::new("A false bottom."))
        .with_check(CheckDescriptor::new("Forensics", 11).with_id("desk_search"))
        .with_failure(TextSpec::new("Papers, nothing more."));

    let level_two = Snapshot::new().with_skill("Forensics", 2);
    let failed = resolver.resolve_forced(&desk, Lens::Neutral, &level_two, 4);
    assert_eq!(failed.outcome().unwrap().tier, Tier::Failure);

    let blocked = resolver.resolve_forced(&desk, Lens::Neutral, &level_two, 12);
    assert!(blocked.is_blocked());
    assert!(matches!(
        blocked,
        Resolution::Blocked {
            reason: BlockReason::NoImprovement,
            ..
        }
    ));

    let level_three = Snapshot::new().with_skill("Forensics", 3);
    let retried = resolver.resolve_forced(&desk, Lens::Neutral, &level_three, 9);
    assert_eq!(retried.outcome().unwrap().tier, Tier::Success);
    assert_eq!(retried.text(), Some("A false bottom."));

    let level_five = Snapshot::new().with_skill("Forensics", 5);
    let done = resolver.resolve_forced(&desk, Lens::Neutral, &level_five, 9);
    assert!(matches!(
        done,
        Resolution::Blocked {
            reason: BlockReason::AlreadySucceeded,
            ..
        }
    ));
}

#[test]
fn partial_success_can_be_retried_after_improvement() {
    let mut resolver = resolver();
    let check = CheckDescriptor::new("Stealth", 9).with_id("slip_past");
    let level_one = Snapshot::new().with_skill("Stealth", 1);
    let partial = resolver.attempt(&check, &level_one, Some(7));
    assert_eq!(partial.outcome().unwrap().tier, Tier::PartialSuccess);
    assert!(resolver.attempt(&check, &level_one, Some(12)).is_blocked());
    let level_two = Snapshot::new().with_skill("Stealth", 2);
    assert!(!resolver.attempt(&check, &level_two, Some(12)).is_blocked());
}

#[test]
fn registry_survives_save_and_load() {
    let mut resolver = resolver();
    let snap = Snapshot::new().with_skill("Athletics", 2);
    let door = Target::choice("force_door", "Force the door", TextSpec::new("It gives."))
        .with_check(
            CheckDescriptor::new("Athletics", 9)
                .with_id("door")
                .with_kind(CheckKind::Red),
        );
    resolver.resolve_forced(&door, Lens::Neutral, &snap, 4);

    let saved = resolver.save_registry().unwrap();
    assert_eq!(
        saved,
        r#"{"door":{"kind":"red","skill_level_at_attempt":2,"succeeded":false}}"#
    );

    let mut restored = NarrativeResolver::new(ResolverConfig::default());
    restored.load_registry(&saved).unwrap();
    assert_eq!(restored.registry(), resolver.registry());
    assert!(restored.resolve_forced(&door, Lens::Neutral, &snap, 12).is_blocked());

    restored.reset_registry();
    assert!(!restored.resolve_forced(&door, Lens::Neutral, &snap, 12).is_blocked());
}

#[test]
fn corrupt_save_is_an_error() {
    let mut resolver = resolver();
    assert!(resolver.load_registry("{not json").is_err());
    assert!(resolver.registry().is_empty());
}

#[test]
fn gate_runs_before_the_check() {
    let mut resolver = resolver();
    let theory = Target::theory("lighthouse_theory", TextSpec::new("It was never a lighthouse."))
        .with_condition(ConditionNode::All(vec![
            ConditionNode::flag_set("read_logbook"),
            ConditionNode::skill_at_least("Occult Knowledge", 2),
        ]))
        .with_check(
            CheckDescriptor::new("Occult Knowledge", 9)
                .with_id("internalise_lighthouse")
                .with_kind(CheckKind::Red),
        );

    let rejected = resolver.resolve(&theory, Lens::Neutral, &Snapshot::new().with_flag("read_logbook"));
    assert_eq!(
        rejected,
        Resolution::Rejected {
            target: "lighthouse_theory".to_string(),
            reason: "requires Occult Knowledge 2".to_string(),
        }
    );
    assert!(resolver.registry().record("internalise_lighthouse").is_none());

    let ready = Snapshot::new()
        .with_flag("read_logbook")
        .with_skill("Occult Knowledge", 3);
    let resolved = resolver.resolve_forced(&theory, Lens::Neutral, &ready, 10);
    assert_eq!(resolved.resolved().unwrap().kind, TargetKind::Theory);
    assert!(resolver.registry().record("internalise_lighthouse").is_some());
}

#[test]
fn dominant_lens_picks_variant() {
    let resolver = resolver();
    let snap = Snapshot::new()
        .with_attribute("REASON", 4)
        .with_skill("Logic", 2)
        .with_attribute("INTUITION", 1);
    let lens = resolver.dominant_lens(&snap);
    assert_eq!(lens, Lens::Skeptic);

    let spec = TextSpec::new("The light turns on by itself.")
        .with_variant(Lens::Skeptic, "A timer switches the light on.");
    let out = resolver.preview(&spec, lens, &snap);
    assert_eq!(out.text(), "A timer switches the light on.");
    assert_eq!(out.trail().lens(), Some(Lens::Skeptic));
}

#[test]
fn content_loads_from_json() {
    let json = r#"{
        "id": "cellar",
        "kind": "scene",
        "condition": {"predicate": {"kind": "time_of_day", "start_hour": 20, "end_hour": 4}},
        "check": {"skill": "Athletics", "difficulty": 7, "check_id": "cellar_hatch", "bonus": 1},
        "text": {
            "success": {
                "base": "The hatch lifts.",
                "inserts": [
                    {"id": "lamp", "condition": {"predicate": {"kind": "has_item", "item": "lamp"}},
                     "text": "Lamplight finds the steps.", "anchor": "AFTER_LENS"}
                ]
            },
            "failure": {"base": "The hatch will not move."}
        }
    }"#;
    let target: Target = serde_json::from_str(json).unwrap();
    let mut resolver = resolver();

    let noon = Snapshot::new().with_item("lamp");
    assert!(resolver.resolve(&target, Lens::Neutral, &noon).is_rejected());

    let night = Snapshot::new().with_item("lamp").with_hour(22).with_skill("Athletics", 1);
    let resolution = resolver.resolve_forced(&target, Lens::Neutral, &night, 5);
    assert_eq!(resolution.outcome().unwrap().total, 7);
    assert_eq!(
        resolution.text(),
        Some("The hatch lifts.\nLamplight finds the steps.")
    );
}

#[test]
fn choice_content_with_ranges_and_transitions() {
    let json = r#"{
        "id": "answer_phone",
        "kind": "choice",
        "label": "Answer the phone",
        "condition": {"and": [
            {"predicate": {"kind": "sanity_range", "min": 20, "max": 80}},
            {"NOT": {"predicate": {"kind": "theory_disproven", "theory": "the_caller_is_real"}}}
        ]},
        "text": {"success": {"base": "Static, then breathing."}},
        "transitions": [
            {"condition": {"predicate": {"kind": "attention_range", "min": 50, "max": 100}},
             "next_scene": "the_voice"}
        ],
        "default_scene": "kitchen"
    }"#;
    let target: Target = serde_json::from_str(json).unwrap();
    let mut resolver = resolver();

    let lucid = Snapshot::new();
    assert!(resolver.resolve(&target, Lens::Neutral, &lucid).is_rejected());

    let shaken = Snapshot::new().with_sanity(80.0);
    let calm = resolver.resolve(&target, Lens::Neutral, &shaken);
    assert_eq!(calm.resolved().unwrap().next_scene.as_deref(), Some("kitchen"));

    let watched = shaken.clone().with_attention(50.0);
    let noticed = resolver.resolve(&target, Lens::Neutral, &watched);
    assert_eq!(noticed.resolved().unwrap().next_scene.as_deref(), Some("the_voice"));

    let disproven = watched.with_disproven("the_caller_is_real");
    assert!(resolver.resolve(&target, Lens::Neutral, &disproven).is_rejected());
}
