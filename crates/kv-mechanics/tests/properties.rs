//! Property tests for roll arithmetic and check locking.

use kv_mechanics::dice::{CriticalThresholds, DiceEngine, FixedSource, RollOptions, Tier};
use kv_mechanics::{BlockReason, CheckKind, CheckRegistry};
use proptest::prelude::*;

proptest! {
    #[test]
    fn totals_and_margins_add_up(
        faces in (1..=6i32, 1..=6i32),
        modifier in -10..=10i32,
        difficulty in 2..=20i32,
    ) {
        let mut source = FixedSource::from_faces(&[faces.0, faces.1]);
        let outcome = DiceEngine::default().resolve(
            &mut source,
            modifier,
            difficulty,
            &RollOptions::default(),
        );
        prop_assert_eq!(outcome.faces, [faces.0, faces.1]);
        prop_assert_eq!(outcome.total, faces.0 + faces.1 + modifier);
        prop_assert_eq!(outcome.margin, outcome.total - difficulty);
    }

    #[test]
    fn arithmetic_holds_for_any_modifier(
        natural in 2..=12i32,
        modifier in any::<i32>(),
        difficulty in any::<i32>(),
    ) {
        let options = RollOptions::default().forced(natural);
        let outcome =
            DiceEngine::default().resolve(&mut FixedSource::default(), modifier, difficulty, &options);
        prop_assert_eq!(outcome.total, natural.saturating_add(modifier));
        prop_assert_eq!(outcome.margin, outcome.total.saturating_sub(difficulty));
    }

    #[test]
    fn classification_depends_only_on_natural_and_margin(
        natural in 2..=12i32,
        modifier in -10..=10i32,
        difficulty in 2..=20i32,
        allow_partial in any::<bool>(),
    ) {
        let engine = DiceEngine::default();
        let options = RollOptions::default().forced(natural).with_partial(allow_partial);
        let outcome = engine.resolve(&mut FixedSource::default(), modifier, difficulty, &options);
        let expected = Tier::classify(
            natural,
            natural + modifier - difficulty,
            allow_partial,
            CriticalThresholds::default(),
        );
        prop_assert_eq!(outcome.tier, expected);
    }

    #[test]
    fn forced_rolls_always_decompose_into_valid_faces(natural in -50..=50i32) {
        let faces = DiceEngine::decompose(natural);
        prop_assert!((1..=6).contains(&faces[0]));
        prop_assert!((1..=6).contains(&faces[1]));
        prop_assert_eq!(faces[0] + faces[1], natural.clamp(2, 12));
    }

    #[test]
    fn red_checks_stay_locked(natural in 2..=12i32, levels in proptest::collection::vec(0..10i32, 1..8)) {
        let mut registry = CheckRegistry::new();
        let engine = DiceEngine::default();
        registry.attempt(Some("red"), CheckKind::Red, 0, || {
            engine.resolve(&mut FixedSource::default(), 0, 9, &RollOptions::default().forced(natural))
        });
        for level in levels {
            let result = registry.attempt(Some("red"), CheckKind::Red, level, || {
                engine.resolve(&mut FixedSource::default(), level, 9, &RollOptions::default())
            });
            prop_assert_eq!(result.block_reason(), Some(BlockReason::PermanentlyResolved));
        }
    }
}
