//! Property-based tests for the session state machine.
//!
//! Arbitrary intent sequences, valid or not, must never panic, never
//! drive resources negative and always replay to the same state.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use zipcode_engine::{
    Catalog, Direction, Intent, Lifecycle, Panel, ResourceKind, RulesConfig, Session,
};

fn intent() -> impl Strategy<Value = Intent> {
    let direction = prop_oneof![Just(Direction::Forward), Just(Direction::Backward)];
    prop_oneof![
        Just(Intent::StartGame),
        (0u8..9).prop_map(|roll| Intent::RollForMove { roll }),
        (direction, 0u32..30).prop_map(|(direction, distance)| Intent::Move { direction, distance }),
        (0u8..9).prop_map(|roll| Intent::ResolveRoll { roll }),
        (0usize..5).prop_map(|index| Intent::ResolveChoice { index }),
        (0u8..9).prop_map(|roll| Intent::TakeExam { roll }),
        Just(Intent::CloseCard),
        Just(Intent::Tick { elapsed_ms: 1000 }),
        (0u64..10_000).prop_map(|elapsed_ms| Intent::Tick { elapsed_ms }),
        Just(Intent::Restart),
    ]
}

fn session(seed: u64, rules: RulesConfig) -> Session {
    Session::new(rules, Catalog::standard().unwrap(), seed).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Any intent sequence is absorbed without panicking and leaves a
    /// coherent state behind.
    #[test]
    fn prop_random_intents_keep_state_coherent(
        seed in any::<u64>(),
        intents in proptest::collection::vec(intent(), 0..200)
    ) {
        let mut s = session(seed, RulesConfig::default());
        for intent in intents {
            s.apply(intent);
            let state = s.state();
            prop_assert!((state.position as usize) < 24);
            if state.panel.awaits_card() {
                prop_assert!(state.current_card.is_some());
                prop_assert_eq!(state.lifecycle, Lifecycle::Playing);
            }
            if state.lifecycle == Lifecycle::Idle {
                prop_assert_eq!(state.panel, Panel::Move);
            }
        }
    }

    /// Replaying the log reproduces the session exactly.
    #[test]
    fn prop_replay_is_deterministic(
        seed in any::<u64>(),
        intents in proptest::collection::vec(intent(), 0..120)
    ) {
        let mut s = session(seed, RulesConfig::default());
        for intent in intents {
            s.apply(intent);
        }
        let r = Session::replay(RulesConfig::default(), Catalog::standard().unwrap(), seed, s.log()).unwrap();
        prop_assert_eq!(r.state().resources, s.state().resources);
        prop_assert_eq!(r.state().position, s.state().position);
        prop_assert_eq!(r.state().panel, s.state().panel);
        prop_assert_eq!(&r.state().deck, &s.state().deck);
        prop_assert_eq!(r.clock_ms(), s.clock_ms());
        prop_assert_eq!(r.next_transition_in(), s.next_transition_in());
    }

    /// Resource updates saturate at zero and respect the ceiling.
    #[test]
    fn prop_resources_bounded(
        deltas in proptest::collection::vec((any::<bool>(), -500i32..500), 0..100),
        ceiling in proptest::option::of(2u32..40)
    ) {
        let rules = RulesConfig { gpa_ceiling: ceiling, ..RulesConfig::default() };
        let mut s = session(7, rules);
        let mut gems = i64::from(s.state().resources.gems);
        let mut gpa = i64::from(s.state().resources.gpa);

        for (is_gems, delta) in deltas {
            if is_gems {
                s.update_resource(ResourceKind::Gems, delta);
                gems = (gems + i64::from(delta)).max(0);
            } else {
                s.update_resource(ResourceKind::Gpa, delta);
                gpa = (gpa + i64::from(delta)).max(0);
                if let Some(cap) = ceiling {
                    gpa = gpa.min(i64::from(cap));
                }
            }
            prop_assert_eq!(i64::from(s.state().resources.gems), gems);
            prop_assert_eq!(i64::from(s.state().resources.gpa), gpa);
        }
    }

    /// The exam is decided by `gpa + roll >= threshold` alone.
    #[test]
    fn prop_exam_threshold(gpa in 0u32..20, roll in 1u8..=6) {
        let rules = RulesConfig::default();
        let threshold = rules.exam_pass_threshold;
        let mut s = session(3, rules);
        s.start_game();
        let current = s.state().resources.gpa;
        s.update_resource(ResourceKind::Gpa, gpa as i32 - current as i32);

        let outcome = s.take_exam(roll).unwrap();
        prop_assert_eq!(outcome.passed(), gpa + u32::from(roll) >= threshold);
        if outcome.passed() {
            prop_assert_eq!(s.state().lifecycle, Lifecycle::Idle);
        } else {
            prop_assert_eq!(s.state().resources.gpa, gpa.div_ceil(2));
        }
    }
}
