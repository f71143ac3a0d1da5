// ═══════════════════════════════════════════════════════════════════════
// Effect resolver — pure transforms from effects to resource deltas.
// Nothing here mutates state; the session applies what these return.
// ═══════════════════════════════════════════════════════════════════════

use serde::Serialize;

use crate::types::{BaseEffect, Effect, ResourceKind};

/// Die faces accepted by every roll-driven operation.
pub const DIE_FACES: std::ops::RangeInclusive<u8> = 1..=6;

pub fn is_die_face(roll: u8) -> bool {
    DIE_FACES.contains(&roll)
}

/// Concrete change to apply to the player's resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceDelta {
    pub gems: Option<i32>,
    pub gpa: Option<i32>,
}

impl ResourceDelta {
    pub fn is_empty(&self) -> bool {
        self.gems.is_none() && self.gpa.is_none()
    }
}

/// Magnitudes pass through as-is for both resources (point scale).
pub fn resolve_base(effect: &BaseEffect) -> ResourceDelta {
    match effect.kind {
        ResourceKind::Gems => ResourceDelta { gems: Some(effect.magnitude), gpa: None },
        ResourceKind::Gpa => ResourceDelta { gems: None, gpa: Some(effect.magnitude) },
    }
}

/// Sum of a sequence of base effects, per resource.
pub fn total_delta(effects: &[BaseEffect]) -> ResourceDelta {
    effects.iter().map(resolve_base).fold(ResourceDelta::default(), |acc, d| ResourceDelta {
        gems: sum(acc.gems, d.gems),
        gpa: sum(acc.gpa, d.gpa),
    })
}

fn sum(a: Option<i32>, b: Option<i32>) -> Option<i32> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.saturating_add(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

/// Evaluate a probability effect's outcome table for a die face.
/// Non-probability effects and off-die rolls yield nothing.
pub fn resolve_probability(effect: &Effect, roll: u8) -> Vec<BaseEffect> {
    match effect {
        Effect::Probability { outcome, .. } if is_die_face(roll) => outcome(roll).to_vec(),
        _ => Vec::new(),
    }
}

/// Effects of the chosen option. An out-of-range index is not an error:
/// it yields an empty sequence.
pub fn resolve_choice(effect: &Effect, index: usize) -> Vec<BaseEffect> {
    match effect {
        Effect::Choice { options, .. } => options.get(index).map(|o| o.effects.to_vec()).unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChoiceOption;

    fn high_roll_wins(roll: u8) -> &'static [BaseEffect] {
        const WIN: &[BaseEffect] = &[BaseEffect::gems(10)];
        const LOSE: &[BaseEffect] = &[BaseEffect::gems(-10)];
        if roll >= 4 { WIN } else { LOSE }
    }

    const GAMBLE: Effect = Effect::Probability { description: "Roll 4+", outcome: high_roll_wins };

    const JOB: Effect = Effect::Choice {
        description: None,
        options: &[
            ChoiceOption { label: "Decline", effects: &[] },
            ChoiceOption { label: "Accept", effects: &[BaseEffect::gems(2), BaseEffect::gpa(-2)] },
        ],
    };

    #[test]
    fn base_passes_magnitude_through() {
        assert_eq!(resolve_base(&BaseEffect::gems(-3)), ResourceDelta { gems: Some(-3), gpa: None });
        assert_eq!(resolve_base(&BaseEffect::gpa(2)), ResourceDelta { gems: None, gpa: Some(2) });
    }

    #[test]
    fn probability_is_deterministic_per_roll() {
        for _ in 0..5 {
            let effects = resolve_probability(&GAMBLE, 6);
            assert_eq!(total_delta(&effects).gems, Some(10));
        }
        assert_eq!(total_delta(&resolve_probability(&GAMBLE, 3)).gems, Some(-10));
    }

    #[test]
    fn probability_ignores_off_die_rolls() {
        assert!(resolve_probability(&GAMBLE, 0).is_empty());
        assert!(resolve_probability(&GAMBLE, 7).is_empty());
        assert!(resolve_probability(&JOB, 4).is_empty());
    }

    #[test]
    fn choice_is_bounds_checked() {
        assert!(resolve_choice(&JOB, 0).is_empty());
        assert_eq!(resolve_choice(&JOB, 1).len(), 2);
        assert!(resolve_choice(&JOB, 2).is_empty());
        assert!(resolve_choice(&JOB, usize::MAX).is_empty());
    }

    #[test]
    fn totals_sum_per_resource() {
        let delta = total_delta(&[BaseEffect::gems(2), BaseEffect::gpa(-1), BaseEffect::gems(-5)]);
        assert_eq!(delta, ResourceDelta { gems: Some(-3), gpa: Some(-1) });
        assert!(total_delta(&[]).is_empty());
    }
}
