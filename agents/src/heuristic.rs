// ═══════════════════════════════════════════════════════════════════════
// Heuristic Agent — plays for GPA using expected card values.
//
// The agent studies the published catalog once at construction and
// scores every location by the mean value of the cards it can draw
// there. It never looks at deck order; the view doesn't carry it.
// ═══════════════════════════════════════════════════════════════════════

use std::collections::HashMap;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::agent::Agent;
use zipcode_engine::board::{is_bus_stop, location_of, position_of};
use zipcode_engine::effects::DIE_FACES;
use zipcode_engine::view::SessionView;
use zipcode_engine::{BaseEffect, CardDef, Catalog, ChoiceOption, Direction, Effect, Location, ResourceKind};

/// One GPA point is worth this many gems.
const GPA_WEIGHT: f64 = 3.0;
/// Extra pull toward a bus stop once the exam is worth sitting.
const BUS_STOP_BONUS: f64 = 4.0;
/// Mean of a fair d6.
const MEAN_ROLL: f64 = 3.5;

pub struct HeuristicAgent {
    rng: ChaCha8Rng,
    location_values: HashMap<Location, f64>,
}

impl HeuristicAgent {
    pub fn new(catalog: &Catalog, seed: u64) -> Self {
        let location_values = Location::ALL.iter()
            .map(|&loc| (loc, location_value(catalog, loc)))
            .collect();
        HeuristicAgent {
            rng: ChaCha8Rng::seed_from_u64(seed),
            location_values,
        }
    }

    pub fn value_of(&self, location: Location) -> f64 {
        self.location_values.get(&location).copied().unwrap_or(0.0)
    }

    /// Sit the exam when the odds of passing are at least even.
    fn exam_is_favorable(view: &SessionView) -> bool {
        f64::from(view.resources.gpa) + MEAN_ROLL >= f64::from(view.exam_pass_threshold)
    }
}

// ── Scoring ────────────────────────────────────────────────────────────

fn effects_value(effects: &[BaseEffect]) -> f64 {
    effects.iter()
        .map(|e| match e.kind {
            ResourceKind::Gems => f64::from(e.magnitude),
            ResourceKind::Gpa => f64::from(e.magnitude) * GPA_WEIGHT,
        })
        .sum()
}

fn option_value(option: &ChoiceOption) -> f64 {
    effects_value(option.effects)
}

fn card_value(card: &CardDef) -> f64 {
    if let Some(Effect::Probability { outcome, .. }) = card.probability() {
        let faces = DIE_FACES.count() as f64;
        return DIE_FACES.map(|roll| effects_value(outcome(roll))).sum::<f64>() / faces;
    }
    if let Some(Effect::Choice { options, .. }) = card.choice() {
        return options.iter().map(option_value).fold(f64::NEG_INFINITY, f64::max);
    }
    effects_value(&card.base_effects())
}

fn location_value(catalog: &Catalog, location: Location) -> f64 {
    let (total, count) = catalog.cards_at(location)
        .fold((0.0, 0usize), |(total, count), card| (total + card_value(card), count + 1));
    if count == 0 { 0.0 } else { total / count as f64 }
}

impl Agent for HeuristicAgent {
    fn name(&self) -> &str { "Heuristic" }

    fn roll_die(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }

    fn attempt_exam(&mut self, view: &SessionView) -> bool {
        Self::exam_is_favorable(view)
    }

    fn choose_direction(&mut self, view: &SessionView, roll: u8) -> Direction {
        let exam_ready = Self::exam_is_favorable(view);
        let score = |dir: Direction| {
            let to = position_of(dir, u32::from(roll), view.position);
            let bonus = if exam_ready && is_bus_stop(to) { BUS_STOP_BONUS } else { 0.0 };
            self.value_of(location_of(to)) + bonus
        };
        let (forward, backward) = (score(Direction::Forward), score(Direction::Backward));
        trace!(roll, forward, backward, "direction scores");

        if forward > backward {
            Direction::Forward
        } else if backward > forward {
            Direction::Backward
        } else {
            Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())]
        }
    }

    fn choose_option(&mut self, view: &SessionView, options: &[ChoiceOption]) -> usize {
        // A GPA loss that would make the exam unwinnable this lap is
        // weighed twice.
        let near_exam = Self::exam_is_favorable(view);
        options.iter()
            .enumerate()
            .map(|(i, o)| {
                let gpa_loss: i32 = o.effects.iter()
                    .filter(|e| e.kind == ResourceKind::Gpa && e.magnitude < 0)
                    .map(|e| e.magnitude)
                    .sum();
                let penalty = if near_exam { f64::from(gpa_loss) * GPA_WEIGHT } else { 0.0 };
                (i, option_value(o) + penalty)
            })
            .fold((0, f64::NEG_INFINITY), |best, (i, v)| if v > best.1 { (i, v) } else { best })
            .0
    }

    fn close_early(&mut self, _view: &SessionView) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zipcode_engine::{session_view, Commercial, Neighborhood, RulesConfig, Session};

    fn agent() -> HeuristicAgent {
        HeuristicAgent::new(&Catalog::standard().unwrap(), 11)
    }

    #[test]
    fn rich_blocks_outscore_redlined() {
        let a = agent();
        let rich = a.value_of(Location::Neighborhood(Neighborhood::Rich));
        let redlined = a.value_of(Location::Neighborhood(Neighborhood::Redlined));
        assert!(rich > redlined, "rich {rich} vs redlined {redlined}");
    }

    #[test]
    fn choice_cards_score_their_best_option() {
        let a = agent();
        assert!(a.value_of(Location::Commercial(Commercial::Tutor)) > 0.0);
        assert!(a.value_of(Location::Commercial(Commercial::Hotel)) < 0.0);
    }

    #[test]
    fn picks_best_option() {
        let mut a = agent();
        let session = Session::new(RulesConfig::default(), Catalog::standard().unwrap(), 1).unwrap();
        let view = session_view(&session);
        const STUDY: &[BaseEffect] = &[BaseEffect::gpa(1)];
        const WORK: &[BaseEffect] = &[BaseEffect::gems(2)];
        let options = [
            ChoiceOption { label: "Decline", effects: &[] },
            ChoiceOption { label: "Study", effects: STUDY },
            ChoiceOption { label: "Work", effects: WORK },
        ];
        assert_eq!(a.choose_option(&view, &options), 1);
    }

    #[test]
    fn steers_toward_better_block() {
        let mut a = agent();
        let rules = RulesConfig { spawn: Some(Neighborhood::Redlined), ..RulesConfig::default() };
        let session = Session::new(rules, Catalog::standard().unwrap(), 1).unwrap();
        let view = session_view(&session);
        // From 12: backward 6 lands on 6 (gentrified), forward 6 on 18 (middle-income).
        assert_eq!(a.choose_direction(&view, 6), Direction::Forward);
    }

    #[test]
    fn exam_only_when_odds_are_even() {
        let mut a = agent();
        let mut session = Session::new(RulesConfig::default(), Catalog::standard().unwrap(), 1).unwrap();
        session.start_game();
        assert!(!a.attempt_exam(&session_view(&session)));
        session.update_resource(ResourceKind::Gpa, 5);
        assert!(a.attempt_exam(&session_view(&session)));
    }
}
