// ═══════════════════════════════════════════════════════════════════════
// Random Agent — makes every decision uniformly at random.
// Serves as baseline and for exercising the session's state machine.
// ═══════════════════════════════════════════════════════════════════════

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::agent::Agent;
use zipcode_engine::view::SessionView;
use zipcode_engine::{ChoiceOption, Direction};

pub struct RandomAgent {
    rng: ChaCha8Rng,
    /// Chance of sitting the exam whenever a bus stop is reached.
    exam_chance: f64,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        RandomAgent {
            rng: ChaCha8Rng::seed_from_u64(seed),
            exam_chance: 0.5,
        }
    }

    pub fn with_exam_chance(mut self, chance: f64) -> Self {
        self.exam_chance = chance.clamp(0.0, 1.0);
        self
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str { "Random" }

    fn roll_die(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }

    fn attempt_exam(&mut self, _view: &SessionView) -> bool {
        self.rng.gen_bool(self.exam_chance)
    }

    fn choose_direction(&mut self, _view: &SessionView, _roll: u8) -> Direction {
        Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())]
    }

    fn choose_option(&mut self, _view: &SessionView, options: &[ChoiceOption]) -> usize {
        if options.is_empty() {
            return 0;
        }
        self.rng.gen_range(0..options.len())
    }
}
