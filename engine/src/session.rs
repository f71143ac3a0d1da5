// ═══════════════════════════════════════════════════════════════════════
// Game session — turn resolution and the panel state machine.
//
// Architecture:
//   The session is a pure state machine. It never does I/O and never
//   rolls dice for the player. The render layer (or an agent) reads the
//   current `panel`, decides, and feeds an `Intent` back via `apply()`.
//
// Flow:
//   1. `StartGame` moves the lifecycle from Idle to Playing
//   2. `RollForMove` → Reveal → (timer) → PendingAction
//   3. `Move` lands on a tile, draws a card and classifies it:
//        probability → Probability panel, awaiting `ResolveRoll`
//        choice      → Choice panel, awaiting `ResolveChoice`
//        base only   → applied at once, Effects panel, (timer) → Move
//   4. Resolved interactive cards show Effects, then (timer) → Move
//
// Timers:
//   Display delays are modeled on a logical clock advanced by `Tick`.
//   At most one transition is scheduled at a time. Every panel change
//   bumps `generation`; a scheduled transition only fires if the
//   generation it was scheduled under is still current, so a stale
//   timer can never overwrite a newer panel.
// ═══════════════════════════════════════════════════════════════════════

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::board::{self, is_bus_stop, location_of, position_of};
use crate::cards::{CardDef, Catalog};
use crate::config::RulesConfig;
use crate::deck::Deck;
use crate::effects::{self, is_die_face};
use crate::error::ConfigError;
use crate::spawn::{self, SpawnProfile};
use crate::types::*;

/// Player intents forwarded by the render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "intent")]
pub enum Intent {
    StartGame,
    /// Show a move roll before the direction is picked.
    RollForMove { roll: u8 },
    Move { direction: Direction, distance: u32 },
    /// Settle the current card's probability effect.
    ResolveRoll { roll: u8 },
    /// Settle the current card's choice effect.
    ResolveChoice { index: usize },
    TakeExam { roll: u8 },
    /// Dismiss the effects panel early.
    CloseCard,
    Restart,
    /// Advance the logical clock.
    Tick { elapsed_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum ExamOutcome {
    /// GPA was doubled, then a fresh game was dealt. `gpa` and `gems`
    /// are the values at graduation.
    Passed { roll: u8, score: u32, gpa: u32, gems: u32 },
    /// GPA and gems were halved (rounding up).
    Failed { roll: u8, score: u32, gpa: u32, gems: u32 },
}

impl ExamOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, ExamOutcome::Passed { .. })
    }
}

/// What applying an intent did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentOutcome {
    /// Invalid in the current phase or malformed; state is unchanged.
    Ignored,
    Applied,
    /// A card's effects were resolved and applied (possibly none).
    Resolved(Vec<BaseEffect>),
    Exam(ExamOutcome),
}

impl IntentOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, IntentOutcome::Ignored)
    }

    pub fn effects(&self) -> &[BaseEffect] {
        match self {
            IntentOutcome::Resolved(effects) => effects,
            _ => &[],
        }
    }

    fn into_effects(self) -> Vec<BaseEffect> {
        match self {
            IntentOutcome::Resolved(effects) => effects,
            _ => Vec::new(),
        }
    }
}

/// Signals for the render layer. They carry no payload: everything they
/// refer to is already in the observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notification {
    CardDrawn,
    CardClosed,
    BusStopReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScheduledTransition {
    generation: u64,
    fires_at_ms: u64,
    target: Panel,
}

#[derive(Debug, Clone)]
pub struct Session {
    rules: RulesConfig,
    catalog: Catalog,
    seed: u64,
    rng: ChaCha8Rng,
    state: GameState,
    clock_ms: u64,
    generation: u64,
    scheduled: Option<ScheduledTransition>,
    notifications: Vec<Notification>,
    log: Vec<Intent>,
}

impl Session {
    /// Validate configuration and deal the first (idle) game.
    pub fn new(rules: RulesConfig, catalog: Catalog, seed: u64) -> Result<Session, ConfigError> {
        rules.validate()?;
        board::validate_board()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let profile = pick_profile(&rules, &mut rng);
        let state = fresh_state(&rules, &catalog, profile);

        Ok(Session {
            rules,
            catalog,
            seed,
            rng,
            state,
            clock_ms: 0,
            generation: 0,
            scheduled: None,
            notifications: Vec::new(),
            log: Vec::new(),
        })
    }

    /// Rebuild a session by re-applying a recorded intent log.
    pub fn replay(rules: RulesConfig, catalog: Catalog, seed: u64, intents: &[Intent]) -> Result<Session, ConfigError> {
        let mut session = Session::new(rules, catalog, seed)?;
        for &intent in intents {
            session.apply(intent);
        }
        Ok(session)
    }

    // ── Observation ────────────────────────────────────────────────────

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn log(&self) -> &[Intent] {
        &self.log
    }

    pub fn current_card_def(&self) -> Option<&'static CardDef> {
        self.state.current_card.as_ref().map(|c| self.catalog.card(c.id))
    }

    /// Time until the live scheduled transition fires, if any.
    pub fn next_transition_in(&self) -> Option<u64> {
        self.scheduled
            .filter(|t| t.generation == self.generation)
            .map(|t| t.fires_at_ms.saturating_sub(self.clock_ms))
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // ── Intents ────────────────────────────────────────────────────────

    /// Apply one intent. Every intent is logged, including ignored ones,
    /// so that replay reproduces the exact sequence.
    pub fn apply(&mut self, intent: Intent) -> IntentOutcome {
        self.log.push(intent);
        let outcome = match intent {
            Intent::StartGame => self.handle_start(),
            Intent::RollForMove { roll } => self.handle_roll_for_move(roll),
            Intent::Move { direction, distance } => self.handle_move(direction, distance),
            Intent::ResolveRoll { roll } => self.handle_resolve_roll(roll),
            Intent::ResolveChoice { index } => self.handle_resolve_choice(index),
            Intent::TakeExam { roll } => self.handle_exam(roll),
            Intent::CloseCard => self.handle_close_card(),
            Intent::Restart => {
                self.reset();
                IntentOutcome::Applied
            }
            Intent::Tick { elapsed_ms } => {
                self.advance_clock(elapsed_ms);
                IntentOutcome::Applied
            }
        };
        if outcome.is_ignored() {
            debug!(?intent, panel = ?self.state.panel, lifecycle = ?self.state.lifecycle, "intent ignored");
        }
        outcome
    }

    pub fn start_game(&mut self) -> IntentOutcome {
        self.apply(Intent::StartGame)
    }

    pub fn roll_for_move(&mut self, roll: u8) -> IntentOutcome {
        self.apply(Intent::RollForMove { roll })
    }

    pub fn move_by(&mut self, direction: Direction, distance: u32) -> IntentOutcome {
        self.apply(Intent::Move { direction, distance })
    }

    /// Effects produced by the roll; empty when no probability effect is
    /// awaiting resolution.
    pub fn resolve_roll(&mut self, roll: u8) -> Vec<BaseEffect> {
        self.apply(Intent::ResolveRoll { roll }).into_effects()
    }

    pub fn resolve_choice(&mut self, index: usize) -> Vec<BaseEffect> {
        self.apply(Intent::ResolveChoice { index }).into_effects()
    }

    pub fn take_exam(&mut self, roll: u8) -> Option<ExamOutcome> {
        match self.apply(Intent::TakeExam { roll }) {
            IntentOutcome::Exam(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn close_card(&mut self) -> IntentOutcome {
        self.apply(Intent::CloseCard)
    }

    pub fn restart(&mut self) {
        self.apply(Intent::Restart);
    }

    pub fn tick(&mut self, elapsed_ms: u64) {
        self.apply(Intent::Tick { elapsed_ms });
    }

    // ── Resources ──────────────────────────────────────────────────────

    /// Add a signed delta, flooring at zero and applying the GPA ceiling.
    pub fn update_resource(&mut self, kind: ResourceKind, delta: i32) {
        let resources = &mut self.state.resources;
        match kind {
            ResourceKind::Gems => resources.gems = resources.gems.saturating_add_signed(delta),
            ResourceKind::Gpa => {
                let gpa = resources.gpa.saturating_add_signed(delta);
                resources.gpa = self.rules.gpa_ceiling.map_or(gpa, |cap| gpa.min(cap));
            }
        }
    }

    fn apply_effects(&mut self, effects: &[BaseEffect]) {
        for effect in effects {
            let delta = effects::resolve_base(effect);
            if let Some(gems) = delta.gems {
                self.update_resource(ResourceKind::Gems, gems);
            }
            if let Some(gpa) = delta.gpa {
                self.update_resource(ResourceKind::Gpa, gpa);
            }
        }
    }

    /// Deal a fresh idle game from a newly chosen spawn profile. The RNG
    /// and clock carry on; any pending timer is invalidated.
    pub fn reset(&mut self) {
        let profile = pick_profile(&self.rules, &mut self.rng);
        self.state = fresh_state(&self.rules, &self.catalog, profile);
        self.generation += 1;
        self.scheduled = None;
        info!(neighborhood = %profile.neighborhood, gems = profile.starting_gems, "new game dealt");
    }

    // ── Handlers ───────────────────────────────────────────────────────

    fn playing(&self) -> bool {
        self.state.lifecycle == Lifecycle::Playing
    }

    fn handle_start(&mut self) -> IntentOutcome {
        if self.playing() {
            return IntentOutcome::Ignored;
        }
        self.state.lifecycle = Lifecycle::Playing;
        self.set_panel(Panel::Move);
        info!(neighborhood = %self.state.profile.neighborhood, seed = self.seed, "game started");
        IntentOutcome::Applied
    }

    fn handle_roll_for_move(&mut self, roll: u8) -> IntentOutcome {
        if !self.playing() || self.state.panel != Panel::Move || !is_die_face(roll) {
            return IntentOutcome::Ignored;
        }
        self.set_panel(Panel::Reveal { roll });
        self.schedule(Panel::PendingAction { roll }, self.rules.reveal_ms);
        IntentOutcome::Applied
    }

    fn handle_move(&mut self, direction: Direction, distance: u32) -> IntentOutcome {
        // The rolled value is still on screen while revealing.
        if !self.playing() || self.state.panel.awaits_card() || matches!(self.state.panel, Panel::Reveal { .. }) {
            return IntentOutcome::Ignored;
        }

        let position = position_of(direction, distance, self.state.position);
        let location = location_of(position);
        self.state.position = position;
        self.state.location = location;
        if is_bus_stop(position) {
            self.notifications.push(Notification::BusStopReached);
        }

        let Some(id) = self.state.deck.draw(&self.catalog, location, &mut self.rng) else {
            // Unreachable with a validated catalog.
            warn!(%location, "no card available to draw");
            self.set_panel(Panel::Move);
            return IntentOutcome::Applied;
        };
        let card = self.catalog.card(id);
        self.state.current_card = Some(DrawnCard { id, final_outcome: None });
        self.notifications.push(Notification::CardDrawn);
        debug!(position, %location, card = card.id, title = card.title, "card drawn");

        if card.probability().is_some() {
            self.set_panel(Panel::Probability);
            IntentOutcome::Applied
        } else if card.choice().is_some() {
            self.set_panel(Panel::Choice);
            IntentOutcome::Applied
        } else {
            let effects = card.base_effects();
            self.apply_effects(&effects);
            self.set_panel(Panel::Effects);
            self.schedule(Panel::Move, self.rules.base_card_display_ms());
            IntentOutcome::Resolved(effects)
        }
    }

    fn handle_resolve_roll(&mut self, roll: u8) -> IntentOutcome {
        if !self.playing() || self.state.panel != Panel::Probability || !is_die_face(roll) {
            return IntentOutcome::Ignored;
        }
        let Some(effect) = self.current_card_def().and_then(CardDef::probability) else {
            return IntentOutcome::Ignored;
        };

        let effects = effects::resolve_probability(effect, roll);
        self.apply_effects(&effects);
        self.record_outcome(&effects);
        self.set_panel(Panel::Effects);
        self.schedule(Panel::Move, self.rules.panel_transition_ms);
        debug!(roll, ?effects, "probability resolved");
        IntentOutcome::Resolved(effects)
    }

    fn handle_resolve_choice(&mut self, index: usize) -> IntentOutcome {
        if !self.playing() || self.state.panel != Panel::Choice {
            return IntentOutcome::Ignored;
        }
        let Some(effect) = self.current_card_def().and_then(CardDef::choice) else {
            return IntentOutcome::Ignored;
        };
        let Effect::Choice { options, .. } = effect else {
            return IntentOutcome::Ignored;
        };
        if index >= options.len() {
            return IntentOutcome::Ignored;
        }

        let effects = effects::resolve_choice(effect, index);
        self.record_outcome(&effects);
        if effects.is_empty() {
            // Declining skips the effects display.
            self.set_panel(Panel::Move);
        } else {
            self.apply_effects(&effects);
            self.set_panel(Panel::Effects);
            self.schedule(Panel::Move, self.rules.panel_transition_ms);
        }
        debug!(index, ?effects, "choice resolved");
        IntentOutcome::Resolved(effects)
    }

    fn handle_exam(&mut self, roll: u8) -> IntentOutcome {
        if !self.playing() || !is_die_face(roll) {
            return IntentOutcome::Ignored;
        }
        let Resources { gems, gpa } = self.state.resources;
        let score = gpa.saturating_add(u32::from(roll));

        if score >= self.rules.exam_pass_threshold {
            self.update_resource(ResourceKind::Gpa, i32::try_from(gpa).unwrap_or(i32::MAX));
            let outcome = ExamOutcome::Passed { roll, score, gpa: self.state.resources.gpa, gems };
            info!(roll, score, gpa = self.state.resources.gpa, "exam passed");
            self.reset();
            IntentOutcome::Exam(outcome)
        } else {
            let resources = &mut self.state.resources;
            resources.gpa = gpa.div_ceil(2);
            resources.gems = gems.div_ceil(2);
            info!(roll, score, gpa = resources.gpa, gems = resources.gems, "exam failed");
            IntentOutcome::Exam(ExamOutcome::Failed { roll, score, gpa: resources.gpa, gems: resources.gems })
        }
    }

    fn handle_close_card(&mut self) -> IntentOutcome {
        if !self.playing() || self.state.panel != Panel::Effects {
            return IntentOutcome::Ignored;
        }
        self.set_panel(Panel::Move);
        self.notifications.push(Notification::CardClosed);
        IntentOutcome::Applied
    }

    fn record_outcome(&mut self, effects: &[BaseEffect]) {
        if let Some(card) = self.state.current_card.as_mut() {
            card.final_outcome = Some(effects.to_vec());
        }
    }

    // ── Panel transitions ──────────────────────────────────────────────

    fn set_panel(&mut self, panel: Panel) {
        self.state.panel = panel;
        self.generation += 1;
    }

    /// Replaces any earlier scheduled transition.
    fn schedule(&mut self, target: Panel, delay_ms: u64) {
        self.scheduled = Some(ScheduledTransition {
            generation: self.generation,
            fires_at_ms: self.clock_ms.saturating_add(delay_ms),
            target,
        });
    }

    fn advance_clock(&mut self, elapsed_ms: u64) {
        self.clock_ms = self.clock_ms.saturating_add(elapsed_ms);
        while let Some(transition) = self.scheduled.filter(|t| t.fires_at_ms <= self.clock_ms) {
            self.scheduled = None;
            if transition.generation != self.generation {
                debug!(target = ?transition.target, "stale transition dropped");
                continue;
            }
            debug!(from = ?self.state.panel, to = ?transition.target, "scheduled transition fired");
            self.set_panel(transition.target);
        }
    }
}

fn pick_profile(rules: &RulesConfig, rng: &mut ChaCha8Rng) -> &'static SpawnProfile {
    match rules.spawn {
        Some(neighborhood) => spawn::profile_for(neighborhood),
        None => spawn::choose(rng),
    }
}

fn fresh_state(rules: &RulesConfig, catalog: &Catalog, profile: &'static SpawnProfile) -> GameState {
    GameState {
        profile,
        resources: Resources { gems: profile.starting_gems, gpa: rules.gpa_baseline },
        position: profile.starting_position(),
        location: Location::Neighborhood(profile.neighborhood),
        deck: Deck::full(catalog),
        current_card: None,
        panel: Panel::Move,
        lifecycle: Lifecycle::Idle,
    }
}
