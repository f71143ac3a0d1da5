// ═══════════════════════════════════════════════════════════════════════
// Agent Trait — interface for autoplay policies
//
// KEY DESIGN PRINCIPLE:
//   Agents receive a `SessionView` (not the Session), so they see what a
//   player at the table would see: the panel, resources, the face-up
//   card and the per-location pool sizes. They never see deck order or
//   probability outcome tables, and cannot mutate state.
//
//   The session never rolls dice for the player. An agent owns its own
//   RNG and supplies every roll inside the intents it returns.
// ═══════════════════════════════════════════════════════════════════════

use zipcode_engine::view::{CardView, SessionView};
use zipcode_engine::{ChoiceOption, Direction, Intent, Lifecycle, Panel};

/// Trait that all autoplay policies implement.
pub trait Agent: Send {
    fn name(&self) -> &str;

    /// Pick the next intent for the current view. `None` means the agent
    /// is waiting on a scheduled panel transition.
    fn decide(&mut self, view: &SessionView) -> Option<Intent> {
        if view.lifecycle == Lifecycle::Idle {
            return Some(Intent::StartGame);
        }
        match view.panel {
            Panel::Move => {
                let roll = self.roll_die();
                if view.at_bus_stop && self.attempt_exam(view) {
                    Some(Intent::TakeExam { roll })
                } else {
                    Some(Intent::RollForMove { roll })
                }
            }
            Panel::Reveal { .. } => None,
            Panel::PendingAction { roll } => Some(Intent::Move {
                direction: self.choose_direction(view, roll),
                distance: u32::from(roll),
            }),
            Panel::Probability => Some(Intent::ResolveRoll { roll: self.roll_die() }),
            Panel::Choice => {
                let options = view.current_card.as_ref().and_then(CardView::choice_options)?;
                Some(Intent::ResolveChoice { index: self.choose_option(view, options) })
            }
            Panel::Effects => self.close_early(view).then_some(Intent::CloseCard),
        }
    }

    // ── Individual decision methods ────────────────────────────────────

    /// A fair six-sided die.
    fn roll_die(&mut self) -> u8;

    /// Whether to sit the exam. Only asked at a bus stop.
    fn attempt_exam(&mut self, view: &SessionView) -> bool;

    fn choose_direction(&mut self, view: &SessionView, roll: u8) -> Direction;

    /// Index into `options`. Must be in range.
    fn choose_option(&mut self, view: &SessionView, options: &[ChoiceOption]) -> usize;

    /// Dismiss the effects panel instead of waiting it out.
    fn close_early(&mut self, _view: &SessionView) -> bool {
        false
    }
}
