// ═══════════════════════════════════════════════════════════════════════
// Session view — the read-only projection handed to the render layer
// and to agents. Agents decide from a SessionView, never from the raw
// session, so they cannot see deck order or touch state directly.
// ═══════════════════════════════════════════════════════════════════════

use serde::Serialize;

use crate::board::is_bus_stop;
use crate::cards::{CardDef, CardId};
use crate::session::Session;
use crate::types::*;

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub lifecycle: Lifecycle,
    pub panel: Panel,
    pub resources: Resources,
    pub position: Position,
    pub location: Location,
    pub neighborhood: Neighborhood,
    pub at_bus_stop: bool,
    pub exam_pass_threshold: u32,
    pub current_card: Option<CardView>,
    /// Cards left per location. Commercial pools never shrink.
    pub deck_remaining: Vec<(Location, usize)>,
    /// Milliseconds until the pending panel transition, if any.
    pub next_transition_in: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub id: CardId,
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub location: Location,
    pub effects: Vec<EffectView>,
    pub final_outcome: Option<Vec<BaseEffect>>,
}

/// Effects with the outcome table hidden: a probability effect only
/// shows its description until it is rolled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum EffectView {
    Base(BaseEffect),
    Probability { description: &'static str },
    Choice { description: Option<&'static str>, options: Vec<ChoiceOption> },
}

impl From<&Effect> for EffectView {
    fn from(effect: &Effect) -> Self {
        match effect {
            Effect::Base(b) => EffectView::Base(*b),
            Effect::Probability { description, .. } => EffectView::Probability { description: *description },
            Effect::Choice { description, options } => EffectView::Choice {
                description: *description,
                options: options.to_vec(),
            },
        }
    }
}

impl CardView {
    fn new(id: CardId, def: &CardDef, final_outcome: Option<Vec<BaseEffect>>) -> CardView {
        CardView {
            id,
            key: def.id,
            title: def.title,
            description: def.description,
            location: def.location,
            effects: def.effects.iter().map(EffectView::from).collect(),
            final_outcome,
        }
    }

    /// Option labels and effects if this card awaits a choice.
    pub fn choice_options(&self) -> Option<&[ChoiceOption]> {
        self.effects.iter().find_map(|e| match e {
            EffectView::Choice { options, .. } => Some(options.as_slice()),
            _ => None,
        })
    }
}

/// Build the observable projection of a session.
pub fn session_view(session: &Session) -> SessionView {
    let state = session.state();
    let catalog = session.catalog();

    let current_card = state.current_card.as_ref().map(|drawn| {
        CardView::new(drawn.id, catalog.card(drawn.id), drawn.final_outcome.clone())
    });

    let deck_remaining = Location::ALL.iter()
        .map(|&loc| (loc, state.deck.remaining(catalog, loc)))
        .collect();

    SessionView {
        lifecycle: state.lifecycle,
        panel: state.panel,
        resources: state.resources,
        position: state.position,
        location: state.location,
        neighborhood: state.profile.neighborhood,
        at_bus_stop: is_bus_stop(state.position),
        exam_pass_threshold: session.rules().exam_pass_threshold,
        current_card,
        deck_remaining,
        next_transition_in: session.next_transition_in(),
    }
}
