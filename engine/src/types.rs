// ═══════════════════════════════════════════════════════════════════════
// Core types — locations, effects, panels, resources and session state
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::deck::Deck;
use crate::spawn::SpawnProfile;

// ── Board primitives ───────────────────────────────────────────────────

/// Index of a tile on the loop, always in `0..BOARD_SIZE`.
pub type Position = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Backward,
    Forward,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Backward, Direction::Forward];

    /// Signed step: -1 backward, +1 forward.
    pub fn sign(self) -> i32 {
        match self {
            Direction::Backward => -1,
            Direction::Forward => 1,
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::Backward => Direction::Forward,
            Direction::Forward => Direction::Backward,
        }
    }
}

// ── Locations ──────────────────────────────────────────────────────────

/// The four socioeconomic archetypes. Their decks are single-use per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Neighborhood {
    Rich,
    Gentrified,
    Redlined,
    MiddleIncome,
}

impl Neighborhood {
    pub const ALL: [Neighborhood; 4] = [
        Neighborhood::Rich,
        Neighborhood::Gentrified,
        Neighborhood::Redlined,
        Neighborhood::MiddleIncome,
    ];

    /// Stable tag used in storage and on the command line.
    pub fn tag(self) -> &'static str {
        match self {
            Neighborhood::Rich => "rich",
            Neighborhood::Gentrified => "gentrified",
            Neighborhood::Redlined => "redlined",
            Neighborhood::MiddleIncome => "middle-income",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Neighborhood> {
        Neighborhood::ALL.into_iter().find(|n| n.tag() == tag)
    }
}

impl std::fmt::Display for Neighborhood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Commercial establishments. Their decks never deplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Commercial {
    Store,
    Hotel,
    Tutor,
}

impl Commercial {
    pub const ALL: [Commercial; 3] = [Commercial::Store, Commercial::Hotel, Commercial::Tutor];
}

impl std::fmt::Display for Commercial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Commercial::Store => write!(f, "store"),
            Commercial::Hotel => write!(f, "hotel"),
            Commercial::Tutor => write!(f, "tutor"),
        }
    }
}

/// Closed tag set a tile maps to; selects which card pool is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Location {
    Neighborhood(Neighborhood),
    Commercial(Commercial),
}

impl Location {
    pub const ALL: [Location; 7] = [
        Location::Neighborhood(Neighborhood::Rich),
        Location::Neighborhood(Neighborhood::Gentrified),
        Location::Neighborhood(Neighborhood::Redlined),
        Location::Neighborhood(Neighborhood::MiddleIncome),
        Location::Commercial(Commercial::Store),
        Location::Commercial(Commercial::Hotel),
        Location::Commercial(Commercial::Tutor),
    ];

    pub fn is_commercial(self) -> bool {
        matches!(self, Location::Commercial(_))
    }

    pub fn neighborhood(self) -> Option<Neighborhood> {
        match self {
            Location::Neighborhood(n) => Some(n),
            Location::Commercial(_) => None,
        }
    }
}

impl From<Neighborhood> for Location {
    fn from(n: Neighborhood) -> Self {
        Location::Neighborhood(n)
    }
}

impl From<Commercial> for Location {
    fn from(c: Commercial) -> Self {
        Location::Commercial(c)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Neighborhood(n) => n.fmt(f),
            Location::Commercial(c) => c.fmt(f),
        }
    }
}

// ── Effects ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Gems,
    Gpa,
}

/// A direct resource change. Magnitudes are on the point scale (×1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BaseEffect {
    pub kind: ResourceKind,
    pub magnitude: i32,
    /// Optional flavor shown when this effect is the outcome of a roll.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

impl BaseEffect {
    pub const fn gems(magnitude: i32) -> BaseEffect {
        BaseEffect { kind: ResourceKind::Gems, magnitude, description: None }
    }

    pub const fn gpa(magnitude: i32) -> BaseEffect {
        BaseEffect { kind: ResourceKind::Gpa, magnitude, description: None }
    }

    pub const fn described(self, description: &'static str) -> BaseEffect {
        BaseEffect { description: Some(description), ..self }
    }
}

/// Pure mapping from a die face (1–6) to the effects it produces.
pub type OutcomeFn = fn(u8) -> &'static [BaseEffect];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub label: &'static str,
    pub effects: &'static [BaseEffect],
}

/// A unit of card-triggered consequence.
#[derive(Debug, Clone, Copy)]
pub enum Effect {
    Base(BaseEffect),
    Probability { description: &'static str, outcome: OutcomeFn },
    /// The first option conventionally declines with no effects.
    Choice { description: Option<&'static str>, options: &'static [ChoiceOption] },
}

impl Effect {
    pub fn as_base(&self) -> Option<BaseEffect> {
        match self {
            Effect::Base(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_probability(&self) -> bool {
        matches!(self, Effect::Probability { .. })
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, Effect::Choice { .. })
    }
}

// ── Phases ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Start screen: spawn profile chosen, waiting for `start_game`.
    Idle,
    Playing,
}

/// Sub-state of the turn UI, gating which intents are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "panel")]
pub enum Panel {
    /// Awaiting a move roll.
    Move,
    /// Move roll shown; no player action.
    Reveal { roll: u8 },
    /// Player picks a direction for the rolled distance.
    PendingAction { roll: u8 },
    /// Current card has a probability effect awaiting a roll.
    Probability,
    /// Current card has a choice effect awaiting an option.
    Choice,
    /// Resolved deltas on display.
    Effects,
}

impl Panel {
    /// Panels that wait on the current card and block movement.
    pub fn awaits_card(self) -> bool {
        matches!(self, Panel::Probability | Panel::Choice)
    }
}

// ── Session state ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub gems: u32,
    pub gpa: u32,
}

/// The card the player last landed on, with its resolved outcome once an
/// interactive effect has been settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawnCard {
    pub id: CardId,
    pub final_outcome: Option<Vec<BaseEffect>>,
}

/// Everything that is reset when a new game is dealt.
#[derive(Debug, Clone)]
pub struct GameState {
    pub profile: &'static SpawnProfile,
    pub resources: Resources,
    pub position: Position,
    pub location: Location,
    pub deck: Deck,
    pub current_card: Option<DrawnCard>,
    pub panel: Panel,
    pub lifecycle: Lifecycle,
}
