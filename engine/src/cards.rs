// ═══════════════════════════════════════════════════════════════════════
// Card catalog — static card data, keyed by location
// The catalog is the immutable source of truth; decks are working copies
// of its ids (see deck.rs).
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ConfigError;
use crate::types::*;

/// Index of a card inside the catalog that minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(u16);

impl CardId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Immutable card template.
#[derive(Debug, Clone, Copy)]
pub struct CardDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub location: Location,
    pub effects: &'static [Effect],
}

impl CardDef {
    pub fn probability(&self) -> Option<&Effect> {
        self.effects.iter().find(|e| e.is_probability())
    }

    pub fn choice(&self) -> Option<&Effect> {
        self.effects.iter().find(|e| e.is_choice())
    }

    pub fn base_effects(&self) -> Vec<BaseEffect> {
        self.effects.iter().filter_map(Effect::as_base).collect()
    }
}

/// A validated set of cards: at least one per location, unique ids.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    cards: &'static [CardDef],
}

impl Catalog {
    pub fn new(cards: &'static [CardDef]) -> Result<Catalog, ConfigError> {
        if cards.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        if cards.len() > usize::from(u16::MAX) {
            return Err(ConfigError::InvalidRules(format!("catalog too large: {} cards", cards.len())));
        }
        let mut seen = HashSet::new();
        for card in cards {
            if !seen.insert(card.id) {
                return Err(ConfigError::DuplicateCardId(card.id));
            }
        }
        for location in Location::ALL {
            if !cards.iter().any(|c| c.location == location) {
                return Err(ConfigError::EmptyPool(location));
            }
        }
        Ok(Catalog { cards })
    }

    /// The game's shipped card set.
    pub fn standard() -> Result<Catalog, ConfigError> {
        Catalog::new(STANDARD_CARDS)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Ids are only minted by this catalog, so the index is always in range.
    pub fn card(&self, id: CardId) -> &'static CardDef {
        &self.cards[id.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = CardId> + '_ {
        (0..self.cards.len()).map(|i| CardId(i as u16))
    }

    /// Full-catalog slice for one location.
    pub fn ids_at(&self, location: Location) -> impl Iterator<Item = CardId> + '_ {
        self.ids().filter(move |&id| self.card(id).location == location)
    }

    pub fn cards_at(&self, location: Location) -> impl Iterator<Item = &'static CardDef> + '_ {
        self.cards.iter().filter(move |c| c.location == location)
    }

    pub fn find(&self, id: &str) -> Option<CardId> {
        self.ids().find(|&c| self.card(c).id == id)
    }
}

// ── Outcome tables for probability cards ──────────────────────────────

fn wildfire_coverage(roll: u8) -> &'static [BaseEffect] {
    const COVERED: &[BaseEffect] = &[BaseEffect::gems(-1)];
    const UNCOVERED: &[BaseEffect] = &[BaseEffect::gems(-2)];
    if roll >= 4 { COVERED } else { UNCOVERED }
}

fn ice_raid(roll: u8) -> &'static [BaseEffect] {
    const DETAINED: &[BaseEffect] = &[BaseEffect::gems(-2)
        .described("Your grandmother got detained by ICE. Pay for an immigration lawyer.")];
    if roll >= 3 { &[] } else { DETAINED }
}

fn scholarship_competition(roll: u8) -> &'static [BaseEffect] {
    const AWARDED: &[BaseEffect] = &[BaseEffect::gems(2)];
    if roll >= 4 { AWARDED } else { &[] }
}

fn hotel_banquet_shift(roll: u8) -> &'static [BaseEffect] {
    const BIG_TIPS: &[BaseEffect] = &[BaseEffect::gems(3), BaseEffect::gpa(-1)];
    const SLOW_NIGHT: &[BaseEffect] = &[BaseEffect::gems(1), BaseEffect::gpa(-1)];
    if roll >= 5 { BIG_TIPS } else { SLOW_NIGHT }
}

// ── Standard catalog ───────────────────────────────────────────────────

const REDLINED: Location = Location::Neighborhood(Neighborhood::Redlined);
const GENTRIFIED: Location = Location::Neighborhood(Neighborhood::Gentrified);
const MIDDLE_INCOME: Location = Location::Neighborhood(Neighborhood::MiddleIncome);
const RICH: Location = Location::Neighborhood(Neighborhood::Rich);
const STORE: Location = Location::Commercial(Commercial::Store);
const HOTEL: Location = Location::Commercial(Commercial::Hotel);
const TUTOR: Location = Location::Commercial(Commercial::Tutor);

const DECLINE: ChoiceOption = ChoiceOption { label: "Decline", effects: &[] };

macro_rules! card {
    ($id:expr, $title:expr, $location:expr, $desc:expr, [$($effect:expr),* $(,)?]) => {
        CardDef {
            id: $id,
            title: $title,
            description: $desc,
            location: $location,
            effects: &[$($effect),*],
        }
    };
}

use Effect::Base;

pub static STANDARD_CARDS: &[CardDef] = &[
    // ── Redlined: setbacks ──
    card!("red-n-1", "Food Desert", REDLINED,
        "Your neighborhood is classified as a food desert. You spend extra time and gems traveling for groceries.",
        [Base(BaseEffect::gems(-1))]),
    card!("red-n-2", "Limited Library Hours", REDLINED,
        "The nearest library branch has limited hours due to budget cuts. You can't always study there anymore.",
        [Base(BaseEffect::gpa(-1))]),
    card!("red-n-3", "Parent Works Two Jobs", REDLINED,
        "Your parent works two jobs, leaving little time to help with school.",
        [Base(BaseEffect::gpa(-1))]),
    card!("red-n-4", "Wildfire Health Impact", REDLINED,
        "A wildfire leads to poor air quality, hitting low-income neighborhoods hardest. You have to pay for healthcare.",
        [Effect::Probability {
            description: "Roll a die. Roll a 4 or higher for better healthcare coverage.",
            outcome: wildfire_coverage,
        }]),
    card!("red-n-5", "Unreliable Public Transit", REDLINED,
        "Your neighborhood's public transit is unreliable. You're late to school.",
        [Base(BaseEffect::gpa(-1))]),
    card!("red-n-6", "Limited School Resources", REDLINED,
        "Your school lacks advanced courses. You struggle with preparing for the SAT.",
        [Base(BaseEffect::gpa(-1))]),
    card!("red-n-7", "Family Healthcare Crisis", REDLINED,
        "Your younger sibling got sick and your parents can't take time off work. You stay home to take care of them.",
        [Base(BaseEffect::gpa(-1))]),
    card!("red-n-8", "Utility Bills Crisis", REDLINED,
        "Your family can't afford the rising utility bills and the electricity is cut off. Lose a study session.",
        [Base(BaseEffect::gpa(-1))]),
    card!("red-n-9", "ICE Raids", REDLINED,
        "ICE raids in your community have caused panic. Your family avoids legal trouble but lives in fear.",
        [Effect::Probability {
            description: "Roll a die. Roll a 3 or higher to be safe.",
            outcome: ice_raid,
        }]),
    card!("red-n-10", "Medical Emergency", REDLINED,
        "Your uninsured family member needs urgent medical care, and you have to help.",
        [Base(BaseEffect::gems(-3)), Base(BaseEffect::gpa(-1))]),
    // ── Redlined: breaks ──
    card!("red-p-1", "Massive Scholarship", REDLINED,
        "You just received a massive scholarship!",
        [Base(BaseEffect::gems(2))]),
    card!("red-p-2", "Sibling Support", REDLINED,
        "Your older sibling helps you study for a test.",
        [Base(BaseEffect::gpa(1))]),
    card!("red-p-3", "Library Grant", REDLINED,
        "Your underfunded library finally gets a grant for STEM workshops, and you learn coding for free.",
        [Base(BaseEffect::gpa(1))]),
    card!("red-p-4", "Urban Farm Project", REDLINED,
        "A new urban farm gives families access to free, healthy produce. You eat better and feel more energized.",
        [Base(BaseEffect::gems(1)), Base(BaseEffect::gpa(1))]),

    // ── Gentrified ──
    card!("gen-n-1", "Community Center Closure", GENTRIFIED,
        "Gentrification forces your favorite community center to shut down. You can't study there anymore.",
        [Base(BaseEffect::gpa(-1))]),
    card!("gen-n-2", "Rent Control Rollback", GENTRIFIED,
        "The city rolls back rent control. Your family's rent spikes.",
        [Base(BaseEffect::gems(-1))]),
    card!("gen-n-3", "Tech Company Move-In", GENTRIFIED,
        "A new tech company moves in, driving up housing prices. Your family puts off any plans to buy a house.",
        [Base(BaseEffect::gems(-1))]),
    card!("gen-p-1", "Private Tutoring", GENTRIFIED,
        "Your neighbor gets a private tutor and offers you one free tutoring session.",
        [Base(BaseEffect::gpa(1))]),
    card!("gen-p-2", "Summer Internship", GENTRIFIED,
        "Your affluent neighbor's parent pulls strings to get you a summer internship.",
        [Base(BaseEffect::gpa(1))]),
    card!("gen-p-3", "Writing Competition", GENTRIFIED,
        "You win a creative writing competition and get some prize gems.",
        [Base(BaseEffect::gems(1))]),
    card!("gen-p-4", "Affordable Housing", GENTRIFIED,
        "Your family secures one of the new rent-controlled apartments in the neighborhood.",
        [Base(BaseEffect::gems(2))]),

    // ── Middle income ──
    card!("mid-n-1", "Scholarship Competition", MIDDLE_INCOME,
        "A scholarship opportunity is available, but preference is given to students from wealthier schools.",
        [Effect::Probability {
            description: "Roll a die to see if you qualify.",
            outcome: scholarship_competition,
        }]),
    card!("mid-n-2", "AI Layoffs", MIDDLE_INCOME,
        "One of your parents gets laid off as a tech company automates their team.",
        [Base(BaseEffect::gems(-2))]),
    card!("mid-p-1", "PTA Funding", MIDDLE_INCOME,
        "The parent association funds new AP classes at your school.",
        [Base(BaseEffect::gpa(1))]),
    card!("mid-p-2", "Public Park Upgrade", MIDDLE_INCOME,
        "City investment in public parks gives you free recreation to keep you healthy and happy.",
        [Base(BaseEffect::gpa(1))]),

    // ── Rich ──
    card!("rich-p-1", "Connected Parents", RICH,
        "A neighbor's parent pulls strings for a summer internship that helps your grades.",
        [Base(BaseEffect::gpa(1))]),
    card!("rich-p-2", "Private Tutoring", RICH,
        "Your parents can afford a private tutor to help you with difficult subjects.",
        [Base(BaseEffect::gpa(1))]),
    card!("rich-p-3", "SAT Prep Course", RICH,
        "Your family enrolls you in an expensive SAT prep course.",
        [Base(BaseEffect::gpa(2))]),
    card!("rich-p-4", "Alumni Connections", RICH,
        "Your parent is an alumnus of a prestigious university.",
        [Base(BaseEffect::gpa(1))]),
    card!("rich-p-5", "Family Connections", RICH,
        "Your parents' connections help you land a prestigious internship.",
        [Base(BaseEffect::gpa(2))]),
    card!("rich-p-6", "Focus on School", RICH,
        "Your parents handle all chores, so you can focus entirely on school.",
        [Base(BaseEffect::gpa(1))]),

    // ── Commercial (never depleted) ──
    card!("loc-store-1", "Corner Store Job", STORE,
        "The local corner store is hiring part-time help.",
        [Effect::Choice {
            description: None,
            options: &[
                DECLINE,
                ChoiceOption {
                    label: "Accept job - Cashier",
                    effects: &[BaseEffect::gems(1), BaseEffect::gpa(-1)],
                },
            ],
        }]),
    card!("loc-store-2", "School Supplies", STORE,
        "Your calculator breaks the week before finals.",
        [Effect::Choice {
            description: Some("Buy a new one, or borrow from friends?"),
            options: &[
                ChoiceOption { label: "Borrow", effects: &[BaseEffect::gpa(-1)] },
                ChoiceOption { label: "Buy a calculator", effects: &[BaseEffect::gems(-2)] },
            ],
        }]),
    card!("loc-hotel-1", "Part-time Job Opportunity", HOTEL,
        "Your family is struggling financially, so you consider taking on a part-time job at the hotel.",
        [Effect::Choice {
            description: None,
            options: &[
                DECLINE,
                ChoiceOption {
                    label: "Accept job - Valet",
                    effects: &[BaseEffect::gems(2), BaseEffect::gpa(-2)],
                },
            ],
        }]),
    card!("loc-hotel-2", "Banquet Shift", HOTEL,
        "The hotel needs extra hands for a wedding banquet on a school night.",
        [Effect::Probability {
            description: "Roll a die. Roll a 5 or higher for a generous crowd.",
            outcome: hotel_banquet_shift,
        }]),
    card!("loc-tutor-1", "Paid Tutoring", TUTOR,
        "The tutoring center offers a weekly session for a fee.",
        [Effect::Choice {
            description: None,
            options: &[
                DECLINE,
                ChoiceOption {
                    label: "Pay for a session",
                    effects: &[BaseEffect::gems(-2), BaseEffect::gpa(1)],
                },
            ],
        }]),
    card!("loc-tutor-2", "Free Study Hall", TUTOR,
        "The tutoring center opens its doors for a free study hall.",
        [Base(BaseEffect::gpa(1))]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_is_valid() {
        let catalog = Catalog::standard().unwrap();
        assert_eq!(catalog.len(), STANDARD_CARDS.len());
        for location in Location::ALL {
            assert!(catalog.ids_at(location).count() >= 1, "{location} has no cards");
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        static DUPES: [CardDef; 2] = [
            card!("x", "A", RICH, "", []),
            card!("x", "B", RICH, "", []),
        ];
        assert_eq!(Catalog::new(&DUPES).unwrap_err(), ConfigError::DuplicateCardId("x"));
    }

    #[test]
    fn missing_pool_is_rejected() {
        static ONLY_RICH: [CardDef; 1] = [card!("r", "R", RICH, "", [])];
        assert!(matches!(Catalog::new(&ONLY_RICH), Err(ConfigError::EmptyPool(_))));
        assert_eq!(Catalog::new(&[]).unwrap_err(), ConfigError::EmptyCatalog);
    }

    #[test]
    fn outcome_tables_are_pure() {
        assert_eq!(wildfire_coverage(4), wildfire_coverage(4));
        assert_eq!(wildfire_coverage(6)[0].magnitude, -1);
        assert_eq!(wildfire_coverage(1)[0].magnitude, -2);
        assert!(ice_raid(3).is_empty());
        assert_eq!(ice_raid(2).len(), 1);
    }

    #[test]
    fn choice_cards_lead_with_decline() {
        let catalog = Catalog::standard().unwrap();
        let id = catalog.find("loc-hotel-1").unwrap();
        match catalog.card(id).choice() {
            Some(Effect::Choice { options, .. }) => {
                assert_eq!(options[0].label, "Decline");
                assert!(options[0].effects.is_empty());
            }
            other => panic!("expected choice, got {other:?}"),
        }
    }
}
