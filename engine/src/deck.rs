// ═══════════════════════════════════════════════════════════════════════
// Deck — the per-session working copy of the catalog.
//
// Neighborhood draws consume the card; when a neighborhood's pool runs
// dry it is refilled from the catalog. Commercial draws leave the deck
// untouched, so store/hotel/tutor pools never deplete.
// ═══════════════════════════════════════════════════════════════════════

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::cards::{CardId, Catalog};
use crate::types::Location;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<CardId>,
}

impl Deck {
    /// A fresh deck holding every catalog card once.
    pub fn full(catalog: &Catalog) -> Deck {
        Deck { cards: catalog.ids().collect() }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains(&id)
    }

    /// Cards left in the pool for one location.
    pub fn remaining(&self, catalog: &Catalog, location: Location) -> usize {
        self.cards.iter().filter(|&&id| catalog.card(id).location == location).count()
    }

    /// Draw uniformly among the cards whose location matches exactly.
    /// Returns `None` only if the catalog itself has no card there, which
    /// `Catalog::new` rules out.
    pub fn draw(&mut self, catalog: &Catalog, location: Location, rng: &mut impl Rng) -> Option<CardId> {
        if self.remaining(catalog, location) == 0 && !location.is_commercial() {
            debug!(%location, "pool exhausted, refilling from catalog");
            self.cards.extend(catalog.ids_at(location));
        }

        let pool: Vec<CardId> = self.cards.iter()
            .copied()
            .filter(|&id| catalog.card(id).location == location)
            .collect();
        let &card = pool.choose(rng)?;

        if !location.is_commercial() {
            if let Some(pos) = self.cards.iter().position(|&c| c == card) {
                self.cards.remove(pos);
            }
        }
        Some(card)
    }
}
