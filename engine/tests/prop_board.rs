//! Property-based tests for board geometry and the deck.
//!
//! Run with: cargo test -p zipcode-engine --test prop_board

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use zipcode_engine::board::{location_of, position_of, BOARD_SIZE};
use zipcode_engine::deck::Deck;
use zipcode_engine::{Catalog, Direction, Location};

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Forward), Just(Direction::Backward)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Movement always lands on the board, whatever the distance.
    #[test]
    fn prop_position_in_range(
        from in 0u8..24,
        distance in any::<u32>(),
        dir in direction()
    ) {
        let to = position_of(dir, distance, from);
        prop_assert!((to as usize) < BOARD_SIZE);
    }

    /// Moving back the same distance returns to the start.
    #[test]
    fn prop_reverse_move_round_trips(
        from in 0u8..24,
        distance in 0u32..1000,
        dir in direction()
    ) {
        let there = position_of(dir, distance, from);
        prop_assert_eq!(position_of(dir.reverse(), distance, there), from);
    }

    /// A full lap is a no-op.
    #[test]
    fn prop_full_lap_is_identity(from in 0u8..24, laps in 0u32..50, dir in direction()) {
        prop_assert_eq!(position_of(dir, laps * BOARD_SIZE as u32, from), from);
    }

    /// Commercial draws never change the deck.
    #[test]
    fn prop_commercial_pool_never_shrinks(seed in any::<u64>(), draws in 1usize..60) {
        let catalog = Catalog::standard().unwrap();
        let mut deck = Deck::full(&catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let before = deck.clone();

        for i in 0..draws {
            let loc = Location::ALL[4 + i % 3];
            prop_assert!(loc.is_commercial());
            let id = deck.draw(&catalog, loc, &mut rng).unwrap();
            prop_assert_eq!(catalog.card(id).location, loc);
        }
        prop_assert_eq!(deck, before);
    }

    /// A neighborhood draw removes exactly one card, or refills first
    /// when the pool is empty.
    #[test]
    fn prop_neighborhood_pool_decrements_then_refills(
        seed in any::<u64>(),
        picks in proptest::collection::vec(0usize..4, 1..80)
    ) {
        let catalog = Catalog::standard().unwrap();
        let mut deck = Deck::full(&catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for pick in picks {
            let loc = Location::ALL[pick];
            prop_assert!(!loc.is_commercial());
            let full = catalog.ids_at(loc).count();
            let before = deck.remaining(&catalog, loc);
            let id = deck.draw(&catalog, loc, &mut rng).unwrap();

            prop_assert_eq!(catalog.card(id).location, loc);
            prop_assert!(!deck.contains(id));
            let expected = if before == 0 { full - 1 } else { before - 1 };
            prop_assert_eq!(deck.remaining(&catalog, loc), expected);
        }
    }
}

#[test]
fn every_tile_maps_to_one_location() {
    for p in 0..BOARD_SIZE as u8 {
        let loc = location_of(p);
        assert!(Location::ALL.contains(&loc), "tile {p} maps to {loc:?}");
    }
}
