// ═══════════════════════════════════════════════════════════════════════
// Board topology — the fixed 24-tile loop.
// All tile properties are compile-time constants; the board is never
// mutated after it is built.
//
//   0 ── 1 ── 2 ── 3 ── 4 ── 5 ── 6
//   │                             │
//  23                             7
//  ..         (clockwise)        ..
//  19                            11
//   │                             │
//  18 ─ 17 ─ 16 ─ 15 ─ 14 ─ 13 ─ 12
//
// Corners (every 6th tile) hold the neighborhood landmarks.
// ═══════════════════════════════════════════════════════════════════════

use serde::Serialize;

use crate::error::ConfigError;
use crate::types::{Commercial, Direction, Location, Neighborhood, Position};

pub const BOARD_SIZE: usize = 24;
const CORNER_SPACING: u8 = 6;

// ── Landmark positions ─────────────────────────────────────────────────

pub const MANSION: Position = 0;
pub const STORE: Position = 3;
pub const HOUSE: Position = 6;
pub const HOTEL: Position = 9;
pub const COTTAGE: Position = 12;
pub const TUTOR: Position = 15;
pub const SKYSCRAPER: Position = 18;

/// Tiles where the final exam can be entered.
pub const BUS_STOPS: [Position; 3] = [2, 16, 21];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TileSize {
    Corner,
    Regular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Landmark {
    Mansion,
    House,
    Cottage,
    Skyscraper,
    Store,
    Hotel,
    Tutor,
}

/// Static description of a board tile.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Tile {
    pub position: Position,
    pub size: TileSize,
    pub location: Location,
    pub landmark: Option<Landmark>,
    pub bus_stop: bool,
}

/// The board, indexed by position.
pub static BOARD: [Tile; BOARD_SIZE] = build_board();

const fn build_board() -> [Tile; BOARD_SIZE] {
    let mut tiles = [Tile {
        position: 0,
        size: TileSize::Regular,
        location: Location::Neighborhood(Neighborhood::Rich),
        landmark: None,
        bus_stop: false,
    }; BOARD_SIZE];

    let mut i = 0;
    while i < BOARD_SIZE {
        let position = i as Position;
        tiles[i] = Tile {
            position,
            size: if position % CORNER_SPACING == 0 { TileSize::Corner } else { TileSize::Regular },
            location: location_of(position),
            landmark: landmark_at(position),
            bus_stop: is_bus_stop(position),
        };
        i += 1;
    }
    tiles
}

const fn landmark_at(position: Position) -> Option<Landmark> {
    match position {
        MANSION => Some(Landmark::Mansion),
        STORE => Some(Landmark::Store),
        HOUSE => Some(Landmark::House),
        HOTEL => Some(Landmark::Hotel),
        COTTAGE => Some(Landmark::Cottage),
        TUTOR => Some(Landmark::Tutor),
        SKYSCRAPER => Some(Landmark::Skyscraper),
        _ => None,
    }
}

pub const fn is_bus_stop(position: Position) -> bool {
    let mut i = 0;
    while i < BUS_STOPS.len() {
        if BUS_STOPS[i] == position {
            return true;
        }
        i += 1;
    }
    false
}

pub fn tile(position: Position) -> &'static Tile {
    &BOARD[position as usize % BOARD_SIZE]
}

// ── Movement ───────────────────────────────────────────────────────────

/// `(from + direction * distance) mod BOARD_SIZE`, normalized into range.
pub fn position_of(direction: Direction, distance: u32, from: Position) -> Position {
    let size = BOARD_SIZE as i64;
    let raw = i64::from(from) + i64::from(direction.sign()) * i64::from(distance);
    // rem_euclid of a positive modulus is always in 0..size
    raw.rem_euclid(size) as Position
}

// ── Location mapping ───────────────────────────────────────────────────

/// Neighborhood ranges, inclusive. Together they cover the whole loop.
const NEIGHBORHOOD_RANGES: [(Position, Position, Neighborhood); 5] = [
    (21, 23, Neighborhood::Rich),
    (0, 2, Neighborhood::Rich),
    (3, 8, Neighborhood::Gentrified),
    (9, 14, Neighborhood::Redlined),
    (15, 20, Neighborhood::MiddleIncome),
];

/// Returned for a position no range covers. `validate_board` guarantees
/// this is unreachable for `0..BOARD_SIZE`.
const FALLBACK: Location = Location::Neighborhood(Neighborhood::Redlined);

/// Commercial tiles first, then the neighborhood partition.
pub const fn location_of(position: Position) -> Location {
    match commercial_at(position) {
        Some(c) => Location::Commercial(c),
        None => match neighborhood_range_of(position) {
            Some(n) => Location::Neighborhood(n),
            None => FALLBACK,
        },
    }
}

const fn commercial_at(position: Position) -> Option<Commercial> {
    match position {
        STORE => Some(Commercial::Store),
        HOTEL => Some(Commercial::Hotel),
        TUTOR => Some(Commercial::Tutor),
        _ => None,
    }
}

const fn neighborhood_range_of(position: Position) -> Option<Neighborhood> {
    let mut i = 0;
    while i < NEIGHBORHOOD_RANGES.len() {
        let (lo, hi, n) = NEIGHBORHOOD_RANGES[i];
        if position >= lo && position <= hi {
            return Some(n);
        }
        i += 1;
    }
    None
}

/// The corner tile a player born into `neighborhood` starts on.
/// Corners are picked by location: each lies inside its own neighborhood's
/// range, which need not match the building art of the spawn profile.
pub const fn canonical_position_of(neighborhood: Neighborhood) -> Position {
    match neighborhood {
        Neighborhood::Rich => MANSION,
        Neighborhood::Gentrified => HOUSE,
        Neighborhood::Redlined => COTTAGE,
        Neighborhood::MiddleIncome => SKYSCRAPER,
    }
}

/// Checked once before any session starts: every position resolves
/// without the fallback, and every canonical tile sits in its own
/// neighborhood.
pub fn validate_board() -> Result<(), ConfigError> {
    for position in 0..BOARD_SIZE as Position {
        if commercial_at(position).is_none() && neighborhood_range_of(position).is_none() {
            return Err(ConfigError::UnmappedPosition(position));
        }
    }
    for neighborhood in Neighborhood::ALL {
        let position = canonical_position_of(neighborhood);
        if location_of(position) != Location::Neighborhood(neighborhood) {
            return Err(ConfigError::CanonicalTileOutside { neighborhood, position });
        }
    }
    Ok(())
}
