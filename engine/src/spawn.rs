// ═══════════════════════════════════════════════════════════════════════
// Spawn profiles — the neighborhood a player is born into
// ═══════════════════════════════════════════════════════════════════════

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::board::canonical_position_of;
use crate::types::{Neighborhood, Position};

/// Starting-condition bundle. One per neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpawnProfile {
    pub id: &'static str,
    pub display_name: &'static str,
    pub neighborhood: Neighborhood,
    pub building_art: &'static str,
    pub starting_gems: u32,
    pub description: &'static str,
}

impl SpawnProfile {
    pub fn starting_position(&self) -> Position {
        canonical_position_of(self.neighborhood)
    }
}

pub static SPAWN_PROFILES: [SpawnProfile; 4] = [
    SpawnProfile {
        id: "rich",
        display_name: "Wealthy Suburb",
        neighborhood: Neighborhood::Rich,
        building_art: "mansion",
        starting_gems: 200,
        description: "Tree-lined streets, well-funded schools and parents with time and money to spare.",
    },
    SpawnProfile {
        id: "gentrified",
        display_name: "Gentrifying District",
        neighborhood: Neighborhood::Gentrified,
        building_art: "house",
        starting_gems: 120,
        description: "New cafes and rising rents. Opportunity is arriving, but so is displacement.",
    },
    SpawnProfile {
        id: "redlined",
        display_name: "Historically Redlined Neighborhood",
        neighborhood: Neighborhood::Redlined,
        building_art: "cottage",
        starting_gems: 80,
        description: "Decades of disinvestment left underfunded schools and few nearby services.",
    },
    SpawnProfile {
        id: "middle-income",
        display_name: "Middle-Income Neighborhood",
        neighborhood: Neighborhood::MiddleIncome,
        building_art: "skyscraper",
        starting_gems: 150,
        description: "Stable jobs and decent schools, one layoff away from a hard year.",
    },
];

pub fn profile_for(neighborhood: Neighborhood) -> &'static SpawnProfile {
    match neighborhood {
        Neighborhood::Rich => &SPAWN_PROFILES[0],
        Neighborhood::Gentrified => &SPAWN_PROFILES[1],
        Neighborhood::Redlined => &SPAWN_PROFILES[2],
        Neighborhood::MiddleIncome => &SPAWN_PROFILES[3],
    }
}

/// Uniform pick over the four profiles.
pub fn choose(rng: &mut impl Rng) -> &'static SpawnProfile {
    SPAWN_PROFILES.choose(rng).unwrap_or(&SPAWN_PROFILES[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::location_of;
    use crate::types::Location;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn one_profile_per_neighborhood() {
        for n in Neighborhood::ALL {
            assert_eq!(profile_for(n).neighborhood, n);
        }
    }

    #[test]
    fn profiles_start_inside_their_neighborhood() {
        for p in &SPAWN_PROFILES {
            assert_eq!(location_of(p.starting_position()), Location::Neighborhood(p.neighborhood));
        }
    }

    #[test]
    fn choose_reaches_every_profile() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(choose(&mut rng).neighborhood);
        }
        assert_eq!(seen.len(), 4);
    }
}
