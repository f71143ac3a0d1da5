//! Configuration errors. These are fatal and surface before a session
//! starts; invalid intents during play are absorbed, never raised.

use crate::types::{Location, Neighborhood, Position};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The catalog has no cards at all.
    #[error("card catalog is empty")]
    EmptyCatalog,

    /// A location has no cards, so landing there could never draw.
    #[error("card catalog has no cards for {0}")]
    EmptyPool(Location),

    /// Two catalog entries share an id; deck removal is by id.
    #[error("duplicate card id {0:?}")]
    DuplicateCardId(&'static str),

    /// No neighborhood range or commercial tile covers this position.
    #[error("position {0} is not mapped to any location")]
    UnmappedPosition(Position),

    #[error("canonical tile {position} for {neighborhood} lies outside that neighborhood")]
    CanonicalTileOutside { neighborhood: Neighborhood, position: Position },

    #[error("invalid rules: {0}")]
    InvalidRules(String),
}
