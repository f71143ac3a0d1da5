pub mod agent;
pub mod random;
pub mod heuristic;

pub use agent::Agent;
pub use random::RandomAgent;
pub use heuristic::HeuristicAgent;

use zipcode_engine::Catalog;

/// Build an agent by its command-line name.
pub fn by_name(name: &str, catalog: &Catalog, seed: u64) -> Option<Box<dyn Agent>> {
    match name.to_ascii_lowercase().as_str() {
        "random" => Some(Box::new(RandomAgent::new(seed))),
        "heuristic" => Some(Box::new(HeuristicAgent::new(catalog, seed))),
        _ => None,
    }
}

pub const AGENT_NAMES: [&str; 2] = ["random", "heuristic"];
