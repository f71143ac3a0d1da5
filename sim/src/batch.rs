// ═══════════════════════════════════════════════════════════════════════
// Batch simulation — many seeded playthroughs in parallel, summarized
// per spawn neighborhood
// ═══════════════════════════════════════════════════════════════════════

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use zipcode_agents::by_name;
use zipcode_engine::{Catalog, Neighborhood, RulesConfig};

use crate::error::SimError;
use crate::runner::{run_playthrough, PlaythroughResult};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub agent: String,
    pub rules: RulesConfig,
    pub first_seed: u64,
    pub games: u32,
    pub max_decisions: usize,
}

/// Aggregate outcome for one spawn neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborhoodSummary {
    pub neighborhood: Neighborhood,
    pub games: u32,
    pub graduated: u32,
    pub mean_turns: f64,
    pub mean_final_gpa: f64,
    pub mean_final_gems: f64,
    pub mean_exams_failed: f64,
}

impl NeighborhoodSummary {
    pub fn graduation_rate(&self) -> f64 {
        if self.games == 0 { 0.0 } else { f64::from(self.graduated) / f64::from(self.games) }
    }
}

/// Run `config.games` playthroughs, one agent per seed. Games that fail
/// are logged and left out of the returned results.
pub fn run_batch(config: &BatchConfig, catalog: Catalog) -> Result<Vec<PlaythroughResult>, SimError> {
    config.rules.validate()?;
    // Resolve the agent name once so a typo fails before the pool spins up.
    by_name(&config.agent, &catalog, 0).ok_or_else(|| SimError::UnknownAgent(config.agent.clone()))?;

    let seeds: Vec<u64> = (0..u64::from(config.games)).map(|g| config.first_seed.wrapping_add(g)).collect();
    let results: Vec<Result<PlaythroughResult, SimError>> = seeds.par_iter()
        .map(|&seed| {
            let mut agent = by_name(&config.agent, &catalog, seed)
                .ok_or_else(|| SimError::UnknownAgent(config.agent.clone()))?;
            run_playthrough(agent.as_mut(), &config.rules, catalog, seed, config.max_decisions)
        })
        .collect();

    let mut ok = Vec::with_capacity(results.len());
    for (seed, result) in seeds.iter().zip(results) {
        match result {
            Ok(r) => ok.push(r),
            Err(e) => warn!(seed, error = %e, "playthrough failed"),
        }
    }
    info!(agent = %config.agent, games = config.games, completed = ok.len(), "batch finished");
    Ok(ok)
}

/// Group results by spawn neighborhood, in `Neighborhood::ALL` order.
pub fn summarize(results: &[PlaythroughResult]) -> Vec<NeighborhoodSummary> {
    let mut groups: BTreeMap<Neighborhood, Vec<&PlaythroughResult>> = BTreeMap::new();
    for r in results {
        groups.entry(r.neighborhood).or_default().push(r);
    }

    Neighborhood::ALL.iter()
        .filter_map(|n| groups.get(n).map(|rs| (*n, rs)))
        .map(|(neighborhood, rs)| {
            let n = rs.len() as f64;
            let mean = |f: &dyn Fn(&PlaythroughResult) -> f64| rs.iter().map(|r| f(r)).sum::<f64>() / n;
            NeighborhoodSummary {
                neighborhood,
                games: rs.len() as u32,
                graduated: rs.iter().filter(|r| r.graduated).count() as u32,
                mean_turns: mean(&|r| f64::from(r.turns)),
                mean_final_gpa: mean(&|r| f64::from(r.final_gpa)),
                mean_final_gems: mean(&|r| f64::from(r.final_gems)),
                mean_exams_failed: mean(&|r| f64::from(r.exams_failed)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(agent: &str, games: u32) -> BatchConfig {
        BatchConfig {
            agent: agent.to_string(),
            rules: RulesConfig::default(),
            first_seed: 100,
            games,
            max_decisions: 3_000,
        }
    }

    #[test]
    fn batch_runs_every_seed() {
        let results = run_batch(&config("heuristic", 16), Catalog::standard().unwrap()).unwrap();
        assert_eq!(results.len(), 16);
        let seeds: Vec<u64> = results.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, (100..116).collect::<Vec<_>>());
    }

    #[test]
    fn unknown_agent_is_rejected() {
        let err = run_batch(&config("oracle", 1), Catalog::standard().unwrap()).unwrap_err();
        assert!(matches!(err, SimError::UnknownAgent(name) if name == "oracle"));
    }

    #[test]
    fn summary_groups_by_spawn() {
        let results = run_batch(&config("random", 40), Catalog::standard().unwrap()).unwrap();
        let summary = summarize(&results);
        assert_eq!(summary.iter().map(|s| s.games).sum::<u32>(), 40);
        for s in &summary {
            assert!(s.games > 0);
            assert!((0.0..=1.0).contains(&s.graduation_rate()));
        }
        assert!(summary.windows(2).all(|w| {
            let pos = |n: Neighborhood| Neighborhood::ALL.iter().position(|&m| m == n);
            pos(w[0].neighborhood) < pos(w[1].neighborhood)
        }));
    }
}
