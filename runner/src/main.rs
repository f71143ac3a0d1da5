// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for playing, simulating and replaying games
// ═══════════════════════════════════════════════════════════════════════

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use zipcode_agents::{by_name, AGENT_NAMES};
use zipcode_engine::board::BOARD;
use zipcode_engine::{session_view, Catalog, Intent, Neighborhood, RulesConfig, Session};
use zipcode_sim::{run_batch, run_playthrough, summarize, BatchConfig, Database, NeighborhoodSummary};

#[derive(Parser)]
#[command(name = "zipcode", about = "Zip Code turn engine: play, simulate and replay sessions")]
struct Cli {
    /// JSON file overriding the default rules.
    #[arg(short, long, global = true)]
    rules: Option<PathBuf>,

    /// Fix the spawn neighborhood (rich, gentrified, redlined, middle-income).
    #[arg(long, global = true, value_parser = parse_neighborhood)]
    spawn: Option<Neighborhood>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single playthrough with an agent
    Play {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        /// Agent type: "random" or "heuristic"
        #[arg(short, long, default_value = "heuristic")]
        agent: String,
        #[arg(long, default_value_t = 10_000)]
        max_decisions: usize,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run N seeded playthroughs in parallel and store the statistics
    Simulate {
        #[arg(short, long, default_value_t = 1000)]
        games: u32,
        #[arg(short, long, default_value = "heuristic")]
        agent: String,
        #[arg(long, default_value_t = 42)]
        first_seed: u64,
        #[arg(long, default_value_t = 10_000)]
        max_decisions: usize,
        #[arg(short, long, default_value = "results.db")]
        db: String,
    },
    /// Show per-neighborhood outcomes from the database
    Report {
        #[arg(short, long, default_value = "results.db")]
        db: String,
        /// Restrict to one agent
        #[arg(short, long)]
        agent: Option<String>,
    },
    /// Rebuild a session from a JSON intent log and print its view
    Replay {
        #[arg(short, long)]
        seed: u64,
        log: PathBuf,
    },
    /// Print the board layout
    Board,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let rules = load_rules(cli.rules.as_deref(), cli.spawn)?;
    let catalog = Catalog::standard()?;

    match cli.command {
        Commands::Play { seed, agent, max_decisions, json } => cmd_play(&rules, catalog, seed, &agent, max_decisions, json),
        Commands::Simulate { games, agent, first_seed, max_decisions, db } => {
            let config = BatchConfig { agent, rules, first_seed, games, max_decisions };
            cmd_simulate(&config, catalog, &db)
        }
        Commands::Report { db, agent } => cmd_report(&db, agent.as_deref()),
        Commands::Replay { seed, log } => cmd_replay(rules, catalog, seed, &log),
        Commands::Board => {
            cmd_board();
            Ok(())
        }
    }
}

fn parse_neighborhood(s: &str) -> Result<Neighborhood, String> {
    Neighborhood::from_tag(s).ok_or_else(|| {
        let tags: Vec<&str> = Neighborhood::ALL.iter().map(|n| n.tag()).collect();
        format!("unknown neighborhood {s:?}, expected one of {}", tags.join(", "))
    })
}

fn load_rules(path: Option<&Path>, spawn: Option<Neighborhood>) -> Result<RulesConfig> {
    let mut rules = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            RulesConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => RulesConfig::default(),
    };
    if spawn.is_some() {
        rules.spawn = spawn;
    }
    Ok(rules)
}

fn cmd_play(rules: &RulesConfig, catalog: Catalog, seed: u64, agent_name: &str, max_decisions: usize, json: bool) -> Result<()> {
    let mut agent = by_name(agent_name, &catalog, seed)
        .ok_or_else(|| anyhow!("unknown agent {agent_name:?}, expected one of {}", AGENT_NAMES.join(", ")))?;
    let result = run_playthrough(agent.as_mut(), rules, catalog, seed, max_decisions)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("=== Zip Code ===\n");
    println!("Single playthrough: seed={}, agent={}\n", seed, result.agent);
    println!("  Spawned in:     {} ({} gems)", result.neighborhood, result.starting_gems);
    if result.graduated {
        println!("  Graduated after {} turns with GPA {} and {} gems", result.turns, result.final_gpa, result.final_gems);
    } else {
        println!("  Did not graduate within {} decisions (GPA {}, {} gems)", max_decisions, result.final_gpa, result.final_gems);
    }
    println!("  Exam attempts:  {} ({} failed)", result.exam_attempts, result.exams_failed);
    println!("  Cards drawn:    {} (net {:+} gems, {:+} GPA)", result.cards_drawn, result.card_gems_delta, result.card_gpa_delta);
    println!("  Bus stops:      {}", result.bus_stops_reached);
    println!("  Table time:     {:.1} min", result.elapsed_ms as f64 / 60_000.0);
    Ok(())
}

fn cmd_simulate(config: &BatchConfig, catalog: Catalog, db_path: &str) -> Result<()> {
    println!("=== Simulation: {} games, agent={} ===\n", config.games, config.agent);

    let results = run_batch(config, catalog)?;
    let mut db = Database::new(db_path).with_context(|| format!("opening {db_path}"))?;
    db.store_batch(&results)?;
    info!(stored = results.len(), db = db_path, "simulation stored");

    print_summary(&summarize(&results));
    println!("\n{} of {} games completed", results.len(), config.games);
    println!("Results saved to: {}", db_path);
    println!("Total playthroughs in DB: {}", db.playthrough_count()?);
    Ok(())
}

fn cmd_report(db_path: &str, agent: Option<&str>) -> Result<()> {
    let db = Database::new(db_path).with_context(|| format!("opening {db_path}"))?;
    let report = db.neighborhood_report(agent)?;
    if report.is_empty() {
        println!("No playthroughs found. Run a simulation first.");
        return Ok(());
    }
    println!("=== Outcomes by spawn neighborhood ===\n");
    print_summary(&report);
    Ok(())
}

fn print_summary(rows: &[NeighborhoodSummary]) {
    println!("{:<15} {:>7} {:>9} {:>8} {:>8} {:>8} {:>8}", "Neighborhood", "Games", "Graduated", "Turns", "GPA", "Gems", "Failed");
    println!("{}", "-".repeat(71));
    for s in rows {
        println!(
            "{:<15} {:>7} {:>8.1}% {:>8.1} {:>8.1} {:>8.1} {:>8.2}",
            s.neighborhood.to_string(),
            s.games,
            s.graduation_rate() * 100.0,
            s.mean_turns,
            s.mean_final_gpa,
            s.mean_final_gems,
            s.mean_exams_failed,
        );
    }
}

fn cmd_replay(rules: RulesConfig, catalog: Catalog, seed: u64, log: &Path) -> Result<()> {
    let text = std::fs::read_to_string(log).with_context(|| format!("reading {}", log.display()))?;
    let intents: Vec<Intent> = serde_json::from_str(&text).with_context(|| format!("parsing {}", log.display()))?;
    let session = Session::replay(rules, catalog, seed, &intents)?;
    println!("{}", serde_json::to_string_pretty(&session_view(&session))?);
    Ok(())
}

fn cmd_board() {
    println!("{:>3}  {:<8} {:<15} {:<11} {}", "#", "Size", "Location", "Landmark", "Bus stop");
    for tile in &BOARD {
        println!(
            "{:>3}  {:<8} {:<15} {:<11} {}",
            tile.position,
            format!("{:?}", tile.size),
            tile.location.to_string(),
            tile.landmark.map(|l| format!("{l:?}")).unwrap_or_default(),
            if tile.bus_stop { "yes" } else { "" },
        );
    }
}
