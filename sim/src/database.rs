// ═══════════════════════════════════════════════════════════════════════
// Database — SQLite storage for playthrough statistics
// ═══════════════════════════════════════════════════════════════════════

use rusqlite::{params, Connection};
use tracing::debug;

use zipcode_engine::Neighborhood;

use crate::batch::NeighborhoodSummary;
use crate::error::SimError;
use crate::runner::PlaythroughResult;

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path.
    pub fn new(path: &str) -> Result<Self, SimError> {
        let db = Database { conn: Connection::open(path)? };
        db.create_schema()?;
        Ok(db)
    }

    /// In-memory database (useful for tests).
    pub fn in_memory() -> Result<Self, SimError> {
        let db = Database { conn: Connection::open_in_memory()? };
        db.create_schema()?;
        Ok(db)
    }

    fn create_schema(&self) -> Result<(), SimError> {
        self.conn.execute_batch("
            CREATE TABLE IF NOT EXISTS agents (
                id          INTEGER PRIMARY KEY,
                name        TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS playthroughs (
                id              INTEGER PRIMARY KEY,
                agent_id        INTEGER NOT NULL REFERENCES agents(id),
                seed            INTEGER NOT NULL,
                neighborhood    TEXT NOT NULL,
                starting_gems   INTEGER NOT NULL,
                graduated       INTEGER NOT NULL,
                final_gpa       INTEGER NOT NULL,
                final_gems      INTEGER NOT NULL,
                turns           INTEGER NOT NULL,
                cards_drawn     INTEGER NOT NULL,
                exam_attempts   INTEGER NOT NULL,
                exams_failed    INTEGER NOT NULL,
                bus_stops       INTEGER NOT NULL,
                elapsed_ms      INTEGER NOT NULL,
                played_at       TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_playthroughs_neighborhood
                ON playthroughs (neighborhood);
        ")?;
        Ok(())
    }

    pub fn store_playthrough(&self, result: &PlaythroughResult) -> Result<i64, SimError> {
        BorrowedDb { conn: &self.conn }.store_playthrough(result)
    }

    /// Store a batch in one transaction.
    pub fn store_batch(&mut self, results: &[PlaythroughResult]) -> Result<usize, SimError> {
        let tx = self.conn.transaction()?;
        {
            let batch = BorrowedDb { conn: &tx };
            for r in results {
                batch.store_playthrough(r)?;
            }
        }
        tx.commit()?;
        debug!(count = results.len(), "batch stored");
        Ok(results.len())
    }

    /// Per-neighborhood outcomes, optionally restricted to one agent.
    pub fn neighborhood_report(&self, agent: Option<&str>) -> Result<Vec<NeighborhoodSummary>, SimError> {
        BorrowedDb { conn: &self.conn }.neighborhood_report(agent)
    }

    /// Get total number of playthroughs stored.
    pub fn playthrough_count(&self) -> Result<u32, SimError> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM playthroughs", [], |row| row.get(0))?)
    }
}

/// Statement helpers usable on a connection or an open transaction.
struct BorrowedDb<'a> {
    conn: &'a Connection,
}

impl BorrowedDb<'_> {
    /// Register an agent (or return existing ID).
    fn register_agent(&self, name: &str) -> Result<i64, SimError> {
        self.conn.execute("INSERT OR IGNORE INTO agents (name) VALUES (?1)", params![name])?;
        let id = self.conn.query_row("SELECT id FROM agents WHERE name = ?1", params![name], |row| row.get(0))?;
        Ok(id)
    }

    fn store_playthrough(&self, result: &PlaythroughResult) -> Result<i64, SimError> {
        let agent_id = self.register_agent(&result.agent)?;
        self.conn.execute(
            "INSERT INTO playthroughs (agent_id, seed, neighborhood, starting_gems, graduated, final_gpa,
                                       final_gems, turns, cards_drawn, exam_attempts, exams_failed, bus_stops,
                                       elapsed_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                agent_id,
                result.seed as i64,
                result.neighborhood.tag(),
                result.starting_gems,
                result.graduated,
                result.final_gpa,
                result.final_gems,
                result.turns,
                result.cards_drawn,
                result.exam_attempts,
                result.exams_failed,
                result.bus_stops_reached,
                result.elapsed_ms as i64,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn neighborhood_report(&self, agent: Option<&str>) -> Result<Vec<NeighborhoodSummary>, SimError> {
        let mut stmt = self.conn.prepare(
            "SELECT p.neighborhood, COUNT(*), SUM(p.graduated), AVG(p.turns), AVG(p.final_gpa),
                    AVG(p.final_gems), AVG(p.exams_failed)
             FROM playthroughs p JOIN agents a ON a.id = p.agent_id
             WHERE ?1 IS NULL OR a.name = ?1
             GROUP BY p.neighborhood",
        )?;
        let rows = stmt.query_map(params![agent], |row| {
            Ok((
                row.get::<_, String>(0)?,
                NeighborhoodSummary {
                    neighborhood: Neighborhood::Redlined,
                    games: row.get(1)?,
                    graduated: row.get(2)?,
                    mean_turns: row.get(3)?,
                    mean_final_gpa: row.get(4)?,
                    mean_final_gems: row.get(5)?,
                    mean_exams_failed: row.get(6)?,
                },
            ))
        })?;

        let mut report = Vec::new();
        for row in rows {
            let (tag, mut summary) = row?;
            // Rows with an unknown tag were written by another version.
            let Some(neighborhood) = Neighborhood::from_tag(&tag) else { continue };
            summary.neighborhood = neighborhood;
            report.push(summary);
        }
        report.sort_by_key(|s| Neighborhood::ALL.iter().position(|&n| n == s.neighborhood));
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(seed: u64, agent: &str, neighborhood: Neighborhood, graduated: bool, turns: u32) -> PlaythroughResult {
        PlaythroughResult {
            seed,
            agent: agent.to_string(),
            neighborhood,
            starting_gems: 80,
            graduated,
            final_gpa: if graduated { 16 } else { 3 },
            final_gems: 40,
            turns,
            cards_drawn: turns,
            exam_attempts: 1,
            exams_failed: u32::from(!graduated),
            bus_stops_reached: 2,
            card_gems_delta: -40,
            card_gpa_delta: 1,
            decisions: 0,
            elapsed_ms: 0,
        }
    }

    #[test]
    fn store_and_count() {
        let db = Database::in_memory().unwrap();
        db.store_playthrough(&result(1, "Random", Neighborhood::Rich, true, 10)).unwrap();
        db.store_playthrough(&result(2, "Random", Neighborhood::Rich, false, 30)).unwrap();
        assert_eq!(db.playthrough_count().unwrap(), 2);
        let agents = BorrowedDb { conn: &db.conn };
        assert_eq!(agents.register_agent("Random").unwrap(), agents.register_agent("Random").unwrap());
        assert_ne!(agents.register_agent("Heuristic").unwrap(), agents.register_agent("Random").unwrap());
    }

    #[test]
    fn report_aggregates_per_neighborhood() {
        let mut db = Database::in_memory().unwrap();
        db.store_batch(&[
            result(1, "Heuristic", Neighborhood::Redlined, false, 40),
            result(2, "Heuristic", Neighborhood::Redlined, true, 20),
            result(3, "Heuristic", Neighborhood::Rich, true, 8),
            result(4, "Random", Neighborhood::Rich, false, 50),
        ]).unwrap();

        let all = db.neighborhood_report(None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].neighborhood, Neighborhood::Rich);
        assert_eq!(all[0].games, 2);
        assert_eq!(all[1].neighborhood, Neighborhood::Redlined);
        assert_eq!(all[1].graduated, 1);
        assert!((all[1].mean_turns - 30.0).abs() < 1e-9);

        let heuristic = db.neighborhood_report(Some("Heuristic")).unwrap();
        let rich = heuristic.iter().find(|s| s.neighborhood == Neighborhood::Rich).unwrap();
        assert_eq!(rich.games, 1);
        assert!((rich.graduation_rate() - 1.0).abs() < 1e-9);
    }
}
