//! Errors raised while running or storing playthroughs.

use zipcode_engine::{ConfigError, Panel};

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Rules or catalog were rejected before play began.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The agent chose to wait but no transition was scheduled.
    #[error("playthrough stalled on {panel:?} after {decisions} decisions")]
    Stalled { panel: Panel, decisions: usize },

    /// The agent produced an intent the session rejected.
    #[error("agent {agent} sent an intent the session ignored on {panel:?}")]
    RejectedIntent { agent: String, panel: Panel },

    #[error("unknown agent {0:?}")]
    UnknownAgent(String),
}
