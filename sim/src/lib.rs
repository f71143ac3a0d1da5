pub mod error;
pub mod runner;
pub mod batch;
pub mod database;

pub use batch::{run_batch, summarize, BatchConfig, NeighborhoodSummary};
pub use database::Database;
pub use error::SimError;
pub use runner::{run_playthrough, PlaythroughResult};
