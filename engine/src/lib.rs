pub mod types;
pub mod error;
pub mod board;
pub mod cards;
pub mod deck;
pub mod effects;
pub mod spawn;
pub mod config;
pub mod session;
pub mod view;


pub use types::*;
pub use board::BOARD;
pub use cards::{CardDef, CardId, Catalog};
pub use config::RulesConfig;
pub use error::ConfigError;
pub use session::{ExamOutcome, Intent, IntentOutcome, Notification, Session};
pub use view::{session_view, SessionView};
