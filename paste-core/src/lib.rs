//! Paste Core - matching and memory engine for emoji search
//!
//! This library implements the core of the Paste emoji search app: a ranked
//! index over the symbol catalogue, a query pipeline that turns keystrokes
//! into a race-free result list, and a persisted most-recent-first history
//! of selected symbols.
//!
//! Types are exported via UniFFI proc-macros (#[derive(uniffi::Record/Enum/Object)]).

pub(crate) mod candidate;
pub mod database;
pub mod interface;
pub mod models;
pub mod ranking;
pub mod recency;
pub mod search;
mod store;

pub use database::{Database, MemoryStorage, PreferenceStorage, StorageError};
pub use interface::*;
pub use models::{Corpus, CorpusError};
pub use recency::{RecencyConfig, RecencyStore};
pub use search::{CorpusIndex, SearchConfig, SymbolSearcher};
pub use store::{SearchSession, SessionConfig};

uniffi::setup_scaffolding!("paste_core");
