//! Recency store: most-recently-selected symbols, persisted across launches.
//!
//! The list holds names, most-recent-first, with no duplicates. It is
//! written to durable storage after every mutation as a versioned JSON
//! payload. Anything unreadable on load (storage failure, malformed JSON,
//! a version this build does not know) degrades to an empty list.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::database::{PreferenceStorage, StorageResult};
use crate::interface::SymbolRecord;
use crate::models::Corpus;

/// Storage key holding the persisted list
pub const RECENTS_KEY: &str = "recent_symbols";

/// Payload version written by this build
const FORMAT_VERSION: u32 = 1;

pub const DEFAULT_MAX_RECENTS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyConfig {
    /// Oldest entries beyond this length are dropped; `None` never drops
    pub max_entries: Option<usize>,
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self { max_entries: Some(DEFAULT_MAX_RECENTS) }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedRecents {
    version: u32,
    names: Vec<String>,
}

/// Read before the full payload so a future layout is recognized as such
/// instead of failing to parse.
#[derive(Debug, Deserialize)]
struct VersionProbe {
    version: u32,
}

pub struct RecencyStore {
    storage: Arc<dyn PreferenceStorage>,
    corpus: Arc<Corpus>,
    names: RwLock<Vec<String>>,
    config: RecencyConfig,
}

impl RecencyStore {
    pub fn open(storage: Arc<dyn PreferenceStorage>, corpus: Arc<Corpus>) -> Self {
        Self::with_config(storage, corpus, RecencyConfig::default())
    }

    pub fn with_config(storage: Arc<dyn PreferenceStorage>, corpus: Arc<Corpus>, config: RecencyConfig) -> Self {
        let mut names = load_names(storage.as_ref());
        apply_cap(&mut names, &corpus, config.max_entries);
        Self { storage, corpus, names: RwLock::new(names), config }
    }

    /// Recent symbols, most-recent-first. Names the corpus no longer knows
    /// are skipped.
    pub fn get(&self) -> Vec<SymbolRecord> {
        self.names
            .read()
            .iter()
            .filter_map(|name| self.corpus.get(name).cloned())
            .collect()
    }

    /// Raw identifiers, including ones the corpus cannot resolve
    pub fn names(&self) -> Vec<String> {
        self.names.read().clone()
    }

    /// Move `record` to the front and persist.
    ///
    /// The in-memory list is updated even when the write fails; the error is
    /// returned so the caller can report it, and the previous durable value
    /// stays in place until the next successful write.
    pub fn record_selection(&self, record: &SymbolRecord) -> StorageResult<()> {
        let mut names = self.names.write();
        if let Some(index) = names.iter().position(|n| n == &record.name) {
            names.remove(index);
        }
        names.insert(0, record.name.clone());
        apply_cap(&mut names, &self.corpus, self.config.max_entries);
        // Written under the lock so durable writes land in mutation order
        self.persist(&names)
    }

    /// Forget every recent symbol.
    pub fn clear(&self) -> StorageResult<()> {
        let mut names = self.names.write();
        names.clear();
        self.persist(&names)
    }

    fn persist(&self, names: &[String]) -> StorageResult<()> {
        let payload = PersistedRecents { version: FORMAT_VERSION, names: names.to_vec() };
        let json = serde_json::to_string(&payload).map_err(std::io::Error::from)?;
        self.storage.write(RECENTS_KEY, &json)
    }
}

/// Drop everything from the first resolvable name beyond `max`.
///
/// Only names the corpus can resolve count toward the cap, so a retired
/// name never pushes a visible one out.
fn apply_cap(names: &mut Vec<String>, corpus: &Corpus, max: Option<usize>) {
    let Some(max) = max else {
        return;
    };
    let mut resolvable = 0;
    let end = names
        .iter()
        .position(|name| {
            if corpus.get(name).is_some() {
                resolvable += 1;
            }
            resolvable > max
        })
        .unwrap_or(names.len());
    names.truncate(end);
}

fn load_names(storage: &dyn PreferenceStorage) -> Vec<String> {
    let raw = match storage.read(RECENTS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read recent symbols, starting empty");
            return Vec::new();
        }
    };
    match decode(&raw) {
        Ok(names) => names,
        Err(reason) => {
            tracing::warn!(%reason, "discarding unreadable recent symbols");
            Vec::new()
        }
    }
}

fn decode(raw: &str) -> Result<Vec<String>, String> {
    let probe: VersionProbe = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    if probe.version != FORMAT_VERSION {
        return Err(format!("unknown format version {}", probe.version));
    }
    let payload: PersistedRecents = serde_json::from_str(raw).map_err(|e| e.to_string())?;

    // A hand-edited or older payload may repeat names; keep the first.
    let mut names: Vec<String> = Vec::with_capacity(payload.names.len());
    for name in payload.names {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}
