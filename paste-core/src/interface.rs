//! Paste FFI Interface Definition
//!
//! This file defines the public types exposed to Swift via UniFFI.
//! It acts as the source of truth for values crossing the boundary: the
//! symbol records the search view renders and the result lists it observes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS (Structs)
// ═══════════════════════════════════════════════════════════════════════════════

/// A named, displayable glyph plus its search metadata.
///
/// `name` is the identity: it is unique within a corpus and is what the
/// recency list persists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Record)]
pub struct SymbolRecord {
    /// The displayable character or short grapheme cluster
    pub glyph: String,
    pub name: String,
    /// Optional synonyms, matched after every name tier
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl SymbolRecord {
    pub fn new<I, S>(glyph: impl Into<String>, name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            glyph: glyph.into(),
            name: name.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENUMS
// ═══════════════════════════════════════════════════════════════════════════════

/// Where the visible result list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum ResultSource {
    /// Empty query: the recency list, most-recent-first
    Recents,
    /// Corpus index answer to the latest query
    Search,
}

/// The single list visible to the UI at any time.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ResultList {
    /// Generation of the event that produced this list. Strictly increases
    /// across published lists.
    pub generation: u64,
    /// Raw query text the list answers (empty for the recents view)
    pub query: String,
    pub source: ResultSource,
    pub records: Vec<SymbolRecord>,
}

impl ResultList {
    pub(crate) fn recents(generation: u64, query: String, records: Vec<SymbolRecord>) -> Self {
        Self { generation, query, source: ResultSource::Recents, records }
    }

    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }
}

/// Error type for Paste operations
#[derive(Debug, Error, uniffi::Error)]
pub enum PasteError {
    #[error("Corpus error: {0}")]
    Corpus(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<crate::models::CorpusError> for PasteError {
    fn from(e: crate::models::CorpusError) -> Self {
        PasteError::Corpus(e.to_string())
    }
}

impl From<crate::database::StorageError> for PasteError {
    fn from(e: crate::database::StorageError) -> Self {
        PasteError::Storage(e.to_string())
    }
}
