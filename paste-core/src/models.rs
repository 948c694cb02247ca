//! Symbol corpus: the static catalogue every query runs against.
//!
//! Loaded once at startup and read-only afterwards. Load order is kept as
//! the tie-break order for ranking, so the catalogue file is ordered the
//! way results should fall back to.

use std::collections::HashMap;

use thiserror::Error;

use crate::interface::SymbolRecord;

/// Catalogue bundled with the library, a JSON array of symbol records.
static BUNDLED_CATALOGUE: &str = include_str!("../data/emoji.json");

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Catalogue parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate symbol name: {0}")]
    DuplicateName(String),
    #[error("Symbol at position {0} has an empty name or glyph")]
    EmptyField(usize),
}

pub type CorpusResult<T> = Result<T, CorpusError>;

/// Ordered, immutable collection of symbol records with unique names.
#[derive(Debug, Default)]
pub struct Corpus {
    records: Vec<SymbolRecord>,
    positions: HashMap<String, usize>,
}

impl Corpus {
    /// Build a corpus, rejecting duplicate or empty names.
    pub fn from_records(records: Vec<SymbolRecord>) -> CorpusResult<Self> {
        let mut positions = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if record.name.trim().is_empty() || record.glyph.is_empty() {
                return Err(CorpusError::EmptyField(i));
            }
            if positions.insert(record.name.clone(), i).is_some() {
                return Err(CorpusError::DuplicateName(record.name.clone()));
            }
        }
        Ok(Self { records, positions })
    }

    /// Parse a JSON array of `{ "glyph", "name", "keywords" }` objects.
    pub fn from_json(json: &str) -> CorpusResult<Self> {
        let records: Vec<SymbolRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// The catalogue compiled into the library.
    pub fn bundled() -> CorpusResult<Self> {
        Self::from_json(BUNDLED_CATALOGUE)
    }

    pub fn records(&self) -> &[SymbolRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by its identifying name
    pub fn get(&self, name: &str) -> Option<&SymbolRecord> {
        self.positions.get(name).map(|&i| &self.records[i])
    }
}
