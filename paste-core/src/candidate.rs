//! Search candidate with memoized derived state.
//!
//! Module isolation ensures no code outside this module can mutate the
//! lowercased fields after construction, so the `OnceLock` word cache can
//! never go stale.

use std::sync::OnceLock;

use crate::interface::SymbolRecord;

/// One corpus record prepared for matching.
/// Lowercased name and keywords are computed at index build time; the word
/// list used by typo-tolerant matching is computed on first access and cached.
#[derive(Debug)]
pub struct SymbolCandidate {
    /// Position in the corpus, the final tie-break key
    pub position: usize,
    name_lower: String,
    keywords_lower: Vec<String>,
    words: OnceLock<Vec<String>>,
}

impl SymbolCandidate {
    pub fn new(position: usize, record: &SymbolRecord) -> Self {
        Self {
            position,
            name_lower: record.name.to_lowercase(),
            keywords_lower: record.keywords.iter().map(|k| k.to_lowercase()).collect(),
            words: OnceLock::new(),
        }
    }

    pub fn name_lower(&self) -> &str {
        &self.name_lower
    }

    pub fn keywords_lower(&self) -> &[String] {
        &self.keywords_lower
    }

    /// Whole name, whole keywords, and every alphanumeric word inside them.
    pub fn words(&self) -> &[String] {
        self.words.get_or_init(|| {
            let mut words: Vec<String> = Vec::new();
            for text in std::iter::once(&self.name_lower).chain(self.keywords_lower.iter()) {
                push_unique(&mut words, text);
                for word in text.split(|c: char| !c.is_alphanumeric()) {
                    push_unique(&mut words, word);
                }
            }
            words
        })
    }
}

fn push_unique(words: &mut Vec<String>, word: &str) {
    if !word.is_empty() && !words.iter().any(|w| w == word) {
        words.push(word.to_string());
    }
}
