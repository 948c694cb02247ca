//! Corpus Index (substring tiers + typo-tolerant fallback)
//!
//! The index is built once from an immutable corpus and answers lookups
//! without side effects. Candidates are classified in parallel with rayon,
//! then sorted by `(tier, corpus position)` so the output never depends on
//! which worker finished first.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::candidate::SymbolCandidate;
use crate::interface::SymbolRecord;
use crate::models::Corpus;
use crate::ranking::{classify, MatchTier};

/// Lookup tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Truncate results to this many records; `None` returns every match
    pub max_results: Option<usize>,
    /// Fall back to typo-tolerant matching for records no substring tier hits
    pub fuzzy: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_results: None, fuzzy: true }
    }
}

/// Anything the query pipeline can run lookups against.
///
/// Implementations must be pure: the same query returns the same sequence.
/// `token` is cancelled when the lookup has been superseded; honoring it is
/// optional and whatever is returned afterwards is discarded.
pub trait SymbolSearcher: Send + Sync {
    fn lookup(&self, query: &str, token: &CancellationToken) -> Vec<SymbolRecord>;
}

/// In-memory index over a [`Corpus`].
pub struct CorpusIndex {
    corpus: Arc<Corpus>,
    candidates: Vec<SymbolCandidate>,
    config: SearchConfig,
}

impl CorpusIndex {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self::with_config(corpus, SearchConfig::default())
    }

    pub fn with_config(corpus: Arc<Corpus>, config: SearchConfig) -> Self {
        let candidates = corpus
            .records()
            .iter()
            .enumerate()
            .map(|(i, record)| SymbolCandidate::new(i, record))
            .collect();
        Self { corpus, candidates, config }
    }

    /// Ranked records matching `query`. Blank queries return nothing.
    pub fn search(&self, query: &str) -> Vec<SymbolRecord> {
        self.search_cancellable(query, &CancellationToken::new())
    }

    /// Like [`search`](Self::search), but stops classifying once `token` is
    /// cancelled. A cancelled lookup returns a partial list.
    pub fn search_cancellable(&self, query: &str, token: &CancellationToken) -> Vec<SymbolRecord> {
        let query_lower = query.trim().to_lowercase();
        if query_lower.is_empty() {
            return Vec::new();
        }

        #[cfg(feature = "perf-log")]
        let t0 = std::time::Instant::now();

        use rayon::prelude::*;
        let mut ranked: Vec<(MatchTier, usize)> = self
            .candidates
            .par_iter()
            .take_any_while(|_| !token.is_cancelled())
            .filter_map(|c| classify(c, &query_lower, self.config.fuzzy).map(|tier| (tier, c.position)))
            .collect();

        // Positions are unique, so this order is total
        ranked.sort_unstable();
        if let Some(limit) = self.config.max_results {
            ranked.truncate(limit);
        }

        #[cfg(feature = "perf-log")]
        tracing::debug!(
            query = %query_lower,
            matches = ranked.len(),
            elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
            "corpus lookup"
        );

        let records = self.corpus.records();
        ranked.into_iter().map(|(_, pos)| records[pos].clone()).collect()
    }
}

impl SymbolSearcher for CorpusIndex {
    fn lookup(&self, query: &str, token: &CancellationToken) -> Vec<SymbolRecord> {
        self.search_cancellable(query, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(records: Vec<SymbolRecord>) -> CorpusIndex {
        CorpusIndex::new(Arc::new(Corpus::from_records(records).unwrap()))
    }

    fn names(records: &[SymbolRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    fn hearts() -> CorpusIndex {
        index(vec![
            SymbolRecord::new("💔", "broken heart", ["sad"]),
            SymbolRecord::new("😍", "heart eyes", ["love"]),
            SymbolRecord::new("❤️", "heart", ["love"]),
        ])
    }

    #[test]
    fn test_exact_then_prefix_then_substring() {
        let results = hearts().search("heart");
        assert_eq!(names(&results), vec!["heart", "heart eyes", "broken heart"]);
    }

    #[test]
    fn test_query_is_trimmed_and_lowercased() {
        let results = hearts().search("  HEART ");
        assert_eq!(names(&results), vec!["heart", "heart eyes", "broken heart"]);
    }

    #[test]
    fn test_search_is_deterministic() {
        let idx = CorpusIndex::new(Arc::new(Corpus::bundled().unwrap()));
        for query in ["a", "heart", "face", "lo", "sunglases", "zz"] {
            assert_eq!(idx.search(query), idx.search(query), "query {query:?}");
        }
    }

    #[test]
    fn test_keyword_matches_rank_after_name_matches() {
        let idx = index(vec![
            SymbolRecord::new("😘", "kissing heart", ["flirt", "kiss"]),
            SymbolRecord::new("💋", "kiss", ["lips", "love"]),
            SymbolRecord::new("👄", "lips", ["mouth", "kiss"]),
        ]);
        // "kiss" exact name, "kissing heart" name prefix, "lips" keyword exact
        assert_eq!(names(&idx.search("kiss")), vec!["kiss", "kissing heart", "lips"]);
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let idx = index(vec![
            SymbolRecord::new("💛", "yellow heart", Vec::<String>::new()),
            SymbolRecord::new("💚", "green heart", Vec::<String>::new()),
            SymbolRecord::new("💙", "blue heart", Vec::<String>::new()),
        ]);
        assert_eq!(names(&idx.search("heart")), vec!["yellow heart", "green heart", "blue heart"]);
    }

    #[test]
    fn test_unmatched_query_is_empty() {
        assert!(hearts().search("pizza").is_empty());
        assert!(hearts().search("   ").is_empty());
    }

    #[test]
    fn test_fuzzy_fallback_ranks_last() {
        let idx = index(vec![
            SymbolRecord::new("😎", "sunglasses", ["cool"]),
            SymbolRecord::new("🕶️", "dark sunglases", Vec::<String>::new()),
        ]);
        // "dark sunglases" contains the typo verbatim, "sunglasses" is one edit away
        assert_eq!(names(&idx.search("sunglases")), vec!["dark sunglases", "sunglasses"]);
    }

    #[test]
    fn test_fuzzy_can_be_disabled() {
        let corpus = Arc::new(Corpus::from_records(vec![SymbolRecord::new("😎", "sunglasses", ["cool"])]).unwrap());
        let idx = CorpusIndex::with_config(corpus, SearchConfig { fuzzy: false, ..Default::default() });
        assert!(idx.search("sunglases").is_empty());
    }

    #[test]
    fn test_max_results_truncates() {
        let corpus = Arc::new(Corpus::bundled().unwrap());
        let idx = CorpusIndex::with_config(corpus, SearchConfig { max_results: Some(3), fuzzy: true });
        assert_eq!(idx.search("heart").len(), 3);
        assert_eq!(idx.search("heart")[0].name, "heart");
    }

    #[test]
    fn test_cancelled_lookup_stops_early() {
        let idx = CorpusIndex::new(Arc::new(Corpus::bundled().unwrap()));
        let token = CancellationToken::new();
        token.cancel();
        assert!(idx.lookup("heart", &token).is_empty());
    }
}
