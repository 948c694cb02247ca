//! Tiered match ranking for symbol lookups.
//!
//! A candidate's tier is the strongest way the query matches it. Tiers
//! compare lexicographically and the corpus position breaks ties, so every
//! query yields a total, deterministic order:
//!
//! 1. exact name
//! 2. name starts with query
//! 3. name contains query
//! 4. keyword exact / prefix / contains
//! 5. typo-tolerant word match, fewer edits first

use crate::candidate::SymbolCandidate;

/// Match strength. Derived `Ord` follows declaration order: lower is stronger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    ExactName,
    NamePrefix,
    NameContains,
    ExactKeyword,
    KeywordPrefix,
    KeywordContains,
    /// Edit distance of the closest word
    Fuzzy(u8),
}

/// How a single field contains the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Containment {
    Exact,
    Prefix,
    Contains,
}

fn containment(text: &str, query_lower: &str) -> Option<Containment> {
    if text == query_lower {
        Some(Containment::Exact)
    } else if text.starts_with(query_lower) {
        Some(Containment::Prefix)
    } else if text.contains(query_lower) {
        Some(Containment::Contains)
    } else {
        None
    }
}

/// Classify a candidate against an already trimmed and lowercased query.
/// Returns `None` when the candidate does not match at all.
pub(crate) fn classify(candidate: &SymbolCandidate, query_lower: &str, fuzzy: bool) -> Option<MatchTier> {
    if query_lower.is_empty() {
        return None;
    }

    if let Some(c) = containment(candidate.name_lower(), query_lower) {
        return Some(match c {
            Containment::Exact => MatchTier::ExactName,
            Containment::Prefix => MatchTier::NamePrefix,
            Containment::Contains => MatchTier::NameContains,
        });
    }

    let best_keyword = candidate
        .keywords_lower()
        .iter()
        .filter_map(|k| containment(k, query_lower))
        .min();
    if let Some(c) = best_keyword {
        return Some(match c {
            Containment::Exact => MatchTier::ExactKeyword,
            Containment::Prefix => MatchTier::KeywordPrefix,
            Containment::Contains => MatchTier::KeywordContains,
        });
    }

    if !fuzzy {
        return None;
    }
    let max_dist = max_edit_distance(query_lower.chars().count());
    if max_dist == 0 {
        return None;
    }
    candidate
        .words()
        .iter()
        .filter_map(|w| edit_distance_bounded(query_lower, w, max_dist))
        .min()
        .map(MatchTier::Fuzzy)
}

/// Maximum allowed edit distance for a query of `len` chars.
/// Short queries get no typo tolerance; they would match too much.
pub(crate) fn max_edit_distance(len: usize) -> u8 {
    match len {
        0..=4 => 0,
        5..=8 => 1,
        _ => 2,
    }
}

/// Optimal string alignment distance, `None` when it exceeds `max_dist`.
/// Pruned on length difference first so most words never reach strsim.
pub fn edit_distance_bounded(a: &str, b: &str, max_dist: u8) -> Option<u8> {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a.abs_diff(len_b) > max_dist as usize {
        return None;
    }
    let dist = strsim::osa_distance(a, b);
    (dist <= max_dist as usize).then_some(dist as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::SymbolRecord;

    fn candidate(name: &str, keywords: &[&str]) -> SymbolCandidate {
        SymbolCandidate::new(0, &SymbolRecord::new("❤️", name, keywords.iter().copied()))
    }

    // ── tier ordering ────────────────────────────────────────────

    #[test]
    fn test_name_tiers_beat_keyword_tiers() {
        assert!(MatchTier::NameContains < MatchTier::ExactKeyword);
        assert!(MatchTier::KeywordContains < MatchTier::Fuzzy(0));
        assert!(MatchTier::Fuzzy(1) < MatchTier::Fuzzy(2));
    }

    // ── classify ─────────────────────────────────────────────────

    #[test]
    fn test_classify_name_tiers() {
        assert_eq!(classify(&candidate("heart", &[]), "heart", true), Some(MatchTier::ExactName));
        assert_eq!(classify(&candidate("heart eyes", &[]), "heart", true), Some(MatchTier::NamePrefix));
        assert_eq!(classify(&candidate("broken heart", &[]), "heart", true), Some(MatchTier::NameContains));
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify(&candidate("Thumbs Up", &[]), "thumbs", true), Some(MatchTier::NamePrefix));
    }

    #[test]
    fn test_classify_keyword_tiers_pick_strongest() {
        let c = candidate("thumbsup", &["approve", "ok", "okay fine"]);
        assert_eq!(classify(&c, "ok", true), Some(MatchTier::ExactKeyword));
        assert_eq!(classify(&c, "appr", true), Some(MatchTier::KeywordPrefix));
        assert_eq!(classify(&c, "prove", true), Some(MatchTier::KeywordContains));
    }

    #[test]
    fn test_classify_name_wins_over_keyword() {
        // "love" is an exact keyword, but the name contains it too
        let c = candidate("love letter", &["love"]);
        assert_eq!(classify(&c, "love", true), Some(MatchTier::NamePrefix));
    }

    #[test]
    fn test_classify_fuzzy_word() {
        let c = candidate("sunglasses", &["cool", "summer"]);
        assert_eq!(classify(&c, "sunglases", true), Some(MatchTier::Fuzzy(1)));
        assert_eq!(classify(&c, "sunglases", false), None);
    }

    #[test]
    fn test_classify_short_queries_never_fuzzy() {
        let c = candidate("heart", &[]);
        assert_eq!(classify(&c, "hert", true), None);
    }

    #[test]
    fn test_classify_no_match() {
        assert_eq!(classify(&candidate("heart", &["love"]), "pizza", true), None);
        assert_eq!(classify(&candidate("heart", &["love"]), "", true), None);
    }

    // ── edit distance ────────────────────────────────────────────

    #[test]
    fn test_edit_distance_bounded() {
        assert_eq!(edit_distance_bounded("rocket", "rocket", 1), Some(0));
        assert_eq!(edit_distance_bounded("rokcet", "rocket", 1), Some(1));
        assert_eq!(edit_distance_bounded("rockt", "rocket", 1), Some(1));
        assert_eq!(edit_distance_bounded("racket", "rocket", 0), None);
        assert_eq!(edit_distance_bounded("rock", "rocket", 1), None);
    }

    #[test]
    fn test_max_edit_distance_graduation() {
        assert_eq!(max_edit_distance(4), 0);
        assert_eq!(max_edit_distance(5), 1);
        assert_eq!(max_edit_distance(8), 1);
        assert_eq!(max_edit_distance(9), 2);
    }
}
