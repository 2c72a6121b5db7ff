//! Fuzzy search over the annotation collection.
//!
//! Matching is weighted across the comment text, the id, and the creator.
//! Field scores run from 0.0 (exact substring) to 1.0; an annotation is a
//! hit when at least one field scores within the acceptance threshold. The
//! index is rebuilt from the collection after every mutation and holds only
//! derived data.

use std::cmp::Ordering;
use std::ops::Range;

use chrono::{DateTime, Utc};

use crate::model::Annotation;

/// Relative weight of the comment text field.
pub const WEIGHT_TEXT: f64 = 0.7;

/// Relative weight of the id field.
pub const WEIGHT_ID: f64 = 0.2;

/// Relative weight of the creator field.
pub const WEIGHT_CREATOR: f64 = 0.1;

/// Normalized distance at or below which a field counts as a match.
/// Roughly one tolerated typo per three to four query characters.
pub const SCORE_THRESHOLD: f64 = 0.3;

/// Queries shorter than this only match as plain substrings.
pub const MIN_FUZZY_QUERY_CHARS: usize = 2;

/// Floor for exact-match scores when combining weighted fields, so a
/// perfect field still produces a nonzero product.
const SCORE_EPSILON: f64 = 0.001;

/// A matched collection entry. Lower scores are better; 0 is exact.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Index into the collection the index was built from.
    pub index: usize,
    pub score: f64,
}

/// Derived search data for one annotation.
#[derive(Debug, Clone)]
struct IndexEntry {
    fields: [(String, f64); 3],
}

/// Weighted fuzzy index over the collection.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<IndexEntry>,
}

impl SearchIndex {
    /// Build the index from the current collection.
    pub fn build(annotations: &[Annotation]) -> Self {
        let entries = annotations
            .iter()
            .map(|a| IndexEntry {
                fields: [
                    (a.text.to_lowercase(), WEIGHT_TEXT),
                    (a.id.to_lowercase(), WEIGHT_ID),
                    (a.creator.to_lowercase(), WEIGHT_CREATOR),
                ],
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank entries against a query, best first.
    ///
    /// An empty or whitespace query matches every entry with a perfect
    /// score in collection order. Ties keep collection order (stable sort).
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return (0..self.entries.len())
                .map(|index| SearchHit { index, score: 0.0 })
                .collect();
        }
        let needle = trimmed.to_lowercase();
        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                entry.score(&needle).map(|score| SearchHit { index, score })
            })
            .collect();
        hits.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));
        hits
    }
}

impl IndexEntry {
    /// Combined score over the matched fields, None when nothing matches.
    ///
    /// Matched field scores combine multiplicatively, each dampened by its
    /// weight, so a strong match in a heavy field dominates.
    fn score(&self, needle: &str) -> Option<f64> {
        let mut combined = 1.0;
        let mut matched = false;
        for (haystack, weight) in &self.fields {
            if let Some(field_score) = field_score(haystack, needle) {
                matched = true;
                combined *= field_score.max(SCORE_EPSILON).powf(*weight);
            }
        }
        matched.then_some(combined)
    }
}

/// Score one field against the query.
///
/// Exact substring is 0. Otherwise the best edit distance between the query
/// and any substring of the field, normalized by query length; accepted
/// only within [`SCORE_THRESHOLD`].
fn field_score(haystack: &str, needle: &str) -> Option<f64> {
    if haystack.is_empty() {
        return None;
    }
    if haystack.contains(needle) {
        return Some(0.0);
    }
    let needle_chars = needle.chars().count();
    if needle_chars < MIN_FUZZY_QUERY_CHARS {
        return None;
    }
    let distance = substring_distance(haystack, needle);
    let normalized = distance as f64 / needle_chars as f64;
    (normalized <= SCORE_THRESHOLD).then_some(normalized)
}

/// Minimum edit distance between `needle` and any substring of `haystack`.
///
/// Standard Levenshtein rows with a free starting position in the haystack
/// (first row all zeros) and a free end (minimum over the last row).
fn substring_distance(haystack: &str, needle: &str) -> usize {
    let haystack: Vec<char> = haystack.chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return 0;
    }
    if haystack.is_empty() {
        return needle.len();
    }

    let mut prev = vec![0usize; haystack.len() + 1];
    let mut curr = vec![0usize; haystack.len() + 1];
    for (i, nc) in needle.iter().enumerate() {
        curr[0] = i + 1;
        for (j, hc) in haystack.iter().enumerate() {
            let substitution = prev[j] + usize::from(nc != hc);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev.into_iter().min().unwrap_or(needle.len())
}

// =============================================================================
// Filtered search and helpers
// =============================================================================

/// Filters for [`advanced_search`]; absent filters pass everything.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    /// Case-insensitive substring over the comment text.
    pub text: Option<String>,
    /// Case-insensitive substring over the creator.
    pub creator: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub min_text_length: Option<usize>,
    pub max_text_length: Option<usize>,
}

/// Filter the collection by the given criteria, order preserved.
pub fn advanced_search(annotations: &[Annotation], criteria: &SearchCriteria) -> Vec<Annotation> {
    annotations
        .iter()
        .filter(|a| {
            if let Some(text) = &criteria.text {
                if !a.text.to_lowercase().contains(&text.to_lowercase()) {
                    return false;
                }
            }
            if let Some(creator) = &criteria.creator {
                if !a.creator.to_lowercase().contains(&creator.to_lowercase()) {
                    return false;
                }
            }
            if criteria.created_from.is_some_and(|from| a.created < from) {
                return false;
            }
            if criteria.created_to.is_some_and(|to| a.created > to) {
                return false;
            }
            let area = a.geometry.area();
            if criteria.min_area.is_some_and(|min| area < min) {
                return false;
            }
            if criteria.max_area.is_some_and(|max| area > max) {
                return false;
            }
            let text_length = a.text.chars().count();
            if criteria.min_text_length.is_some_and(|min| text_length < min) {
                return false;
            }
            if criteria.max_text_length.is_some_and(|max| text_length > max) {
                return false;
            }
            true
        })
        .cloned()
        .collect()
}

/// Field selector for [`search_by_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Text,
    Id,
    Creator,
    Created,
}

/// Exact-substring filter over a single field, case-insensitive.
pub fn search_by_field(
    annotations: &[Annotation],
    field: SearchField,
    query: &str,
) -> Vec<Annotation> {
    let needle = query.to_lowercase();
    annotations
        .iter()
        .filter(|a| {
            let haystack = match field {
                SearchField::Text => a.text.to_lowercase(),
                SearchField::Id => a.id.to_lowercase(),
                SearchField::Creator => a.creator.to_lowercase(),
                SearchField::Created => a.created.to_rfc3339(),
            };
            haystack.contains(&needle)
        })
        .cloned()
        .collect()
}

/// Distinct lowercased comment words containing the query, capped at `limit`.
///
/// Useful for type-ahead; queries under two characters return nothing.
pub fn suggestions(annotations: &[Annotation], query: &str, limit: usize) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    if needle.chars().count() < MIN_FUZZY_QUERY_CHARS {
        return Vec::new();
    }
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for annotation in annotations {
        for word in annotation.text.split_whitespace() {
            let word = word.to_lowercase();
            if word.chars().count() > 2 && word.contains(&needle) && seen.insert(word.clone()) {
                out.push(word);
                if out.len() >= limit {
                    return out;
                }
            }
        }
    }
    out
}

/// Byte ranges of case-insensitive occurrences of `query` in `text`.
///
/// Non-overlapping, left to right; renderers turn these into highlights.
pub fn highlight_spans(text: &str, query: &str) -> Vec<Range<usize>> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let needle = trimmed.to_lowercase();
    let needle_chars = trimmed.chars().count();

    let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    boundaries.push(text.len());
    let total_chars = boundaries.len() - 1;

    let mut spans = Vec::new();
    let mut at = 0;
    while at + needle_chars <= total_chars {
        let start = boundaries[at];
        let end = boundaries[at + needle_chars];
        if text[start..end].to_lowercase() == needle {
            spans.push(start..end);
            at += needle_chars;
        } else {
            at += 1;
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationMeta, Rect};

    fn annotation(text: &str) -> Annotation {
        Annotation::new(text, Rect::new(0.0, 0.0, 10.0, 10.0), AnnotationMeta::default())
    }

    fn collection() -> Vec<Annotation> {
        vec![
            annotation("stop sign on the corner"),
            annotation("red car"),
            annotation("street lamp"),
        ]
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let annotations = collection();
        let index = SearchIndex::build(&annotations);
        let hits = index.search("   ");
        let indices: Vec<usize> = hits.iter().map(|h| h.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(hits.iter().all(|h| h.score == 0.0));
    }

    #[test]
    fn test_exact_substring_ranks_first() {
        let annotations = collection();
        let index = SearchIndex::build(&annotations);
        let hits = index.search("stop sign");
        assert!(!hits.is_empty());
        assert_eq!(hits[0].index, 0);
        assert!(hits[0].score < 0.01);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let annotations = collection();
        let index = SearchIndex::build(&annotations);
        let hits = index.search("RED CAR");
        assert_eq!(hits.first().map(|h| h.index), Some(1));
    }

    #[test]
    fn test_single_typo_still_matches() {
        let annotations = collection();
        let index = SearchIndex::build(&annotations);
        // "streat" for "street": one substitution over six characters.
        let hits = index.search("streat");
        assert!(hits.iter().any(|h| h.index == 2));
        let hit = hits.iter().find(|h| h.index == 2).unwrap();
        assert!(hit.score > 0.0 && hit.score < 0.3);
    }

    #[test]
    fn test_garbage_query_matches_nothing() {
        let annotations = collection();
        let index = SearchIndex::build(&annotations);
        assert!(index.search("qqqqqqqq").is_empty());
    }

    #[test]
    fn test_short_query_is_substring_only() {
        let annotations = vec![annotation("ab"), annotation("xy")];
        let index = SearchIndex::build(&annotations);
        let hits = index.search("a");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 0);
    }

    #[test]
    fn test_id_and_creator_fields_are_searchable() {
        let mut annotations = collection();
        annotations[1].creator = "marieke".to_string();
        let index = SearchIndex::build(&annotations);
        let by_creator = index.search("marieke");
        assert_eq!(by_creator.first().map(|h| h.index), Some(1));
        let by_id = index.search(&annotations[2].id.clone());
        assert_eq!(by_id.first().map(|h| h.index), Some(2));
    }

    #[test]
    fn test_substring_distance() {
        assert_eq!(substring_distance("street lamp", "street"), 0);
        assert_eq!(substring_distance("street lamp", "streat"), 1);
        assert_eq!(substring_distance("abc", "xyz"), 3);
        assert_eq!(substring_distance("", "ab"), 2);
        assert_eq!(substring_distance("abc", ""), 0);
    }

    #[test]
    fn test_advanced_search_combines_filters() {
        let mut annotations = collection();
        annotations[0].geometry = Rect::new(0.0, 0.0, 100.0, 100.0);
        let criteria = SearchCriteria {
            text: Some("s".to_string()),
            min_area: Some(5000.0),
            ..SearchCriteria::default()
        };
        let found = advanced_search(&annotations, &criteria);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "stop sign on the corner");
    }

    #[test]
    fn test_advanced_search_text_length_bounds() {
        let annotations = collection();
        let criteria = SearchCriteria {
            max_text_length: Some(10),
            ..SearchCriteria::default()
        };
        let found = advanced_search(&annotations, &criteria);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "red car");
    }

    #[test]
    fn test_search_by_field_only_touches_that_field() {
        let mut annotations = collection();
        annotations[2].creator = "carmen".to_string();
        let by_text = search_by_field(&annotations, SearchField::Text, "car");
        assert_eq!(by_text.len(), 1);
        assert_eq!(by_text[0].text, "red car");
        let by_creator = search_by_field(&annotations, SearchField::Creator, "car");
        assert_eq!(by_creator.len(), 1);
        assert_eq!(by_creator[0].text, "street lamp");
    }

    #[test]
    fn test_suggestions_dedupe_and_cap() {
        let annotations = vec![
            annotation("stop sign"),
            annotation("stop light"),
            annotation("bus stop sign"),
        ];
        let words = suggestions(&annotations, "st", 5);
        assert_eq!(words, vec!["stop".to_string()]);
        let capped = suggestions(&annotations, "si", 1);
        assert_eq!(capped.len(), 1);
        assert!(suggestions(&annotations, "s", 5).is_empty());
    }

    #[test]
    fn test_highlight_spans_finds_all_occurrences() {
        let spans = highlight_spans("Stop at the stop sign", "stop");
        assert_eq!(spans, vec![0..4, 12..16]);
    }

    #[test]
    fn test_highlight_spans_empty_query() {
        assert!(highlight_spans("anything", " ").is_empty());
    }
}
