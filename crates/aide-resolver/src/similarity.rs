//! Fuzzy similarity scoring.
//!
//! Case-insensitive and script-agnostic: text is compared as Unicode
//! characters, so Hebrew and Latin labels score the same way.

use aide_core::domain::Entity;
use serde::Serialize;
use strsim::{normalized_damerau_levenshtein, normalized_levenshtein};

/// Anything with named text fields the scorer can read.
pub trait Searchable {
    /// Missing fields return `None` and score zero.
    fn search_field(&self, name: &str) -> Option<&str>;
}

impl Searchable for Entity {
    fn search_field(&self, name: &str) -> Option<&str> {
        self.field(name)
    }
}

/// How a candidate matched its query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    Exact,
    /// The field contains the whole query.
    Contains,
    /// The query contains the whole field.
    Contained,
    Fuzzy,
    /// Selected by a time range alone, with no text left to compare.
    InRange,
}

/// One scored item, pointing back into the searched slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'a, T> {
    pub item: &'a T,
    /// Position in the input, which breaks score ties.
    pub index: usize,
    pub score: f64,
    pub reason: MatchReason,
    pub field: &'static str,
}

/// Lowercase and collapse whitespace.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Similarity in `[0, 1]` between two normalized strings.
pub fn score_text(query: &str, text: &str) -> (f64, MatchReason) {
    if query.is_empty() || text.is_empty() {
        return (0.0, MatchReason::Fuzzy);
    }
    if query == text {
        return (1.0, MatchReason::Exact);
    }

    let q_len = query.chars().count() as f64;
    let t_len = text.chars().count() as f64;
    if text.contains(query) {
        return (0.8 + 0.2 * (q_len / t_len), MatchReason::Contains);
    }
    if query.contains(text) {
        return (0.6 + 0.3 * (t_len / q_len), MatchReason::Contained);
    }

    let whole = normalized_levenshtein(query, text);
    let tokens = token_score(query, text) * 0.9;
    (whole.max(tokens), MatchReason::Fuzzy)
}

/// Mean, over query tokens, of each token's best match among text tokens.
fn token_score(query: &str, text: &str) -> f64 {
    let text_tokens: Vec<&str> = text.split(' ').collect();
    let query_tokens: Vec<&str> = query.split(' ').collect();
    let total: f64 = query_tokens
        .iter()
        .map(|q| {
            text_tokens
                .iter()
                .map(|t| normalized_damerau_levenshtein(q, t))
                .fold(0.0, f64::max)
        })
        .sum();
    total / query_tokens.len() as f64
}

/// Score every item against `query` over `fields`, keep those at or above
/// `threshold`, and rank them by descending score. Equal scores keep their
/// input order.
pub fn search<'a, T: Searchable>(
    query: &str,
    items: &'a [T],
    fields: &[&'static str],
    threshold: f64,
) -> Vec<Match<'a, T>> {
    let query = normalize(query);
    if query.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<Match<'a, T>> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let mut best: Option<Match<'a, T>> = None;
            for field in fields {
                let text = normalize(item.search_field(field).unwrap_or_default());
                let (score, reason) = score_text(&query, &text);
                if best.as_ref().is_none_or(|b| score > b.score) {
                    best = Some(Match {
                        item,
                        index,
                        score,
                        reason,
                        field: *field,
                    });
                }
            }
            best.filter(|m| m.score >= threshold)
        })
        .collect();

    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches
}
