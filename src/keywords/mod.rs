//! Weighted keyword extraction from task prompts.
//!
//! Tokenizes on non-alphanumeric boundaries, drops stop words and short
//! tokens, splits identifier-shaped tokens into sub-tokens, and lifts quoted
//! substrings to high-weight literal phrases. Deterministic for identical
//! input. Identifier casing changes the sub-token split, so the extraction
//! participates in the prompt's cache identity.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::file_record::{Language, KNOWN_EXTENSIONS};

const BASE_WEIGHT: f32 = 1.0;
const SUBTOKEN_WEIGHT: f32 = 0.6;
const LANGUAGE_WEIGHT: f32 = 1.5;
const PHRASE_WEIGHT: f32 = 2.5;

/// Common English function words that carry no routing signal.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "can", "could", "do", "does", "for",
    "from", "has", "have", "how", "i", "if", "in", "into", "is", "it", "its", "me", "my", "no",
    "not", "of", "on", "or", "our", "please", "should", "so", "some", "that", "the", "their",
    "then", "there", "these", "they", "this", "to", "up", "us", "was", "we", "what", "when",
    "where", "which", "why", "will", "with", "would", "you", "your",
];

/// Short tokens kept despite the 3-character minimum.
const ACRONYM_WHITELIST: &[&str] = &[
    "db", "ui", "io", "os", "js", "ts", "py", "rs", "go", "ai", "id", "api",
];

// Double quotes only: apostrophes in contractions would otherwise pair up
// into bogus phrases.
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)""#).expect("quoted pattern"));
static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9_]+").expect("token pattern"));

/// Ordered `(term, weight)` pairs: weights positive, terms lower-cased and
/// deduplicated, descending weight order. Immutable once derived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordSet {
    terms: Vec<(String, f32)>,
}

impl KeywordSet {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.terms.iter().map(|(t, w)| (t.as_str(), *w))
    }

    /// Languages explicitly named in the prompt, for the scorer's prior.
    pub fn named_languages(&self) -> Vec<Language> {
        let mut langs: Vec<Language> = Vec::new();
        for (term, _) in &self.terms {
            if let Some(lang) = Language::from_keyword(term) {
                if !langs.contains(&lang) {
                    langs.push(lang);
                }
            }
        }
        langs
    }
}

/// Derive a weighted term set from a task prompt.
pub fn extract(prompt: &str) -> KeywordSet {
    let mut weighted: Vec<(String, f32)> = Vec::new();

    // Quoted substrings become literal high-weight phrases, matched verbatim.
    for cap in QUOTED.captures_iter(prompt) {
        if let Some(m) = cap.get(1) {
            let phrase = m.as_str().trim().to_lowercase();
            if !phrase.is_empty() {
                weighted.push((phrase, PHRASE_WEIGHT));
            }
        }
    }

    for token in TOKEN.find_iter(prompt) {
        let raw = token.as_str();
        let lower = raw.to_lowercase();

        if STOP_WORDS.contains(&lower.as_str()) {
            continue;
        }
        if lower.len() < 3 && !ACRONYM_WHITELIST.contains(&lower.as_str()) {
            continue;
        }

        let weight = if KNOWN_EXTENSIONS.contains(&lower.as_str())
            || Language::from_keyword(&lower).is_some()
        {
            LANGUAGE_WEIGHT
        } else {
            BASE_WEIGHT
        };
        weighted.push((lower, weight));

        // Identifier-shaped tokens also contribute their pieces.
        for sub in split_identifier(raw) {
            if sub.len() >= 3 && !STOP_WORDS.contains(&sub.as_str()) {
                weighted.push((sub, SUBTOKEN_WEIGHT));
            }
        }
    }

    dedup_by_max_weight(weighted)
}

/// Split camelCase and snake_case into lower-cased sub-tokens. Returns an
/// empty vec when the token has no internal structure.
fn split_identifier(token: &str) -> Vec<String> {
    let has_underscore = token.contains('_');
    let has_case_change = token
        .as_bytes()
        .windows(2)
        .any(|w| w[0].is_ascii_lowercase() && w[1].is_ascii_uppercase());
    if !has_underscore && !has_case_change {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in token.chars() {
        if ch == '_' {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_ascii_uppercase() && prev_lower && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        current.push(ch.to_ascii_lowercase());
    }
    if !current.is_empty() {
        parts.push(current);
    }

    parts.retain(|p| p.len() > 1);
    parts
}

fn dedup_by_max_weight(weighted: Vec<(String, f32)>) -> KeywordSet {
    use std::collections::BTreeMap;

    let mut by_term: BTreeMap<String, f32> = BTreeMap::new();
    for (term, weight) in weighted {
        let entry = by_term.entry(term).or_insert(0.0);
        if weight > *entry {
            *entry = weight;
        }
    }

    let mut terms: Vec<(String, f32)> = by_term.into_iter().collect();
    // Descending weight, then ascending term so output order is total.
    terms.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    KeywordSet { terms }
}
