//! Lexical trigger-phrase matching.
//!
//! A model-free fallback: compares accent-folded text against each entry's trigger phrases
//! (or its question text) and scores exact, contains and contained-in hits at fixed levels.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{CatalogEntry, TriggerMatch};

const EXACT: f64 = 1.0;
const CONTAINS: f64 = 0.8;
const CONTAINED: f64 = 0.6;
const MIN_CONTAINED_LEN: usize = 3;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid char class"));

static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let folded: String = lowered.trim().nfd().filter(|c| !is_combining_mark(*c)).collect();
    let stripped = NON_WORD.replace_all(&folded, " ");
    WHITESPACE_RUNS
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

fn score(message: &str, phrase: &str) -> Option<f64> {
    if message == phrase {
        Some(EXACT)
    } else if message.contains(phrase) {
        Some(CONTAINS)
    } else if phrase.contains(message) && message.chars().count() >= MIN_CONTAINED_LEN {
        Some(CONTAINED)
    } else {
        None
    }
}

/// First entry, in catalog order, with a phrase that hits. Entries are scanned phrase by phrase,
/// so an earlier entry's weaker hit beats a later entry's exact one.
pub fn match_trigger_phrases(message: &str, catalog: &[CatalogEntry]) -> TriggerMatch {
    let normalized_message = normalize(message);
    for entry in catalog {
        for phrase in entry.trigger_phrases() {
            let normalized_phrase = normalize(&phrase);
            // An empty phrase is contained in every message; it would match everything.
            if normalized_phrase.is_empty() {
                continue;
            }
            if let Some(similarity) = score(&normalized_message, &normalized_phrase) {
                debug!(id = %entry.id, similarity, "trigger phrase hit");
                return TriggerMatch {
                    is_question: true,
                    similarity,
                    confidence: similarity,
                    matched_question_id: Some(entry.id.clone()),
                    matched_question: Some(entry.clone()),
                    matched_trigger_phrase: Some(phrase),
                };
            }
        }
    }
    TriggerMatch::none()
}
