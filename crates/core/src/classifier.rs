//! Surface-text question heuristics.
//!
//! Everything here is pure: the same text always yields the same verdict, and nothing in this
//! module touches the embedding provider.

use regex::Regex;
use std::sync::LazyLock;

static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s?!.,\-]").expect("valid char class"));

static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Checked in order; the first hit decides.
static QUESTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\?",
        r"^(como|quando|onde|por que|porque|qual|quais|quem|o que|que)",
        r"^(posso|pode|consegue|tem como|é possível)",
        r"^(você|vocês|alguém)",
        r"(status|situação|andamento).*?(pedido|compra|produto)",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("valid question pattern"))
    .collect()
});

/// Normalizes text before pattern matching and embedding.
///
/// Inputs with fewer than two whitespace-separated tokens collapse to the empty string.
/// Note that trimming happens before the character squeeze, so a leading symbol leaves a
/// leading space behind.
pub fn preprocess(text: &str) -> String {
    if text.split_whitespace().nth(1).is_none() {
        return String::new();
    }
    let lowered = text.to_lowercase();
    let squeezed = DISALLOWED_CHARS.replace_all(lowered.trim(), " ");
    WHITESPACE_RUNS.replace_all(&squeezed, " ").into_owned()
}

/// Whether `text` reads like a question on surface features alone.
pub fn classify(text: &str) -> bool {
    let preprocessed = preprocess(text);
    if preprocessed.is_empty() {
        return false;
    }
    QUESTION_PATTERNS.iter().any(|p| p.is_match(&preprocessed))
}
