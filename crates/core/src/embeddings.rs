use providers::{EmbeddingProvider, ProviderError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::classifier::preprocess;
use crate::DetectorError;

/// Raw text to vector, for the lifetime of the owning matcher.
///
/// Keys are the text exactly as received, before preprocessing, so inputs that only differ in
/// case or spacing are embedded separately. Nothing is ever evicted.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    entries: HashMap<String, Vec<f64>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, text: &str) -> Option<&Vec<f64>> {
        self.entries.get(text)
    }

    pub fn insert(&mut self, text: &str, vector: Vec<f64>) {
        self.entries.insert(text.to_string(), vector);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `dot(a, b) / (|a| * |b|)`, or `0.0` when either side has zero magnitude.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64, DetectorError> {
    if a.len() != b.len() {
        return Err(DetectorError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Embeds messages and catalog questions through an injected provider and finds the closest
/// catalog entry. See `search` for the scan itself.
pub struct SimilarityMatcher {
    provider: Arc<dyn EmbeddingProvider>,
    cache: EmbeddingCache,
    pub(crate) report_below_threshold: bool,
}

impl SimilarityMatcher {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            cache: EmbeddingCache::new(),
            report_below_threshold: false,
        }
    }

    /// Keep the global best candidate even when it scores under the threshold.
    pub fn report_below_threshold(mut self, enabled: bool) -> Self {
        self.report_below_threshold = enabled;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    /// Provider output is widened to `f64` once, here, so cached and stored vectors share a type.
    pub async fn embed_text(&mut self, text: &str) -> Result<Vec<f64>, DetectorError> {
        if let Some(hit) = self.cache.get(text) {
            debug!(len = text.len(), "embedding cache hit");
            return Ok(hit.clone());
        }

        let preprocessed = preprocess(text);
        let resp = self.provider.embed(&[preprocessed]).await?;
        let vector: Vec<f64> = resp
            .vectors
            .into_iter()
            .next()
            .ok_or(ProviderError::ShortResponse {
                expected: 1,
                got: 0,
            })?
            .into_iter()
            .map(f64::from)
            .collect();
        debug!(
            provider = self.provider.name(),
            dims = vector.len(),
            "embedded text"
        );
        self.cache.insert(text, vector.clone());
        Ok(vector)
    }
}
