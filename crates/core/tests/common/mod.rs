use providers::{EmbedResponse, EmbeddingProvider, ProviderError};
use std::collections::HashMap;
use std::sync::Mutex;

/// Test double: fixed vectors for known texts, a constant fallback for everything else, and a
/// log of every text it was asked to embed.
#[derive(Default)]
pub struct FakeProvider {
    table: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    fail_on: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new(fallback: Vec<f32>) -> Self {
        Self {
            fallback,
            ..Self::default()
        }
    }

    pub fn with(mut self, preprocessed: &str, vector: Vec<f32>) -> Self {
        self.table.insert(preprocessed.to_string(), vector);
        self
    }

    pub fn failing_on(mut self, preprocessed: &str) -> Self {
        self.fail_on = Some(preprocessed.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, preprocessed: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.as_str() == preprocessed)
            .count()
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FakeProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            self.calls.lock().unwrap().push(text.clone());
            if self.fail_on.as_deref() == Some(text.as_str()) {
                return Err(ProviderError::RequestFailed("model crashed".into()));
            }
            vectors.push(
                self.table
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| self.fallback.clone()),
            );
        }
        Ok(EmbedResponse { vectors })
    }

    fn name(&self) -> &str {
        "fake"
    }
}
