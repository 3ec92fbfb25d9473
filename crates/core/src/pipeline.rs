use crate::classifier;
use crate::config::{AppConfig, DecisionPolicy};
use crate::embeddings::SimilarityMatcher;
use crate::models::{CatalogEntry, MatchResult};
use crate::DetectorError;
#[cfg(feature = "fastembed")]
use providers::fastembed::FastEmbedProvider;
use providers::hashing::HashingProvider;
use providers::openai::{OpenAiConfig, OpenAiProvider};
use providers::{EmbeddingProvider, ProviderRegistry};
use std::sync::Arc;
use tracing::{info, warn};

/// Pattern heuristics plus embedding similarity, merged into one verdict per message.
pub struct Detector {
    matcher: SimilarityMatcher,
    decision: DecisionPolicy,
}

impl Detector {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            matcher: SimilarityMatcher::new(provider),
            decision: DecisionPolicy::PatternAndSimilarity,
        }
    }

    pub fn with_decision(mut self, decision: DecisionPolicy) -> Self {
        self.decision = decision;
        self
    }

    pub fn report_below_threshold(mut self, enabled: bool) -> Self {
        self.matcher = self.matcher.report_below_threshold(enabled);
        self
    }

    pub fn matcher(&self) -> &SimilarityMatcher {
        &self.matcher
    }

    /// Never fails: anything that goes wrong is folded into a negative verdict with `error` set.
    /// Entries of `catalog` that lacked an embedding carry one afterwards.
    pub async fn detect(
        &mut self,
        message: &str,
        catalog: &mut [CatalogEntry],
        threshold: f64,
    ) -> MatchResult {
        match self.try_detect(message, catalog, threshold).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "detection failed");
                MatchResult::failed(e)
            }
        }
    }

    async fn try_detect(
        &mut self,
        message: &str,
        catalog: &mut [CatalogEntry],
        threshold: f64,
    ) -> Result<MatchResult, DetectorError> {
        let pattern_detected = classifier::classify(message);
        let best = self
            .matcher
            .find_best_match(message, catalog, threshold)
            .await?;

        let similar_enough = best.similarity >= threshold;
        let is_question = match self.decision {
            DecisionPolicy::PatternAndSimilarity => similar_enough && pattern_detected,
            DecisionPolicy::SimilarityOnly => similar_enough,
        };

        let matched = match best.index {
            Some(i) => Some(catalog.get(i).cloned().ok_or_else(|| {
                DetectorError::Internal(format!("best match index {i} out of range"))
            })?),
            None => None,
        };

        info!(
            pattern_detected,
            similarity = best.similarity,
            is_question,
            candidates = catalog.len(),
            "detection complete"
        );

        Ok(MatchResult {
            is_question,
            similarity: best.similarity,
            matched_question_id: matched.as_ref().map(|m| m.id.clone()),
            matched_question: matched,
            pattern_detected,
            error: None,
        })
    }

    /// Embeds a fixed text to prove the provider is reachable and answering.
    pub async fn check_ready(&mut self) -> Result<usize, DetectorError> {
        let vector = self
            .matcher
            .embed_text("teste de carregamento do modelo")
            .await
            .map_err(|e| DetectorError::Initialization(e.to_string()))?;
        if vector.is_empty() {
            return Err(DetectorError::Initialization(format!(
                "provider {} returned an empty vector",
                self.matcher.provider_name()
            )));
        }
        Ok(vector.len())
    }
}

/// Registers every provider the configuration can reach. The in-process model is only loaded
/// when it is the configured provider, since loading it is the expensive part of startup.
pub fn build_registry(config: &AppConfig) -> Result<ProviderRegistry, DetectorError> {
    let mut reg = ProviderRegistry::new().with_embedding(
        "hashing",
        Arc::new(HashingProvider::new(config.embeddings.dimensions)),
    );

    let base_url = config
        .embeddings
        .base_url
        .clone()
        .or_else(|| std::env::var("OPENAI_BASE_URL").ok());
    if let Some(base_url) = base_url {
        let provider = OpenAiProvider::new(OpenAiConfig {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url,
            embedding_model: config.embeddings.model.clone(),
        });
        reg = reg.with_embedding("openai", Arc::new(provider));
    }

    if config.embeddings.provider == "fastembed" {
        reg = with_local_model(reg, config)?;
    }

    Ok(reg.set_preferred_embedding(&config.embeddings.provider))
}

#[cfg(feature = "fastembed")]
fn with_local_model(
    reg: ProviderRegistry,
    config: &AppConfig,
) -> Result<ProviderRegistry, DetectorError> {
    let provider = FastEmbedProvider::new(
        &config.embeddings.model,
        config.embeddings.cache_dir.as_ref().map(std::path::PathBuf::from),
    )
    .map_err(|e| DetectorError::Initialization(e.to_string()))?;
    Ok(reg.with_embedding("fastembed", Arc::new(provider)))
}

#[cfg(not(feature = "fastembed"))]
fn with_local_model(
    reg: ProviderRegistry,
    _config: &AppConfig,
) -> Result<ProviderRegistry, DetectorError> {
    warn!("built without the fastembed feature; no local model available");
    Ok(reg)
}

/// Resolves the configured provider and wires up a detector around it.
pub fn build_detector(config: &AppConfig) -> Result<Detector, DetectorError> {
    let registry = build_registry(config)?;
    let provider = registry.embedding(None).map_err(|e| {
        DetectorError::Initialization(format!(
            "{e} (available: {})",
            registry.names().join(", ")
        ))
    })?;
    info!(provider = provider.name(), "embedding provider ready");
    Ok(Detector::new(provider)
        .with_decision(config.detection.decision)
        .report_below_threshold(config.detection.report_below_threshold))
}
