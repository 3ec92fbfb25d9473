use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub embeddings: EmbeddingConfig,
    pub detection: DetectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Registry name: `fastembed`, `hashing` or `openai`.
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    /// Overrides `OPENAI_BASE_URL` for the `openai` provider.
    pub base_url: Option<String>,
    /// Where `fastembed` keeps downloaded model files.
    pub cache_dir: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "fastembed".to_string(),
            model: "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2".to_string(),
            dimensions: 384,
            base_url: None,
            cache_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPolicy {
    /// Similarity must clear the threshold and the message must read like a question.
    PatternAndSimilarity,
    /// Similarity alone decides; the pattern verdict is only reported.
    SimilarityOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub threshold: f64,
    pub decision: DecisionPolicy,
    /// Report the best-scoring entry even when it falls below the threshold.
    pub report_below_threshold: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            decision: DecisionPolicy::PatternAndSimilarity,
            report_below_threshold: false,
        }
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("DETECTOR")
            .prefix_separator("_")
            .separator("__"),
    );
    let cfg = settings.build().context("reading configuration")?;
    cfg.try_deserialize().context("invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_a_file() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.embeddings.provider, "fastembed");
        assert_eq!(
            cfg.embeddings.model,
            "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2"
        );
        assert_eq!(cfg.detection.threshold, 0.7);
        assert_eq!(cfg.detection.decision, DecisionPolicy::PatternAndSimilarity);
        assert!(!cfg.detection.report_below_threshold);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[detection]\nthreshold = 0.55\ndecision = \"similarity_only\"\n"
        )
        .unwrap();
        let cfg = load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(cfg.detection.threshold, 0.55);
        assert_eq!(cfg.detection.decision, DecisionPolicy::SimilarityOnly);
        assert_eq!(cfg.embeddings.provider, "fastembed");
    }
}
