//! In-process sentence-embedding model (ONNX via fastembed).
//!
//! The model is downloaded on first use into the fastembed cache directory and loaded once per
//! process. Inference is CPU-bound, so it runs on the blocking pool.

use crate::{EmbedResponse, EmbeddingProvider, ProviderError};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;

pub const DEFAULT_MODEL: &str = "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2";

/// Maps a Hugging Face style model name onto the models fastembed ships.
pub fn parse_model(name: &str) -> Result<EmbeddingModel, ProviderError> {
    let lowered = name.trim().to_lowercase();
    let short = lowered.rsplit('/').next().unwrap_or(&lowered);
    match short {
        "paraphrase-multilingual-minilm-l12-v2" => Ok(EmbeddingModel::ParaphraseMLMiniLML12V2),
        "paraphrase-multilingual-mpnet-base-v2" => Ok(EmbeddingModel::ParaphraseMLMpnetBaseV2),
        "multilingual-e5-small" => Ok(EmbeddingModel::MultilingualE5Small),
        "multilingual-e5-base" => Ok(EmbeddingModel::MultilingualE5Base),
        "multilingual-e5-large" => Ok(EmbeddingModel::MultilingualE5Large),
        "all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        _ => Err(ProviderError::ModelLoad(format!("unsupported model: {name}"))),
    }
}

#[derive(Clone)]
pub struct FastEmbedProvider {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
}

impl FastEmbedProvider {
    pub fn new(model_name: &str, cache_dir: Option<PathBuf>) -> Result<Self, ProviderError> {
        let model = parse_model(model_name)?;
        let mut options = InitOptions::new(model).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }
        let embedding = TextEmbedding::try_new(options)
            .map_err(|e| ProviderError::ModelLoad(format!("{model_name}: {e}")))?;
        info!(model = model_name, "sentence-embedding model loaded");
        Ok(Self {
            model: Arc::new(Mutex::new(embedding)),
            model_name: model_name.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model_name
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        let vectors = tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| ProviderError::RequestFailed("embedding model lock poisoned".into()))?;
            model
                .embed(texts, None)
                .map_err(|e| ProviderError::RequestFailed(e.to_string()))
        })
        .await
        .map_err(|e| ProviderError::RequestFailed(e.to_string()))??;
        Ok(EmbedResponse { vectors })
    }

    fn name(&self) -> &str {
        "fastembed"
    }
}
