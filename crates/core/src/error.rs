use providers::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectorError {
    /// The embedding provider could not be set up. Fatal for the process.
    #[error("failed to initialize embedding provider: {0}")]
    Initialization(String),
    /// The catalog could not be decoded. Fatal for the process.
    #[error("invalid catalog JSON: {0}")]
    InputDecode(#[from] serde_json::Error),
    #[error("embedding failed: {0}")]
    Embedding(#[from] ProviderError),
    #[error("embedding dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("internal error: {0}")]
    Internal(String),
}

impl DetectorError {
    /// Whether the process has to stop rather than report a negative verdict.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Initialization(_) | Self::InputDecode(_))
    }
}
