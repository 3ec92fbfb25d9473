//! Core library: question patterns, embedding cache, catalog matching, detection verdicts.

pub mod classifier;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod search;
pub mod triggers;

pub use error::DetectorError;
