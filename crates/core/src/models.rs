use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::DetectorError;

/// One known question. Fields other than the three the matcher reads are carried through untouched.
///
/// Stored vectors are kept as `f64` so values written by other tools survive a round trip at full
/// precision; freshly computed ones are widened from the model's `f32` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Absent ids stay absent on output rather than turning into `null`.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub id: Value,
    pub pergunta_texto: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pergunta_embedding: Option<Vec<f64>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogEntry {
    pub fn new(id: impl Into<Value>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pergunta_texto: text.into(),
            pergunta_embedding: None,
            extra: Map::new(),
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f64>) -> Self {
        self.pergunta_embedding = Some(embedding);
        self
    }

    /// Stored vector, if one is present and non-empty.
    pub fn embedding(&self) -> Option<&[f64]> {
        self.pergunta_embedding
            .as_deref()
            .filter(|v| !v.is_empty())
    }

    /// `ativo: false` marks a retired question; anything else counts as active.
    pub fn is_active(&self) -> bool {
        self.extra
            .get("ativo")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Phrases the lexical matcher compares against, defaulting to the question text.
    pub fn trigger_phrases(&self) -> Vec<String> {
        match self.extra.get("trigger_phrases").and_then(Value::as_array) {
            Some(phrases) => phrases
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            None => vec![self.pergunta_texto.clone()],
        }
    }
}

pub fn parse_catalog(json: &str) -> Result<Vec<CatalogEntry>, DetectorError> {
    Ok(serde_json::from_str(json)?)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub is_question: bool,
    pub similarity: f64,
    pub matched_question_id: Option<Value>,
    pub matched_question: Option<CatalogEntry>,
    pub pattern_detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MatchResult {
    /// Negative verdict carrying the failure that produced it.
    pub fn failed(error: impl ToString) -> Self {
        Self {
            is_question: false,
            similarity: 0.0,
            matched_question_id: None,
            matched_question: None,
            pattern_detected: false,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerMatch {
    pub is_question: bool,
    pub similarity: f64,
    pub confidence: f64,
    pub matched_question_id: Option<Value>,
    pub matched_question: Option<CatalogEntry>,
    pub matched_trigger_phrase: Option<String>,
}

impl TriggerMatch {
    pub fn none() -> Self {
        Self {
            is_question: false,
            similarity: 0.0,
            confidence: 0.0,
            matched_question_id: None,
            matched_question: None,
            matched_trigger_phrase: None,
        }
    }
}
