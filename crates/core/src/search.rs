use tracing::{debug, warn};

use crate::embeddings::{cosine_similarity, SimilarityMatcher};
use crate::models::CatalogEntry;
use crate::DetectorError;

/// Best candidate from a catalog scan. `index` points into the scanned slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch {
    pub index: Option<usize>,
    pub similarity: f64,
}

impl BestMatch {
    pub fn none() -> Self {
        Self {
            index: None,
            similarity: 0.0,
        }
    }
}

impl SimilarityMatcher {
    /// Linear scan for the catalog entry closest to `message`.
    ///
    /// Entries without a stored vector get one computed and written back. Only a strictly
    /// greater score replaces the current best, so the earliest entry wins ties. Unless
    /// `report_below_threshold` is set, scores under `threshold` never become the best.
    pub async fn find_best_match(
        &mut self,
        message: &str,
        catalog: &mut [CatalogEntry],
        threshold: f64,
    ) -> Result<BestMatch, DetectorError> {
        let message_vec = match self.embed_text(message).await {
            Ok(v) if !v.is_empty() => v,
            Ok(_) => {
                warn!("provider returned an empty vector for the message");
                return Ok(BestMatch::none());
            }
            Err(e) => {
                warn!(error = %e, "could not embed message");
                return Ok(BestMatch::none());
            }
        };

        let mut best = BestMatch::none();
        for (i, entry) in catalog.iter_mut().enumerate() {
            if entry.embedding().is_none() {
                let computed = match self.embed_text(&entry.pergunta_texto).await {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(id = %entry.id, error = %e, "could not embed catalog question");
                        Vec::new()
                    }
                };
                entry.pergunta_embedding = Some(computed);
            }

            let Some(vector) = entry.embedding() else {
                continue;
            };
            let similarity = cosine_similarity(&message_vec, vector)?;
            debug!(id = %entry.id, similarity, "scored catalog entry");

            let clears_threshold = self.report_below_threshold || similarity >= threshold;
            if clears_threshold && similarity > best.similarity {
                best = BestMatch {
                    index: Some(i),
                    similarity,
                };
            }
        }
        Ok(best)
    }
}
