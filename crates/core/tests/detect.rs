mod common;

use common::FakeProvider;
use detector_core::config::{AppConfig, DecisionPolicy};
use detector_core::models::{parse_catalog, CatalogEntry};
use detector_core::pipeline::{build_detector, build_registry, Detector};
use detector_core::DetectorError;
use serde_json::json;
use std::sync::Arc;

fn provider() -> FakeProvider {
    FakeProvider::new(vec![0.0, 0.0, 1.0])
        .with("como rastrear meu pedido?", vec![0.2, 0.9, 0.1])
        .with("obrigado pelo atendimento", vec![0.2, 0.9, 0.1])
        .with("qual o status do meu pedido?", vec![1.0, 0.0, 0.0])
}

#[tokio::test]
async fn status_question_against_empty_catalog() {
    let mut detector = Detector::new(Arc::new(provider()));
    let mut catalog: Vec<CatalogEntry> = Vec::new();
    let result = detector
        .detect("Qual o status do meu pedido?", &mut catalog, 0.7)
        .await;
    assert!(result.pattern_detected);
    assert_eq!(result.similarity, 0.0);
    assert_eq!(result.matched_question, None);
    assert_eq!(result.matched_question_id, None);
    assert!(!result.is_question);
    assert_eq!(result.error, None);
}

#[tokio::test]
async fn one_word_message_has_no_pattern_and_embeds_empty_text() {
    let fake = Arc::new(provider());
    let mut detector = Detector::new(fake.clone());
    let mut catalog = vec![CatalogEntry::new(1, "Como rastrear meu pedido?")];
    let result = detector.detect("oi", &mut catalog, 0.1).await;
    assert!(!result.pattern_detected);
    assert!(!result.is_question);
    assert_eq!(fake.calls_for(""), 1);
}

#[tokio::test]
async fn identical_text_matches_itself() {
    let mut detector = Detector::new(Arc::new(provider()));
    let mut catalog = parse_catalog(
        r#"[{"id":1,"pergunta_texto":"Como rastrear meu pedido?","respostas":[{"tipo":"texto","conteudo":"Use o código."}]}]"#,
    )
    .unwrap();
    let result = detector
        .detect("Como rastrear meu pedido?", &mut catalog, 0.5)
        .await;
    assert!((result.similarity - 1.0).abs() < 1e-6);
    assert_eq!(result.matched_question_id, Some(json!(1)));
    assert!(result.pattern_detected);
    assert!(result.is_question);

    let matched = result.matched_question.unwrap();
    assert_eq!(matched.extra["respostas"][0]["conteudo"], "Use o código.");
    assert_eq!(matched.embedding().map(<[f64]>::len), Some(3));
    assert_eq!(catalog[0].pergunta_embedding, matched.pergunta_embedding);
}

#[tokio::test]
async fn pattern_gates_the_verdict_by_default() {
    let mut detector = Detector::new(Arc::new(provider()));
    let mut catalog = vec![CatalogEntry::new(9, "Como rastrear meu pedido?")];
    let result = detector
        .detect("Obrigado pelo atendimento", &mut catalog, 0.5)
        .await;
    assert!((result.similarity - 1.0).abs() < 1e-6);
    assert_eq!(result.matched_question_id, Some(json!(9)));
    assert!(!result.pattern_detected);
    assert!(!result.is_question);
}

#[tokio::test]
async fn similarity_only_policy_ignores_the_pattern() {
    let mut detector =
        Detector::new(Arc::new(provider())).with_decision(DecisionPolicy::SimilarityOnly);
    let mut catalog = vec![CatalogEntry::new(9, "Como rastrear meu pedido?")];
    let result = detector
        .detect("Obrigado pelo atendimento", &mut catalog, 0.5)
        .await;
    assert!(!result.pattern_detected);
    assert!(result.is_question);
}

#[tokio::test]
async fn pattern_alone_is_not_enough() {
    let mut detector = Detector::new(Arc::new(provider()));
    let mut catalog = vec![CatalogEntry::new(3, "Como rastrear meu pedido?")];
    let result = detector
        .detect("Qual o status do meu pedido?", &mut catalog, 0.7)
        .await;
    assert!(result.pattern_detected);
    assert!(!result.is_question);
    assert_eq!(result.matched_question, None);
}

#[tokio::test]
async fn below_threshold_best_is_reported_but_not_a_question() {
    let mut detector = Detector::new(Arc::new(provider()))
        .with_decision(DecisionPolicy::SimilarityOnly)
        .report_below_threshold(true);
    let mut catalog = vec![CatalogEntry::new(3, "Como rastrear meu pedido?")];
    let result = detector
        .detect("Qual o status do meu pedido?", &mut catalog, 0.7)
        .await;
    assert_eq!(result.matched_question_id, Some(json!(3)));
    assert!(result.similarity > 0.0 && result.similarity < 0.7);
    assert!(!result.is_question);
}

#[tokio::test]
async fn detect_is_idempotent() {
    let mut detector = Detector::new(Arc::new(provider()));
    let mut catalog = vec![
        CatalogEntry::new(1, "Como rastrear meu pedido?"),
        CatalogEntry::new(2, "Quais são as formas de pagamento?"),
    ];
    let first = detector
        .detect("Como rastrear meu pedido?", &mut catalog, 0.5)
        .await;
    let second = detector
        .detect("Como rastrear meu pedido?", &mut catalog, 0.5)
        .await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn internal_failures_become_error_results() {
    let mut detector = Detector::new(Arc::new(provider()));
    let mut catalog = vec![CatalogEntry::new(1, "x").with_embedding(vec![1.0, 0.0])];
    let result = detector
        .detect("Qual o status do meu pedido?", &mut catalog, 0.5)
        .await;
    assert!(!result.is_question);
    assert!(!result.pattern_detected);
    assert_eq!(result.similarity, 0.0);
    assert_eq!(result.matched_question, None);
    assert!(result.error.unwrap().contains("dimension mismatch"));
}

#[tokio::test]
async fn hashing_provider_works_offline() {
    let mut cfg = AppConfig::default();
    cfg.embeddings.provider = "hashing".into();
    let mut detector = build_detector(&cfg).unwrap();
    assert_eq!(detector.matcher().provider_name(), "hashing");
    assert_eq!(detector.check_ready().await.unwrap(), 384);

    let mut catalog = vec![
        CatalogEntry::new(1, "Quanto tempo demora para entregar?"),
        CatalogEntry::new(2, "Como faço para cancelar meu pedido?"),
    ];
    let result = detector
        .detect("Como faço para cancelar meu pedido?", &mut catalog, 0.7)
        .await;
    assert_eq!(result.matched_question_id, Some(json!(2)));
    assert!(result.is_question);
}

#[test]
fn unknown_provider_fails_initialization() {
    let mut cfg = AppConfig::default();
    cfg.embeddings.provider = "sentence-transformers".into();
    match build_detector(&cfg) {
        Err(e) => {
            assert!(matches!(e, DetectorError::Initialization(_)));
            assert!(e.is_fatal());
        }
        Ok(_) => panic!("expected initialization failure"),
    }
}

#[test]
fn unsupported_local_model_fails_initialization() {
    let mut cfg = AppConfig::default();
    assert_eq!(cfg.embeddings.provider, "fastembed");
    cfg.embeddings.model = "acme/word2vec".into();
    match build_detector(&cfg) {
        Err(e) => assert!(matches!(e, DetectorError::Initialization(_))),
        Ok(_) => panic!("expected initialization failure"),
    }
}

#[test]
fn local_model_is_not_loaded_unless_selected() {
    let mut cfg = AppConfig::default();
    cfg.embeddings.provider = "hashing".into();
    let registry = build_registry(&cfg).unwrap();
    let names = registry.names();
    assert!(names.contains(&"hashing".to_string()));
    assert!(!names.contains(&"fastembed".to_string()));
}
