use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::{args, catalog};
use detector_core::config::{self, AppConfig};
use detector_core::{classifier, pipeline, triggers};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries exactly one JSON document; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Test => run_test(cfg).await,
        Commands::Detect {
            message,
            catalog,
            threshold,
            threshold_option,
            catalog_file,
            write_catalog,
            active_only,
        } => {
            let inputs = args::resolve_detect_inputs(
                catalog,
                threshold,
                threshold_option,
                catalog_file.is_some(),
            )?;
            run_detect(cfg, &message, inputs, catalog_file, write_catalog, active_only).await
        }
        Commands::Classify { message } => {
            let verdict = serde_json::json!({
                "pattern_detected": classifier::classify(&message),
            });
            println!("{}", verdict);
            Ok(())
        }
        Commands::Triggers {
            message,
            catalog,
            catalog_file,
        } => {
            let entries = catalog::load(catalog.as_deref(), catalog_file.as_deref())?;
            let result = triggers::match_trigger_phrases(&message, &entries);
            println!("{}", serde_json::to_string(&result)?);
            Ok(())
        }
    }
}

#[derive(Parser)]
#[command(name = "question-detector")]
#[command(about = "Detects questions and matches them against a Q&A catalog", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the embedding provider and report readiness
    Test,
    /// Classify a message and match it against the catalog
    Detect {
        /// User message
        #[arg(allow_hyphen_values = true)]
        message: String,
        /// Catalog as a JSON array of {id, pergunta_texto, pergunta_embedding?};
        /// holds the threshold instead when --catalog-file is used
        #[arg(required_unless_present = "catalog_file", allow_negative_numbers = true)]
        catalog: Option<String>,
        /// Minimum similarity for a match (defaults to detection.threshold)
        #[arg(allow_negative_numbers = true)]
        threshold: Option<f64>,
        /// Same as the positional threshold
        #[arg(long = "threshold", value_name = "THRESHOLD", allow_negative_numbers = true)]
        threshold_option: Option<f64>,
        /// Read the catalog from a JSON file instead
        #[arg(long)]
        catalog_file: Option<PathBuf>,
        /// Save the catalog with back-filled embeddings after detection
        #[arg(long)]
        write_catalog: Option<PathBuf>,
        /// Skip entries marked "ativo": false
        #[arg(long, default_value_t = false)]
        active_only: bool,
    },
    /// Run only the surface-pattern heuristics
    Classify {
        /// User message
        #[arg(allow_hyphen_values = true)]
        message: String,
    },
    /// Match a message against trigger phrases without embeddings
    Triggers {
        /// User message
        #[arg(allow_hyphen_values = true)]
        message: String,
        /// Catalog as a JSON array
        #[arg(required_unless_present = "catalog_file", conflicts_with = "catalog_file")]
        catalog: Option<String>,
        /// Read the catalog from a JSON file instead
        #[arg(long)]
        catalog_file: Option<PathBuf>,
    },
}

async fn run_test(cfg: AppConfig) -> Result<()> {
    let mut detector = pipeline::build_detector(&cfg)?;
    let dims = detector.check_ready().await?;
    info!(dims, "model loaded");
    println!(
        "{}",
        serde_json::json!({ "status": "ok", "model_loaded": true })
    );
    Ok(())
}

async fn run_detect(
    cfg: AppConfig,
    message: &str,
    inputs: args::DetectInputs,
    catalog_file: Option<PathBuf>,
    write_catalog: Option<PathBuf>,
    active_only: bool,
) -> Result<()> {
    let mut detector = pipeline::build_detector(&cfg)?;
    let entries = catalog::load(inputs.inline_catalog.as_deref(), catalog_file.as_deref())?;
    let threshold = inputs.threshold.unwrap_or(cfg.detection.threshold);

    let (mut active, parked) = if active_only {
        catalog::take_active(entries)
    } else {
        (entries, Vec::new())
    };
    info!(
        entries = active.len(),
        skipped = parked.len(),
        threshold,
        "catalog loaded"
    );

    let result = detector.detect(message, &mut active, threshold).await;

    println!("{}", serde_json::to_string(&result)?);

    // The verdict is already out; a failed write-back only costs the cached embeddings.
    if let Some(path) = write_catalog {
        let full = catalog::restore(active, parked);
        if let Err(e) = catalog::save(&path, &full) {
            warn!(error = %format!("{e:#}"), path = %path.display(), "catalog not persisted");
        }
    }
    Ok(())
}
