use anyhow::{bail, Result};

/// What `detect` should read once positionals and flags are reconciled.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectInputs {
    pub inline_catalog: Option<String>,
    pub threshold: Option<f64>,
}

/// The positional form is `<message> <catalog> [threshold]`. With `--catalog-file` there is no
/// inline catalog, so the second positional is the threshold.
pub fn resolve_detect_inputs(
    catalog: Option<String>,
    positional_threshold: Option<f64>,
    threshold_option: Option<f64>,
    has_catalog_file: bool,
) -> Result<DetectInputs> {
    let (inline_catalog, positional_threshold) = if has_catalog_file {
        if positional_threshold.is_some() {
            bail!("too many positional arguments: --catalog-file replaces the inline catalog");
        }
        let threshold = match catalog {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(t) => Some(t),
                Err(_) => bail!("--catalog-file cannot be combined with an inline catalog"),
            },
            None => None,
        };
        (None, threshold)
    } else {
        (catalog, positional_threshold)
    };

    let threshold = match (positional_threshold, threshold_option) {
        (Some(_), Some(_)) => bail!("threshold given both positionally and with --threshold"),
        (p, o) => o.or(p),
    };
    if let Some(t) = threshold {
        if !t.is_finite() {
            bail!("threshold must be a finite number, got {t}");
        }
    }

    Ok(DetectInputs {
        inline_catalog,
        threshold,
    })
}
