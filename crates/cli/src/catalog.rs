use anyhow::{Context, Result};
use detector_core::models::{parse_catalog, CatalogEntry};
use std::fs;
use std::path::Path;

/// Reads the catalog from a file when one is given, otherwise decodes the inline argument.
pub fn load(inline: Option<&str>, file: Option<&Path>) -> Result<Vec<CatalogEntry>> {
    let json = match (file, inline) {
        (Some(path), _) => fs::read_to_string(path)
            .with_context(|| format!("reading catalog file {}", path.display()))?,
        (None, Some(json)) => json.to_string(),
        (None, None) => anyhow::bail!("no catalog given"),
    };
    Ok(parse_catalog(&json)?)
}

/// Writes the catalog, back-filled embeddings included, as pretty JSON.
pub fn save(path: &Path, catalog: &[CatalogEntry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let data = serde_json::to_string_pretty(catalog)?;
    fs::write(path, data).with_context(|| format!("writing catalog {}", path.display()))?;
    Ok(())
}

/// Retired entries, remembered by their original position.
pub type Parked = Vec<(usize, CatalogEntry)>;

/// Splits off entries with `ativo: false`; the rest keep their relative order.
pub fn take_active(catalog: Vec<CatalogEntry>) -> (Vec<CatalogEntry>, Parked) {
    let mut active = Vec::with_capacity(catalog.len());
    let mut parked = Vec::new();
    for (i, entry) in catalog.into_iter().enumerate() {
        if entry.is_active() {
            active.push(entry);
        } else {
            parked.push((i, entry));
        }
    }
    (active, parked)
}

/// Inverse of [`take_active`].
pub fn restore(mut active: Vec<CatalogEntry>, parked: Parked) -> Vec<CatalogEntry> {
    for (i, entry) in parked {
        let at = i.min(active.len());
        active.insert(at, entry);
    }
    active
}
