//! Content catalog — the static list of nurture content a follow-up can link to.
//!
//! Stored as CSV with a header row. `topic`, `description` and `link` are
//! required columns; any others are kept in `ContentEntry::extra`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::models::content::ContentEntry;

const REQUIRED_COLUMNS: [&str; 3] = ["topic", "description", "link"];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog file not found at: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Catalog is missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Loads the catalog from disk.
pub async fn load_catalog(path: &Path) -> Result<Vec<ContentEntry>, CatalogError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CatalogError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    let entries = parse_catalog(bytes.as_slice())?;
    info!("Loaded {} catalog entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Parses catalog CSV from any reader. Rows with every cell blank are skipped.
pub fn parse_catalog<R: std::io::Read>(reader: R) -> Result<Vec<ContentEntry>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.to_lowercase())
        .collect();

    let mut required = [0usize; 3];
    for (slot, column) in required.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .ok_or(CatalogError::MissingColumn(column))?;
    }
    let [topic_idx, description_idx, link_idx] = required;

    let mut entries = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let cell = |idx: usize| row.get(idx).unwrap_or_default().to_string();
        let extra: BTreeMap<String, String> = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| !required.contains(idx))
            .map(|(idx, header)| (header.clone(), cell(idx)))
            .collect();

        entries.push(ContentEntry {
            topic: cell(topic_idx),
            description: cell(description_idx),
            link: cell(link_idx),
            extra,
        });
    }

    Ok(entries)
}
