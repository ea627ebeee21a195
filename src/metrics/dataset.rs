//! County dataset: the static per-county figures the dashboard is built from.
//!
//! The bundled table is compiled into the binary and parsed on first use.
//! Operators can point the CLI at a replacement JSON file with the same
//! shape (`[{countyName, queries, escalations, satisfaction, coordinates}]`).

use std::path::Path;
use std::sync::OnceLock;

use crate::error::ErrorCode;
use crate::types::CountyMetric;

const BUNDLED_COUNTIES: &str = include_str!("../../data/counties.json");

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("could not read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid county dataset: {0}")]
    Parse(String),

    #[error("county dataset has invalid entry '{county}': {reason}")]
    Invalid { county: String, reason: String },
}

impl ErrorCode for DatasetError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "E_DATASET_READ",
            Self::Parse(_) => "E_DATASET_PARSE",
            Self::Invalid { .. } => "E_DATASET_INVALID",
        }
    }
}

/// Parse a county table from JSON text.
///
/// # Errors
///
/// Malformed JSON, blank county names or satisfaction above 100.
pub fn parse(json: &str) -> Result<Vec<CountyMetric>, DatasetError> {
    let counties: Vec<CountyMetric> = serde_json::from_str(json).map_err(|e| DatasetError::Parse(e.to_string()))?;
    for county in &counties {
        if county.county_name.trim().is_empty() {
            return Err(DatasetError::Invalid { county: county.county_name.clone(), reason: "empty name".into() });
        }
        if county.satisfaction > 100 {
            return Err(DatasetError::Invalid {
                county: county.county_name.clone(),
                reason: format!("satisfaction {} exceeds 100", county.satisfaction),
            });
        }
    }
    Ok(counties)
}

/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn load_from_file(path: &Path) -> Result<Vec<CountyMetric>, DatasetError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| DatasetError::Read { path: path.display().to_string(), reason: e.to_string() })?;
    parse(&text)
}

/// The bundled dataset. A broken bundle yields an empty table (and a log
/// line) rather than a panic.
pub fn bundled() -> &'static [CountyMetric] {
    static COUNTIES: OnceLock<Vec<CountyMetric>> = OnceLock::new();
    COUNTIES.get_or_init(|| {
        parse(BUNDLED_COUNTIES).unwrap_or_else(|e| {
            tracing::error!(error = %e, "metrics: bundled county dataset unusable");
            Vec::new()
        })
    })
}

#[cfg(test)]
#[path = "dataset_test.rs"]
mod tests;
