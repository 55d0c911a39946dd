//! Loading exported record arrays from disk.
//!
//! Individual malformed records degrade through the lenient field
//! deserializers, and non-object array elements are skipped outright; an
//! unreadable file or a non-array top level is a real error and surfaces
//! with context.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::{Metric, Sale};

fn load_records<T: DeserializeOwned>(path: &Path, what: &str) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} file: {}", path.display()))?;
    let raw: Vec<Value> = serde_json::from_str(&content)
        .with_context(|| format!("invalid {what} JSON in {}", path.display()))?;

    let total = raw.len();
    let records: Vec<T> = raw
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        })
        .collect();
    if records.len() < total {
        warn!(
            "skipped {} non-record entries in {}",
            total - records.len(),
            path.display()
        );
    }
    info!("loaded {} {what} records from {}", records.len(), path.display());
    Ok(records)
}

/// Load a JSON array of metric records.
pub fn load_metrics(path: &Path) -> Result<Vec<Metric>> {
    load_records(path, "metrics")
}

/// Load a JSON array of sale records.
pub fn load_sales(path: &Path) -> Result<Vec<Sale>> {
    load_records(path, "sales")
}
