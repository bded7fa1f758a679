//! JSON import/export codec for quote collections.

use crate::dedup;
use crate::store::StoreError;
use chrono::{DateTime, Local};
use quote_sync_types::Quote;
use std::collections::HashSet;

pub struct MergeOutcome {
    pub merged: Vec<Quote>,
    pub added: usize,
}

/// Pretty-printed JSON array (two-space indent), verbatim order.
pub fn export_document(quotes: &[Quote]) -> String {
    serde_json::to_string_pretty(quotes).unwrap_or_else(|_| "[]".to_string())
}

/// Suggested download filename: `quotes-YYYYMMDD-HHMMSS.json`.
pub fn export_filename(at: DateTime<Local>) -> String {
    format!("quotes-{}.json", at.format("%Y%m%d-%H%M%S"))
}

/// Parse an externally supplied JSON document into candidate quotes.
///
/// Errors unless the top-level value is an array. Elements failing
/// the validity predicate are dropped silently; the caller only sees
/// the accepted records.
pub fn import_document(raw: &str) -> Result<Vec<Quote>, StoreError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| StoreError::Parse(format!("invalid JSON: {}", e)))?;
    let items = value
        .as_array()
        .ok_or_else(|| StoreError::Parse("JSON must be an array of quotes".to_string()))?;
    Ok(items.iter().filter_map(dedup::quote_from_value).collect())
}

/// Append each incoming quote whose identity key is novel. The seen
/// set starts from `existing` and grows as records are accepted, so
/// duplicates within the batch collapse too; first occurrence wins.
pub fn merge_imported(existing: &[Quote], incoming: Vec<Quote>) -> MergeOutcome {
    let mut seen: HashSet<String> = existing.iter().map(dedup::identity_key).collect();
    let mut merged = existing.to_vec();
    let mut added = 0usize;

    for quote in incoming {
        if seen.insert(dedup::identity_key(&quote)) {
            merged.push(quote);
            added += 1;
        }
    }

    MergeOutcome { merged, added }
}
