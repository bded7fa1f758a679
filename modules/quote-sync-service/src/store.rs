//! The quote store: an ordered in-memory sequence, deduplicated by
//! identity key, persisted as a versioned JSON document in key-value
//! storage.

use crate::codec;
use crate::dedup;
use crate::storage::{QUOTES_KEY, Storage};
use quote_sync_types::{Quote, STORE_VERSION, StoreDocument};
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("that quote already exists in this category")]
    Duplicate,
    #[error("{0}")]
    Parse(String),
    #[error("failed to save quotes: {0}")]
    Storage(String),
}

/// Built-in quotes used when persisted storage is absent or corrupt.
pub fn seed_quotes() -> Vec<Quote> {
    vec![
        Quote {
            text: "The best way to get started is to quit talking and begin doing.".to_string(),
            category: "Motivation".to_string(),
        },
        Quote {
            text: "Your time is limited, so don’t waste it living someone else’s life.".to_string(),
            category: "Life".to_string(),
        },
        Quote {
            text: "Success is not the key to happiness. Happiness is the key to success."
                .to_string(),
            category: "Success".to_string(),
        },
    ]
}

pub struct QuoteStore {
    quotes: Vec<Quote>,
    storage: Arc<Storage>,
    revision: u64,
}

impl QuoteStore {
    /// Load the store from persistent storage. Any read or parse
    /// failure falls back to the seed set; this never errors.
    pub fn load(storage: Arc<Storage>) -> Self {
        let quotes = match storage.get(QUOTES_KEY) {
            Ok(Some(raw)) => parse_document(&raw).unwrap_or_else(|| {
                log::warn!("Stored quote document is corrupt, using seed set");
                seed_quotes()
            }),
            Ok(None) => seed_quotes(),
            Err(e) => {
                log::warn!("Failed to read stored quotes: {}", e);
                seed_quotes()
            }
        };
        Self {
            quotes,
            storage,
            revision: 0,
        }
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Write the current sequence to storage. A failed write leaves
    /// the in-memory state as-is; memory and disk diverge until the
    /// next successful save.
    pub fn save(&self) -> Result<(), StoreError> {
        let doc = StoreDocument {
            v: STORE_VERSION,
            quotes: self.quotes.clone(),
        };
        let raw = serde_json::to_string(&doc).map_err(|e| StoreError::Storage(e.to_string()))?;
        self.storage
            .set(QUOTES_KEY, &raw)
            .map_err(|e| StoreError::Storage(e.to_string()))
    }

    /// Validate, dedup, append, persist. Returns the stored quote.
    pub fn add(&mut self, text: &str, category: &str) -> Result<Quote, StoreError> {
        if !dedup::is_valid(text, category) {
            return Err(StoreError::Validation(
                "both text and category are required".to_string(),
            ));
        }

        let candidate = dedup::normalize(text, category);
        let key = dedup::identity_key(&candidate);
        if self.quotes.iter().any(|q| dedup::identity_key(q) == key) {
            return Err(StoreError::Duplicate);
        }

        self.quotes.push(candidate.clone());
        self.revision += 1;
        self.save()?;
        Ok(candidate)
    }

    /// Merge an imported document into the store. Returns how many
    /// quotes were actually added; invalid elements were already
    /// dropped by the codec and duplicates are skipped silently.
    pub fn import(&mut self, content: &str) -> Result<usize, StoreError> {
        let incoming = codec::import_document(content)?;
        let outcome = codec::merge_imported(&self.quotes, incoming);
        if outcome.added > 0 {
            self.quotes = outcome.merged;
            self.revision += 1;
            self.save()?;
        }
        Ok(outcome.added)
    }

    /// Replace the whole sequence (sync reconciliation result) and
    /// persist it.
    pub fn replace_quotes(&mut self, quotes: Vec<Quote>) -> Result<(), StoreError> {
        self.quotes = quotes;
        self.revision += 1;
        self.save()
    }

    /// Replace everything with the seed set. The confirmation gate
    /// lives at the RPC boundary, not here.
    pub fn reset(&mut self) -> Result<usize, StoreError> {
        self.quotes = seed_quotes();
        self.revision += 1;
        self.save()?;
        Ok(self.quotes.len())
    }

    /// Distinct categories as stored, sorted lexicographically.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> =
            self.quotes.iter().map(|q| q.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Uniform random pick from the given category, or from the whole
    /// store for `None` / `"all"`. `None` when the pool is empty.
    pub fn random_quote(&self, category: Option<&str>) -> Option<Quote> {
        let pool: Vec<&Quote> = match category {
            Some(c) if c != "all" => self.quotes.iter().filter(|q| q.category == c).collect(),
            _ => self.quotes.iter().collect(),
        };
        if pool.is_empty() {
            return None;
        }
        let idx = rand::thread_rng().gen_range(0..pool.len());
        Some(pool[idx].clone())
    }
}

/// Parse a persisted document: either the `{v, quotes}` envelope or a
/// bare array written by older versions. Invalid elements are dropped,
/// survivors normalized. `None` means the document is unusable.
fn parse_document(raw: &str) -> Option<Vec<Quote>> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let items = match &value {
        serde_json::Value::Array(items) => items,
        other => other.get("quotes")?.as_array()?,
    };
    Some(items.iter().filter_map(dedup::quote_from_value).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_store() -> QuoteStore {
        let storage = Arc::new(Storage::open(":memory:").expect("in-memory storage"));
        let mut store = QuoteStore::load(storage);
        store.quotes.clear();
        store
    }

    #[test]
    fn missing_storage_falls_back_to_seed_set() {
        let storage = Arc::new(Storage::open(":memory:").expect("in-memory storage"));
        let store = QuoteStore::load(storage);
        assert_eq!(store.quotes(), seed_quotes().as_slice());
    }

    #[test]
    fn corrupted_storage_falls_back_to_seed_set() {
        let storage = Arc::new(Storage::open(":memory:").expect("in-memory storage"));
        storage.set(QUOTES_KEY, "{not valid json!").unwrap();
        let store = QuoteStore::load(storage);
        assert_eq!(store.quotes().len(), 3);
        assert_eq!(store.quotes(), seed_quotes().as_slice());
    }

    #[test]
    fn load_accepts_bare_array_documents() {
        let storage = Arc::new(Storage::open(":memory:").expect("in-memory storage"));
        storage
            .set(QUOTES_KEY, r#"[{"text":"A","category":"B"}]"#)
            .unwrap();
        let store = QuoteStore::load(storage);
        assert_eq!(store.quotes().len(), 1);
        assert_eq!(store.quotes()[0].text, "A");
    }

    #[test]
    fn load_drops_invalid_elements_and_normalizes() {
        let storage = Arc::new(Storage::open(":memory:").expect("in-memory storage"));
        storage
            .set(
                QUOTES_KEY,
                r#"{"v":1,"quotes":[{"text":"  A  ","category":" B "},{"text":"","category":"C"},{"category":"D"}]}"#,
            )
            .unwrap();
        let store = QuoteStore::load(storage);
        assert_eq!(store.quotes().len(), 1);
        assert_eq!(store.quotes()[0].text, "A");
        assert_eq!(store.quotes()[0].category, "B");
    }

    #[test]
    fn add_rejects_blank_fields() {
        let mut store = empty_store();
        assert!(matches!(
            store.add("   ", "Motivation"),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(store.add("text", ""), Err(StoreError::Validation(_))));
        assert!(store.quotes().is_empty());
    }

    #[test]
    fn add_rejects_whitespace_and_case_variants_of_existing_quote() {
        let storage = Arc::new(Storage::open(":memory:").expect("in-memory storage"));
        let mut store = QuoteStore::load(storage);
        let before = store.quotes().len();

        store.add("Do it.", "Motivation").expect("first add");
        assert_eq!(store.quotes().len(), before + 1);

        let err = store.add("do it.  ", "  motivation").unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
        assert_eq!(store.quotes().len(), before + 1);

        // Trimmed category appears exactly once
        let count = store
            .categories()
            .iter()
            .filter(|c| c.as_str() == "Motivation")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn add_persists_and_survives_reload() {
        let storage = Arc::new(Storage::open(":memory:").expect("in-memory storage"));
        let mut store = QuoteStore::load(storage.clone());
        store.add("Fresh quote", "Testing").expect("add");

        let reloaded = QuoteStore::load(storage);
        assert!(
            reloaded
                .quotes()
                .iter()
                .any(|q| q.text == "Fresh quote" && q.category == "Testing")
        );
    }

    #[test]
    fn reset_restores_the_seed_set() {
        let storage = Arc::new(Storage::open(":memory:").expect("in-memory storage"));
        let mut store = QuoteStore::load(storage);
        store.add("extra", "Extra").expect("add");
        let count = store.reset().expect("reset");
        assert_eq!(count, 3);
        assert_eq!(store.quotes(), seed_quotes().as_slice());
    }

    #[test]
    fn categories_are_distinct_and_sorted() {
        let mut store = empty_store();
        store.add("q1", "Zebra").unwrap();
        store.add("q2", "Alpha").unwrap();
        store.add("q3", "Zebra").unwrap();
        assert_eq!(store.categories(), vec!["Alpha", "Zebra"]);
    }

    #[test]
    fn random_quote_respects_the_category_filter() {
        let mut store = empty_store();
        store.add("a", "One").unwrap();
        store.add("b", "Two").unwrap();

        let q = store.random_quote(Some("One")).expect("quote in category");
        assert_eq!(q.text, "a");

        assert!(store.random_quote(Some("Missing")).is_none());
        assert!(store.random_quote(Some("all")).is_some());
        assert!(store.random_quote(None).is_some());
    }

    #[test]
    fn import_counts_only_novel_valid_quotes() {
        let mut store = empty_store();
        let added = store
            .import(r#"[{"text":"A","category":"B"},{"text":"A","category":"B"},{"text":"","category":"C"}]"#)
            .expect("import");
        assert_eq!(added, 1);
        assert_eq!(store.quotes().len(), 1);
        assert_eq!(store.quotes()[0].text, "A");
        assert_eq!(store.quotes()[0].category, "B");
    }

    #[test]
    fn import_rejects_non_array_documents() {
        let mut store = empty_store();
        assert!(matches!(
            store.import(r#"{"text":"A","category":"B"}"#),
            Err(StoreError::Parse(_))
        ));
        assert!(matches!(store.import("not json"), Err(StoreError::Parse(_))));
        assert!(store.quotes().is_empty());
    }

    #[test]
    fn revision_bumps_on_every_mutation() {
        let mut store = empty_store();
        let r0 = store.revision();
        store.add("a", "b").unwrap();
        assert!(store.revision() > r0);
        let r1 = store.revision();
        store.reset().unwrap();
        assert!(store.revision() > r1);
    }
}
