//! Background sync worker.
//!
//! Every N seconds, fetches the remote quote set and merges additions
//! into the local store. Each tick is an independent attempt: a failed
//! fetch is logged and the next tick is the only retry.

use crate::server_api;
use crate::store::QuoteStore;
use quote_sync_types::Quote;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub async fn run_worker(
    store: Arc<Mutex<QuoteStore>>,
    server_url: String,
    sync_interval_secs: u64,
    last_sync_at: Arc<Mutex<Option<String>>>,
) {
    log::info!(
        "[QUOTE_SYNC] Worker started (sync interval: {}s)",
        sync_interval_secs
    );

    let client = reqwest::Client::new();

    loop {
        tokio::time::sleep(Duration::from_secs(sync_interval_secs)).await;

        match sync_tick(&store, &client, &server_url).await {
            Ok(added) => {
                *last_sync_at.lock().await = Some(chrono::Utc::now().to_rfc3339());
                if added > 0 {
                    log::info!(
                        "[QUOTE_SYNC] Tick complete: {} quotes added from server",
                        added
                    );
                }
            }
            Err(e) => {
                log::error!("[QUOTE_SYNC] Tick error: {}", e);
            }
        }
    }
}

/// One sync tick: fetch the remote set, reconcile additively, persist
/// when anything changed. Returns the number of quotes added.
pub async fn sync_tick(
    store: &Arc<Mutex<QuoteStore>>,
    client: &reqwest::Client,
    server_url: &str,
) -> Result<usize, String> {
    let remote = server_api::fetch_server_quotes(client, server_url).await?;

    let mut store = store.lock().await;
    let (merged, changed) = reconcile(store.quotes(), &remote);
    if !changed {
        return Ok(0);
    }

    let added = merged.len() - store.quotes().len();
    store
        .replace_quotes(merged)
        .map_err(|e| format!("Failed to persist synced quotes: {}", e))?;
    Ok(added)
}

/// Additive merge of remote records into the local sequence.
///
/// Local quotes are never removed or rewritten; a remote quote is
/// appended only when no local quote carries the same raw text. The
/// match is deliberately on text alone, not the identity key, so a
/// server quote never displaces a locally categorized copy.
pub fn reconcile(local: &[Quote], remote: &[Quote]) -> (Vec<Quote>, bool) {
    let mut merged = local.to_vec();
    let mut changed = false;

    for quote in remote {
        let exists = merged.iter().any(|q| q.text == quote.text);
        if !exists {
            merged.push(quote.clone());
            changed = true;
        }
    }

    (merged, changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server_api::SERVER_CATEGORY;

    fn quote(text: &str, category: &str) -> Quote {
        Quote {
            text: text.to_string(),
            category: category.to_string(),
        }
    }

    fn server_quote(text: &str) -> Quote {
        quote(text, SERVER_CATEGORY)
    }

    #[test]
    fn reconcile_preserves_every_local_record_unchanged() {
        let local = vec![quote("A", "One"), quote("B", "Two")];
        let remote = vec![server_quote("B"), server_quote("C")];

        let (merged, changed) = reconcile(&local, &remote);
        assert!(changed);
        assert_eq!(&merged[..local.len()], local.as_slice());
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[2], server_quote("C"));
    }

    #[test]
    fn reconcile_matches_on_raw_text_only() {
        // Same category-normalized identity, different raw text:
        // treated as new.
        let local = vec![quote("Stay hungry", "server")];
        let remote = vec![server_quote("Stay hungry "), server_quote("Stay hungry")];

        let (merged, changed) = reconcile(&local, &remote);
        assert!(changed);
        // The padded variant differs in raw text and is appended; the
        // exact-text match is not.
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].text, "Stay hungry ");
    }

    #[test]
    fn reconcile_dedups_repeated_remote_text_within_a_batch() {
        let remote = vec![server_quote("X"), server_quote("X")];
        let (merged, changed) = reconcile(&[], &remote);
        assert!(changed);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn reconcile_reports_no_change_when_everything_matches() {
        let local = vec![quote("A", "One")];
        let remote = vec![server_quote("A")];
        let (merged, changed) = reconcile(&local, &remote);
        assert!(!changed);
        assert_eq!(merged, local);
    }
}
