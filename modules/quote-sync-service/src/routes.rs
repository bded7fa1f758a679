//! Axum route handlers for the quote sync RPC API.

use crate::server_api;
use crate::storage::{SELECTED_CATEGORY_KEY, Storage};
use crate::store::{QuoteStore, StoreError};
use crate::worker;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use quote_sync_types::*;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

pub struct AppState {
    pub store: Arc<Mutex<QuoteStore>>,
    pub storage: Arc<Storage>,
    /// Last quote shown this session. Process memory only; the process
    /// lifetime is the session.
    pub last_viewed: Mutex<Option<Quote>>,
    pub last_sync_at: Arc<Mutex<Option<String>>>,
    pub start_time: Instant,
    pub sync_interval_secs: u64,
    pub server_url: String,
    pub client: reqwest::Client,
}

fn error_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

// =====================================================
// Quote Endpoints
// =====================================================

// POST /rpc/quotes/add
pub async fn quotes_add(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddQuoteRequest>,
) -> (StatusCode, Json<RpcResponse<Quote>>) {
    let snapshot;
    let added;
    {
        let mut store = state.store.lock().await;
        match store.add(&req.text, &req.category) {
            Ok(quote) => {
                snapshot = store.quotes().to_vec();
                added = quote;
            }
            Err(e) => return (error_status(&e), Json(RpcResponse::err(e.to_string()))),
        }
    }

    *state.last_viewed.lock().await = Some(added.clone());

    // Adds push the full local set to the server; the timer never does.
    let client = state.client.clone();
    let url = state.server_url.clone();
    tokio::spawn(async move {
        match server_api::push_quotes(&client, &url, &snapshot).await {
            Ok(()) => log::debug!("[QUOTE_SYNC] Local quotes pushed to server"),
            Err(e) => log::warn!("[QUOTE_SYNC] Push after add failed: {}", e),
        }
    });

    (StatusCode::OK, Json(RpcResponse::ok(added)))
}

// POST /rpc/quotes/random
pub async fn quotes_random(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RandomQuoteRequest>,
) -> (StatusCode, Json<RpcResponse<Quote>>) {
    let picked = {
        let store = state.store.lock().await;
        store.random_quote(req.category.as_deref())
    };

    match picked {
        Some(quote) => {
            *state.last_viewed.lock().await = Some(quote.clone());
            (StatusCode::OK, Json(RpcResponse::ok(quote)))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(RpcResponse::err("No quotes available for this category")),
        ),
    }
}

// GET /rpc/quotes/list
pub async fn quotes_list(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<Vec<Quote>>>) {
    let store = state.store.lock().await;
    (
        StatusCode::OK,
        Json(RpcResponse::ok(store.quotes().to_vec())),
    )
}

// GET /rpc/categories/list
pub async fn categories_list(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<Vec<String>>>) {
    let store = state.store.lock().await;
    (StatusCode::OK, Json(RpcResponse::ok(store.categories())))
}

// POST /rpc/quotes/import
pub async fn quotes_import(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ImportRequest>,
) -> (StatusCode, Json<RpcResponse<usize>>) {
    let mut store = state.store.lock().await;
    match store.import(&req.content) {
        Ok(added) => (StatusCode::OK, Json(RpcResponse::ok(added))),
        Err(e) => (error_status(&e), Json(RpcResponse::err(e.to_string()))),
    }
}

// GET /rpc/quotes/export
pub async fn quotes_export(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<ExportPayload>>) {
    let store = state.store.lock().await;
    let payload = ExportPayload {
        filename: crate::codec::export_filename(chrono::Local::now()),
        content: crate::codec::export_document(store.quotes()),
    };
    (StatusCode::OK, Json(RpcResponse::ok(payload)))
}

// POST /rpc/quotes/reset
pub async fn quotes_reset(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetRequest>,
) -> (StatusCode, Json<RpcResponse<usize>>) {
    if !req.confirm {
        return (
            StatusCode::BAD_REQUEST,
            Json(RpcResponse::err(
                "Reset overwrites saved quotes; set confirm to proceed",
            )),
        );
    }

    let mut store = state.store.lock().await;
    match store.reset() {
        Ok(count) => (StatusCode::OK, Json(RpcResponse::ok(count))),
        Err(e) => (error_status(&e), Json(RpcResponse::err(e.to_string()))),
    }
}

// =====================================================
// Filter Endpoints
// =====================================================

// GET /rpc/filter
pub async fn filter_get(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<String>>) {
    match state.storage.get(SELECTED_CATEGORY_KEY) {
        Ok(value) => (
            StatusCode::OK,
            Json(RpcResponse::ok(value.unwrap_or_else(|| "all".to_string()))),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RpcResponse::err(format!("Failed to read filter: {}", e))),
        ),
    }
}

// POST /rpc/filter
pub async fn filter_set(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetFilterRequest>,
) -> (StatusCode, Json<RpcResponse<bool>>) {
    match state.storage.set(SELECTED_CATEGORY_KEY, &req.category) {
        Ok(()) => (StatusCode::OK, Json(RpcResponse::ok(true))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RpcResponse::err(format!("Failed to save filter: {}", e))),
        ),
    }
}

// =====================================================
// Session Endpoints
// =====================================================

// GET /rpc/session/last
pub async fn session_last(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<Quote>>) {
    let last = state.last_viewed.lock().await.clone();
    let quote = match last {
        Some(q) => q,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(RpcResponse::err("No quote viewed yet this session")),
            )
        }
    };

    // If the quote's category disappeared from the store (reset or
    // import since it was viewed), put the quote back.
    let mut store = state.store.lock().await;
    let category_exists = store.quotes().iter().any(|q| q.category == quote.category);
    if !category_exists {
        if let Err(e) = store.add(&quote.text, &quote.category) {
            log::warn!("[QUOTE_SYNC] Failed to restore last viewed quote: {}", e);
        }
    }

    (StatusCode::OK, Json(RpcResponse::ok(quote)))
}

// =====================================================
// Sync / Service Endpoints
// =====================================================

// POST /rpc/sync/now
pub async fn sync_now(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<SyncOutcome>>) {
    let added = match worker::sync_tick(&state.store, &state.client, &state.server_url).await {
        Ok(added) => added,
        Err(e) => {
            log::warn!("[QUOTE_SYNC] Manual sync failed: {}", e);
            return (
                StatusCode::BAD_GATEWAY,
                Json(RpcResponse::err(format!("Sync failed: {}", e))),
            );
        }
    };

    *state.last_sync_at.lock().await = Some(chrono::Utc::now().to_rfc3339());

    let snapshot = {
        let store = state.store.lock().await;
        store.quotes().to_vec()
    };
    let pushed = match server_api::push_quotes(&state.client, &state.server_url, &snapshot).await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("[QUOTE_SYNC] Push during manual sync failed: {}", e);
            false
        }
    };

    (
        StatusCode::OK,
        Json(RpcResponse::ok(SyncOutcome { added, pushed })),
    )
}

// GET /rpc/status
pub async fn status(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RpcResponse<ServiceStatus>>) {
    let (quote_count, category_count, revision) = {
        let store = state.store.lock().await;
        (
            store.quotes().len(),
            store.categories().len(),
            store.revision(),
        )
    };
    let last_sync_at = state.last_sync_at.lock().await.clone();

    let status = ServiceStatus {
        running: true,
        uptime_secs: state.start_time.elapsed().as_secs(),
        quote_count,
        category_count,
        revision,
        last_sync_at,
        sync_interval_secs: state.sync_interval_secs,
    };

    (StatusCode::OK, Json(RpcResponse::ok(status)))
}
