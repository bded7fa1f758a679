//! Quote Sync Service — standalone binary for quote collection
//! management with periodic server sync.
//!
//! Hosts both an RPC API and a dashboard UI on the same port.
//! Default: http://127.0.0.1:9104/

mod codec;
mod dashboard;
mod dedup;
mod routes;
mod server_api;
mod storage;
mod store;
mod worker;

use routes::AppState;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let port: u16 = std::env::var("QUOTE_SYNC_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9104);

    let db_path =
        std::env::var("QUOTE_SYNC_DB_PATH").unwrap_or_else(|_| "./quote_sync.db".to_string());

    let sync_interval_secs: u64 = std::env::var("QUOTE_SYNC_INTERVAL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(30);

    let server_url = std::env::var("QUOTE_SYNC_SERVER_URL")
        .unwrap_or_else(|_| server_api::DEFAULT_SERVER_URL.to_string());

    log::info!("Opening storage at: {}", db_path);
    let storage = Arc::new(storage::Storage::open(&db_path).expect("Failed to open storage"));

    let store = Arc::new(Mutex::new(store::QuoteStore::load(storage.clone())));
    let last_sync_at: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

    let state = Arc::new(AppState {
        store: store.clone(),
        storage,
        last_viewed: Mutex::new(None),
        last_sync_at: last_sync_at.clone(),
        start_time: Instant::now(),
        sync_interval_secs,
        server_url: server_url.clone(),
        client: reqwest::Client::new(),
    });

    tokio::spawn(async move {
        worker::run_worker(store, server_url, sync_interval_secs, last_sync_at).await;
    });
    log::info!(
        "Background sync worker started (interval: {}s)",
        sync_interval_secs
    );

    let cors = tower_http::cors::CorsLayer::permissive();

    let app = axum::Router::new()
        .route("/", axum::routing::get(dashboard::dashboard))
        // Quote management
        .route("/rpc/quotes/add", axum::routing::post(routes::quotes_add))
        .route(
            "/rpc/quotes/random",
            axum::routing::post(routes::quotes_random),
        )
        .route("/rpc/quotes/list", axum::routing::get(routes::quotes_list))
        .route(
            "/rpc/categories/list",
            axum::routing::get(routes::categories_list),
        )
        // Import / export
        .route(
            "/rpc/quotes/import",
            axum::routing::post(routes::quotes_import),
        )
        .route(
            "/rpc/quotes/export",
            axum::routing::get(routes::quotes_export),
        )
        .route(
            "/rpc/quotes/reset",
            axum::routing::post(routes::quotes_reset),
        )
        // Category filter
        .route(
            "/rpc/filter",
            axum::routing::get(routes::filter_get).post(routes::filter_set),
        )
        // Session
        .route(
            "/rpc/session/last",
            axum::routing::get(routes::session_last),
        )
        // Sync + service
        .route("/rpc/sync/now", axum::routing::post(routes::sync_now))
        .route("/rpc/status", axum::routing::get(routes::status))
        .with_state(state)
        .layer(cors);

    let addr = format!("127.0.0.1:{}", port);
    log::info!("Quote Sync Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
