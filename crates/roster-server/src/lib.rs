//! Roster server library logic.

pub mod api;
pub mod config;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use roster_db::{
    DbPool, SqliteAppConfig, SqliteCardStore, SqlitePeerRegistry, SqliteUserStore,
};
use roster_federation::FederatedAccessGate;
use roster_types::AddressBookInfo;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Trust-gated view of the served address book.
    pub gate: Arc<FederatedAccessGate>,
    /// Trusted servers whose `system` logins authenticate.
    pub peers: Arc<SqlitePeerRegistry>,
    /// Local accounts.
    pub users: SqliteUserStore,
}

impl AppState {
    /// Wires the SQLite stores behind a gate for `address_book`.
    pub fn new(pool: DbPool, address_book: AddressBookInfo) -> Self {
        let cards = Arc::new(SqliteCardStore::new(pool.clone()));
        let config = Arc::new(SqliteAppConfig::new(pool.clone()));
        let peers = Arc::new(SqlitePeerRegistry::new(pool.clone()));
        let users = SqliteUserStore::new(pool);

        let gate = FederatedAccessGate::new(address_book, cards, config)
            .with_peer_registry(peers.clone());
        Self {
            gate: Arc::new(gate),
            peers,
            users,
        }
    }
}

/// Maximum request body size (1 MiB). Multiget bodies are name lists only.
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
///
/// Everything except `/health` requires Basic credentials.
pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/addressbooks/{uri}/cards", get(api::list_cards_handler))
        .route(
            "/addressbooks/{uri}/cards/{name}",
            get(api::get_card_handler),
        )
        .route(
            "/addressbooks/{uri}/multiget",
            post(api::multiget_handler),
        )
        .route("/addressbooks/{uri}/changes", get(api::changes_handler))
        .layer(axum::middleware::from_fn(middleware::auth_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
