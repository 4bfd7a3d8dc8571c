mod handlers;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::store::FileStore;

/// Largest document the save endpoint accepts.
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

pub fn create_router(store: FileStore) -> Router {
    let api = Router::new()
        // Document
        .route("/data", get(handlers::get_data).post(handlers::save_data))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(store)
}
