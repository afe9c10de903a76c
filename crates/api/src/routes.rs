use crate::handlers;
use crate::middleware;
use crate::AppState;
use appreg_storage::StorageConfig;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Client registration - Protected (require session)
        .route(
            "/app",
            get(handlers::client::list_clients)
                .post(handlers::client::create_client)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_session)),
        )
        .route(
            "/app/:client_id",
            get(handlers::client::get_client)
                .put(handlers::client::update_client)
                .delete(handlers::client::delete_client)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_session)),
        )
        .route(
            "/app/:client_id/secret",
            patch(handlers::client::rotate_secret)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_session)),
        )
        .route(
            "/app/:client_id/scope",
            patch(handlers::client::patch_scope)
                .route_layer(from_fn_with_state(state.clone(), middleware::require_session)),
        )
        .with_state(state)
}

/// Serve uploaded logos from the media root under the media URL
pub fn serve_media(router: Router, storage: &StorageConfig) -> Router {
    if !storage.media_url.starts_with('/') {
        tracing::info!(
            "Media URL {} is external, not serving {} locally",
            storage.media_url,
            storage.media_root.display()
        );
        return router;
    }

    router.nest_service(&storage.media_url, ServeDir::new(&storage.media_root))
}
