//! API route definitions

use crate::handlers::{admin, auth, chirps, health, users};
use crate::middleware::fileserver_hits_middleware;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Routes nested under `/api`
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route(
            "/users",
            post(users::create_user_handler).put(users::update_user_handler),
        )
        .route("/login", post(auth::login_handler))
        .route("/refresh", post(auth::refresh_handler))
        .route("/revoke", post(auth::revoke_handler))
        .route("/chirps", get(chirps::list_chirps).post(chirps::create_chirp))
        .route("/chirps/:id", get(chirps::get_chirp))
}

/// Routes nested under `/admin`
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/metrics", get(admin::metrics_handler))
        .route("/reset", post(admin::reset_handler))
}

/// Static files under `/app`, each request counted
pub fn app_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let files = ServeDir::new(&state.config.server.file_root);

    Router::new()
        .nest_service("/app", files)
        .layer(middleware::from_fn_with_state(
            state,
            fileserver_hits_middleware,
        ))
}
