//! Chirpy API - REST server
//!
//! Users, chirps, password login, JWT access tokens and opaque refresh
//! tokens over axum.

pub mod audit;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::Router;
use openapi::ApiDoc;
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", routes::api_routes())
        .nest("/admin", routes::admin_routes())
        .merge(routes::app_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Configuration used by [`create_router_for_testing`]: dev platform, fixed
/// secret, no database
#[cfg(feature = "test-utils")]
pub fn test_config() -> chirpy_core::AppConfig {
    let mut config = chirpy_core::AppConfig::default();
    config.server.platform = chirpy_core::Platform::Dev;
    config.auth.jwt_secret = "test-secret".to_string();
    config
}

/// Router over an in-memory store with cheap password hashing
#[cfg(feature = "test-utils")]
pub fn create_router_for_testing() -> Router {
    create_router_for_testing_with(test_config())
}

#[cfg(feature = "test-utils")]
pub fn create_router_for_testing_with(config: chirpy_core::AppConfig) -> Router {
    let state = AppState::in_memory(config);
    let sessions = auth::SessionService::new(
        state.users.clone(),
        state.refresh_tokens.clone(),
        &state.config.auth,
    )
    .with_password_config(auth::PasswordConfig::for_testing());

    create_router(Arc::new(state.with_sessions(sessions)))
}
