//! Admin handlers: file server metrics and development reset

use crate::audit::{audit_log, extract_ip_address, AuditEvent};
use crate::auth::api_key;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{Html, IntoResponse},
};
use chirpy_core::{ChirpStore, Platform, RefreshTokenStore, UserStore};
use std::sync::Arc;

/// File server hit count as an HTML page
#[utoipa::path(
    get,
    path = "/admin/metrics",
    tag = "admin",
    responses(
        (status = 200, description = "Hit count page", body = String, content_type = "text/html")
    )
)]
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>
"#,
        state.hits()
    ))
}

/// Delete every user, chirp and refresh token and zero the hit counter
///
/// Only available on the `dev` platform. When an admin API key is configured
/// the request must also carry `Authorization: ApiKey <key>`.
#[utoipa::path(
    post,
    path = "/admin/reset",
    tag = "admin",
    responses(
        (status = 200, description = "State wiped", body = String, content_type = "text/plain"),
        (status = 401, description = "Missing or wrong API key", body = crate::error::ApiError),
        (status = 403, description = "Not the dev platform", body = crate::error::ApiError),
    )
)]
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if state.config.server.platform != Platform::Dev {
        return Err(AppError::Forbidden(
            "Reset is only allowed in dev environment".to_string(),
        ));
    }

    if let Some(expected) = state.config.auth.admin_api_key.as_deref() {
        match api_key(&headers) {
            Ok(key) if key == expected => {}
            _ => {
                tracing::warn!("Admin reset rejected: missing or wrong API key");
                return Err(AppError::Unauthorized);
            }
        }
    }

    // Children before parents for the foreign keys
    state.chirps.delete_all().await?;
    state.refresh_tokens.delete_all().await?;
    state.users.delete_all().await?;
    state.reset_hits();

    audit_log(&AuditEvent::AdminReset {
        ip_address: extract_ip_address(&headers),
    });

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("Hits: {}", state.hits()),
    ))
}
