//! Session API handlers
//!
//! Password login, access token refresh and refresh token revocation.

use crate::audit::{audit_log, AuditEvent};
use crate::error::AppError;
use crate::handlers::users::CredentialsRequest;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Login response: the user plus both tokens
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    /// Access token (JWT)
    pub token: String,
    /// Opaque refresh token
    pub refresh_token: String,
}

/// Freshly minted access token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Login with email and password
///
/// Unknown email, wrong password and an undecodable body produce the same
/// 401 response.
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Incorrect email or password", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        audit_log(&AuditEvent::LoginFailure {
            email: String::new(),
            reason: format!("malformed request: {}", rejection.body_text()),
        });
        AppError::AuthenticationFailed
    })?;

    let outcome = state
        .sessions
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        id: outcome.user.id,
        created_at: outcome.user.created_at,
        updated_at: outcome.user.updated_at,
        email: outcome.user.email,
        token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

/// Exchange the bearer refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/refresh",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "New access token", body = TokenResponse),
        (status = 401, description = "Missing, unknown, revoked or expired refresh token", body = crate::error::ApiError),
    )
)]
pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = state.sessions.refresh(&headers).await?;
    Ok(Json(TokenResponse { token }))
}

/// Revoke the bearer refresh token
#[utoipa::path(
    post,
    path = "/api/revoke",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Refresh token revoked"),
        (status = 401, description = "Missing or unknown refresh token", body = crate::error::ApiError),
    )
)]
pub async fn revoke_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    state.sessions.revoke(&headers).await?;
    Ok(StatusCode::NO_CONTENT)
}
