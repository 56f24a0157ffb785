//! Chirp handlers

use crate::audit::{audit_log, AuditEvent};
use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chirpy_core::{validate_chirp_body, Chirp, ChirpStore, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChirpResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.id,
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
            body: chirp.body,
            user_id: chirp.user_id,
        }
    }
}

/// List all chirps, oldest first
#[utoipa::path(
    get,
    path = "/api/chirps",
    tag = "chirps",
    responses(
        (status = 200, description = "All chirps", body = Vec<ChirpResponse>),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn list_chirps(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let chirps = state.chirps.list().await?;
    let response: Vec<ChirpResponse> = chirps.into_iter().map(ChirpResponse::from).collect();
    Ok(Json(response))
}

/// Get one chirp by ID
#[utoipa::path(
    get,
    path = "/api/chirps/{id}",
    tag = "chirps",
    params(("id" = String, Path, description = "Chirp ID")),
    responses(
        (status = 200, description = "Chirp found", body = ChirpResponse),
        (status = 404, description = "Malformed or unknown ID", body = crate::error::ApiError),
    )
)]
pub async fn get_chirp(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::NotFound(format!("Chirp {id}"));

    let chirp_id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let chirp = state.chirps.get(chirp_id).await.map_err(|e| match e {
        StoreError::NotFound => not_found(),
        other => other.into(),
    })?;

    Ok(Json(ChirpResponse::from(chirp)))
}

/// Post a chirp as the authenticated user
///
/// Bodies over 140 bytes are rejected; profane words are masked.
#[utoipa::path(
    post,
    path = "/api/chirps",
    tag = "chirps",
    request_body = CreateChirpRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Chirp created", body = ChirpResponse),
        (status = 400, description = "Chirp is too long or body is not valid JSON", body = crate::error::ApiError),
        (status = 401, description = "Missing or invalid access token", body = crate::error::ApiError),
    )
)]
pub async fn create_chirp(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateChirpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let body = validate_chirp_body(&request.body)?;
    let chirp = state.chirps.create(&body, user.user_id).await?;

    audit_log(&AuditEvent::ChirpCreated {
        chirp_id: chirp.id,
        user_id: user.user_id,
    });

    Ok((StatusCode::CREATED, Json(ChirpResponse::from(chirp))))
}
