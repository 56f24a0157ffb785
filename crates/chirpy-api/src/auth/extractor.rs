//! Bearer identity extractor
//!
//! Handlers that mutate state take an [`AuthenticatedUser`] argument; the
//! request is rejected with 401 before the handler runs when the bearer
//! access token does not validate.

use crate::error::AppError;
use crate::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;
use uuid::Uuid;

/// Identity established from a valid access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user_id = state.sessions.authorize(&parts.headers)?;
        Ok(Self { user_id })
    }
}
