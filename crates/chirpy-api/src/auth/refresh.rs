//! Opaque refresh tokens
//!
//! Refresh tokens are 32 random bytes, hex-encoded, persisted through a
//! [`RefreshTokenStore`]. Redeeming never rotates the token; it only
//! vouches for the owning user so a new access token can be issued.

use chirpy_core::{RefreshToken, RefreshTokenState, RefreshTokenStore, StoreError};
use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Random bytes per token (64 hex characters)
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Default refresh token lifetime in days
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 60;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Entropy source failed: {0}")]
    Entropy(String),

    #[error("Unknown refresh token")]
    UnknownToken,

    #[error("Refresh token has been revoked")]
    TokenRevoked,

    #[error("Refresh token has expired")]
    TokenExpired,

    #[error("Refresh token lifetime out of range")]
    LifetimeOutOfRange,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RefreshError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => RefreshError::UnknownToken,
            other => RefreshError::Store(other),
        }
    }
}

/// Generate a fresh opaque token
pub fn generate_refresh_token() -> Result<String, RefreshError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| RefreshError::Entropy(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Issues, redeems and revokes refresh tokens against a store
#[derive(Clone)]
pub struct RefreshTokenManager {
    store: Arc<dyn RefreshTokenStore>,
    ttl: Duration,
}

impl RefreshTokenManager {
    pub fn new(store: Arc<dyn RefreshTokenStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn with_default_ttl(store: Arc<dyn RefreshTokenStore>) -> Self {
        Self::new(store, Duration::days(DEFAULT_REFRESH_TTL_DAYS))
    }

    pub fn generate(&self) -> Result<String, RefreshError> {
        generate_refresh_token()
    }

    /// Create and persist a new token for `user_id`
    pub async fn issue(&self, user_id: Uuid) -> Result<RefreshToken, RefreshError> {
        let token = self.generate()?;
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or(RefreshError::LifetimeOutOfRange)?;

        let row = self
            .store
            .insert(&token, user_id, expires_at)
            .await
            .map_err(RefreshError::Store)?;

        tracing::debug!(%user_id, %expires_at, "Refresh token issued");
        Ok(row)
    }

    /// Return the owning user of a usable token, leaving the row untouched
    pub async fn redeem(&self, token: &str) -> Result<Uuid, RefreshError> {
        let row = self.store.find_by_token(token).await?;

        match row.state_at(Utc::now()) {
            RefreshTokenState::Active => Ok(row.user_id),
            RefreshTokenState::Revoked => Err(RefreshError::TokenRevoked),
            RefreshTokenState::Expired => Err(RefreshError::TokenExpired),
        }
    }

    /// Set `revoked_at = now`; revoking an already revoked token succeeds
    pub async fn revoke(&self, token: &str) -> Result<(), RefreshError> {
        self.store.mark_revoked(token).await?;
        Ok(())
    }
}
