//! Persistence ports
//!
//! The auth and HTTP layers only see these traits. Implementations must
//! enforce email and token uniqueness and report missing rows as
//! [`StoreError::NotFound`] rather than a generic database error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{Chirp, RefreshToken, User};

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; fails with `Conflict` on a duplicate email
    async fn create(&self, email: &str, hashed_password: &str) -> StoreResult<User>;

    /// Look up a user by email
    async fn find_by_email(&self, email: &str) -> StoreResult<User>;

    /// Replace email and password hash of an existing user
    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> StoreResult<User>;

    /// Remove every user (administrative reset)
    async fn delete_all(&self) -> StoreResult<()>;
}

/// Refresh token persistence
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Insert a new, unrevoked token row
    async fn insert(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<RefreshToken>;

    /// Look up a token row by its value
    async fn find_by_token(&self, token: &str) -> StoreResult<RefreshToken>;

    /// Set `revoked_at = now` on the matching row, whether or not it was
    /// already revoked
    async fn mark_revoked(&self, token: &str) -> StoreResult<()>;

    /// Remove every token (administrative reset)
    async fn delete_all(&self) -> StoreResult<()>;
}

/// Chirp persistence
#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create(&self, body: &str, user_id: Uuid) -> StoreResult<Chirp>;

    async fn get(&self, id: Uuid) -> StoreResult<Chirp>;

    /// All chirps, oldest first
    async fn list(&self) -> StoreResult<Vec<Chirp>>;

    /// Remove every chirp (administrative reset)
    async fn delete_all(&self) -> StoreResult<()>;
}
