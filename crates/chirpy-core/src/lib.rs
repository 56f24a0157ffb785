//! Chirpy Core - Domain models, persistence ports, and shared types
//!
//! This crate defines the core abstractions used throughout Chirpy:
//! - Users, chirps, and refresh tokens
//! - Validation error type
//! - Persistence ports (`UserStore`, `RefreshTokenStore`, `ChirpStore`)
//! - PostgreSQL and in-memory store implementations
//! - Configuration management

pub mod chirp;
pub mod config;
pub mod memory;
pub mod postgres;
pub mod store;

pub use chirp::{clean_body, validate_chirp_body, MAX_CHIRP_LENGTH};
pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, Platform, ServerConfig,
};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{ChirpStore, RefreshTokenStore, StoreError, UserStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for Chirpy operations
#[derive(Error, Debug)]
pub enum ChirpyError {
    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ChirpyError>;

// ============================================================================
// Users
// ============================================================================

/// Registered account
///
/// The password hash never leaves the process: it is skipped on serialization.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
}

impl User {
    /// Create a fresh user record with a new identity
    pub fn new(email: impl Into<String>, hashed_password: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.into(),
            hashed_password: hashed_password.into(),
        }
    }
}

// ============================================================================
// Refresh Tokens
// ============================================================================

/// Lifecycle state of a refresh token at a given instant
///
/// `Active` is the only usable state; `Revoked` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshTokenState {
    Active,
    Revoked,
    Expired,
}

/// Persisted opaque refresh token
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RefreshToken {
    /// Opaque hex string, unique
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn new(token: impl Into<String>, user_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            token: token.into(),
            created_at: now,
            updated_at: now,
            user_id,
            expires_at,
            revoked_at: None,
        }
    }

    /// State of the token at `now`. Revocation takes precedence over expiry.
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked_at.is_some() {
            RefreshTokenState::Revoked
        } else if now >= self.expires_at {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }

    /// A token is usable iff it is unrevoked and `now < expires_at`
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == RefreshTokenState::Active
    }
}

// ============================================================================
// Chirps
// ============================================================================

/// Short text post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Chirp {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

impl Chirp {
    pub fn new(body: impl Into<String>, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.into(),
            user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_user_password_hash_not_serialized() {
        let user = User::new("a@x.com", "$argon2id$v=19$secret");
        let json = serde_json::to_string(&user).unwrap();

        assert!(json.contains("a@x.com"));
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("argon2id"));
    }

    #[test]
    fn test_refresh_token_states() {
        let now = Utc::now();
        let mut token = RefreshToken::new("abc", Uuid::new_v4(), now + Duration::days(60));

        assert_eq!(token.state_at(now), RefreshTokenState::Active);
        assert!(token.is_usable_at(now));

        // Exactly at expiry the token is no longer usable
        assert_eq!(token.state_at(token.expires_at), RefreshTokenState::Expired);

        token.revoked_at = Some(now);
        assert_eq!(token.state_at(now), RefreshTokenState::Revoked);
        assert_eq!(
            token.state_at(now + Duration::days(61)),
            RefreshTokenState::Revoked
        );
        assert!(!token.is_usable_at(now));
    }
}
