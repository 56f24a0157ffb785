//! In-memory store
//!
//! Implements every persistence port over maps guarded by async locks.
//! Used when no database URL is configured and throughout the test suites.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{ChirpStore, RefreshTokenStore, StoreError, StoreResult, UserStore};
use crate::{Chirp, RefreshToken, User};

/// In-memory store for users, chirps, and refresh tokens
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    tokens: RwLock<HashMap<String, RefreshToken>>,
    chirps: RwLock<Vec<Chirp>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, email: &str, hashed_password: &str) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict(format!(
                "email already registered: {email}"
            )));
        }

        let user = User::new(email, hashed_password);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email && u.id != id) {
            return Err(StoreError::Conflict(format!(
                "email already registered: {email}"
            )));
        }

        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_all(&self) -> StoreResult<()> {
        self.users.write().await.clear();
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn insert(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<RefreshToken> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(token) {
            return Err(StoreError::Conflict("duplicate refresh token".to_string()));
        }

        let row = RefreshToken::new(token, user_id, expires_at);
        tokens.insert(row.token.clone(), row.clone());
        Ok(row)
    }

    async fn find_by_token(&self, token: &str) -> StoreResult<RefreshToken> {
        self.tokens
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn mark_revoked(&self, token: &str) -> StoreResult<()> {
        let mut tokens = self.tokens.write().await;
        let row = tokens.get_mut(token).ok_or(StoreError::NotFound)?;
        let now = Utc::now();
        row.revoked_at = Some(now);
        row.updated_at = now;
        Ok(())
    }

    async fn delete_all(&self) -> StoreResult<()> {
        self.tokens.write().await.clear();
        Ok(())
    }
}

#[async_trait]
impl ChirpStore for MemoryStore {
    async fn create(&self, body: &str, user_id: Uuid) -> StoreResult<Chirp> {
        if !self.users.read().await.contains_key(&user_id) {
            return Err(StoreError::Conflict(format!("unknown user: {user_id}")));
        }

        let chirp = Chirp::new(body, user_id);
        self.chirps.write().await.push(chirp.clone());
        Ok(chirp)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Chirp> {
        self.chirps
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> StoreResult<Vec<Chirp>> {
        let mut chirps = self.chirps.read().await.clone();
        chirps.sort_by_key(|c| c.created_at);
        Ok(chirps)
    }

    async fn delete_all(&self) -> StoreResult<()> {
        self.chirps.write().await.clear();
        Ok(())
    }
}
