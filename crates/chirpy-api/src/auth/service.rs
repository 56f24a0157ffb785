//! Session service layer
//!
//! Orchestrates password login, access token refresh, refresh token
//! revocation and bearer authorization on top of the user and refresh token
//! stores. Every rejection is audit-logged with its precise reason while the
//! error returned to the caller stays uniform.

use super::credentials::bearer_token;
use super::jwt::JwtConfig;
use super::password::{hash_password_with_config, verify_password, PasswordConfig};
use super::refresh::{RefreshError, RefreshTokenManager};
use crate::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use axum::http::HeaderMap;
use chirpy_core::{AuthConfig, RefreshTokenStore, StoreError, User, UserStore};
use chrono::Duration;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use uuid::Uuid;

/// Hashed once per service and verified against when the email is unknown
const DUMMY_PASSWORD: &str = "chirpy-unknown-account";

#[derive(Debug, Error)]
pub enum SessionError {
    /// Unknown email and wrong password are indistinguishable
    #[error("Incorrect email or password")]
    AuthenticationFailed,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to hash password: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(StoreError),
}

/// Result of a successful password login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserStore>,
    refresh_tokens: RefreshTokenManager,
    jwt: JwtConfig,
    password_config: PasswordConfig,
    dummy_digest: Arc<OnceCell<String>>,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_store: Arc<dyn RefreshTokenStore>,
        config: &AuthConfig,
    ) -> Self {
        // Out-of-range lifetimes surface as an issuance error at login
        let refresh_ttl = Duration::try_days(config.refresh_token_ttl_days)
            .unwrap_or_else(Duration::max_value);

        Self {
            users,
            refresh_tokens: RefreshTokenManager::new(refresh_store, refresh_ttl),
            jwt: JwtConfig::from_auth_config(config),
            password_config: PasswordConfig::default(),
            dummy_digest: Arc::new(OnceCell::new()),
        }
    }

    /// Override the hashing cost (tests use a minimal one)
    pub fn with_password_config(mut self, password_config: PasswordConfig) -> Self {
        self.password_config = password_config;
        self.dummy_digest = Arc::new(OnceCell::new());
        self
    }

    pub fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }

    /// Authenticate by email and password and open a session
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SessionError> {
        let user = match self.users.find_by_email(email).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                self.verify_unknown_account(password).await;
                return Err(login_failure(email, "unknown email"));
            }
            Err(e) => return Err(SessionError::Store(e)),
        };

        if self.verify(password, &user.hashed_password).await.is_err() {
            return Err(login_failure(email, "password mismatch"));
        }

        let access_token = self.jwt.issue(user.id).map_err(|e| {
            tracing::error!(error = %e, "Failed to issue access token");
            login_failure(email, "access token issuance failed")
        })?;

        let refresh_token = match self.refresh_tokens.issue(user.id).await {
            Ok(row) => row.token,
            Err(RefreshError::Store(e)) => return Err(SessionError::Store(e)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to issue refresh token");
                return Err(login_failure(email, "refresh token issuance failed"));
            }
        };

        audit_log(&AuditEvent::LoginSuccess {
            user_id: user.id,
            email: user.email.clone(),
        });

        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from the bearer refresh token
    ///
    /// The refresh token itself is left active.
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String, SessionError> {
        let token = bearer_token(headers).map_err(|e| reject(headers, e.to_string()))?;

        let user_id = match self.refresh_tokens.redeem(token).await {
            Ok(user_id) => user_id,
            Err(RefreshError::Store(e)) => return Err(SessionError::Store(e)),
            Err(e) => return Err(reject(headers, e.to_string())),
        };

        let access_token = self
            .jwt
            .issue(user_id)
            .map_err(|e| reject(headers, e.to_string()))?;

        audit_log(&AuditEvent::TokenRefresh {
            user_id,
            ip_address: extract_ip_address(headers),
        });

        Ok(access_token)
    }

    /// Revoke the bearer refresh token; revoking twice succeeds
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), SessionError> {
        let token = bearer_token(headers).map_err(|e| reject(headers, e.to_string()))?;

        match self.refresh_tokens.revoke(token).await {
            Ok(()) => {}
            Err(RefreshError::Store(e)) => return Err(SessionError::Store(e)),
            Err(e) => return Err(reject(headers, e.to_string())),
        }

        audit_log(&AuditEvent::RefreshTokenRevoked {
            ip_address: extract_ip_address(headers),
        });

        Ok(())
    }

    /// Resolve the bearer access token to its user ID
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Uuid, SessionError> {
        let token = bearer_token(headers).map_err(|e| reject(headers, e.to_string()))?;

        self.jwt
            .validate(token)
            .map_err(|e| reject(headers, e.to_string()))
    }

    /// Create a user with a freshly hashed password
    pub async fn register(&self, email: &str, password: &str) -> Result<User, SessionError> {
        validate_credentials(email, password)?;

        let hashed = self.hash(password).await?;
        let user = self
            .users
            .create(email, &hashed)
            .await
            .map_err(SessionError::Store)?;

        audit_log(&AuditEvent::UserRegistered {
            user_id: user.id,
            email: user.email.clone(),
        });

        Ok(user)
    }

    /// Replace the email and password of an authorized user
    pub async fn update_credentials(
        &self,
        user_id: Uuid,
        email: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        validate_credentials(email, password)?;

        let hashed = self.hash(password).await?;
        let user = self
            .users
            .update_credentials(user_id, email, &hashed)
            .await
            .map_err(SessionError::Store)?;

        audit_log(&AuditEvent::CredentialsUpdated {
            user_id: user.id,
            email: user.email.clone(),
        });

        Ok(user)
    }

    async fn hash(&self, password: &str) -> Result<String, SessionError> {
        let password = password.to_string();
        let config = self.password_config.clone();

        tokio::task::spawn_blocking(move || hash_password_with_config(&password, &config))
            .await
            .map_err(|e| SessionError::Hashing(e.to_string()))?
            .map_err(|e| SessionError::Hashing(e.to_string()))
    }

    /// Spend the same Argon2 work on an unknown email as on a wrong password
    async fn verify_unknown_account(&self, password: &str) {
        let digest = match self
            .dummy_digest
            .get_or_try_init(|| self.hash(DUMMY_PASSWORD))
            .await
        {
            Ok(digest) => digest,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to prepare dummy password digest");
                return;
            }
        };

        let _ = self.verify(password, digest).await;
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<(), SessionError> {
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| SessionError::Hashing(e.to_string()))?
            .map_err(|_| SessionError::AuthenticationFailed)
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(), SessionError> {
    if !email.contains('@') {
        return Err(SessionError::InvalidInput("Invalid email format".to_string()));
    }
    if password.is_empty() {
        return Err(SessionError::InvalidInput(
            "Password must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn login_failure(email: &str, reason: &str) -> SessionError {
    audit_log(&AuditEvent::LoginFailure {
        email: email.to_string(),
        reason: reason.to_string(),
    });
    SessionError::AuthenticationFailed
}

fn reject(headers: &HeaderMap, reason: String) -> SessionError {
    audit_log(&AuditEvent::InvalidToken {
        ip_address: extract_ip_address(headers),
        user_agent: extract_user_agent(headers),
        reason,
    });
    SessionError::Unauthorized
}
