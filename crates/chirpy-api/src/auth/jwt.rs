//! JWT access token issuance and validation
//!
//! Access tokens are HMAC-SHA256 signed, self-contained assertions of
//! `{iss, sub, iat, exp}`. Validity is purely cryptographic and time-based;
//! nothing is looked up server-side.

use chirpy_core::AuthConfig;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Issuer stamped on every access token
pub const TOKEN_ISSUER: &str = "chirpy";

/// Default access token lifetime (1 hour)
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(3600);

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer
    pub iss: String,
    /// Subject - user ID
    pub sub: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
}

/// JWT token generation and validation errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to sign JWT: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token signature")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Token lifetime out of range")]
    LifetimeOutOfRange,

    #[error("System time error: {0}")]
    SystemTime(#[from] std::time::SystemTimeError),
}

/// JWT Configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC signing
    pub secret: String,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// Token issuer identifier
    pub issuer: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: DEFAULT_ACCESS_TTL,
            issuer: TOKEN_ISSUER.to_string(),
        }
    }

    pub fn from_auth_config(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            access_ttl: Duration::from_secs(config.access_token_ttl_secs),
            issuer: config.issuer.clone(),
        }
    }

    /// Issue an access token for `user_id` with the configured lifetime
    pub fn issue(&self, user_id: Uuid) -> Result<String, JwtError> {
        sign(user_id, &self.secret, self.access_ttl, &self.issuer)
    }

    /// Validate an access token and return its subject
    pub fn validate(&self, token: &str) -> Result<Uuid, JwtError> {
        verify(token, &self.secret, &self.issuer)
    }
}

/// Issue a signed access token
///
/// # Example
///
/// ```no_run
/// use chirpy_api::auth::jwt::{issue_access_token, validate_access_token};
/// use std::time::Duration;
/// use uuid::Uuid;
///
/// let user_id = Uuid::new_v4();
/// let token = issue_access_token(user_id, "secret", Duration::from_secs(3600)).unwrap();
/// assert_eq!(validate_access_token(&token, "secret").unwrap(), user_id);
/// ```
pub fn issue_access_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, JwtError> {
    sign(user_id, secret, ttl, TOKEN_ISSUER)
}

/// Validate a signed access token and return its subject
///
/// * `InvalidToken` - signature mismatch (wrong secret, tampering) or foreign issuer
/// * `ExpiredToken` - `now >= exp`, with no clock skew allowance
/// * `MalformedToken` - undecodable structure or a subject that is not a user ID
pub fn validate_access_token(token: &str, secret: &str) -> Result<Uuid, JwtError> {
    verify(token, secret, TOKEN_ISSUER)
}

fn now_secs() -> Result<u64, JwtError> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

fn sign(user_id: Uuid, secret: &str, ttl: Duration, issuer: &str) -> Result<String, JwtError> {
    let now = now_secs()?;
    let exp = now
        .checked_add(ttl.as_secs())
        .ok_or(JwtError::LifetimeOutOfRange)?;

    let claims = Claims {
        iss: issuer.to_string(),
        sub: user_id.to_string(),
        iat: now,
        exp,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

fn verify(token: &str, secret: &str, issuer: &str) -> Result<Uuid, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    // Expiry is checked below so that `now == exp` already counts as expired
    validation.validate_exp = false;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::ImmatureSignature => JwtError::InvalidToken,
        ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
        _ => JwtError::MalformedToken,
    })?;

    if now_secs()? >= token_data.claims.exp {
        return Err(JwtError::ExpiredToken);
    }

    Uuid::parse_str(&token_data.claims.sub).map_err(|_| JwtError::MalformedToken)
}
