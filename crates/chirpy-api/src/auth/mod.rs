//! Authentication and authorization
//!
//! - `password`: Argon2id hashing and verification
//! - `jwt`: HS256 access tokens
//! - `credentials`: `Bearer` / `ApiKey` header extraction
//! - `refresh`: opaque refresh token lifecycle
//! - `service`: login, refresh, revoke and bearer authorization
//! - `extractor`: axum extractor for the authenticated user

pub mod credentials;
pub mod extractor;
pub mod jwt;
pub mod password;
pub mod refresh;
pub mod service;

pub use credentials::{api_key, bearer_token, CredentialError};
pub use extractor::AuthenticatedUser;
pub use jwt::{issue_access_token, validate_access_token, Claims, JwtConfig, JwtError};
pub use password::{hash_password, verify_password, PasswordConfig, PasswordError};
pub use refresh::{generate_refresh_token, RefreshError, RefreshTokenManager};
pub use service::{LoginOutcome, SessionError, SessionService};
