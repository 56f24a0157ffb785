//! Credential extraction from request headers
//!
//! Both schemes are exact, case-sensitive prefix matches on the
//! `Authorization` header value; no further grammar is parsed.

use axum::http::{header, HeaderMap};
use thiserror::Error;

const BEARER_PREFIX: &str = "Bearer ";
const API_KEY_PREFIX: &str = "ApiKey ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Missing or malformed Authorization header")]
    Missing,
}

fn authorization(headers: &HeaderMap) -> Result<&str, CredentialError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(CredentialError::Missing)
}

/// Token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, CredentialError> {
    let token = authorization(headers)?
        .strip_prefix(BEARER_PREFIX)
        .ok_or(CredentialError::Missing)?;

    if token.is_empty() {
        return Err(CredentialError::Missing);
    }
    Ok(token)
}

/// Key from `Authorization: ApiKey <key>`, surrounding whitespace trimmed
pub fn api_key(headers: &HeaderMap) -> Result<&str, CredentialError> {
    let key = authorization(headers)?
        .strip_prefix(API_KEY_PREFIX)
        .ok_or(CredentialError::Missing)?
        .trim();

    if key.is_empty() {
        return Err(CredentialError::Missing);
    }
    Ok(key)
}
