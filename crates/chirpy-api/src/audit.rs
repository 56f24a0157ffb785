//! Security audit logging for authentication events
//!
//! Every audit event is logged at INFO level with the "audit" target so it
//! can be filtered and routed separately from application logs. Events keep
//! the precise failure reason even where the HTTP response is uniform.
//!
//! # Example
//!
//! ```ignore
//! use chirpy_api::audit::{AuditEvent, audit_log};
//!
//! audit_log(&AuditEvent::LoginSuccess {
//!     user_id: user.id,
//!     email: user.email.clone(),
//! });
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Security audit events for authentication and account changes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Successful password login
    LoginSuccess { user_id: Uuid, email: String },

    /// Failed login; `reason` is never sent to the client
    LoginFailure { email: String, reason: String },

    /// New access token minted from a refresh token
    TokenRefresh {
        user_id: Uuid,
        ip_address: Option<String>,
    },

    /// Refresh token revoked
    RefreshTokenRevoked { ip_address: Option<String> },

    /// Missing, invalid, expired or revoked credential presented
    InvalidToken {
        ip_address: Option<String>,
        user_agent: Option<String>,
        reason: String,
    },

    /// Account created
    UserRegistered { user_id: Uuid, email: String },

    /// Email and password replaced
    CredentialsUpdated { user_id: Uuid, email: String },

    /// Chirp posted
    ChirpCreated { chirp_id: Uuid, user_id: Uuid },

    /// Admin reset wiped all state
    AdminReset { ip_address: Option<String> },
}

/// Log a security audit event with structured fields
///
/// The whole event is also serialized to JSON in the `event` field for log
/// aggregators.
pub fn audit_log(event: &AuditEvent) {
    let timestamp = Utc::now();

    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    match event {
        AuditEvent::LoginSuccess { user_id, email } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                email = %email,
                "Login successful"
            );
        }
        AuditEvent::LoginFailure { email, reason } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                email = %email,
                reason = %reason,
                "Login failed"
            );
        }
        AuditEvent::TokenRefresh {
            user_id,
            ip_address,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                ip_address = ?ip_address,
                "Token refresh"
            );
        }
        AuditEvent::RefreshTokenRevoked { ip_address } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                ip_address = ?ip_address,
                "Refresh token revoked"
            );
        }
        AuditEvent::InvalidToken {
            ip_address, reason, ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                ip_address = ?ip_address,
                reason = %reason,
                "Invalid token"
            );
        }
        AuditEvent::UserRegistered { user_id, email } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                email = %email,
                "User registered"
            );
        }
        AuditEvent::CredentialsUpdated { user_id, email } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                email = %email,
                "Credentials updated"
            );
        }
        AuditEvent::ChirpCreated { chirp_id, user_id } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                chirp_id = %chirp_id,
                user_id = %user_id,
                "Chirp created"
            );
        }
        AuditEvent::AdminReset { ip_address } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                ip_address = ?ip_address,
                "Admin reset"
            );
        }
    }
}

/// Client IP from `X-Forwarded-For` (first hop) or `X-Real-IP`
pub fn extract_ip_address(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(xff) = headers.get("x-forwarded-for") {
        if let Ok(xff_str) = xff.to_str() {
            if let Some(first_ip) = xff_str.split(',').next() {
                return Some(first_ip.trim().to_string());
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    None
}

pub fn extract_user_agent(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string())
}
