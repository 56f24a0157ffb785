//! Password hashing and verification using Argon2id
//!
//! Hashes are PHC strings carrying algorithm, parameters and a per-call
//! random salt, so verification needs nothing but the stored digest.
//! Default cost:
//! - Memory: 19 MiB
//! - Iterations: 2
//! - Parallelism: 1
//! - Salt: 16 bytes from the OS RNG
//! - Output: 32 bytes hash

use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2, Params,
};
use thiserror::Error;

/// Memory cost in KiB
pub const DEFAULT_MEMORY_COST_KIB: u32 = 19_456;
/// Number of passes
pub const DEFAULT_TIME_COST: u32 = 2;
/// Lanes
pub const DEFAULT_PARALLELISM: u32 = 1;

const SALT_LEN: usize = 16;

/// Password hashing and verification errors
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    #[error("Password does not match")]
    Mismatch,
}

/// Password hashing configuration
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Time cost (iterations)
    pub time_cost: u32,
    /// Parallelism (lanes)
    pub parallelism: u32,
    /// Output length in bytes (default: 32)
    pub output_len: Option<usize>,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost: DEFAULT_MEMORY_COST_KIB,
            time_cost: DEFAULT_TIME_COST,
            parallelism: DEFAULT_PARALLELISM,
            output_len: Some(32),
        }
    }
}

impl PasswordConfig {
    /// Minimal parameters so test suites do not spend their time hashing
    #[cfg(any(test, feature = "test-utils"))]
    pub fn for_testing() -> Self {
        Self {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
            output_len: Some(32),
        }
    }

    fn to_params(&self) -> Result<Params, PasswordError> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            self.output_len,
        )
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }
}

/// Hash a plaintext password with the default parameters
///
/// # Example
///
/// ```no_run
/// use chirpy_api::auth::password::hash_password;
///
/// let hash = hash_password("hunter2").expect("Failed to hash password");
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with_config(password, &PasswordConfig::default())
}

/// Hash a password with custom configuration
///
/// Fails with `HashingFailed` only if the OS RNG cannot produce a salt or the
/// parameters are rejected.
pub fn hash_password_with_config(
    password: &str,
    config: &PasswordConfig,
) -> Result<String, PasswordError> {
    let mut salt_bytes = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt_bytes)
        .map_err(|e| PasswordError::HashingFailed(format!("entropy source failed: {e}")))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    let params = config.to_params()?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verify a plaintext password against a stored hash
///
/// A wrong password and an unparseable digest both yield
/// `Err(PasswordError::Mismatch)`; the comparison itself is constant-time.
///
/// # Example
///
/// ```no_run
/// use chirpy_api::auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("hunter2").unwrap();
/// assert!(verify_password("hunter2", &hash).is_ok());
/// assert!(verify_password("hunter3", &hash).is_err());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| {
        tracing::debug!(error = %e, "Stored password hash is malformed");
        PasswordError::Mismatch
    })?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::Mismatch)
}
