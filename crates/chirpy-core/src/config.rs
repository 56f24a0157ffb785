//! Chirpy Configuration Management
//!
//! Handles configuration from environment variables and TOML files,
//! with sensible defaults for development.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Longest accepted access token lifetime (one year)
pub const MAX_ACCESS_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Longest accepted refresh token lifetime (ten years)
pub const MAX_REFRESH_TTL_DAYS: i64 = 3650;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database connection
    pub database: DatabaseConfig,

    /// Token signing and lifetimes
    pub auth: AuthConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|message| ConfigError::ParseError { path, message })
    }

    fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Overlay values found through `lookup` onto this configuration
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(host) = lookup("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = parse_value("API_PORT", port)?;
        }
        if let Some(root) = lookup("FILE_ROOT") {
            self.server.file_root = PathBuf::from(root);
        }
        if let Some(platform) = lookup("PLATFORM") {
            self.server.platform = platform.parse()?;
        }

        // Database
        if let Some(url) = lookup("DB_URL").or_else(|| lookup("DATABASE_URL")) {
            self.database.url = Some(url).filter(|u| !u.is_empty());
        }
        if let Some(max) = lookup("DB_MAX_CONNECTIONS") {
            self.database.max_connections = parse_value("DB_MAX_CONNECTIONS", max)?;
        }

        // Auth
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(ttl) = lookup("JWT_ACCESS_TTL_SECS") {
            self.auth.access_token_ttl_secs = parse_value("JWT_ACCESS_TTL_SECS", ttl)?;
        }
        if let Some(days) = lookup("REFRESH_TOKEN_TTL_DAYS") {
            self.auth.refresh_token_ttl_days = parse_value("REFRESH_TOKEN_TTL_DAYS", days)?;
        }
        if let Some(key) = lookup("ADMIN_API_KEY") {
            self.auth.admin_api_key = Some(key).filter(|k| !k.is_empty());
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.json_format = format.eq_ignore_ascii_case("json");
        }

        Ok(self)
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        if !(1..=MAX_ACCESS_TTL_SECS).contains(&self.auth.access_token_ttl_secs) {
            return Err(ConfigError::InvalidValue {
                key: "JWT_ACCESS_TTL_SECS".to_string(),
                value: self.auth.access_token_ttl_secs.to_string(),
            });
        }
        if !(1..=MAX_REFRESH_TTL_DAYS).contains(&self.auth.refresh_token_ttl_days) {
            return Err(ConfigError::InvalidValue {
                key: "REFRESH_TOKEN_TTL_DAYS".to_string(),
                value: self.auth.refresh_token_ttl_days.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Deployment platform
///
/// Destructive admin operations are only available on `Dev`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Dev,
    #[default]
    Prod,
}

impl std::str::FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "prod" | "production" => Ok(Self::Prod),
            _ => Err(ConfigError::InvalidValue {
                key: "PLATFORM".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Directory served under `/app`
    pub file_root: PathBuf,

    /// Deployment platform
    pub platform: Platform,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            file_root: PathBuf::from("."),
            platform: Platform::Prod,
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; `None` selects the in-memory store
    pub url: Option<String>,

    /// Connection pool size
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

/// Token issuance configuration, fixed at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Symmetric HMAC signing secret
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// Access token lifetime in seconds (default: 3600 = 1 hour)
    pub access_token_ttl_secs: u64,

    /// Refresh token lifetime in days (default: 60)
    pub refresh_token_ttl_days: i64,

    /// Token issuer identifier
    pub issuer: String,

    /// Key required as `Authorization: ApiKey <key>` on admin routes, if set
    #[serde(skip_serializing)]
    pub admin_api_key: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_days: 60,
            issuer: "chirpy".to_string(),
            admin_api_key: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "chirpy_api=debug,tower_http=debug".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
