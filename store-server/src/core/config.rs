//! Server configuration
//!
//! Every field can be overridden by an environment variable:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | ./data | working directory (database, logs) |
//! | HTTP_PORT | 4000 | HTTP API port |
//! | ENVIRONMENT | development | development / staging / production |
//! | CORS_ORIGINS | (empty) | comma-separated allowed origins |
//! | JWT_SECRET | (generated in dev) | access token signing secret |
//! | JWT_ACCESS_MINUTES | 15 | access token lifetime |
//! | REFRESH_TOKEN_DAYS | 30 | refresh token lifetime |
//! | ORDER_NUMBER_PREFIX | TW | order number prefix |
//! | ALLOW_UNLISTED_ORDER_ITEMS | true | see below |
//!
//! `ALLOW_UNLISTED_ORDER_ITEMS` controls what happens to checkout lines
//! whose product reference does not resolve to a catalog entry: `true`
//! trusts them as-is and skips stock validation (compatibility with
//! legacy/externally-sourced items), `false` rejects the payload.

use std::path::PathBuf;

use crate::auth::JwtConfig;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Allowed CORS origins; empty means permissive
    pub cors_origins: Vec<String>,
    /// JWT access token configuration
    pub jwt: JwtConfig,
    /// Refresh token lifetime (days)
    pub refresh_token_days: i64,
    /// Prefix for generated order numbers
    pub order_number_prefix: String,
    /// Skip stock validation for order lines that do not resolve to a
    /// catalog entry (true), or reject such payloads (false)
    pub allow_unlisted_order_items: bool,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            jwt: JwtConfig::default(),
            refresh_token_days: std::env::var("REFRESH_TOKEN_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            order_number_prefix: std::env::var("ORDER_NUMBER_PREFIX")
                .unwrap_or_else(|_| "TW".into()),
            allow_unlisted_order_items: std::env::var("ALLOW_UNLISTED_ORDER_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }

    /// Override work dir and port (test scenarios)
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// Directory holding the embedded database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Directory holding rolling log files
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Create the work directory layout if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
