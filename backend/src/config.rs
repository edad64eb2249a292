//! Configuration management for the Contract Farming Marketplace backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with CFM_ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::PageLimits;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Remote store selection and credentials
    pub remote_store: RemoteStoreConfig,

    /// Direct database configuration (postgres backend only)
    pub database: DatabaseConfig,

    /// JWT verification configuration
    pub jwt: JwtConfig,

    /// Read model limits
    pub read_model: ReadModelConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// Which remote store implementation serves the read model
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Hosted REST gateway (PostgREST-compatible)
    Rest,
    /// Direct PostgreSQL connection
    Postgres,
    /// In-process store, for local development
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteStoreConfig {
    pub backend: StoreBackend,

    /// Base URL of the hosted backend (REST backend only)
    pub url: String,

    /// API key sent as `apikey` and bearer token (REST backend only)
    pub api_key: String,

    /// Database schema exposed by the gateway
    pub schema: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Shared secret the hosted backend signs access tokens with
    pub secret: String,

    /// Expected `aud` claim
    pub audience: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReadModelConfig {
    /// Page size when the caller does not pass a limit
    pub default_limit: u32,

    /// Upper bound on any caller-supplied limit
    pub max_limit: u32,

    /// Deadline for a single remote store round trip
    pub request_timeout_ms: u64,
}

impl ReadModelConfig {
    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_limit: self.default_limit,
            max_limit: self.max_limit,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ReadModelConfig {
    fn default() -> Self {
        let limits = PageLimits::default();
        Self {
            default_limit: limits.default_limit,
            max_limit: limits.max_limit,
            request_timeout_ms: 10_000,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("CFM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("remote_store.backend", "memory")?
            .set_default("remote_store.url", "")?
            .set_default("remote_store.api_key", "")?
            .set_default("remote_store.schema", "public")?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.secret", "development-secret-key")?
            .set_default("jwt.audience", "authenticated")?
            .set_default("read_model.default_limit", 50)?
            .set_default("read_model.max_limit", 200)?
            .set_default("read_model.request_timeout_ms", 10_000)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CFM_ prefix)
            .add_source(
                Environment::with_prefix("CFM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
