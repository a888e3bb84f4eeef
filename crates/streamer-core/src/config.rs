//! Configuration module
//!
//! This module provides the service configuration (server, database, gateway limits)
//! and the ingestion settings handed to the coordinator and writer at construction.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const UPLOAD_ROOT: &str = "./uploads";
const INACTIVITY_TIMEOUT_MS: u64 = 5_000;
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;
const MAX_UPLOAD_SIZE_MB: usize = 100;

/// Settings for one upload pipeline.
///
/// Passed explicitly into the coordinator and every writer it spawns; nothing here is
/// read from global state once the service is running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestConfig {
    /// Base directory for upload artifacts. Each upload lands in `{upload_root}/{id}/{id}`.
    pub upload_root: PathBuf,
    /// How long an idle writer waits for a chunk or the end signal before aborting.
    pub inactivity_timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            upload_root: PathBuf::from(UPLOAD_ROOT),
            inactivity_timeout: Duration::from_millis(INACTIVITY_TIMEOUT_MS),
        }
    }
}

impl IngestConfig {
    pub fn new(upload_root: impl Into<PathBuf>, inactivity_timeout: Duration) -> Self {
        Self {
            upload_root: upload_root.into(),
            inactivity_timeout,
        }
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let upload_root = env::var("UPLOAD_ROOT")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(UPLOAD_ROOT));

        let inactivity_timeout_ms = env::var("INACTIVITY_TIMEOUT_MS")
            .unwrap_or_else(|_| INACTIVITY_TIMEOUT_MS.to_string())
            .parse()
            .unwrap_or(INACTIVITY_TIMEOUT_MS);

        let config = Self {
            upload_root,
            inactivity_timeout: Duration::from_millis(inactivity_timeout_ms),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.inactivity_timeout.is_zero() {
            return Err(anyhow::anyhow!(
                "INACTIVITY_TIMEOUT_MS must be greater than 0"
            ));
        }
        if self.upload_root.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_ROOT must not be empty"));
        }
        Ok(())
    }
}

/// Service configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    /// Size of the data frames the gateway cuts an uploaded file into.
    pub chunk_size_bytes: usize,
    /// Upper bound for a single HTTP upload body.
    pub max_upload_bytes: usize,
    pub ingest: IngestConfig,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let max_upload_mb: usize = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .unwrap_or(SERVER_PORT),
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
            chunk_size_bytes: env::var("UPLOAD_CHUNK_SIZE")
                .unwrap_or_else(|_| UPLOAD_CHUNK_SIZE.to_string())
                .parse()
                .unwrap_or(UPLOAD_CHUNK_SIZE),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            ingest: IngestConfig::from_env()?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.database_url.starts_with("postgresql://")
            || self.database_url.starts_with("postgres://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.chunk_size_bytes == 0 {
            return Err(anyhow::anyhow!("UPLOAD_CHUNK_SIZE must be greater than 0"));
        }

        if self.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        self.ingest.validate()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
