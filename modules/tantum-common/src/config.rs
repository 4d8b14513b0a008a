use std::env;
use std::time::Duration;

use crate::IngestError;

pub const DEFAULT_POOL_COUNT: usize = 4;
pub const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Log verbosity selected by `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Fatal,
    Error,
    Info,
    Debug,
}

impl LogLevel {
    /// Unrecognized values fall through to the most verbose level.
    pub fn parse(value: &str) -> Self {
        match value {
            "FATAL" => Self::Fatal,
            "ERROR" => Self::Error,
            "INFO" => Self::Info,
            _ => Self::Debug,
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`.
    /// tracing has no fatal level, so FATAL maps onto error.
    pub fn as_directive(&self) -> &'static str {
        match self {
            Self::Fatal | Self::Error => "error",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Process configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub db_host: String,
    pub db_port: u16,
    /// How long startup waits for the first connection before giving up.
    pub db_acquire_timeout: Duration,

    // Pipeline: worker count and queue capacity share this value.
    pub pool_count: usize,
    /// Set when `POOL_COUNT` was unusable and the default was substituted.
    /// Logged by [`Config::log_summary`], after the subscriber is installed.
    pub pool_count_error: Option<String>,

    // Logging
    pub log_level: LogLevel,
    pub log_format: LogFormat,

    // HTTP
    pub api_host: String,
    pub api_port: u16,
}

impl Config {
    /// Load configuration from the process environment, honoring a `.env` file.
    pub fn from_env() -> Result<Self, IngestError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IngestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| IngestError::Config(format!("{key} environment variable is required")))
        };

        let db_port = match lookup("DB_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| IngestError::Config(format!("DB_PORT must be a port number, got {raw:?}")))?,
            None => 5432,
        };
        let api_port = match lookup("API_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| IngestError::Config(format!("API_PORT must be a port number, got {raw:?}")))?,
            None => 8080,
        };

        let db_acquire_timeout = match lookup("DB_ACQUIRE_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map(Duration::from_secs).map_err(|_| {
                IngestError::Config(format!("DB_ACQUIRE_TIMEOUT_SECS must be a number of seconds, got {raw:?}"))
            })?,
            None => Duration::from_secs(DEFAULT_DB_ACQUIRE_TIMEOUT_SECS),
        };
        let (pool_count, pool_count_error) = match parse_pool_count(lookup("POOL_COUNT").as_deref()) {
            Ok(n) => (n, None),
            Err(e) => (DEFAULT_POOL_COUNT, Some(e)),
        };

        Ok(Self {
            db_user: required("DB_USER")?,
            db_password: required("DB_PASSWORD")?,
            db_name: required("DB_NAME")?,
            db_host: lookup("DB_HOST").unwrap_or_else(|| "postgres-db".to_string()),
            db_port,
            db_acquire_timeout,
            pool_count,
            pool_count_error,
            log_level: LogLevel::parse(lookup("LOG_LEVEL").as_deref().unwrap_or_default()),
            log_format: LogFormat::parse(lookup("LOG_FORMAT").as_deref().unwrap_or_default()),
            api_host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            api_port,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    pub fn log_summary(&self) {
        if let Some(e) = &self.pool_count_error {
            tracing::error!(error = %e, fallback = DEFAULT_POOL_COUNT, "Error env POOL_COUNT");
        }
        tracing::info!("Config loaded:");
        tracing::info!("  DB: {}@{}:{}/{}", self.db_user, self.db_host, self.db_port, self.db_name);
        tracing::info!("  DB_PASSWORD: <{} chars>", self.db_password.len());
        tracing::info!("  POOL_COUNT: {}", self.pool_count);
        tracing::info!("  LOG_LEVEL: {:?}", self.log_level);
    }
}

fn parse_pool_count(raw: Option<&str>) -> Result<usize, String> {
    match raw.map(str::parse::<usize>) {
        Some(Ok(n)) if n >= 1 => Ok(n),
        Some(_) => Err(format!("POOL_COUNT must be a positive integer, got {:?}", raw.unwrap_or_default())),
        None => Err("POOL_COUNT is not set".to_string()),
    }
}
