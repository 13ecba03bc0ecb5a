//! Typed configuration from environment variables.
//!
//! Loads once at startup. In local dev the binary calls
//! `dotenvy::dotenv().ok()` first so a `.env` file can supply the values.

use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DEFAULT_LEDGER_PATH: &str = "workforce.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Snapshot file the CLI loads from and saves to.
    pub ledger_path: PathBuf,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            ledger_path: optional_path("WORKFORCE_LEDGER_PATH")?
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_PATH)),
            otel_endpoint: std::env::var("OTEL_ENDPOINT")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Unset is fine; set-but-empty is a mistake worth failing on.
fn optional_path(name: &str) -> Result<Option<PathBuf>> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(Error::Config(format!(
            "environment variable {name} is set but empty"
        ))),
        Ok(value) => Ok(Some(PathBuf::from(value))),
        Err(_) => Ok(None),
    }
}
