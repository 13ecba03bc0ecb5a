//! Error types for workforce-ledger.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("worker id already registered: {0}")]
    DuplicateIdentity(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("worker {0} is already clocked in")]
    AlreadyClockedIn(String),

    #[error("worker {0} has no active session")]
    NoActiveSession(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("roster parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Short, stable label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::DuplicateIdentity(_) => "duplicate_identity",
            Error::NotFound(_) => "not_found",
            Error::AlreadyClockedIn(_) => "already_clocked_in",
            Error::NoActiveSession(_) => "no_active_session",
            Error::Validation(_) => "validation",
            Error::CorruptSnapshot(_) => "corrupt_snapshot",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Toml(_) => "toml",
            Error::Other(_) => "other",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
