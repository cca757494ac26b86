//! Shared error type across hitcount crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Store could not be reached.
    StoreUnavailable,
    /// Store answered with an error.
    Store,
    /// Configuration missing or invalid.
    BadConfig,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::StoreUnavailable => "STORE_UNAVAILABLE",
            ClientCode::Store => "STORE",
            ClientCode::BadConfig => "BAD_CONFIG",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, HitCountError>;

/// Unified error type used by core and server.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HitCountError {
    #[error("store connection error: {0}")]
    StoreConnection(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("host name resolution failed: {0}")]
    HostResolution(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl HitCountError {
    /// True for the one failure kind the counter retries on.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, HitCountError::StoreConnection(_))
    }

    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            HitCountError::StoreConnection(_) => ClientCode::StoreUnavailable,
            HitCountError::Store(_) => ClientCode::Store,
            HitCountError::Config(_) => ClientCode::BadConfig,
            HitCountError::HostResolution(_) | HitCountError::Internal(_) => ClientCode::Internal,
        }
    }
}
