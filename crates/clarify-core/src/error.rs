//! Error types for Clarify

use thiserror::Error;

/// Result type alias for Clarify operations
pub type ClarifyResult<T> = Result<T, ClarifyError>;

/// Main error type for Clarify
#[derive(Error, Debug)]
pub enum ClarifyError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Injection error: {0}")]
    Injection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClarifyError {
    /// Create a new storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a new host error
    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }

    /// Create a new injection error
    pub fn injection(msg: impl Into<String>) -> Self {
        Self::Injection(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
