//! Error types for CloudSim

use thiserror::Error;

/// Result type alias using CloudSim Error
pub type Result<T> = std::result::Result<T, Error>;

/// CloudSim error types
///
/// The permissive store operations never produce these; missing ids degrade
/// to no-ops there. Errors surface from the validated `transition` path,
/// configuration loading and store construction.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Resource not found: {kind} with id {id}")]
    NotFound { kind: String, id: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown resource domain: {0}")]
    UnknownDomain(String),

    #[error("Lifecycle simulator requires a running tokio runtime")]
    NoRuntime,
}
