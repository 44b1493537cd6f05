//! Typed errors for the connector and configuration seams.
//!
//! Stages never propagate these; they are caught at the stage boundary and
//! turned into warning flags.

use thiserror::Error;

/// Fault raised by an external source connector
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("{service} API error: {status} - {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Upstream answered but reported the extraction as failed
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Response payload did not match the expected shape
    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Connector is missing required configuration
    #[error("config error: {0}")]
    Config(String),
}

/// Invalid or missing configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// A discovery request that fails validation before any lookup runs
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("service_type must not be blank")]
    BlankServiceType,

    #[error("zip_code must be at least {min} characters, got '{zip_code}'")]
    ZipTooShort { zip_code: String, min: usize },

    #[error("target_contractor_count must be between {min} and {max}, got {value}")]
    TargetOutOfRange { value: i64, min: i64, max: i64 },
}

pub type ConnectorResult<T> = std::result::Result<T, ConnectorError>;
