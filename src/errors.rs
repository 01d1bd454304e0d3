//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the citation resolution service, covering
//! configuration, provider access, data parsing and API failures.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from system components and external providers
//! - **Output**: Structured error types with context for logging
//! - **Error Categories**: Configuration, Provider, Data, API, Internal
//!
//! ## Key Features
//! - Domain error types with detailed context
//! - Automatic conversion from library errors
//! - Category labels for structured logging
//! - Distinguishes "provider failed" from "no enrichment found" so that
//!   best-effort resolvers can log the difference even though both are
//!   recovered locally

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Error types for the citation resolution service
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Configuration errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Network-related errors talking to a provider
    #[error("network error: {details}")]
    Network { details: String },

    /// Provider redirect chain exceeded the follow limit
    #[error("too many redirects fetching {url}")]
    TooManyRedirects { url: String },

    /// A provider responded but the payload could not be interpreted
    #[error("failed to parse data from {source_name}: {details}")]
    DataParsing { source_name: String, details: String },

    /// A provider returned a non-success status
    #[error("data source '{source_name}' is unavailable: {details}")]
    DataSourceUnavailable { source_name: String, details: String },

    /// Validation errors
    #[error("validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// A citation permalink id that no registered type can reverse
    #[error("unknown citation id: {id}")]
    UnknownCitationId { id: String },

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors (historical statute datasets)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing errors (configuration files)
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Internal system errors
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ResolveError {
    /// Map a reqwest error onto the domain taxonomy, preserving the
    /// redirect-limit case as its own variant.
    pub fn from_http(err: reqwest::Error, url: &str) -> Self {
        if err.is_redirect() {
            ResolveError::TooManyRedirects {
                url: url.to_string(),
            }
        } else {
            ResolveError::Network {
                details: err.to_string(),
            }
        }
    }

    /// Check if the error is recoverable (the operation can be retried)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ResolveError::Network { .. } | ResolveError::DataSourceUnavailable { .. }
        )
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            ResolveError::Config { .. } | ResolveError::Toml(_) => "configuration",
            ResolveError::Network { .. }
            | ResolveError::TooManyRedirects { .. }
            | ResolveError::DataSourceUnavailable { .. } => "provider",
            ResolveError::DataParsing { .. }
            | ResolveError::Json(_)
            | ResolveError::Yaml(_) => "data",
            ResolveError::ValidationFailed { .. } | ResolveError::UnknownCitationId { .. } => "api",
            ResolveError::Io(_) | ResolveError::Internal { .. } => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err = ResolveError::Network {
            details: "connection refused".to_string(),
        };
        assert_eq!(err.category(), "provider");
        assert!(err.is_recoverable());

        let err = ResolveError::Config {
            message: "bad port".to_string(),
        };
        assert_eq!(err.category(), "configuration");
        assert!(!err.is_recoverable());
    }
}
