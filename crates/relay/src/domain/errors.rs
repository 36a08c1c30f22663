//! Domain Errors
//!
//! Error types for domain operations and for proxy execution.

use thiserror::Error;
use uuid::Uuid;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl DomainError {
    pub fn not_found<T: AsRef<str>>(entity_type: T, id: Uuid) -> Self {
        Self::NotFound {
            entity_type: entity_type.as_ref().to_string(),
            id: id.to_string(),
        }
    }
}

/// Outcome taxonomy of a single proxy execution.
///
/// The first four variants are raised before any upstream call and never
/// produce a log entry. `UpstreamTimeout` and `UpstreamFailure` are raised
/// after the log entry has been appended. `Internal` covers definition store
/// and log sink failures and is not classified further.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid API ID")]
    InvalidIdentifier,

    #[error("API not found")]
    NotFound,

    #[error("API is not active")]
    Inactive,

    #[error("Endpoint not permitted: {0}")]
    EgressDenied(String),

    #[error("Request timeout")]
    UpstreamTimeout,

    #[error("{0}")]
    UpstreamFailure(String),

    #[error("Internal error: {0}")]
    Internal(#[from] DomainError),
}

impl ProxyError {
    /// HTTP status code reported to the caller
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidIdentifier => 400,
            Self::NotFound => 404,
            Self::Inactive | Self::EgressDenied(_) => 403,
            Self::UpstreamTimeout => 408,
            Self::UpstreamFailure(_) | Self::Internal(_) => 500,
        }
    }
}
