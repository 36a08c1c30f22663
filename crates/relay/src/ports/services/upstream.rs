//! Upstream Port
//!
//! Abstract interface for issuing the single outbound HTTP call of an
//! execution.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{HttpMethod, UPSTREAM_TIMEOUT};

/// Fully rendered outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    /// Sent as a JSON body when present
    pub body: Option<serde_json::Value>,
}

/// Response received from the upstream, whatever its status
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(crate::domain::is_json_content_type)
    }
}

/// Failure to obtain any upstream response
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("Request timeout")]
    Timeout,

    #[error("{0}")]
    Failure(String),
}

/// Upstream HTTP client interface
///
/// # Example
///
/// ```rust,ignore
/// use relay::ports::UpstreamClient;
///
/// struct HttpUpstream { /* reqwest client */ }
///
/// #[async_trait]
/// impl UpstreamClient for HttpUpstream {
///     async fn send(&self, request: UpstreamRequest)
///         -> Result<UpstreamResponse, UpstreamError>
///     {
///         // One attempt, no retries
///     }
/// }
/// ```
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Issue exactly one request. Implementations must not retry.
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError>;
}

/// Configuration for upstream calls
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub timeout: Duration,
    /// User-Agent header value, unless a Definition sets its own
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout: UPSTREAM_TIMEOUT,
            user_agent: "Relay-Proxy/1.0".to_string(),
        }
    }
}
