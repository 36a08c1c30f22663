//! Relay Request/Response Models
//!
//! - Api: stored Definition payloads
//! - Log: execution log payloads
//! - Execute: proxy envelope

mod api;
mod execute;
mod log;

pub use api::*;
pub use execute::*;
pub use log::*;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Error body returned by every failing route
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Pagination and filter query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (default 1)
    pub page: Option<u32>,
    /// Page size, 1..=100 (default 10)
    pub limit: Option<u32>,
    /// Restrict logs to one Definition
    pub api_id: Option<String>,
}

impl PageQuery {
    pub fn page_request(&self) -> relay::PageRequest {
        relay::PageRequest::new(self.page, self.limit)
    }
}
