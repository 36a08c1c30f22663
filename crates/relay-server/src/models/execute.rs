//! Execute - Proxy envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::application::Execution;

/// Envelope around an upstream response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExecuteResponse {
    /// Status returned by the upstream
    pub status_code: u16,
    /// Parsed JSON or raw text
    #[schema(value_type = Object)]
    pub response: Value,
    /// Milliseconds, rounded to 2 decimal places
    pub response_time: f64,
}

impl From<Execution> for ExecuteResponse {
    fn from(execution: Execution) -> Self {
        Self {
            status_code: execution.status_code,
            response: execution.response,
            response_time: execution.response_time,
        }
    }
}
