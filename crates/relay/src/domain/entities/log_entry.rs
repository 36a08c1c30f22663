//! LogEntry - Record of one execution attempt
//!
//! Append-only. Method, endpoint and owner are copied from the Definition at
//! invocation time so the log keeps historical truth after later edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::ApiDefinition;
use crate::domain::services::{truncate_chars, RESPONSE_PREVIEW_CHARS};
use crate::domain::value_objects::HttpMethod;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    /// Weak reference; the Definition may be deleted later
    pub api_id: Uuid,
    pub user_id: Uuid,
    pub method: HttpMethod,
    pub endpoint: String,
    pub status_code: u16,
    /// Elapsed milliseconds, full precision
    pub response_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Narrowing options for log retrieval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub api_id: Option<Uuid>,
}

impl LogEntry {
    fn base(definition: &ApiDefinition, status_code: u16, response_time: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            api_id: definition.id,
            user_id: definition.user_id,
            method: definition.method,
            endpoint: definition.endpoint.clone(),
            status_code,
            response_time,
            request_data: None,
            response_data: None,
            error: None,
            created_at: Utc::now(),
        }
    }

    /// An upstream response was received (any status code)
    pub fn response(
        definition: &ApiDefinition,
        status_code: u16,
        response_time: f64,
        request_data: serde_json::Value,
        body: &str,
    ) -> Self {
        Self {
            request_data: Some(request_data),
            response_data: Some(truncate_chars(body, RESPONSE_PREVIEW_CHARS)),
            ..Self::base(definition, status_code, response_time)
        }
    }

    /// The proxy classified the attempt as failed; no response fields
    pub fn failure(
        definition: &ApiDefinition,
        status_code: u16,
        response_time: f64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::base(definition, status_code, response_time)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewApiDefinition;
    use serde_json::json;

    fn definition() -> ApiDefinition {
        ApiDefinition::new(
            Uuid::new_v4(),
            NewApiDefinition {
                name: "echo".to_string(),
                endpoint: "https://echo.example.com".to_string(),
                method: HttpMethod::Put,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_response_entry_copies_definition_and_truncates() {
        let def = definition();
        let body = "x".repeat(5000);
        let entry = LogEntry::response(&def, 201, 12.3456, json!({"params": {}}), &body);

        assert_eq!(entry.api_id, def.id);
        assert_eq!(entry.user_id, def.user_id);
        assert_eq!(entry.method, HttpMethod::Put);
        assert_eq!(entry.endpoint, def.endpoint);
        assert_eq!(entry.status_code, 201);
        assert_eq!(entry.response_data.as_deref().map(str::len), Some(1000));
        assert!(entry.error.is_none());
    }

    #[test]
    fn test_failure_entry_has_no_payloads() {
        let def = definition();
        let entry = LogEntry::failure(&def, 408, 30000.0, "Request timeout");

        assert_eq!(entry.status_code, 408);
        assert_eq!(entry.error.as_deref(), Some("Request timeout"));
        assert!(entry.request_data.is_none());
        assert!(entry.response_data.is_none());

        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("response_data").is_none());
    }
}
