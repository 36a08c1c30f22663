//! Log - Execution log payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use relay::{LogEntry, Paginated};

/// One execution attempt
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogResponse {
    pub id: Uuid,
    pub api_id: Uuid,
    pub user_id: Uuid,
    pub method: String,
    pub endpoint: String,
    pub status_code: u16,
    /// Milliseconds
    pub response_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub request_data: Option<Value>,
    /// First 1000 characters of the upstream body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LogResponse {
    pub fn from_domain(entry: LogEntry) -> Self {
        Self {
            id: entry.id,
            api_id: entry.api_id,
            user_id: entry.user_id,
            method: entry.method.to_string(),
            endpoint: entry.endpoint,
            status_code: entry.status_code,
            response_time: entry.response_time,
            request_data: entry.request_data,
            response_data: entry.response_data,
            error: entry.error,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogEnvelope {
    pub log: LogResponse,
}

/// Page of log entries
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogListResponse {
    pub logs: Vec<LogResponse>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
}

impl LogListResponse {
    pub fn from_domain(page: Paginated<LogEntry>) -> Self {
        let page = page.map(LogResponse::from_domain);
        Self {
            logs: page.items,
            total: page.total,
            page: page.page,
            limit: page.limit,
            pages: page.pages,
        }
    }
}
