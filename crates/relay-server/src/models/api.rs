//! Api - Stored Definition payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use relay::{ApiDefinition, Paginated};

use crate::application::ApiInput;

/// Create Definition request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateApiRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Absolute http(s) URL
    pub endpoint: Option<String>,
    /// GET, POST, PUT, DELETE or PATCH (default GET)
    pub method: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub headers: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub params: Option<Value>,
}

/// Update Definition request; omitted fields are left unchanged
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateApiRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub endpoint: Option<String>,
    pub method: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub headers: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub params: Option<Value>,
    /// `active` enables execution; any other value disables it
    pub status: Option<String>,
}

impl From<CreateApiRequest> for ApiInput {
    fn from(req: CreateApiRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            endpoint: req.endpoint,
            method: req.method,
            headers: req.headers,
            params: req.params,
            status: None,
        }
    }
}

impl From<UpdateApiRequest> for ApiInput {
    fn from(req: UpdateApiRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            endpoint: req.endpoint,
            method: req.method,
            headers: req.headers,
            params: req.params,
            status: req.status,
        }
    }
}

/// Stored Definition
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub endpoint: String,
    pub method: String,
    #[schema(value_type = Object)]
    pub headers: Value,
    #[schema(value_type = Object)]
    pub params: Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApiResponse {
    pub fn from_domain(def: ApiDefinition) -> Self {
        Self {
            id: def.id,
            user_id: def.user_id,
            name: def.name,
            description: def.description,
            endpoint: def.endpoint,
            method: def.method.to_string(),
            headers: Value::Object(def.headers),
            params: Value::Object(def.params),
            status: def.status.to_string(),
            created_at: def.created_at,
            updated_at: def.updated_at,
        }
    }
}

/// Single Definition, with an acknowledgement on writes
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub api: ApiResponse,
}

impl ApiEnvelope {
    pub fn new(def: ApiDefinition) -> Self {
        Self {
            message: None,
            api: ApiResponse::from_domain(def),
        }
    }

    pub fn with_message(def: ApiDefinition, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            api: ApiResponse::from_domain(def),
        }
    }
}

/// Page of Definitions
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiListResponse {
    pub apis: Vec<ApiResponse>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
}

impl ApiListResponse {
    pub fn from_domain(page: Paginated<ApiDefinition>) -> Self {
        let page = page.map(ApiResponse::from_domain);
        Self {
            apis: page.items,
            total: page.total,
            page: page.page,
            limit: page.limit,
            pages: page.pages,
        }
    }
}
