//! ApiDefinition - Registered third-party endpoint
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{ApiStatus, HttpMethod, JsonMap};

/// ApiDefinition - A stored description of an endpoint to proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDefinition {
    pub id: Uuid,
    /// Owner; immutable after creation
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    /// Absolute upstream URL
    pub endpoint: String,
    pub method: HttpMethod,
    /// Headers sent with every upstream call
    #[serde(default)]
    pub headers: JsonMap,
    /// Default query params, overridden per call
    #[serde(default)]
    pub params: JsonMap,
    pub status: ApiStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a Definition
#[derive(Debug, Clone, Default)]
pub struct NewApiDefinition {
    pub name: String,
    pub description: String,
    pub endpoint: String,
    pub method: HttpMethod,
    pub headers: JsonMap,
    pub params: JsonMap,
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ApiDefinitionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub endpoint: Option<String>,
    pub method: Option<HttpMethod>,
    pub headers: Option<JsonMap>,
    pub params: Option<JsonMap>,
    pub status: Option<ApiStatus>,
}

impl ApiDefinition {
    /// Create a new active Definition with generated ID and timestamps
    pub fn new(user_id: Uuid, input: NewApiDefinition) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: input.name,
            description: input.description,
            endpoint: input.endpoint,
            method: input.method,
            headers: input.headers,
            params: input.params,
            status: ApiStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Apply a partial update and refresh `updated_at`
    pub fn apply(&mut self, patch: ApiDefinitionPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(endpoint) = patch.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(method) = patch.method {
            self.method = method;
        }
        if let Some(headers) = patch.headers {
            self.headers = headers;
        }
        if let Some(params) = patch.params {
            self.params = params;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ApiDefinition {
        ApiDefinition::new(
            Uuid::new_v4(),
            NewApiDefinition {
                name: "weather".to_string(),
                endpoint: "https://api.example.com/weather".to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_new_is_active_get() {
        let def = sample();
        assert!(def.is_active());
        assert_eq!(def.method, HttpMethod::Get);
        assert!(def.headers.is_empty());
        assert_eq!(def.created_at, def.updated_at);
    }

    #[test]
    fn test_apply_only_touches_supplied_fields() {
        let mut def = sample();
        let id = def.id;
        let owner = def.user_id;
        let created = def.created_at;

        let mut params = JsonMap::new();
        params.insert("units".to_string(), json!("metric"));

        def.apply(ApiDefinitionPatch {
            method: Some(HttpMethod::Post),
            params: Some(params),
            status: Some(ApiStatus::Inactive),
            ..Default::default()
        });

        assert_eq!(def.id, id);
        assert_eq!(def.user_id, owner);
        assert_eq!(def.created_at, created);
        assert_eq!(def.name, "weather");
        assert_eq!(def.endpoint, "https://api.example.com/weather");
        assert_eq!(def.method, HttpMethod::Post);
        assert_eq!(def.params.get("units"), Some(&json!("metric")));
        assert!(!def.is_active());
        assert!(def.updated_at >= created);
    }
}
