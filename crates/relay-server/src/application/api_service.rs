//! ApiDefinition Application Service (Use Case)
//!
//! Owner-scoped management of stored Definitions.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use relay::{
    parse_api_id, ApiDefinition, ApiDefinitionPatch, ApiDefinitionRepository, ApiStatus,
    DomainError, EgressPolicy, HttpMethod, JsonMap, NewApiDefinition, PageRequest, Paginated,
};

/// Loosely typed Definition fields as submitted by a client
#[derive(Debug, Clone, Default)]
pub struct ApiInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub endpoint: Option<String>,
    pub method: Option<String>,
    pub headers: Option<Value>,
    pub params: Option<Value>,
    pub status: Option<String>,
}

/// Application service for Definition management
pub struct ApiService<R: ApiDefinitionRepository> {
    repo: Arc<R>,
    egress: EgressPolicy,
}

impl<R: ApiDefinitionRepository> ApiService<R> {
    pub fn new(repo: Arc<R>, egress: EgressPolicy) -> Self {
        Self { repo, egress }
    }

    /// List the owner's Definitions, newest first
    pub async fn list(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Paginated<ApiDefinition>, DomainError> {
        let items = self.repo.find_by_owner(user_id, page).await?;
        let total = self.repo.count_by_owner(user_id).await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn get(&self, user_id: Uuid, api_id: &str) -> Result<ApiDefinition, DomainError> {
        let id = parse_id(api_id)?;
        self.repo
            .find_by_id_and_owner(id, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("API", id))
    }

    /// Create a new active Definition
    pub async fn create(
        &self,
        user_id: Uuid,
        input: ApiInput,
    ) -> Result<ApiDefinition, DomainError> {
        let name = non_blank(input.name);
        let endpoint = non_blank(input.endpoint);
        let (name, endpoint) = match (name, endpoint) {
            (Some(name), Some(endpoint)) => (name, endpoint),
            _ => {
                return Err(DomainError::Validation(
                    "Name and endpoint are required".to_string(),
                ))
            }
        };

        let method = match input.method {
            Some(raw) => parse_method(&raw)?,
            None => HttpMethod::default(),
        };
        self.check_endpoint(&endpoint)?;

        let definition = ApiDefinition::new(
            user_id,
            NewApiDefinition {
                name,
                description: input.description.unwrap_or_default(),
                endpoint,
                method,
                headers: object_or_empty(input.headers, "headers")?,
                params: object_or_empty(input.params, "params")?,
            },
        );

        let saved = self.repo.insert(&definition).await?;
        tracing::info!(
            api_id = %saved.id,
            user_id = %user_id,
            "Created API definition: {}",
            saved.name
        );

        Ok(saved)
    }

    /// Apply a partial update to an owned Definition
    pub async fn update(
        &self,
        user_id: Uuid,
        api_id: &str,
        input: ApiInput,
    ) -> Result<ApiDefinition, DomainError> {
        let mut current = self.get(user_id, api_id).await?;

        let method = input.method.as_deref().map(parse_method).transpose()?;
        if let Some(endpoint) = &input.endpoint {
            self.check_endpoint(endpoint)?;
        }
        let headers = input
            .headers
            .map(|v| object_or_empty(Some(v), "headers"))
            .transpose()?;
        let params = input
            .params
            .map(|v| object_or_empty(Some(v), "params"))
            .transpose()?;

        current.apply(ApiDefinitionPatch {
            name: input.name,
            description: input.description,
            endpoint: input.endpoint,
            method,
            headers,
            params,
            status: input.status.map(ApiStatus::from),
        });

        let saved = self.repo.update(&current).await?;
        tracing::info!(api_id = %saved.id, status = %saved.status, "Updated API definition");

        Ok(saved)
    }

    /// Permanently delete an owned Definition
    pub async fn delete(&self, user_id: Uuid, api_id: &str) -> Result<(), DomainError> {
        let id = parse_id(api_id)?;
        if !self.repo.delete(id, user_id).await? {
            return Err(DomainError::not_found("API", id));
        }

        tracing::info!(api_id = %id, "Deleted API definition");
        Ok(())
    }

    fn check_endpoint(&self, endpoint: &str) -> Result<(), DomainError> {
        self.egress
            .check(endpoint)
            .map(|_| ())
            .map_err(DomainError::Validation)
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, DomainError> {
    parse_api_id(raw).map_err(|e| DomainError::Validation(e.to_string()))
}

fn parse_method(raw: &str) -> Result<HttpMethod, DomainError> {
    raw.parse()
        .map_err(|_| DomainError::Validation("Invalid HTTP method".to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `null` or absent becomes an empty map; anything else must be an object
fn object_or_empty(value: Option<Value>, field: &str) -> Result<JsonMap, DomainError> {
    match value {
        None | Some(Value::Null) => Ok(JsonMap::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(DomainError::Validation(format!(
            "{} must be a JSON object",
            field
        ))),
    }
}
