//! PostgreSQL implementation of ApiDefinitionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use relay::{
    ApiDefinition, ApiDefinitionRepository, ApiStatus, DomainError, HttpMethod, JsonMap,
    PageRequest,
};

use super::{to_count, to_offset};

/// PostgreSQL implementation of ApiDefinitionRepository
pub struct PgApiDefinitionRepository {
    pool: PgPool,
}

impl PgApiDefinitionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct ApiDefinitionRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    description: String,
    endpoint: String,
    method: String,
    headers: serde_json::Value,
    params: serde_json::Value,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

fn json_object(value: serde_json::Value) -> JsonMap {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonMap::new(),
    }
}

impl TryFrom<ApiDefinitionRow> for ApiDefinition {
    type Error = DomainError;

    fn try_from(row: ApiDefinitionRow) -> Result<Self, Self::Error> {
        let method: HttpMethod = row.method.parse().map_err(DomainError::Repository)?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            endpoint: row.endpoint,
            method,
            headers: json_object(row.headers),
            params: json_object(row.params),
            status: ApiStatus::from(row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl ApiDefinitionRepository for PgApiDefinitionRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ApiDefinition>, DomainError> {
        let row =
            sqlx::query_as::<_, ApiDefinitionRow>("SELECT * FROM api_definitions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_id_and_owner(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ApiDefinition>, DomainError> {
        let row = sqlx::query_as::<_, ApiDefinitionRow>(
            "SELECT * FROM api_definitions WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_owner(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<ApiDefinition>, DomainError> {
        let rows = sqlx::query_as::<_, ApiDefinitionRow>(
            r#"
            SELECT * FROM api_definitions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(i64::from(page.limit))
        .bind(to_offset(page.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_by_owner(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM api_definitions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(to_count(count))
    }

    async fn insert(&self, definition: &ApiDefinition) -> Result<ApiDefinition, DomainError> {
        let row = sqlx::query_as::<_, ApiDefinitionRow>(
            r#"
            INSERT INTO api_definitions
                (id, user_id, name, description, endpoint, method, headers, params, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(definition.id)
        .bind(definition.user_id)
        .bind(&definition.name)
        .bind(&definition.description)
        .bind(&definition.endpoint)
        .bind(definition.method.as_str())
        .bind(sqlx::types::Json(&definition.headers))
        .bind(sqlx::types::Json(&definition.params))
        .bind(definition.status.as_str())
        .bind(definition.created_at)
        .bind(definition.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.try_into()
    }

    async fn update(&self, definition: &ApiDefinition) -> Result<ApiDefinition, DomainError> {
        let row = sqlx::query_as::<_, ApiDefinitionRow>(
            r#"
            UPDATE api_definitions
            SET name = $2, description = $3, endpoint = $4, method = $5,
                headers = $6, params = $7, status = $8, updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(definition.id)
        .bind(&definition.name)
        .bind(&definition.description)
        .bind(&definition.endpoint)
        .bind(definition.method.as_str())
        .bind(sqlx::types::Json(&definition.headers))
        .bind(sqlx::types::Json(&definition.params))
        .bind(definition.status.as_str())
        .bind(definition.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?
        .ok_or_else(|| DomainError::not_found("API", definition.id))?;

        row.try_into()
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM api_definitions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
