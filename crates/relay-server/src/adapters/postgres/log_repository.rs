//! PostgreSQL implementation of LogRepository

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use relay::{DomainError, HttpMethod, LogEntry, LogFilter, LogRepository, PageRequest};

use super::{to_count, to_offset};

/// PostgreSQL implementation of LogRepository
pub struct PgLogRepository {
    pool: PgPool,
}

impl PgLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LogEntryRow {
    id: Uuid,
    api_id: Uuid,
    user_id: Uuid,
    method: String,
    endpoint: String,
    status_code: i32,
    response_time: f64,
    request_data: Option<serde_json::Value>,
    response_data: Option<String>,
    error: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<LogEntryRow> for LogEntry {
    type Error = DomainError;

    fn try_from(row: LogEntryRow) -> Result<Self, Self::Error> {
        let method: HttpMethod = row.method.parse().map_err(DomainError::Repository)?;
        let status_code = u16::try_from(row.status_code)
            .map_err(|_| DomainError::Repository(format!("Invalid status code: {}", row.status_code)))?;

        Ok(Self {
            id: row.id,
            api_id: row.api_id,
            user_id: row.user_id,
            method,
            endpoint: row.endpoint,
            status_code,
            response_time: row.response_time,
            request_data: row.request_data,
            response_data: row.response_data,
            error: row.error,
            created_at: row.created_at,
        })
    }
}

/// Postgres rejects NUL in TEXT and `\u0000` in JSONB
fn without_nul(text: &str) -> String {
    text.replace('\0', "\u{FFFD}")
}

fn json_without_nul(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(without_nul(s)),
        Value::Array(items) => Value::Array(items.iter().map(json_without_nul).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (without_nul(k), json_without_nul(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Copy of the entry that the database will accept
fn storable(entry: &LogEntry) -> LogEntry {
    LogEntry {
        endpoint: without_nul(&entry.endpoint),
        request_data: entry.request_data.as_ref().map(json_without_nul),
        response_data: entry.response_data.as_deref().map(without_nul),
        error: entry.error.as_deref().map(without_nul),
        ..entry.clone()
    }
}

#[async_trait]
impl LogRepository for PgLogRepository {
    async fn append(&self, entry: &LogEntry) -> Result<Uuid, DomainError> {
        let entry = storable(entry);
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO api_logs
                (id, api_id, user_id, method, endpoint, status_code, response_time,
                 request_data, response_data, error, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(entry.id)
        .bind(entry.api_id)
        .bind(entry.user_id)
        .bind(entry.method.as_str())
        .bind(&entry.endpoint)
        .bind(i32::from(entry.status_code))
        .bind(entry.response_time)
        .bind(&entry.request_data)
        .bind(&entry.response_data)
        .bind(&entry.error)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(id)
    }

    async fn find_by_id_and_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<LogEntry>, DomainError> {
        let row = sqlx::query_as::<_, LogEntryRow>(
            "SELECT * FROM api_logs WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        filter: LogFilter,
        page: PageRequest,
    ) -> Result<Vec<LogEntry>, DomainError> {
        let rows = sqlx::query_as::<_, LogEntryRow>(
            r#"
            SELECT * FROM api_logs
            WHERE user_id = $1 AND ($2::uuid IS NULL OR api_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(filter.api_id)
        .bind(i64::from(page.limit))
        .bind(to_offset(page.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_by_user(&self, user_id: Uuid, filter: LogFilter) -> Result<u64, DomainError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM api_logs WHERE user_id = $1 AND ($2::uuid IS NULL OR api_id = $2)",
        )
        .bind(user_id)
        .bind(filter.api_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(to_count(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay::{ApiDefinition, NewApiDefinition};
    use serde_json::json;

    fn definition() -> ApiDefinition {
        ApiDefinition::new(
            Uuid::new_v4(),
            NewApiDefinition {
                name: "image".into(),
                endpoint: "https://cdn.example.com/logo.png".into(),
                ..Default::default()
            },
        )
    }

    fn has_nul(value: &Value) -> bool {
        match value {
            Value::String(s) => s.contains('\0'),
            Value::Array(items) => items.iter().any(has_nul),
            Value::Object(map) => map.iter().any(|(k, v)| k.contains('\0') || has_nul(v)),
            _ => false,
        }
    }

    #[test]
    fn test_binary_response_is_storable() {
        let body = "\u{FFFD}PNG\r\n\u{1a}\n\0\0\0\rIHDR";
        let request_data = json!({
            "params": {"q": "a\0b", "k\0": [1, "x\0"]},
            "body": null
        });
        let entry = LogEntry::response(&definition(), 200, 4.2, request_data, body);

        let stored = storable(&entry);

        assert_eq!(stored.id, entry.id);
        assert_eq!(stored.status_code, 200);
        let response_data = stored.response_data.unwrap();
        assert!(!response_data.contains('\0'));
        assert_eq!(response_data.chars().count(), body.chars().count());
        assert!(response_data.contains("IHDR"));

        let request_data = stored.request_data.unwrap();
        assert!(!has_nul(&request_data));
        assert_eq!(request_data["params"]["q"], json!("a\u{FFFD}b"));
        assert_eq!(request_data["params"]["k\u{FFFD}"], json!([1, "x\u{FFFD}"]));
        assert_eq!(request_data["body"], Value::Null);
    }

    #[test]
    fn test_clean_entry_is_unchanged() {
        let entry = LogEntry::failure(&definition(), 500, 1.0, "connection refused");
        let stored = storable(&entry);

        assert_eq!(stored.error.as_deref(), Some("connection refused"));
        assert_eq!(stored.endpoint, entry.endpoint);
        assert!(stored.request_data.is_none());
        assert!(stored.response_data.is_none());
    }
}
