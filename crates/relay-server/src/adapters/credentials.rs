//! Credential Gate Implementation
//!
//! Execution keys come from configuration; session tokens are looked up in
//! the `sessions` table by their SHA-256 digest.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use relay::{ApiKeyIdentity, CredentialGate, DomainError, Principal};

/// Hex-encoded SHA-256 of a secret token
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Configured execution key, kept only as a digest
struct ApiKeyEntry {
    label: String,
    digest: String,
}

impl ApiKeyEntry {
    fn new(key: &str) -> Self {
        let prefix: String = key.chars().take(4).collect();
        Self {
            label: format!("{prefix}***"),
            digest: hash_token(key),
        }
    }
}

/// Static API keys plus Postgres-backed sessions
pub struct PgCredentialGate {
    pool: PgPool,
    api_keys: Vec<ApiKeyEntry>,
}

impl PgCredentialGate {
    pub fn new(pool: PgPool, api_keys: &[String]) -> Self {
        Self {
            pool,
            api_keys: api_keys.iter().map(|k| ApiKeyEntry::new(k)).collect(),
        }
    }
}

#[async_trait]
impl CredentialGate for PgCredentialGate {
    fn api_keys_enabled(&self) -> bool {
        !self.api_keys.is_empty()
    }

    fn authorize_api_key(&self, key: &str) -> Option<ApiKeyIdentity> {
        if key.is_empty() {
            return None;
        }
        let digest = hash_token(key);
        self.api_keys
            .iter()
            .find(|entry| entry.digest == digest)
            .map(|entry| ApiKeyIdentity {
                label: entry.label.clone(),
            })
    }

    async fn authenticate_session(&self, token: &str) -> Result<Option<Principal>, DomainError> {
        if token.is_empty() {
            return Ok(None);
        }

        let user_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM sessions WHERE token_hash = $1 AND expires_at > NOW()",
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(user_id.map(|user_id| Principal { user_id }))
    }
}
