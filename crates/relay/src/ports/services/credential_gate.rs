//! Credential Gate Port
//!
//! Authenticates callers. Session identities own Definitions and logs;
//! API-key identities may execute any active Definition.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Authenticated session owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
}

/// Caller holding a valid execution key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyIdentity {
    /// Non-secret label for logs (key prefix)
    pub label: String,
}

#[async_trait]
pub trait CredentialGate: Send + Sync {
    /// Whether the gate checks API keys at all
    fn api_keys_enabled(&self) -> bool;

    /// Resolve an execution key
    fn authorize_api_key(&self, key: &str) -> Option<ApiKeyIdentity>;

    /// Resolve a session token to its owner
    async fn authenticate_session(&self, token: &str) -> Result<Option<Principal>, DomainError>;
}
