//! ApiDefinition Repository Port
//!
//! The Definition Store. Only atomic single-row operations are required.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::{ApiDefinition, PageRequest};

/// Repository interface for ApiDefinition entities
#[async_trait]
pub trait ApiDefinitionRepository: Send + Sync {
    /// Find a Definition by ID regardless of owner (execution path)
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ApiDefinition>, DomainError>;

    /// Find a Definition by ID restricted to its owner (CRUD paths)
    async fn find_by_id_and_owner(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ApiDefinition>, DomainError>;

    /// List an owner's Definitions, newest first
    async fn find_by_owner(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<ApiDefinition>, DomainError>;

    /// Count an owner's Definitions
    async fn count_by_owner(&self, user_id: Uuid) -> Result<u64, DomainError>;

    /// Insert a new Definition
    async fn insert(&self, definition: &ApiDefinition) -> Result<ApiDefinition, DomainError>;

    /// Persist changes to an existing Definition
    async fn update(&self, definition: &ApiDefinition) -> Result<ApiDefinition, DomainError>;

    /// Delete an owner's Definition; `false` when nothing matched
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, DomainError>;
}
