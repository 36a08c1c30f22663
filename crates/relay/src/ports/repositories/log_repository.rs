//! Log Repository Port
//!
//! The Log Sink. Appends must never fail silently.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::{LogEntry, LogFilter, PageRequest};

/// Repository interface for LogEntry records
#[async_trait]
pub trait LogRepository: Send + Sync {
    /// Append a log entry, returning its ID
    async fn append(&self, entry: &LogEntry) -> Result<Uuid, DomainError>;

    /// Find a log entry belonging to a user
    async fn find_by_id_and_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<LogEntry>, DomainError>;

    /// List a user's log entries, newest first
    async fn find_by_user(
        &self,
        user_id: Uuid,
        filter: LogFilter,
        page: PageRequest,
    ) -> Result<Vec<LogEntry>, DomainError>;

    /// Count a user's log entries
    async fn count_by_user(&self, user_id: Uuid, filter: LogFilter) -> Result<u64, DomainError>;
}
