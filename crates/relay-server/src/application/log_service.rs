//! Log Application Service (Use Case)
//!
//! Read-only access to the execution log for the Definitions a user owns.

use std::sync::Arc;
use uuid::Uuid;

use relay::{DomainError, LogEntry, LogFilter, LogRepository, PageRequest, Paginated};

use super::api_service::parse_id;

/// Application service for log retrieval
pub struct LogService<L: LogRepository> {
    repo: Arc<L>,
}

impl<L: LogRepository> LogService<L> {
    pub fn new(repo: Arc<L>) -> Self {
        Self { repo }
    }

    /// List log entries, newest first, optionally narrowed to one Definition
    pub async fn list(
        &self,
        user_id: Uuid,
        api_id: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<LogEntry>, DomainError> {
        let filter = LogFilter {
            api_id: api_id.map(parse_id).transpose()?,
        };

        let items = self.repo.find_by_user(user_id, filter, page).await?;
        let total = self.repo.count_by_user(user_id, filter).await?;
        Ok(Paginated::new(items, total, page))
    }

    pub async fn get(&self, user_id: Uuid, log_id: &str) -> Result<LogEntry, DomainError> {
        let id = Uuid::parse_str(log_id)
            .map_err(|_| DomainError::Validation("Invalid log ID".to_string()))?;

        self.repo
            .find_by_id_and_user(id, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Log", id))
    }
}
