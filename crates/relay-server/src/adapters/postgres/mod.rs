//! PostgreSQL Repository Implementations

mod api_repository;
mod log_repository;

pub use api_repository::PgApiDefinitionRepository;
pub use log_repository::PgLogRepository;

/// Convert a COUNT(*) result
fn to_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

/// Convert a page offset for binding
fn to_offset(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}
