//! Infrastructure Adapters
//!
//! Implementations of domain ports for external systems.

pub mod credentials;
pub mod postgres;
pub mod upstream;

// Re-exports
pub use credentials::PgCredentialGate;
pub use postgres::{PgApiDefinitionRepository, PgLogRepository};
pub use upstream::HttpUpstream;
