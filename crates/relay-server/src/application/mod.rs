//! Application Layer (Use Cases)
//!
//! Orchestrates domain operations and coordinates between
//! repositories and the upstream client.

mod api_service;
mod execution_service;
mod log_service;

pub use api_service::{ApiInput, ApiService};
pub use execution_service::{Execution, ExecutionService, Invocation};
pub use log_service::LogService;
