//! Repository Ports
//!
//! Abstract interfaces for data persistence operations.

mod api_repository;
mod log_repository;

pub use api_repository::*;
pub use log_repository::*;
