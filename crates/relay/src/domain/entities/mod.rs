//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - ApiDefinition: Stored description of a third-party HTTP endpoint
//! - LogEntry: Immutable record of one execution attempt

mod api_definition;
mod log_entry;

pub use api_definition::*;
pub use log_entry::*;
