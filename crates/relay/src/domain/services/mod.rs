//! Domain Services
//!
//! Stateless helpers shared by the execution proxy and the definition
//! management use cases.

mod egress;
mod execution;

pub use egress::*;
pub use execution::*;
