//! Service Ports
//!
//! Interfaces for collaborators outside the process.

mod credential_gate;
mod upstream;

pub use credential_gate::*;
pub use upstream::*;
