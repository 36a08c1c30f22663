//! Value Objects
//!
//! Immutable value types used across the domain.

mod api_status;
mod http_method;
mod pagination;

pub use api_status::*;
pub use http_method::*;
pub use pagination::*;

/// Open string-keyed mapping of dynamically typed values.
///
/// Used for stored headers, default params and logged request data,
/// since upstream content has no fixed schema.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;
