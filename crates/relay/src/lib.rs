//! Relay Domain Library
//!
//! Core domain types and interfaces for the Relay API proxy.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (ApiDefinition, LogEntry)
//!   - `value_objects/`: Immutable value types (HttpMethod, ApiStatus, PageRequest)
//!   - `services/`: Pure execution helpers (parameter merge, egress policy)
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Definition store and log sink
//!   - `services/`: Upstream HTTP client and credential gate
//!
//! # Usage
//!
//! ```rust,ignore
//! use relay::domain::{ApiDefinition, LogEntry};
//! use relay::ports::{ApiDefinitionRepository, LogRepository, UpstreamClient};
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    caller_params, is_json_content_type, merge_params, parse_api_id, parse_endpoint,
    query_pairs, render_header_value, round_ms, truncate_chars, ApiDefinition,
    ApiDefinitionPatch, ApiStatus, DomainError, EgressPolicy, HttpMethod, JsonMap, LogEntry,
    LogFilter, NewApiDefinition, PageRequest, Paginated, ProxyError, RESPONSE_PREVIEW_CHARS,
    TIMEOUT_ERROR, UPSTREAM_TIMEOUT,
};
pub use ports::{
    ApiDefinitionRepository, ApiKeyIdentity, CredentialGate, LogRepository, Principal,
    UpstreamClient, UpstreamConfig, UpstreamError, UpstreamRequest, UpstreamResponse,
};
