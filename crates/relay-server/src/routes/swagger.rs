//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::models::{
    // Api models
    ApiEnvelope,
    ApiListResponse,
    ApiResponse,
    CreateApiRequest,
    // Shared
    ErrorResponse,
    // Execute models
    ExecuteResponse,
    // Log models
    LogEnvelope,
    LogListResponse,
    LogResponse,
    MessageResponse,
    UpdateApiRequest,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Execute endpoints
        super::execute::execute_api,
        // Api endpoints
        super::apis::list_apis,
        super::apis::create_api,
        super::apis::get_api,
        super::apis::update_api,
        super::apis::delete_api,
        super::apis::list_api_logs,
        // Log endpoints
        super::logs::list_logs,
        super::logs::get_log,
    ),
    info(
        title = "Relay API",
        version = "0.1.0",
        description = "API definition registry and execution proxy.\n\nStore third-party HTTP endpoints, invoke them through the proxy and inspect every attempt in the execution log.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Execute", description = "Execute - Live invocation of stored Definitions"),
        (name = "Apis", description = "Apis - Definition management"),
        (name = "Logs", description = "Logs - Execution history"),
    ),
    components(
        schemas(
            // Api
            CreateApiRequest,
            UpdateApiRequest,
            ApiResponse,
            ApiEnvelope,
            ApiListResponse,
            // Execute
            ExecuteResponse,
            // Log
            LogResponse,
            LogEnvelope,
            LogListResponse,
            // Shared
            ErrorResponse,
            MessageResponse,
        )
    ),
    modifiers(&SecuritySchemes),
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
            components.add_security_scheme(
                "session",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/execute/{api_id}",
            "/api/apis",
            "/api/apis/{id}",
            "/api/apis/{id}/logs",
            "/api/logs",
            "/api/logs/{id}",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "{expected}");
        }
        assert!(doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("session")));
    }
}
