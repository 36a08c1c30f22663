//! Execute Routes - Live proxy invocation
//!
//! HTTP handlers that delegate to ExecutionService.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    routing::get,
    Json, Router,
};

use relay::is_json_content_type;

use crate::application::Invocation;
use crate::error::{ApiError, ApiResult};
use crate::models::{ErrorResponse, ExecuteResponse};
use crate::AppState;

/// Execute a stored Definition
///
/// Accepts GET, POST, PUT, DELETE and PATCH. The upstream call always uses
/// the stored method. Caller query parameters override stored defaults.
#[utoipa::path(
    post,
    path = "/api/execute/{api_id}",
    params(
        ("api_id" = String, Path, description = "Definition ID")
    ),
    request_body(content = Object, description = "Forwarded as JSON when sent as application/json"),
    responses(
        (status = 200, description = "Upstream response; the status mirrors the upstream", body = ExecuteResponse),
        (status = 400, description = "Invalid API ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 403, description = "API is not active or endpoint not permitted", body = ErrorResponse),
        (status = 404, description = "API not found", body = ErrorResponse),
        (status = 408, description = "Request timeout", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse)
    ),
    security(("api_key" = [])),
    tag = "Execute"
)]
pub async fn execute_api(
    State(state): State<AppState>,
    method: Method,
    Path(api_id): Path<String>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<ExecuteResponse>)> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(is_json_content_type);

    let invocation = Invocation {
        method: method.as_str().parse().unwrap_or_default(),
        query,
        body: body.to_vec(),
        is_json,
    };

    let execution = state.execution_service.execute(&api_id, invocation).await?;
    let status =
        StatusCode::from_u16(execution.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    Ok((status, Json(ExecuteResponse::from(execution))))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/execute/:api_id",
        get(execute_api)
            .post(execute_api)
            .put(execute_api)
            .delete(execute_api)
            .patch(execute_api),
    )
}
