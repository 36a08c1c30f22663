//! Log Routes - Execution history

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Extension, Json, Router,
};

use relay::Principal;

use crate::error::{ApiError, ApiResult};
use crate::models::{ErrorResponse, LogEnvelope, LogListResponse, LogResponse, PageQuery};
use crate::AppState;

/// List the caller's log entries, newest first
#[utoipa::path(
    get,
    path = "/api/logs",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of log entries", body = LogListResponse),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "Logs"
)]
pub async fn list_logs(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<LogListResponse>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let page = state
        .log_service
        .list(
            principal.user_id,
            query.api_id.as_deref(),
            query.page_request(),
        )
        .await?;

    Ok(Json(LogListResponse::from_domain(page)))
}

/// Get one log entry
#[utoipa::path(
    get,
    path = "/api/logs/{id}",
    params(
        ("id" = String, Path, description = "Log entry ID")
    ),
    responses(
        (status = 200, description = "Log entry", body = LogEnvelope),
        (status = 400, description = "Invalid log ID", body = ErrorResponse),
        (status = 404, description = "Log not found", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "Logs"
)]
pub async fn get_log(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<LogEnvelope>> {
    let entry = state.log_service.get(principal.user_id, &id).await?;
    Ok(Json(LogEnvelope {
        log: LogResponse::from_domain(entry),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/logs", get(list_logs))
        .route("/api/logs/:id", get(get_log))
}
