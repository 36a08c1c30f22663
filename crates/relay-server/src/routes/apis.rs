//! Api Routes - Definition management
//!
//! HTTP handlers that delegate to ApiService. Every route is scoped to the
//! session owner.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};

use relay::Principal;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    ApiEnvelope, ApiListResponse, CreateApiRequest, ErrorResponse, LogListResponse,
    MessageResponse, PageQuery, UpdateApiRequest,
};
use crate::AppState;

/// List the caller's Definitions
#[utoipa::path(
    get,
    path = "/api/apis",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of Definitions", body = ApiListResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "Apis"
)]
pub async fn list_apis(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<ApiListResponse>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let page = state
        .api_service
        .list(principal.user_id, query.page_request())
        .await?;

    Ok(Json(ApiListResponse::from_domain(page)))
}

/// Create a Definition
#[utoipa::path(
    post,
    path = "/api/apis",
    request_body = CreateApiRequest,
    responses(
        (status = 201, description = "API created successfully", body = ApiEnvelope),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "Apis"
)]
pub async fn create_api(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<CreateApiRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiEnvelope>)> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let created = state
        .api_service
        .create(principal.user_id, payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::with_message(created, "API created successfully")),
    ))
}

/// Get one Definition
#[utoipa::path(
    get,
    path = "/api/apis/{id}",
    params(
        ("id" = String, Path, description = "Definition ID")
    ),
    responses(
        (status = 200, description = "Definition found", body = ApiEnvelope),
        (status = 400, description = "Invalid API ID", body = ErrorResponse),
        (status = 404, description = "API not found", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "Apis"
)]
pub async fn get_api(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiEnvelope>> {
    let def = state.api_service.get(principal.user_id, &id).await?;
    Ok(Json(ApiEnvelope::new(def)))
}

/// Partially update a Definition
#[utoipa::path(
    put,
    path = "/api/apis/{id}",
    params(
        ("id" = String, Path, description = "Definition ID")
    ),
    request_body = UpdateApiRequest,
    responses(
        (status = 200, description = "API updated successfully", body = ApiEnvelope),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "API not found", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "Apis"
)]
pub async fn update_api(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateApiRequest>, JsonRejection>,
) -> ApiResult<Json<ApiEnvelope>> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let updated = state
        .api_service
        .update(principal.user_id, &id, payload.into())
        .await?;

    Ok(Json(ApiEnvelope::with_message(
        updated,
        "API updated successfully",
    )))
}

/// Delete a Definition
#[utoipa::path(
    delete,
    path = "/api/apis/{id}",
    params(
        ("id" = String, Path, description = "Definition ID")
    ),
    responses(
        (status = 200, description = "API deleted successfully", body = MessageResponse),
        (status = 400, description = "Invalid API ID", body = ErrorResponse),
        (status = 404, description = "API not found", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "Apis"
)]
pub async fn delete_api(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.api_service.delete(principal.user_id, &id).await?;
    Ok(Json(MessageResponse::new("API deleted successfully")))
}

/// Execution log of one Definition
#[utoipa::path(
    get,
    path = "/api/apis/{id}/logs",
    params(
        ("id" = String, Path, description = "Definition ID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Page of log entries", body = LogListResponse),
        (status = 400, description = "Invalid API ID", body = ErrorResponse)
    ),
    security(("session" = [])),
    tag = "Logs"
)]
pub async fn list_api_logs(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<LogListResponse>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let page = state
        .log_service
        .list(principal.user_id, Some(&id), query.page_request())
        .await?;

    Ok(Json(LogListResponse::from_domain(page)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/apis", get(list_apis).post(create_api))
        .route(
            "/api/apis/:id",
            get(get_api).put(update_api).delete(delete_api),
        )
        .route("/api/apis/:id/logs", get(list_api_logs))
}
