use anyhow::Context;
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod adapters;
mod application;
mod auth;
mod config;
mod error;
mod models;
mod routes;

use adapters::{HttpUpstream, PgApiDefinitionRepository, PgCredentialGate, PgLogRepository};
use application::{ApiService, ExecutionService, LogService};
use config::AppConfig;
use relay::CredentialGate;

/// Type aliases for application services with concrete adapter implementations
pub type AppExecutionService =
    ExecutionService<PgApiDefinitionRepository, PgLogRepository, HttpUpstream>;
pub type AppApiService = ApiService<PgApiDefinitionRepository>;
pub type AppLogService = LogService<PgLogRepository>;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub execution_service: Arc<AppExecutionService>,
    pub api_service: Arc<AppApiService>,
    pub log_service: Arc<AppLogService>,
    pub gate: Arc<dyn CredentialGate>,
}

impl AppState {
    pub fn new(pool: PgPool, config: &AppConfig) -> anyhow::Result<Self> {
        let api_repo = Arc::new(PgApiDefinitionRepository::new(pool.clone()));
        let log_repo = Arc::new(PgLogRepository::new(pool.clone()));
        let upstream = Arc::new(
            HttpUpstream::new(&config.upstream, config.egress.clone())
                .context("Failed to build upstream HTTP client")?,
        );

        Ok(Self {
            execution_service: Arc::new(ExecutionService::new(
                api_repo.clone(),
                log_repo.clone(),
                upstream,
                config.egress.clone(),
            )),
            api_service: Arc::new(ApiService::new(api_repo, config.egress.clone())),
            log_service: Arc::new(LogService::new(log_repo)),
            gate: Arc::new(PgCredentialGate::new(pool, &config.api_keys)),
        })
    }
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
}

async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Relay API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Assemble every route with its authentication layer
fn app(state: AppState) -> Router {
    // Execution proxy (API key)
    let execute_routes = routes::execute::router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_api_key,
    ));

    // Owner-scoped management (session)
    let session_routes = Router::new()
        .merge(routes::apis::router())
        .merge(routes::logs::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    // OpenAPI documentation
    let openapi = routes::swagger::ApiDoc::openapi();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(execute_routes)
        .merge(session_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    tracing::info!("Relay API initializing...");

    let config = AppConfig::from_secrets(&secrets);

    if config.api_keys.is_empty() {
        tracing::warn!("No RELAY_API_KEYS set - execution authentication disabled");
    } else {
        tracing::info!(keys = config.api_keys.len(), "API key authentication enabled");
    }
    if config.egress.allow_private_targets {
        tracing::warn!("Private upstream targets allowed");
    }
    if !config.egress.allowed_hosts.is_empty() {
        tracing::info!(hosts = ?config.egress.allowed_hosts, "Upstream host allow-list active");
    }

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let state = AppState::new(pool, &config)?;
    let router = app(state);

    tracing::info!("Swagger UI: /swagger-ui");
    tracing::info!("Relay API ready");

    Ok(router.into())
}
