// src/api/handlers/system_handler.rs
use crate::api::AppState;
use crate::error::AppResult;
use crate::service::member_cache_service::CacheStatus;
use crate::types::ApiResponse;
use axum::{extract::State, routing::get, Router};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub environment: String,
    pub database: bool,
}

#[derive(Debug, Serialize)]
pub struct SystemInfoResponse {
    pub environment: String,
    pub is_test: bool,
    pub is_production: bool,
    pub is_development: bool,
    pub cache: CacheStatus,
}

pub async fn health_check_handler(
    State(app_state): State<AppState>,
) -> AppResult<ApiResponse<HealthResponse>> {
    let database = match app_state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database ping failed");
            false
        }
    };

    Ok(ApiResponse::success(HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        environment: app_state.config.environment.clone(),
        database,
    }))
}

pub async fn get_system_info(
    State(app_state): State<AppState>,
) -> AppResult<ApiResponse<SystemInfoResponse>> {
    let config = &app_state.config;

    Ok(ApiResponse::success(SystemInfoResponse {
        environment: config.environment.clone(),
        is_test: config.is_test(),
        is_production: config.is_production(),
        is_development: config.is_development(),
        cache: app_state.member_cache.status().await,
    }))
}

pub fn system_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check_handler))
        .route("/system/info", get(get_system_info))
        .with_state(app_state)
}
