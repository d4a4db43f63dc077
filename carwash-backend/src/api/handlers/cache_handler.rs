// src/api/handlers/cache_handler.rs
use crate::api::AppState;
use crate::error::AppResult;
use crate::service::member_cache_service::CacheStatus;
use crate::types::ApiResponse;
use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::info;

/// 3種類の会員キャッシュを読み直す
pub async fn refresh_cache_handler(
    State(app_state): State<AppState>,
) -> AppResult<ApiResponse<CacheStatus>> {
    let status = app_state.member_cache.refresh_all().await?;

    info!(
        subscriptions = status.subscription.count,
        loyalty = status.loyalty.count,
        prepaid = status.prepaid.count,
        "Member cache refreshed"
    );

    Ok(ApiResponse::success(status))
}

pub async fn cache_status_handler(
    State(app_state): State<AppState>,
) -> AppResult<ApiResponse<CacheStatus>> {
    Ok(ApiResponse::success(app_state.member_cache.status().await))
}

/// セッション終了時のキャッシュ破棄
pub async fn reset_cache_handler(
    State(app_state): State<AppState>,
) -> AppResult<ApiResponse<CacheStatus>> {
    app_state.member_cache.reset().await;
    info!("Member cache reset");
    Ok(ApiResponse::success(app_state.member_cache.status().await))
}

pub fn cache_router(app_state: AppState) -> Router {
    Router::new()
        .route("/cache/refresh", post(refresh_cache_handler))
        .route("/cache/reset", post(reset_cache_handler))
        .route("/cache/status", get(cache_status_handler))
        .with_state(app_state)
}
