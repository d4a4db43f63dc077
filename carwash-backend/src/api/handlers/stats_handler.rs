// src/api/handlers/stats_handler.rs
use crate::api::AppState;
use crate::error::AppResult;
use crate::service::stats_service::MembershipStats;
use crate::service::weather_service::WeatherReport;
use crate::types::ApiResponse;
use axum::{extract::State, routing::get, Router};

pub async fn member_stats_handler(
    State(app_state): State<AppState>,
) -> AppResult<ApiResponse<MembershipStats>> {
    let stats = app_state.stats_service.membership_stats().await?;
    Ok(ApiResponse::success(stats))
}

/// 天気と来店数の相関
pub async fn weather_stats_handler(
    State(app_state): State<AppState>,
) -> AppResult<ApiResponse<WeatherReport>> {
    let report = app_state.weather_service.weather_report().await?;
    Ok(ApiResponse::success(report))
}

pub fn stats_router(app_state: AppState) -> Router {
    Router::new()
        .route("/stats/members", get(member_stats_handler))
        .route("/stats/weather", get(weather_stats_handler))
        .with_state(app_state)
}
