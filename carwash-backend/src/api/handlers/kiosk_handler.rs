// src/api/handlers/kiosk_handler.rs
use crate::api::dto::kiosk_dto::{CashVisitDto, KioskVisitDto};
use crate::api::AppState;
use crate::domain::daily_visit_model::DailyVisitSnapshot;
use crate::domain::member::Member;
use crate::error::AppResult;
use crate::service::kiosk_service::KioskVisitResult;
use crate::types::ApiResponse;
use crate::utils::error_helper::convert_validation_errors;
use axum::{
    extract::{Json, Path, State},
    routing::{get, post},
    Router,
};
use tracing::info;
use validator::Validate;

pub async fn lookup_handler(
    State(app_state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<ApiResponse<Member>> {
    let member = app_state.kiosk_service.lookup(&code).await?;
    Ok(ApiResponse::success(member))
}

pub async fn member_visit_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<KioskVisitDto>,
) -> AppResult<ApiResponse<KioskVisitResult>> {
    payload
        .validate()
        .map_err(|e| convert_validation_errors(e, "kiosk_handler::member_visit"))?;

    let result = app_state
        .kiosk_service
        .log_member_visit(&payload.code, payload.service_type.as_deref())
        .await?;

    Ok(ApiResponse::success(result))
}

/// 非会員の来店
pub async fn cash_visit_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<CashVisitDto>,
) -> AppResult<ApiResponse<DailyVisitSnapshot>> {
    payload
        .validate()
        .map_err(|e| convert_validation_errors(e, "kiosk_handler::cash_visit"))?;

    let snapshot = app_state
        .kiosk_service
        .log_cash_visit(&payload.service_type)
        .await?;

    info!(
        service_type = %payload.service_type,
        count = snapshot.count,
        "Cash visit logged"
    );
    Ok(ApiResponse::success(snapshot))
}

pub fn kiosk_router(app_state: AppState) -> Router {
    Router::new()
        .route("/kiosk/lookup/{code}", get(lookup_handler))
        .route("/kiosk/visit", post(member_visit_handler))
        .route("/kiosk/cash", post(cash_visit_handler))
        .with_state(app_state)
}
