// src/api/handlers/visit_handler.rs
use crate::api::dto::visit_dto::{PurgeVisitsDto, RecordVisitDto, VisitRangeQuery, VisitSeriesQuery};
use crate::api::AppState;
use crate::domain::daily_visit_model::DailyVisitSnapshot;
use crate::error::AppResult;
use crate::service::visit_service::{PurgeReport, VisitSeries};
use crate::types::ApiResponse;
use crate::utils::error_helper::{convert_validation_errors, validation_error};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use tracing::info;
use validator::Validate;

/// 来店1件を今日の集計に加算
pub async fn record_visit_handler(
    State(app_state): State<AppState>,
    payload: Option<Json<RecordVisitDto>>,
) -> AppResult<ApiResponse<DailyVisitSnapshot>> {
    let Json(payload) = payload.unwrap_or_default();

    let snapshot = app_state
        .visit_service
        .record_visit(payload.category.as_deref(), payload.service_type.as_deref())
        .await?;

    Ok(ApiResponse::success(snapshot))
}

/// 指定日の集計。記録がない日は data: null
pub async fn get_visit_handler(
    State(app_state): State<AppState>,
    Path(date_key): Path<String>,
) -> AppResult<ApiResponse<Option<DailyVisitSnapshot>>> {
    let snapshot = app_state
        .visit_service
        .get_aggregate(&date_key)
        .await?
        .map(|model| DailyVisitSnapshot::try_from(&model))
        .transpose()?;

    Ok(ApiResponse::optional(snapshot))
}

pub async fn list_visits_handler(
    State(app_state): State<AppState>,
    Query(query): Query<VisitRangeQuery>,
) -> AppResult<ApiResponse<Vec<DailyVisitSnapshot>>> {
    let snapshots = app_state
        .visit_service
        .get_range(&query.start, &query.end)
        .await?
        .iter()
        .map(DailyVisitSnapshot::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let count = snapshots.len();
    Ok(ApiResponse::success(snapshots).with_count(count))
}

/// グラフ用の系列（window 指定か start/end 指定）
pub async fn visit_series_handler(
    State(app_state): State<AppState>,
    Query(query): Query<VisitSeriesQuery>,
) -> AppResult<ApiResponse<VisitSeries>> {
    let series = match (query.window, query.start, query.end) {
        (Some(window), None, None) => app_state.visit_service.get_window_series(window).await?,
        (None, Some(start), Some(end)) => {
            app_state
                .visit_service
                .get_daily_series(&start, &end)
                .await?
        }
        _ => {
            return Err(validation_error(
                "query",
                "either window or both start and end must be given",
            ))
        }
    };

    Ok(ApiResponse::success(series))
}

pub async fn purge_visits_handler(
    State(app_state): State<AppState>,
    payload: Option<Json<PurgeVisitsDto>>,
) -> AppResult<ApiResponse<PurgeReport>> {
    let Json(payload) = payload.unwrap_or_default();
    payload
        .validate()
        .map_err(|e| convert_validation_errors(e, "visit_handler::purge_visits"))?;

    let report = app_state
        .visit_service
        .purge_older_than(payload.retention_days)
        .await?;

    info!(
        cutoff = %report.cutoff,
        targeted = report.targeted,
        deleted = report.deleted,
        failed = report.failed_ids.len(),
        "Purge requested via API"
    );

    Ok(ApiResponse::success(report))
}

pub fn visit_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/visits",
            get(list_visits_handler).post(record_visit_handler),
        )
        .route("/visits/series", get(visit_series_handler))
        .route("/visits/purge", post(purge_visits_handler))
        .route("/visits/{date}", get(get_visit_handler))
        .with_state(app_state)
}
