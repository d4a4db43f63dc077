// carwash-backend/src/api/mod.rs
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::logging::{inject_request_context, logging_middleware};
use crate::service::{
    kiosk_service::KioskService,
    member_cache_service::MemberCache,
    stats_service::StatsService,
    visit_service::VisitService,
    weather_service::{WeatherClient, WeatherService},
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod dto;
pub mod handlers;

/// 統一されたアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub member_cache: Arc<MemberCache>,
    pub visit_service: Arc<VisitService>,
    pub kiosk_service: Arc<KioskService>,
    pub stats_service: Arc<StatsService>,
    pub weather_service: Arc<WeatherService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// DB 接続と設定から全サービスを組み立てる
    pub fn new(db_pool: DbPool, app_config: &AppConfig) -> AppResult<Self> {
        let weather_client = WeatherClient::new(app_config.weather.clone())?;
        Ok(Self::with_weather_client(db_pool, app_config, weather_client))
    }

    pub fn with_weather_client(
        db_pool: DbPool,
        app_config: &AppConfig,
        weather_client: WeatherClient,
    ) -> Self {
        let member_cache = Arc::new(MemberCache::new(db_pool.clone()));
        let visit_service = Arc::new(VisitService::new(
            db_pool.clone(),
            app_config.visit.clone(),
        ));

        Self {
            db: Arc::new(db_pool),
            kiosk_service: Arc::new(KioskService::new(
                member_cache.clone(),
                visit_service.clone(),
            )),
            stats_service: Arc::new(StatsService::new(member_cache.clone())),
            weather_service: Arc::new(WeatherService::new(
                weather_client,
                visit_service.clone(),
            )),
            member_cache,
            visit_service,
            config: Arc::new(app_config.clone()),
        }
    }
}

/// CORS 設定（許可オリジンが空なら同一オリジンのみ）
pub fn cors_layer(app_config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = app_config
        .cors_allowed_origins
        .iter()
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// 全ルートとミドルウェアをまとめたルーター
pub fn app_router(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config);

    Router::new()
        .merge(handlers::system_handler::system_router(app_state.clone()))
        .merge(handlers::member_handler::member_router(app_state.clone()))
        .merge(handlers::visit_handler::visit_router(app_state.clone()))
        .merge(handlers::kiosk_handler::kiosk_router(app_state.clone()))
        .merge(handlers::stats_handler::stats_router(app_state.clone()))
        .merge(handlers::cache_handler::cache_router(app_state))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(inject_request_context))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
