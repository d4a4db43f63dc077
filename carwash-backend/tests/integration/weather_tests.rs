// tests/integration/weather_tests.rs
use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
use carwash_backend::config::{VisitConfig, WeatherConfig};
use carwash_backend::error::AppError;
use carwash_backend::service::visit_service::VisitService;
use carwash_backend::service::weather_service::{WeatherClient, WeatherService, WeatherSeverity};
use carwash_backend::types::DateKey;
use crate::common::db::TestDatabase;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

type SeenQuery = Arc<Mutex<Option<HashMap<String, String>>>>;

/// 指定したルーターでモックサーバーを起動し、ベースURLを返す
async fn spawn_mock(app: Router) -> String {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = TcpListener::bind(addr).await.unwrap();
    let actual_addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    format!("http://{}/v1/forecast", actual_addr)
}

fn weather_config(api_url: String) -> WeatherConfig {
    WeatherConfig {
        api_url,
        ..WeatherConfig::default()
    }
}

/// 今日を挟んだ4日分（過去3日 + 予報1日）
fn forecast_payload(today: DateKey) -> Value {
    forecast_payload_at_offset(today, 0)
}

fn forecast_payload_at_offset(today: DateKey, utc_offset_seconds: i32) -> Value {
    let dates: Vec<String> = [-2, -1, 0, 1]
        .iter()
        .map(|offset: &i64| {
            if *offset < 0 {
                today.days_before(-offset).as_string()
            } else {
                today.days_after(*offset).as_string()
            }
        })
        .collect();

    json!({
        "latitude": 46.08,
        "longitude": -118.31,
        "utc_offset_seconds": utc_offset_seconds,
        "daily": {
            "time": dates,
            "weather_code": [0, 61, 2, 95],
            "temperature_2m_max": [78.1, 55.0, 70.2, 66.0],
            "temperature_2m_min": [50.0, 44.3, 48.9, 51.0],
            "precipitation_sum": [0.0, 0.35, 0.0, 1.1]
        }
    })
}

#[tokio::test]
async fn test_client_sends_expected_query() {
    crate::common::init_test_env();
    let seen: SeenQuery = Arc::new(Mutex::new(None));
    let today = DateKey::today();

    let recorder = seen.clone();
    let app = Router::new().route(
        "/v1/forecast",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let recorder = recorder.clone();
            async move {
                *recorder.lock().unwrap() = Some(params);
                Json(forecast_payload(today))
            }
        }),
    );
    let url = spawn_mock(app).await;

    let client = WeatherClient::new(weather_config(url)).unwrap();
    let forecast = client.fetch_daily_forecast().await.unwrap();
    assert_eq!(forecast.daily.time.len(), 4);
    assert_eq!(forecast.daily.weather_code[1], Some(61));
    assert_eq!(forecast.utc_offset_seconds, 0);

    let params = seen.lock().unwrap().clone().expect("mock was called");
    assert_eq!(params["latitude"], "46.08");
    assert_eq!(params["longitude"], "-118.31");
    assert_eq!(params["timezone"], "America/Los_Angeles");
    assert_eq!(params["temperature_unit"], "fahrenheit");
    assert_eq!(params["past_days"], "30");
    assert_eq!(params["forecast_days"], "7");
    assert_eq!(
        params["daily"],
        "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum"
    );
}

#[tokio::test]
async fn test_non_success_status_maps_to_external_error() {
    crate::common::init_test_env();
    let app = Router::new().route(
        "/v1/forecast",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
    );
    let url = spawn_mock(app).await;

    let client = WeatherClient::new(weather_config(url)).unwrap();
    match client.fetch_daily_forecast().await {
        Err(AppError::ExternalServiceError(message)) => {
            assert_eq!(message, "Open-Meteo API error 500: upstream exploded")
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_daily_block_is_rejected() {
    crate::common::init_test_env();
    let app = Router::new().route(
        "/v1/forecast",
        get(|| async { Json(json!({ "latitude": 46.08 })) }),
    );
    let url = spawn_mock(app).await;

    let client = WeatherClient::new(weather_config(url)).unwrap();
    match client.fetch_daily_forecast().await {
        Err(AppError::ExternalServiceError(message)) => {
            assert_eq!(message, "Invalid weather data received from API")
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_feed_is_external_error() {
    crate::common::init_test_env();
    // 使われていないポートを確保してすぐ閉じる
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = WeatherClient::new(weather_config(format!("http://{}/v1/forecast", addr))).unwrap();
    assert!(matches!(
        client.fetch_daily_forecast().await,
        Err(AppError::ExternalServiceError(_))
    ));
}

#[tokio::test]
async fn test_weather_report_joins_visits() {
    let db = TestDatabase::new().await;
    let visits = Arc::new(VisitService::new(
        db.connection.clone(),
        VisitConfig::default(),
    ));
    let today = DateKey::today();

    // 2日前（晴れ）に4件、昨日（雨）に1件、今日は0件
    for _ in 0..4 {
        visits
            .record_visit_on(today.days_before(2), None, None)
            .await
            .unwrap();
    }
    visits
        .record_visit_on(today.days_before(1), None, None)
        .await
        .unwrap();

    let app = Router::new().route(
        "/v1/forecast",
        get(move || async move { Json(forecast_payload(today)) }),
    );
    let url = spawn_mock(app).await;

    let service = WeatherService::new(WeatherClient::new(weather_config(url)).unwrap(), visits);
    let report = service.weather_report().await.unwrap();

    assert_eq!(report.historical.len(), 3);
    assert_eq!(report.forecast.len(), 1);
    assert_eq!(report.forecast[0].weather_label, "Thunderstorm");
    assert_eq!(report.forecast[0].visits, None);

    let visit_counts: Vec<Option<i64>> = report.historical.iter().map(|d| d.visits).collect();
    assert_eq!(visit_counts, vec![Some(4), Some(1), Some(0)]);
    assert_eq!(report.historical[1].weather_severity, WeatherSeverity::Poor);

    // good: 4 と 0 -> 2 / poor: 1
    assert_eq!(report.stats.avg_visits_good_weather, 2);
    assert_eq!(report.stats.avg_visits_poor_weather, 1);
    assert_eq!(report.stats.total_days, 3);
    assert_eq!(report.stats.good_weather_days, 2);
    assert_eq!(report.stats.poor_weather_days, 1);
}

#[tokio::test]
async fn test_report_splits_on_feed_local_date() {
    let db = TestDatabase::new().await;
    let visits = Arc::new(VisitService::new(
        db.connection.clone(),
        VisitConfig::default(),
    ));

    // UTC-12 では UTC の日付より前日になる時間帯がある
    const OFFSET: i32 = -12 * 3600;
    let local_today = DateKey::today_at_offset(OFFSET);

    let app = Router::new().route(
        "/v1/forecast",
        get(move || async move { Json(forecast_payload_at_offset(local_today, OFFSET)) }),
    );
    let url = spawn_mock(app).await;

    let service = WeatherService::new(WeatherClient::new(weather_config(url)).unwrap(), visits);
    let report = service.weather_report().await.unwrap();

    // ローカルの今日までが過去、翌日が予報
    assert_eq!(report.historical.len(), 3);
    assert_eq!(
        report.historical.last().map(|d| d.date.clone()),
        Some(local_today.as_string())
    );
    assert_eq!(report.forecast.len(), 1);
    assert_eq!(report.forecast[0].date, local_today.days_after(1).as_string());
}
