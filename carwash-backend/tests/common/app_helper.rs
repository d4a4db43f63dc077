// tests/common/app_helper.rs

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use carwash_backend::{
    api::{app_router, AppState},
    config::AppConfig,
    service::weather_service::WeatherClient,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::common::db::TestDatabase;

/// テスト用アプリ（天気APIは既定の URL のまま）
pub async fn setup_app() -> (Router, AppState, TestDatabase) {
    setup_app_with_config(AppConfig::for_testing()).await
}

pub async fn setup_app_with_config(app_config: AppConfig) -> (Router, AppState, TestDatabase) {
    let db = TestDatabase::new().await;
    let weather_client =
        WeatherClient::new(app_config.weather.clone()).expect("build weather client");
    let app_state =
        AppState::with_weather_client(db.connection.clone(), &app_config, weather_client);
    let app = app_router(app_state.clone());
    (app, app_state, db)
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// リクエストを送り、ステータスと JSON ボディを返す
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
