// tests/integration/api_tests.rs
use axum::http::{Method, StatusCode};
use carwash_backend::types::DateKey;
use crate::common::app_helper::{empty_request, json_request, send, setup_app};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_check() {
    let (app, _state, _db) = setup_app().await;

    let (status, body) = send(&app, empty_request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], true);
    assert_eq!(body["data"]["environment"], "test");
}

#[tokio::test]
async fn test_request_id_header_is_returned() {
    let (app, _state, _db) = setup_app().await;

    let res = app
        .clone()
        .oneshot(empty_request(Method::GET, "/health"))
        .await
        .unwrap();
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_member_crud_over_http() {
    let (app, _state, _db) = setup_app().await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/members",
            json!({ "id": "b101", "name": "Alice", "car": "Blue Civic", "email": "alice@example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], "B101");

    let (status, body) = send(&app, empty_request(Method::GET, "/members/B101")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Alice");
    assert_eq!(body["data"]["is_active"], true);

    let (status, _) = send(
        &app,
        json_request(Method::PATCH, "/members/B101", json!({ "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, empty_request(Method::GET, "/members")).await;
    assert_eq!(body["meta"]["count"], 1);
    assert_eq!(body["data"][0]["is_active"], false);

    let (status, body) = send(
        &app,
        json_request(Method::PATCH, "/members/B999", json!({ "name": "Ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        "Subscription member with ID B999 does not exist"
    );

    let (status, _) = send(&app, empty_request(Method::DELETE, "/members/B101")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, empty_request(Method::GET, "/members/B101")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_member_validation_errors() {
    let (app, _state, _db) = setup_app().await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/loyalty-members",
            json!({ "id": "L1001", "name": "  ", "email": "nope" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/prepaid-members",
            json!({ "id": "XB100", "name": "Bad Prefix", "prepaid_washes": 3 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request(Method::PATCH, "/members/B101", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_visit_endpoints() {
    let (app, _state, _db) = setup_app().await;
    let today = DateKey::today().as_string();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/visits",
            json!({ "category": "subscription", "service_type": "B" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["counters"]["subB"], 1);
    assert_eq!(body["data"]["counters"]["cash"], 0);

    // ボディなしは件数だけ加算
    let (status, body) = send(&app, empty_request(Method::POST, "/visits")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 2);

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/visits", json!({ "category": "bogus" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, empty_request(Method::GET, &format!("/visits/{}", today))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 2);

    // 記録のない日は data: null
    let (status, body) = send(&app, empty_request(Method::GET, "/visits/2001-01-01")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"].is_null());

    let (status, _) = send(&app, empty_request(Method::GET, "/visits/not-a-date")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        empty_request(
            Method::GET,
            &format!("/visits?start=2001-01-01&end={}", today),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 1);
    assert_eq!(body["data"][0]["date_key"], today.as_str());
}

#[tokio::test]
async fn test_visit_series_endpoint() {
    let (app, _state, _db) = setup_app().await;
    send(&app, empty_request(Method::POST, "/visits")).await;

    let (status, body) = send(&app, empty_request(Method::GET, "/visits/series?window=weekly")).await;
    assert_eq!(status, StatusCode::OK);
    let points = body["data"]["points"].as_array().unwrap();
    assert_eq!(points.len(), 8);
    assert_eq!(points[7]["count"], 1);
    assert_eq!(body["data"]["stats"]["total"], 1);

    let (status, body) = send(
        &app,
        empty_request(Method::GET, "/visits/series?start=2025-01-01&end=2025-01-31"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["points"].as_array().unwrap().len(), 31);

    let (status, _) = send(&app, empty_request(Method::GET, "/visits/series")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_purge_endpoint() {
    let (app, state, _db) = setup_app().await;
    let old = DateKey::today().days_before(400);
    state
        .visit_service
        .record_visit_on(old, None, None)
        .await
        .unwrap();
    send(&app, empty_request(Method::POST, "/visits")).await;

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/visits/purge", json!({ "retention_days": 365 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["targeted"], 1);
    assert_eq!(body["data"]["deleted"], 1);
    assert_eq!(body["data"]["failed_ids"], json!([]));

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/visits/purge", json!({ "retention_days": -5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_kiosk_and_stats_endpoints() {
    let (app, _state, _db) = setup_app().await;

    send(
        &app,
        json_request(
            Method::POST,
            "/loyalty-members",
            json!({ "id": "L2001", "name": "Grace", "visit_count": 8 }),
        ),
    )
    .await;
    send(
        &app,
        json_request(
            Method::POST,
            "/prepaid-members",
            json!({ "id": "DB3001", "name": "Heidi", "prepaid_washes": 1 }),
        ),
    )
    .await;

    let (status, body) = send(&app, empty_request(Method::GET, "/kiosk/lookup/l2001")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["type"], "loyalty");
    assert_eq!(body["data"]["id"], "L2001");

    let (status, body) = send(&app, empty_request(Method::GET, "/kiosk/lookup/U999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No member found with ID: U999");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/kiosk/visit",
            json!({ "code": "L2001", "service_type": "D" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["free_wash"], false);
    assert_eq!(body["data"]["member"]["visit_count"], 9);

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/kiosk/visit", json!({ "code": "DB3001" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["member"]["prepaid_washes"], 0);
    assert_eq!(body["data"]["visit"]["counters"]["preD"], 1);

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/kiosk/visit", json!({ "code": "DB3001" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/kiosk/cash", json!({ "service_type": "U" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 3);

    let (status, body) = send(&app, empty_request(Method::GET, "/stats/members")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["loyalty"]["total"], 1);
    assert_eq!(body["data"]["loyalty"]["highest_visits"], 9);
    assert_eq!(body["data"]["loyalty"]["near_free_wash"], 1);
    assert_eq!(body["data"]["prepaid"]["no_washes_left"], 1);
    assert_eq!(body["data"]["subscription"]["total"], 0);
}

#[tokio::test]
async fn test_cache_endpoints() {
    let (app, _state, _db) = setup_app().await;

    let (status, body) = send(&app, empty_request(Method::POST, "/cache/refresh")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["subscription"]["initialized"], true);
    assert_eq!(body["data"]["loyalty"]["initialized"], true);

    let (status, body) = send(&app, empty_request(Method::POST, "/cache/reset")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["subscription"]["initialized"], false);

    let (status, body) = send(&app, empty_request(Method::GET, "/cache/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["prepaid"]["count"], 0);
}
