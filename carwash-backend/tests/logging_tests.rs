// tests/logging_tests.rs
use axum::http::StatusCode;
use carwash_backend::log_with_context;
use carwash_backend::logging::REQUEST_ID_HEADER;

#[tokio::test]
async fn test_structured_logging_macro() {
    // コンテキストなしのログ
    log_with_context!(tracing::Level::INFO, "Test message without context");

    // コンテキスト付きのログ
    let member_id = "B101";
    let date_key = "2026-10-19";

    log_with_context!(
        tracing::Level::INFO,
        "Test message with context",
        "member_id" => member_id,
        "date_key" => date_key,
        "operation" => "test"
    );

    log_with_context!(
        tracing::Level::ERROR,
        "Error occurred during test",
        "error" => "Test error",
        "member_id" => member_id
    );

    log_with_context!(
        tracing::Level::WARN,
        "Warning during test",
        "attempt" => 3
    );

    log_with_context!(
        tracing::Level::DEBUG,
        "Debug information",
        "counters" => vec![("subB", 1)]
    );
}

#[tokio::test]
async fn test_logging_middleware_integration() {
    use axum::{routing::get, Router};
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    let app = Router::new()
        .route("/test", get(|| async { "Test response" }))
        .route(
            "/error",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error") }),
        )
        .layer(axum::middleware::from_fn(
            carwash_backend::logging::logging_middleware,
        ))
        .layer(axum::middleware::from_fn(
            carwash_backend::logging::inject_request_context,
        ));

    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = TcpListener::bind(addr).await.unwrap();
    let actual_addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .unwrap();
    });

    let client = reqwest::Client::new();

    // 採番された request id が返る
    let response = client
        .get(format!("http://{}/test", actual_addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK.as_u16());
    let generated = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("request id header");
    assert!(uuid::Uuid::parse_str(&generated).is_ok());

    // 上流の request id はそのまま使う
    let response = client
        .get(format!("http://{}/error", actual_addr))
        .header(REQUEST_ID_HEADER, "upstream-123")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.status(),
        StatusCode::INTERNAL_SERVER_ERROR.as_u16()
    );
    assert_eq!(
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
        Some("upstream-123")
    );
}
