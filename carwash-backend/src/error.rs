// src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Multiple validation errors")]
    ValidationErrors(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl AppError {
    fn simple(status: StatusCode, message: String, error_type: &str) -> (StatusCode, ErrorResponse) {
        (
            status,
            ErrorResponse {
                success: false,
                error: message.clone(),
                message,
                details: None,
                validation_errors: None,
                errors: None,
                error_type: error_type.to_string(),
            },
        )
    }
}

// axum でエラーをHTTPレスポンスに変換するための実装
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::DbErr(db_err) => {
                // サーバーログには詳細を出す
                tracing::error!(error = ?db_err, "Database error");

                let status = match db_err {
                    sea_orm::DbErr::RecordNotFound(_) => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };

                let (message, details) = match &db_err {
                    sea_orm::DbErr::RecordNotFound(entity) => (
                        "The requested resource was not found".to_string(),
                        Some(json!({ "entity": entity })),
                    ),
                    sea_orm::DbErr::Exec(_msg) => (
                        "A database operation failed".to_string(),
                        Some(json!({ "operation": "exec", "hint": "Check database connection" })),
                    ),
                    sea_orm::DbErr::Query(_msg) => (
                        "A database query failed".to_string(),
                        Some(json!({ "operation": "query", "hint": "Check query syntax" })),
                    ),
                    _ => ("A database error occurred".to_string(), None),
                };

                (
                    status,
                    ErrorResponse {
                        success: false,
                        error: message.clone(),
                        message,
                        details,
                        validation_errors: None,
                        errors: None,
                        error_type: "database_error".to_string(),
                    },
                )
            }
            AppError::NotFound(message) => {
                Self::simple(StatusCode::NOT_FOUND, message, "not_found")
            }
            AppError::ValidationError(message) => {
                Self::simple(StatusCode::BAD_REQUEST, message, "validation_error")
            }
            AppError::ValidationErrors(errors) => {
                let mut field_errors = HashMap::new();
                for error in &errors {
                    if let Some((field, message)) = error.split_once(": ") {
                        field_errors
                            .entry(field.to_string())
                            .or_insert_with(Vec::new)
                            .push(message.to_string());
                    }
                }
                let errors_array: Vec<serde_json::Value> =
                    errors.iter().map(|e| json!({"message": e})).collect();
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        success: false,
                        error: "Validation failed".to_string(),
                        message: "Validation failed".to_string(),
                        details: None,
                        validation_errors: Some(field_errors),
                        errors: Some(errors_array),
                        error_type: "validation_errors".to_string(),
                    },
                )
            }
            AppError::Conflict(message) => Self::simple(StatusCode::CONFLICT, message, "conflict"),
            AppError::InternalServerError(message) => {
                tracing::error!(error = %message, "Internal server error");
                Self::simple(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                    "internal_server_error",
                )
            }
            AppError::ExternalServiceError(message) => {
                tracing::error!(error = %message, "External service error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse {
                        success: false,
                        error: "External service error".to_string(),
                        message,
                        details: None,
                        validation_errors: None,
                        errors: None,
                        error_type: "external_service_error".to_string(),
                    },
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 統一的なエラーレスポンス構造
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<HashMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<serde_json::Value>>,
    pub error_type: String,
}
