// carwash-backend/src/utils/error_helper.rs

//! エラーハンドリングの統一化ヘルパー
//!
//! リポジトリ層・サービス層・ハンドラー層で共通して使用するエラー処理パターン。

use crate::domain::member::MemberKind;
use crate::error::AppError;
use tracing::{error, warn};
use validator::ValidationErrors;

/// validatorのValidationErrorsをAppErrorに変換する統一処理
pub fn convert_validation_errors(validation_errors: ValidationErrors, context: &str) -> AppError {
    warn!(
        context = %context,
        error_count = validation_errors.field_errors().len(),
        "Validation failed"
    );

    let mut errors: Vec<String> = validation_errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| "Invalid value".to_string(), |cow| cow.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    errors.sort();

    AppError::ValidationErrors(errors)
}

/// 単一のバリデーションエラーメッセージを生成
pub fn validation_error(field: &str, message: &str) -> AppError {
    AppError::ValidationError(format!("{}: {}", field, message))
}

/// 内部サーバーエラーをログ付きで生成
pub fn internal_server_error<E: std::fmt::Display>(
    error: E,
    context: &str,
    user_message: &str,
) -> AppError {
    error!(
        error = %error,
        context = %context,
        "Internal server error occurred"
    );
    AppError::InternalServerError(user_message.to_string())
}

/// 存在しない会員IDへの操作
pub fn member_not_found(kind: MemberKind, id: &str, context: &str) -> AppError {
    warn!(
        context = %context,
        kind = %kind,
        member_id = %id,
        "Member not found"
    );
    AppError::NotFound(kind.not_found_message(id))
}

/// 競合エラーをログ付きで生成
pub fn conflict_error(message: &str, context: &str) -> AppError {
    warn!(
        context = %context,
        message = %message,
        "Resource conflict occurred"
    );
    AppError::Conflict(message.to_string())
}

/// 外部サービスのエラー
pub fn external_service_error<E: std::fmt::Display>(error: E, context: &str) -> AppError {
    error!(
        error = %error,
        context = %context,
        "External service call failed"
    );
    AppError::ExternalServiceError(error.to_string())
}
