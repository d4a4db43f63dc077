// carwash-backend/src/utils/transaction.rs

//! トランザクション管理の統一化
//!
//! リポジトリ層で一貫したトランザクション管理と、楽観的ロック競合時の
//! リトライを提供します。

use crate::error::AppError;
use rand::Rng;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::future::Future;
use tracing::{debug, error, instrument, warn};

// =============================================================================
// トランザクション管理トレイト
// =============================================================================

/// トランザクション実行を抽象化するトレイト
pub trait TransactionManager {
    /// トランザクション内で操作を実行
    #[allow(clippy::manual_async_fn)]
    fn execute_in_transaction<F, R>(
        &self,
        operation: F,
    ) -> impl std::future::Future<Output = Result<R, AppError>> + Send
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<R, AppError>>
            + Send
            + 'static,
        R: Send + 'static;
}

// Future型エイリアス（Boxed Future）
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// DatabaseConnection への実装
impl TransactionManager for DatabaseConnection {
    #[instrument(skip(self, operation), name = "database_transaction")]
    #[allow(clippy::manual_async_fn)]
    fn execute_in_transaction<F, R>(
        &self,
        operation: F,
    ) -> impl std::future::Future<Output = Result<R, AppError>> + Send
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<R, AppError>>
            + Send
            + 'static,
        R: Send + 'static,
    {
        async move {
            let transaction_start = std::time::Instant::now();

            debug!("Starting database transaction");

            let txn = self.begin().await.map_err(|e| {
                error!(error = %e, "Failed to begin transaction");
                AppError::InternalServerError("Failed to begin transaction".to_string())
            })?;

            let result = operation(&txn).await;

            match result {
                Ok(value) => {
                    txn.commit().await.map_err(|e| {
                        error!(error = %e, "Failed to commit transaction");
                        AppError::InternalServerError("Failed to commit transaction".to_string())
                    })?;

                    debug!(
                        duration_ms = transaction_start.elapsed().as_millis(),
                        "Transaction committed"
                    );

                    Ok(value)
                }
                Err(app_error) => {
                    debug!(error = %app_error, "Transaction operation failed, rolling back");

                    if let Err(rollback_error) = txn.rollback().await {
                        error!(
                            original_error = %app_error,
                            rollback_error = %rollback_error,
                            "Failed to rollback transaction"
                        );
                        return Err(AppError::InternalServerError(
                            "Transaction failed and rollback also failed".to_string(),
                        ));
                    }

                    debug!(
                        duration_ms = transaction_start.elapsed().as_millis(),
                        "Transaction rolled back"
                    );

                    Err(app_error)
                }
            }
        }
    }
}

/// トランザクション内での操作を簡単に記述するマクロ
#[macro_export]
macro_rules! with_transaction {
    ($db:expr, |$txn:ident| $body:expr) => {{
        use $crate::utils::transaction::TransactionManager;

        $db.execute_in_transaction(move |$txn| Box::pin($body))
            .await
    }};
}

// =============================================================================
// リトライ機能付きトランザクション
// =============================================================================

/// リトライ設定
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay_ms: 10,
            max_delay_ms: 1000,
        }
    }
}

impl RetryConfig {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }
}

/// リトライ機能付きトランザクション実行
///
/// 操作全体（読み取り・更新・書き込み）を毎回新しいトランザクションでやり直す。
/// 試行回数を使い切った競合は `AppError::Conflict` になる。
pub async fn execute_with_retry<F, R>(
    db: &DatabaseConnection,
    operation: F,
    config: &RetryConfig,
) -> Result<R, AppError>
where
    F: Clone
        + for<'c> Fn(&'c DatabaseTransaction) -> BoxFuture<'c, Result<R, AppError>>
        + Send
        + 'static,
    R: Send + 'static,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let result = db.execute_in_transaction(operation.clone()).await;

        match result {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempts = attempt, "Transaction succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => {
                if !should_retry(&e) {
                    return Err(e);
                }

                if attempt >= max_attempts {
                    error!(
                        attempts = attempt,
                        error = %e,
                        "Transaction failed after all retry attempts"
                    );
                    // 書き込み競合は最終的に Conflict として返す
                    return Err(match e {
                        AppError::Conflict(message) => AppError::Conflict(format!(
                            "{} (gave up after {} attempts)",
                            message, attempt
                        )),
                        AppError::DbErr(sea_orm::DbErr::Exec(err)) => AppError::Conflict(format!(
                            "Concurrent write failed: {} (gave up after {} attempts)",
                            err, attempt
                        )),
                        other => other,
                    });
                }

                let delay = apply_jitter(calculate_delay(attempt, config));
                warn!(
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = delay,
                    error = %e,
                    "Transaction failed, retrying"
                );

                tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
                attempt += 1;
            }
        }
    }
}

/// エラーがリトライ可能かどうかを判定
fn should_retry(error: &AppError) -> bool {
    match error {
        // 楽観的ロックの競合
        AppError::Conflict(_) => true,
        AppError::DbErr(db_err) => {
            match db_err {
                sea_orm::DbErr::Conn(_) => true, // 接続エラー
                sea_orm::DbErr::Exec(_) => true, // 実行エラー（デッドロック等）
                _ => false,
            }
        }
        _ => false,
    }
}

/// 指数バックオフでディレイを計算
fn calculate_delay(attempt: u32, config: &RetryConfig) -> u64 {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    let delay = config.base_delay_ms.saturating_mul(factor);
    delay.min(config.max_delay_ms)
}

/// ディレイの半分を固定、残り半分をランダムにする
fn apply_jitter(delay: u64) -> u64 {
    let half = delay / 2;
    half + rand::thread_rng().gen_range(0..=delay - half)
}

// =============================================================================
// テスト
// =============================================================================
