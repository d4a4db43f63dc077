// carwash-backend/src/repository/mod.rs
pub mod daily_visit_repository;
pub mod loyalty_member_repository;
pub mod member_repository;
pub mod prepaid_member_repository;

use crate::domain::member::MemberKind;
use crate::error::AppResult;
use async_trait::async_trait;

/// 会員リポジトリ共通の操作（3種類の会員で同じ形）
#[async_trait]
pub trait MemberStore: Send + Sync + 'static {
    type Record: Clone + Send + Sync + 'static;
    type Changes: Clone + Send + Sync + 'static;

    fn kind(&self) -> MemberKind;

    fn record_id(record: &Self::Record) -> &str;

    /// キャッシュ側で部分更新を反映するため
    fn apply_changes(record: &mut Self::Record, changes: &Self::Changes);

    /// IDに対して全項目を書き込む（既存なら上書き）
    async fn create(&self, record: Self::Record) -> AppResult<String>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Self::Record>>;

    async fn find_all(&self) -> AppResult<Vec<Self::Record>>;

    async fn update(&self, id: &str, changes: Self::Changes) -> AppResult<String>;

    async fn delete(&self, id: &str) -> AppResult<String>;
}

/// "field: message" 形式のエラーを集める
#[derive(Debug, Default)]
pub(crate) struct FieldErrors(Vec<String>);

impl FieldErrors {
    pub(crate) fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(format!("{}: {}", field, message.into()));
    }

    pub(crate) fn check_not_blank(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "must not be blank");
        }
    }

    pub(crate) fn check_email(&mut self, field: &str, value: Option<&str>) {
        if let Some(email) = value {
            if !email.is_empty() && !crate::utils::validation::is_valid_email(email) {
                self.push(field, "must be a valid email address");
            }
        }
    }

    pub(crate) fn check_non_negative(&mut self, field: &str, value: i32) {
        if value < 0 {
            self.push(field, "must not be negative");
        }
    }

    pub(crate) fn into_result(self) -> AppResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            tracing::warn!(errors = ?self.0, "Member validation failed");
            Err(crate::error::AppError::ValidationErrors(self.0))
        }
    }
}
