// carwash-backend/src/repository/loyalty_member_repository.rs
use crate::domain::loyalty_member_model::{
    self, ActiveModel as LoyaltyActiveModel, Entity as LoyaltyEntity, LoyaltyMemberChanges,
};
use crate::domain::member::MemberKind;
use crate::error::AppResult;
use crate::repository::{FieldErrors, MemberStore};
use crate::utils::error_helper::{member_not_found, validation_error};
use crate::utils::validation::LOYALTY_ID_REGEX;
use crate::with_transaction;
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseTransaction, DbConn, EntityTrait, QueryFilter, QueryOrder, Set,
};

pub struct LoyaltyMemberRepository {
    db: DbConn,
}

impl LoyaltyMemberRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub fn validate(record: &loyalty_member_model::Model) -> AppResult<()> {
        let mut errors = FieldErrors::default();
        if !LOYALTY_ID_REGEX.is_match(&record.id) {
            errors.push(
                "id",
                format!(
                    "'{}' is not a valid loyalty ID (expected L and 3-5 digits)",
                    record.id
                ),
            );
        }
        errors.check_not_blank("name", &record.name);
        errors.check_non_negative("visit_count", record.visit_count);
        errors.check_email("email", record.email.as_deref());
        errors.into_result()
    }

    fn validate_changes(changes: &LoyaltyMemberChanges) -> AppResult<()> {
        if changes.is_empty() {
            return Err(validation_error("changes", "no fields to update"));
        }
        let mut errors = FieldErrors::default();
        if let Some(name) = &changes.name {
            errors.check_not_blank("name", name);
        }
        if let Some(visit_count) = changes.visit_count {
            errors.check_non_negative("visit_count", visit_count);
        }
        if let Some(email) = &changes.email {
            errors.check_email("email", email.as_deref());
        }
        errors.into_result()
    }

    fn to_active_model(record: &loyalty_member_model::Model) -> LoyaltyActiveModel {
        LoyaltyActiveModel {
            id: Set(record.id.clone()),
            name: Set(record.name.clone()),
            issue_date: Set(record.issue_date),
            last_visit_date: Set(record.last_visit_date),
            visit_count: Set(record.visit_count),
            notes: Set(record.notes.clone()),
            email: Set(record.email.clone()),
        }
    }

    /// 指定されたカラムだけを UPDATE する。読み込んだ行を書き戻さないので
    /// 同時に別フィールドを更新しても互いの変更を消さない
    async fn update_in_txn(
        txn: &DatabaseTransaction,
        id: String,
        changes: LoyaltyMemberChanges,
    ) -> AppResult<String> {
        let result = LoyaltyEntity::update_many()
            .set(changes.to_active_model())
            .filter(loyalty_member_model::Column::Id.eq(id.as_str()))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(member_not_found(
                MemberKind::Loyalty,
                &id,
                "LoyaltyMemberRepository::update",
            ));
        }
        Ok(id)
    }

    async fn delete_in_txn(txn: &DatabaseTransaction, id: String) -> AppResult<String> {
        if LoyaltyEntity::find_by_id(id.clone()).one(txn).await?.is_none() {
            return Err(member_not_found(
                MemberKind::Loyalty,
                &id,
                "LoyaltyMemberRepository::delete",
            ));
        }
        LoyaltyEntity::delete_by_id(id.clone()).exec(txn).await?;
        Ok(id)
    }
}

#[async_trait]
impl MemberStore for LoyaltyMemberRepository {
    type Record = loyalty_member_model::Model;
    type Changes = LoyaltyMemberChanges;

    fn kind(&self) -> MemberKind {
        MemberKind::Loyalty
    }

    fn record_id(record: &Self::Record) -> &str {
        &record.id
    }

    fn apply_changes(record: &mut Self::Record, changes: &Self::Changes) {
        changes.apply(record);
    }

    async fn create(&self, record: Self::Record) -> AppResult<String> {
        Self::validate(&record)?;

        LoyaltyEntity::insert(Self::to_active_model(&record))
            .on_conflict(
                OnConflict::column(loyalty_member_model::Column::Id)
                    .update_columns([
                        loyalty_member_model::Column::Name,
                        loyalty_member_model::Column::IssueDate,
                        loyalty_member_model::Column::LastVisitDate,
                        loyalty_member_model::Column::VisitCount,
                        loyalty_member_model::Column::Notes,
                        loyalty_member_model::Column::Email,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        tracing::debug!(member_id = %record.id, "Loyalty member saved");
        Ok(record.id)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Self::Record>> {
        Ok(LoyaltyEntity::find_by_id(id.to_string()).one(&self.db).await?)
    }

    async fn find_all(&self) -> AppResult<Vec<Self::Record>> {
        Ok(LoyaltyEntity::find()
            .order_by_asc(loyalty_member_model::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn update(&self, id: &str, changes: Self::Changes) -> AppResult<String> {
        Self::validate_changes(&changes)?;
        let id = id.to_string();
        with_transaction!(self.db, |txn| Self::update_in_txn(txn, id, changes))
    }

    async fn delete(&self, id: &str) -> AppResult<String> {
        let id = id.to_string();
        with_transaction!(self.db, |txn| Self::delete_in_txn(txn, id))
    }
}
