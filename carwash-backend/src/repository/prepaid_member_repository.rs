// carwash-backend/src/repository/prepaid_member_repository.rs
use crate::domain::member::MemberKind;
use crate::domain::prepaid_member_model::{
    self, ActiveModel as PrepaidActiveModel, Entity as PrepaidEntity, PrepaidMemberChanges,
};
use crate::error::AppResult;
use crate::repository::{FieldErrors, MemberStore};
use crate::utils::error_helper::{member_not_found, validation_error};
use crate::utils::validation::{validate_service_letter, PREPAID_ID_REGEX};
use crate::with_transaction;
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseTransaction, DbConn, EntityTrait, QueryFilter, QueryOrder, Set,
};

pub struct PrepaidMemberRepository {
    db: DbConn,
}

impl PrepaidMemberRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub fn validate(record: &prepaid_member_model::Model) -> AppResult<()> {
        let mut errors = FieldErrors::default();
        if !PREPAID_ID_REGEX.is_match(&record.id) {
            errors.push(
                "id",
                format!(
                    "'{}' is not a valid prepaid ID (expected tier letter B/D/U, B and 3-5 digits)",
                    record.id
                ),
            );
        }
        errors.check_not_blank("name", &record.name);
        if validate_service_letter(&record.wash_type).is_err() {
            errors.push("wash_type", "must be one of B, D, U");
        }
        errors.check_non_negative("prepaid_washes", record.prepaid_washes);
        errors.check_email("email", record.email.as_deref());
        errors.into_result()
    }

    fn validate_changes(changes: &PrepaidMemberChanges) -> AppResult<()> {
        if changes.is_empty() {
            return Err(validation_error("changes", "no fields to update"));
        }
        let mut errors = FieldErrors::default();
        if let Some(name) = &changes.name {
            errors.check_not_blank("name", name);
        }
        if let Some(wash_type) = &changes.wash_type {
            if validate_service_letter(wash_type).is_err() {
                errors.push("wash_type", "must be one of B, D, U");
            }
        }
        if let Some(prepaid_washes) = changes.prepaid_washes {
            errors.check_non_negative("prepaid_washes", prepaid_washes);
        }
        if let Some(email) = &changes.email {
            errors.check_email("email", email.as_deref());
        }
        errors.into_result()
    }

    fn to_active_model(record: &prepaid_member_model::Model) -> PrepaidActiveModel {
        PrepaidActiveModel {
            id: Set(record.id.clone()),
            name: Set(record.name.clone()),
            wash_type: Set(record.wash_type.clone()),
            issue_date: Set(record.issue_date),
            last_visit_date: Set(record.last_visit_date),
            prepaid_washes: Set(record.prepaid_washes),
            notes: Set(record.notes.clone()),
            email: Set(record.email.clone()),
        }
    }

    /// 指定されたカラムだけを UPDATE する。読み込んだ行を書き戻さないので
    /// 同時に別フィールドを更新しても互いの変更を消さない
    async fn update_in_txn(
        txn: &DatabaseTransaction,
        id: String,
        changes: PrepaidMemberChanges,
    ) -> AppResult<String> {
        let result = PrepaidEntity::update_many()
            .set(changes.to_active_model())
            .filter(prepaid_member_model::Column::Id.eq(id.as_str()))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(member_not_found(
                MemberKind::Prepaid,
                &id,
                "PrepaidMemberRepository::update",
            ));
        }
        Ok(id)
    }

    async fn delete_in_txn(txn: &DatabaseTransaction, id: String) -> AppResult<String> {
        if PrepaidEntity::find_by_id(id.clone()).one(txn).await?.is_none() {
            return Err(member_not_found(
                MemberKind::Prepaid,
                &id,
                "PrepaidMemberRepository::delete",
            ));
        }
        PrepaidEntity::delete_by_id(id.clone()).exec(txn).await?;
        Ok(id)
    }
}

#[async_trait]
impl MemberStore for PrepaidMemberRepository {
    type Record = prepaid_member_model::Model;
    type Changes = PrepaidMemberChanges;

    fn kind(&self) -> MemberKind {
        MemberKind::Prepaid
    }

    fn record_id(record: &Self::Record) -> &str {
        &record.id
    }

    fn apply_changes(record: &mut Self::Record, changes: &Self::Changes) {
        changes.apply(record);
    }

    async fn create(&self, record: Self::Record) -> AppResult<String> {
        Self::validate(&record)?;

        PrepaidEntity::insert(Self::to_active_model(&record))
            .on_conflict(
                OnConflict::column(prepaid_member_model::Column::Id)
                    .update_columns([
                        prepaid_member_model::Column::Name,
                        prepaid_member_model::Column::WashType,
                        prepaid_member_model::Column::IssueDate,
                        prepaid_member_model::Column::LastVisitDate,
                        prepaid_member_model::Column::PrepaidWashes,
                        prepaid_member_model::Column::Notes,
                        prepaid_member_model::Column::Email,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        tracing::debug!(member_id = %record.id, "Prepaid member saved");
        Ok(record.id)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Self::Record>> {
        Ok(PrepaidEntity::find_by_id(id.to_string()).one(&self.db).await?)
    }

    async fn find_all(&self) -> AppResult<Vec<Self::Record>> {
        Ok(PrepaidEntity::find()
            .order_by_asc(prepaid_member_model::Column::Id)
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
