// carwash-backend/src/repository/member_repository.rs
use crate::domain::member::MemberKind;
use crate::domain::member_model::{
    self, ActiveModel as MemberActiveModel, Entity as MemberEntity, MemberChanges,
};
use crate::error::AppResult;
use crate::repository::{FieldErrors, MemberStore};
use crate::utils::error_helper::{member_not_found, validation_error};
use crate::utils::validation::SUBSCRIPTION_ID_REGEX;
use crate::with_transaction;
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseTransaction, DbConn, EntityTrait, QueryFilter, QueryOrder, Set,
};

pub struct MemberRepository {
    db: DbConn,
}

impl MemberRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub fn validate(record: &member_model::Model) -> AppResult<()> {
        let mut errors = FieldErrors::default();
        if !SUBSCRIPTION_ID_REGEX.is_match(&record.id) {
            errors.push(
                "id",
                format!(
                    "'{}' is not a valid subscription ID (expected tier letter B/D/U and 3 digits)",
                    record.id
                ),
            );
        }
        errors.check_not_blank("name", &record.name);
        errors.check_email("email", record.email.as_deref());
        errors.into_result()
    }

    fn validate_changes(changes: &MemberChanges) -> AppResult<()> {
        if changes.is_empty() {
            return Err(validation_error("changes", "no fields to update"));
        }
        let mut errors = FieldErrors::default();
        if let Some(name) = &changes.name {
            errors.check_not_blank("name", name);
        }
        if let Some(email) = &changes.email {
            errors.check_email("email", email.as_deref());
        }
        errors.into_result()
    }

    fn to_active_model(record: &member_model::Model) -> MemberActiveModel {
        MemberActiveModel {
            id: Set(record.id.clone()),
            name: Set(record.name.clone()),
            car: Set(record.car.clone()),
            is_active: Set(record.is_active),
            valid_payment: Set(record.valid_payment),
            notes: Set(record.notes.clone()),
            email: Set(record.email.clone()),
        }
    }

    /// 指定されたカラムだけを UPDATE する。読み込んだ行を書き戻さないので
    /// 同時に別フィールドを更新しても互いの変更を消さない
    async fn update_in_txn(
        txn: &DatabaseTransaction,
        id: String,
        changes: MemberChanges,
    ) -> AppResult<String> {
        let result = MemberEntity::update_many()
            .set(changes.to_active_model())
            .filter(member_model::Column::Id.eq(id.as_str()))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(member_not_found(
                MemberKind::Subscription,
                &id,
                "MemberRepository::update",
            ));
        }
        Ok(id)
    }

    async fn delete_in_txn(txn: &DatabaseTransaction, id: String) -> AppResult<String> {
        let exists = MemberEntity::find_by_id(id.clone()).one(txn).await?;
        if exists.is_none() {
            return Err(member_not_found(
                MemberKind::Subscription,
                &id,
                "MemberRepository::delete",
            ));
        }
        MemberEntity::delete_by_id(id.clone()).exec(txn).await?;
        Ok(id)
    }
}

#[async_trait]
impl MemberStore for MemberRepository {
    type Record = member_model::Model;
    type Changes = MemberChanges;

    fn kind(&self) -> MemberKind {
        MemberKind::Subscription
    }

    fn record_id(record: &Self::Record) -> &str {
        &record.id
    }

    fn apply_changes(record: &mut Self::Record, changes: &Self::Changes) {
        changes.apply(record);
    }

    async fn create(&self, record: Self::Record) -> AppResult<String> {
        Self::validate(&record)?;

        MemberEntity::insert(Self::to_active_model(&record))
            .on_conflict(
                OnConflict::column(member_model::Column::Id)
                    .update_columns([
                        member_model::Column::Name,
                        member_model::Column::Car,
                        member_model::Column::IsActive,
                        member_model::Column::ValidPayment,
                        member_model::Column::Notes,
                        member_model::Column::Email,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        tracing::debug!(member_id = %record.id, "Subscription member saved");
        Ok(record.id)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Self::Record>> {
        Ok(MemberEntity::find_by_id(id.to_string()).one(&self.db).await?)
    }

    async fn find_all(&self) -> AppResult<Vec<Self::Record>> {
        Ok(MemberEntity::find()
            .order_by_asc(member_model::Column::Id)
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
