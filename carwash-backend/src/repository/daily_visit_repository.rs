// carwash-backend/src/repository/daily_visit_repository.rs
use crate::domain::daily_visit_model::{
    self, ActiveModel as DailyVisitActiveModel, DailyVisitSnapshot, Entity as DailyVisitEntity,
    VisitCounters,
};
use crate::domain::visit_category::{ServiceType, VisitCategory};
use crate::error::AppResult;
use crate::types::DateKey;
use crate::utils::error_helper::conflict_error;
use crate::utils::transaction::{execute_with_retry, RetryConfig};
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseTransaction, DbConn, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};

pub struct DailyVisitRepository {
    db: DbConn,
}

impl DailyVisitRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// 指定日の集計に来店1件を加算する
    ///
    /// 読み取り・加算・書き込みを1トランザクションで行い、
    /// 他の書き込みと競合した場合は最初からやり直す。
    pub async fn record_visit_on(
        &self,
        date: DateKey,
        category: Option<VisitCategory>,
        service_type: Option<ServiceType>,
        retry: &RetryConfig,
    ) -> AppResult<DailyVisitSnapshot> {
        execute_with_retry(
            &self.db,
            move |txn| Box::pin(Self::increment_in_txn(txn, date, category, service_type)),
            retry,
        )
        .await
    }

    async fn increment_in_txn(
        txn: &DatabaseTransaction,
        date: DateKey,
        category: Option<VisitCategory>,
        service_type: Option<ServiceType>,
    ) -> AppResult<DailyVisitSnapshot> {
        let key = date.as_string();
        let now = Utc::now();

        let existing = DailyVisitEntity::find_by_id(key.clone()).one(txn).await?;

        match existing {
            Some(row) => {
                let mut counters = row.visit_counters()?;
                counters.apply_visit(category, service_type);
                let count = row.count + 1;

                // version が読み取り時のままの場合だけ書き込む
                let result = DailyVisitEntity::update_many()
                    .col_expr(daily_visit_model::Column::Count, Expr::value(count))
                    .col_expr(
                        daily_visit_model::Column::Counters,
                        Expr::value(counters.to_json()),
                    )
                    .col_expr(daily_visit_model::Column::Version, Expr::value(row.version + 1))
                    .col_expr(daily_visit_model::Column::LastUpdated, Expr::value(now))
                    .filter(daily_visit_model::Column::DateKey.eq(key.clone()))
                    .filter(daily_visit_model::Column::Version.eq(row.version))
                    .exec(txn)
                    .await?;

                if result.rows_affected == 0 {
                    return Err(conflict_error(
                        &format!("Daily visit aggregate {} was modified concurrently", key),
                        "DailyVisitRepository::increment",
                    ));
                }

                Ok(DailyVisitSnapshot::from_parts(key, count, &counters))
            }
            None => {
                let mut counters = VisitCounters::new();
                counters.apply_visit(category, service_type);

                let row = DailyVisitActiveModel {
                    date_key: Set(key.clone()),
                    date: Set(date.start_of_day()),
                    count: Set(1),
                    counters: Set(counters.to_json()),
                    version: Set(1),
                    created_at: Set(now),
                    last_updated: Set(now),
                };

                // 同じ日の最初の書き込みが同時に来た場合は片方が 0 件になる
                let inserted = DailyVisitEntity::insert(row)
                    .on_conflict(
                        OnConflict::column(daily_visit_model::Column::DateKey)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;

                if inserted == 0 {
                    return Err(conflict_error(
                        &format!("Daily visit aggregate {} was created concurrently", key),
                        "DailyVisitRepository::increment",
                    ));
                }

                Ok(DailyVisitSnapshot::from_parts(key, 1, &counters))
            }
        }
    }

    pub async fn find_by_date_key(
        &self,
        date: DateKey,
    ) -> AppResult<Option<daily_visit_model::Model>> {
        Ok(DailyVisitEntity::find_by_id(date.as_string())
            .one(&self.db)
            .await?)
    }

    /// start〜end（両端を含む）の集計を日付昇順で返す
    pub async fn find_range(
        &self,
        start: DateKey,
        end: DateKey,
    ) -> AppResult<Vec<daily_visit_model::Model>> {
        Ok(DailyVisitEntity::find()
            .filter(daily_visit_model::Column::DateKey.gte(start.as_string()))
            .filter(daily_visit_model::Column::DateKey.lte(end.as_string()))
            .order_by_asc(daily_visit_model::Column::DateKey)
            .all(&self.db)
            .await?)
    }

    /// cutoff より前（cutoff 当日は含まない）の日付キー
    pub async fn find_keys_older_than(&self, cutoff: DateKey) -> AppResult<Vec<String>> {
        Ok(DailyVisitEntity::find()
            .select_only()
            .column(daily_visit_model::Column::DateKey)
            .filter(daily_visit_model::Column::DateKey.lt(cutoff.as_string()))
            .order_by_asc(daily_visit_model::Column::DateKey)
            .into_tuple::<String>()
            .all(&self.db)
            .await?)
    }

    pub async fn delete_by_key(&self, date_key: &str) -> AppResult<u64> {
        let result = DailyVisitEntity::delete_by_id(date_key.to_string())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
