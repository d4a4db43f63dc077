// carwash-backend/src/service/visit_service.rs

use crate::config::{VisitConfig, MAX_RETENTION_DAYS};
use crate::db::DbPool;
use crate::domain::daily_visit_model::{self, DailyVisitSnapshot};
use crate::domain::visit_category::{ServiceType, VisitCategory};
use crate::error::AppResult;
use crate::log_with_context;
use crate::repository::daily_visit_repository::DailyVisitRepository;
use crate::types::DateKey;
use crate::utils::error_helper::validation_error;
use crate::utils::transaction::RetryConfig;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// グラフ用の系列で許可する最大日数
pub const MAX_SERIES_DAYS: i64 = 366;

/// purge の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeReport {
    pub cutoff: String,
    pub targeted: usize,
    pub deleted: usize,
    pub failed_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date_key: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub total: i64,
    pub average: i64,
    pub max: i64,
    pub min: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitSeries {
    pub start: String,
    pub end: String,
    pub points: Vec<SeriesPoint>,
    pub stats: SeriesStats,
}

/// グラフの表示期間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesWindow {
    Weekly,
    Monthly,
}

impl SeriesWindow {
    pub fn days(&self) -> i64 {
        match self {
            Self::Weekly => 7,
            Self::Monthly => 30,
        }
    }

    /// today から遡った (start, end)
    pub fn range_ending(&self, today: DateKey) -> (DateKey, DateKey) {
        (today.days_before(self.days()), today)
    }
}

/// カテゴリ・サービス種別の文字列を検証して変換する
pub fn parse_visit_kind(
    category: Option<&str>,
    service_type: Option<&str>,
) -> AppResult<(Option<VisitCategory>, Option<ServiceType>)> {
    let category = match category {
        Some(value) => Some(
            value
                .parse::<VisitCategory>()
                .map_err(|e| validation_error("category", &e))?,
        ),
        None => None,
    };
    let service_type = match service_type {
        Some(value) => Some(
            value
                .parse::<ServiceType>()
                .map_err(|e| validation_error("service_type", &e))?,
        ),
        None => None,
    };
    check_visit_kind(category, service_type)?;
    Ok((category, service_type))
}

fn check_visit_kind(
    category: Option<VisitCategory>,
    service_type: Option<ServiceType>,
) -> AppResult<()> {
    if category.is_none() && service_type.is_some() {
        return Err(validation_error(
            "service_type",
            "a service type can only be recorded together with a category",
        ));
    }
    Ok(())
}

/// 範囲の欠けた日を 0 で埋め、統計を付けた系列を作る
pub fn build_daily_series(start: DateKey, end: DateKey, rows: &[(String, i64)]) -> VisitSeries {
    let counts: HashMap<&str, i64> = rows.iter().map(|(k, c)| (k.as_str(), *c)).collect();

    let mut points = Vec::new();
    let mut day = start;
    while day <= end {
        let key = day.as_string();
        let count = counts.get(key.as_str()).copied().unwrap_or(0);
        points.push(SeriesPoint {
            date_key: key,
            count,
        });
        day = day.days_after(1);
    }

    let total: i64 = points.iter().map(|p| p.count).sum();
    let max = points.iter().map(|p| p.count).max().unwrap_or(0);
    let min = points.iter().map(|p| p.count).min().unwrap_or(0);
    let average = if points.is_empty() {
        0
    } else {
        (total as f64 / points.len() as f64).round() as i64
    };

    VisitSeries {
        start: start.as_string(),
        end: end.as_string(),
        points,
        stats: SeriesStats {
            total,
            average,
            max,
            min,
        },
    }
}

pub struct VisitService {
    repo: Arc<DailyVisitRepository>,
    config: VisitConfig,
    retry: RetryConfig,
}

impl VisitService {
    pub fn new(db_pool: DbPool, config: VisitConfig) -> Self {
        let retry = RetryConfig::with_max_attempts(config.max_retry_attempts);
        Self {
            repo: Arc::new(DailyVisitRepository::new(db_pool)),
            config,
            retry,
        }
    }

    pub fn config(&self) -> &VisitConfig {
        &self.config
    }

    /// 文字列入力（API）からの来店記録
    pub async fn record_visit(
        &self,
        category: Option<&str>,
        service_type: Option<&str>,
    ) -> AppResult<DailyVisitSnapshot> {
        let (category, service_type) = parse_visit_kind(category, service_type)?;
        self.record_visit_typed(category, service_type).await
    }

    /// 今日（UTC）の集計に来店1件を加算
    pub async fn record_visit_typed(
        &self,
        category: Option<VisitCategory>,
        service_type: Option<ServiceType>,
    ) -> AppResult<DailyVisitSnapshot> {
        self.record_visit_on(DateKey::today(), category, service_type)
            .await
    }

    pub async fn record_visit_on(
        &self,
        date: DateKey,
        category: Option<VisitCategory>,
        service_type: Option<ServiceType>,
    ) -> AppResult<DailyVisitSnapshot> {
        check_visit_kind(category, service_type)?;

        let snapshot = self
            .repo
            .record_visit_on(date, category, service_type, &self.retry)
            .await?;

        log_with_context!(
            tracing::Level::INFO,
            "Visit recorded",
            "date_key" => &snapshot.date_key,
            "category" => category.map(|c| c.as_str()),
            "service_type" => service_type.map(|s| s.as_str()),
            "count" => snapshot.count
        );

        Ok(snapshot)
    }

    pub async fn get_aggregate(&self, date_key: &str) -> AppResult<Option<daily_visit_model::Model>> {
        let date = DateKey::parse(date_key)?;
        self.repo.find_by_date_key(date).await
    }

    pub async fn get_range(
        &self,
        start_date_key: &str,
        end_date_key: &str,
    ) -> AppResult<Vec<daily_visit_model::Model>> {
        let (start, end) = Self::parse_range(start_date_key, end_date_key)?;
        self.repo.find_range(start, end).await
    }

    pub async fn get_daily_series(
        &self,
        start_date_key: &str,
        end_date_key: &str,
    ) -> AppResult<VisitSeries> {
        let (start, end) = Self::parse_range(start_date_key, end_date_key)?;
        self.series_between(start, end).await
    }

    /// 今日までの週・月の系列
    pub async fn get_window_series(&self, window: SeriesWindow) -> AppResult<VisitSeries> {
        let (start, end) = window.range_ending(DateKey::today());
        self.series_between(start, end).await
    }

    async fn series_between(&self, start: DateKey, end: DateKey) -> AppResult<VisitSeries> {
        let span = (end.date() - start.date()).num_days() + 1;
        if span > MAX_SERIES_DAYS {
            return Err(validation_error(
                "range",
                &format!("series range must not exceed {} days", MAX_SERIES_DAYS),
            ));
        }

        let rows: Vec<(String, i64)> = self
            .repo
            .find_range(start, end)
            .await?
            .into_iter()
            .map(|row| (row.date_key, row.count))
            .collect();

        Ok(build_daily_series(start, end, &rows))
    }

    fn parse_range(start_date_key: &str, end_date_key: &str) -> AppResult<(DateKey, DateKey)> {
        let start = DateKey::parse(start_date_key)?;
        let end = DateKey::parse(end_date_key)?;
        if start > end {
            return Err(validation_error(
                "range",
                &format!(
                    "start date {} must not be after end date {}",
                    start, end
                ),
            ));
        }
        Ok((start, end))
    }

    /// retention_days より古い集計を削除（省略時は設定値）
    pub async fn purge_older_than(&self, retention_days: Option<i64>) -> AppResult<PurgeReport> {
        self.purge_older_than_from(DateKey::today(), retention_days)
            .await
    }

    pub async fn purge_older_than_from(
        &self,
        today: DateKey,
        retention_days: Option<i64>,
    ) -> AppResult<PurgeReport> {
        let retention_days = retention_days.unwrap_or(self.config.retention_days);
        if !(0..=MAX_RETENTION_DAYS).contains(&retention_days) {
            return Err(validation_error(
                "retention_days",
                &format!("must be between 0 and {}", MAX_RETENTION_DAYS),
            ));
        }

        let cutoff = today.days_before(retention_days);
        let keys = self.repo.find_keys_older_than(cutoff).await?;
        let targeted = keys.len();

        let repo = self.repo.clone();
        let results: Vec<(String, AppResult<u64>)> = stream::iter(keys)
            .map(|key| {
                let repo = repo.clone();
                async move {
                    let result = repo.delete_by_key(&key).await;
                    (key, result)
                }
            })
            .buffer_unordered(self.config.purge_concurrency.max(1))
            .collect()
            .await;

        let mut deleted = 0;
        let mut failed_ids = Vec::new();
        for (key, result) in results {
            match result {
                Ok(rows) if rows > 0 => deleted += 1,
                // 既に他で消えていた
                Ok(_) => {}
                Err(e) => {
                    log_with_context!(
                        tracing::Level::ERROR,
                        "Failed to delete daily visit aggregate",
                        "date_key" => &key,
                        "error" => e.to_string()
                    );
                    failed_ids.push(key);
                }
            }
        }
        failed_ids.sort();

        log_with_context!(
            tracing::Level::INFO,
            "Old daily visit aggregates purged",
            "cutoff" => cutoff.as_string(),
            "targeted" => targeted,
            "deleted" => deleted,
            "failed" => failed_ids.len()
        );

        Ok(PurgeReport {
            cutoff: cutoff.as_string(),
            targeted,
            deleted,
            failed_ids,
        })
    }
}
