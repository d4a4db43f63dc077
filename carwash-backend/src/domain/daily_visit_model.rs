// carwash-backend/src/domain/daily_visit_model.rs
use crate::domain::visit_category::{cross_counter_name, ServiceType, VisitCategory};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 1日1行の来店集計
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_visits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub date_key: String,
    pub date: DateTime<Utc>,
    pub count: i64,
    pub counters: Json,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn visit_counters(&self) -> Result<VisitCounters, DbErr> {
        VisitCounters::from_json(&self.counters)
    }
}

/// 内訳カウンター。まだ一度も加算されていない名前は存在しない
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitCounters(BTreeMap<String, i64>);

impl VisitCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(value: &Json) -> Result<Self, DbErr> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value.clone())
            .map_err(|e| DbErr::Json(format!("Invalid daily visit counters: {}", e)))
    }

    pub fn to_json(&self) -> Json {
        serde_json::to_value(&self.0).unwrap_or_else(|_| Json::Object(Default::default()))
    }

    pub fn get(&self, name: &str) -> i64 {
        self.0.get(name).copied().unwrap_or(0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn increment(&mut self, name: &str) {
        *self.0.entry(name.to_string()).or_insert(0) += 1;
    }

    /// 1回の来店分をカウンターに反映する（合計 count は含まない）
    pub fn apply_visit(&mut self, category: Option<VisitCategory>, service_type: Option<ServiceType>) {
        if let Some(category) = category {
            self.increment(category.as_str());
            if let Some(service_type) = service_type {
                self.increment(&cross_counter_name(category, service_type));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &i64)> {
        self.0.iter()
    }
}

/// 記録直後の集計スナップショット。全カウンターを 0 埋めして返す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVisitSnapshot {
    pub date_key: String,
    pub count: i64,
    pub counters: BTreeMap<String, i64>,
}

impl DailyVisitSnapshot {
    pub fn from_parts(date_key: String, count: i64, counters: &VisitCounters) -> Self {
        let mut all = BTreeMap::new();
        for category in VisitCategory::all() {
            all.insert(category.as_str().to_string(), counters.get(category.as_str()));
            for service_type in ServiceType::all() {
                let name = cross_counter_name(category, service_type);
                let value = counters.get(&name);
                all.insert(name, value);
            }
        }
        // 想定外の名前も落とさない
        for (name, value) in counters.iter() {
            all.entry(name.clone()).or_insert(*value);
        }

        Self {
            date_key,
            count,
            counters: all,
        }
    }

    pub fn counter(&self, name: &str) -> i64 {
        self.counters.get(name).copied().unwrap_or(0)
    }
}

impl TryFrom<&Model> for DailyVisitSnapshot {
    type Error = DbErr;

    fn try_from(model: &Model) -> Result<Self, Self::Error> {
        let counters = model.visit_counters()?;
        Ok(Self::from_parts(model.date_key.clone(), model.count, &counters))
    }
}
