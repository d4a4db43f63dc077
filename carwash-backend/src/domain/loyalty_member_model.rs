// carwash-backend/src/domain/loyalty_member_model.rs
use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Serialize};

/// 10回ごとに1回無料になる来店回数
pub const FREE_WASH_INTERVAL: i32 = 10;

/// ポイントカード会員
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loyalty_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(nullable)]
    pub issue_date: Option<NaiveDate>,
    #[sea_orm(nullable)]
    pub last_visit_date: Option<NaiveDate>,
    pub visit_count: i32,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    #[sea_orm(nullable)]
    pub email: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 次の来店が無料洗車になるか
    pub fn next_visit_is_free(&self) -> bool {
        (self.visit_count + 1) % FREE_WASH_INTERVAL == 0
    }

    /// 無料まであと1〜2回
    pub fn is_near_free_wash(&self) -> bool {
        self.visit_count % FREE_WASH_INTERVAL >= FREE_WASH_INTERVAL - 2
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyMemberChanges {
    pub name: Option<String>,
    pub issue_date: Option<Option<NaiveDate>>,
    pub last_visit_date: Option<Option<NaiveDate>>,
    pub visit_count: Option<i32>,
    pub notes: Option<String>,
    pub email: Option<Option<String>>,
}

impl LoyaltyMemberChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.issue_date.is_none()
            && self.last_visit_date.is_none()
            && self.visit_count.is_none()
            && self.notes.is_none()
            && self.email.is_none()
    }

    /// 指定されたカラムだけを Set にした ActiveModel（主キーは NotSet）
    pub fn to_active_model(&self) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            name: self.name.clone().map_or(NotSet, Set),
            issue_date: self.issue_date.map_or(NotSet, Set),
            last_visit_date: self.last_visit_date.map_or(NotSet, Set),
            visit_count: self.visit_count.map_or(NotSet, Set),
            notes: self.notes.clone().map_or(NotSet, Set),
            email: self.email.clone().map_or(NotSet, Set),
        }
    }

    pub fn apply(&self, model: &mut Model) {
        if let Some(name) = &self.name {
            model.name = name.clone();
        }
        if let Some(issue_date) = self.issue_date {
            model.issue_date = issue_date;
        }
        if let Some(last_visit_date) = self.last_visit_date {
            model.last_visit_date = last_visit_date;
        }
        if let Some(visit_count) = self.visit_count {
            model.visit_count = visit_count;
        }
        if let Some(notes) = &self.notes {
            model.notes = notes.clone();
        }
        if let Some(email) = &self.email {
            model.email = email.clone();
        }
    }
}
