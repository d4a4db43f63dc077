// carwash-backend/src/domain/prepaid_member_model.rs
use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Serialize};

/// 回数券会員
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prepaid_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub wash_type: String,
    #[sea_orm(nullable)]
    pub issue_date: Option<NaiveDate>,
    #[sea_orm(nullable)]
    pub last_visit_date: Option<NaiveDate>,
    pub prepaid_washes: i32,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    #[sea_orm(nullable)]
    pub email: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn has_washes_left(&self) -> bool {
        self.prepaid_washes > 0
    }

    /// 残り1〜2回
    pub fn is_running_low(&self) -> bool {
        (1..=2).contains(&self.prepaid_washes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepaidMemberChanges {
    pub name: Option<String>,
    pub wash_type: Option<String>,
    pub issue_date: Option<Option<NaiveDate>>,
    pub last_visit_date: Option<Option<NaiveDate>>,
    pub prepaid_washes: Option<i32>,
    pub notes: Option<String>,
    pub email: Option<Option<String>>,
}

impl PrepaidMemberChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.wash_type.is_none()
            && self.issue_date.is_none()
            && self.last_visit_date.is_none()
            && self.prepaid_washes.is_none()
            && self.notes.is_none()
            && self.email.is_none()
    }

    /// 指定されたカラムだけを Set にした ActiveModel（主キーは NotSet）
    pub fn to_active_model(&self) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            name: self.name.clone().map_or(NotSet, Set),
            wash_type: self.wash_type.clone().map_or(NotSet, Set),
            issue_date: self.issue_date.map_or(NotSet, Set),
            last_visit_date: self.last_visit_date.map_or(NotSet, Set),
            prepaid_washes: self.prepaid_washes.map_or(NotSet, Set),
            notes: self.notes.clone().map_or(NotSet, Set),
            email: self.email.clone().map_or(NotSet, Set),
        }
    }

    pub fn apply(&self, model: &mut Model) {
        if let Some(name) = &self.name {
            model.name = name.clone();
        }
        if let Some(wash_type) = &self.wash_type {
            model.wash_type = wash_type.clone();
        }
        if let Some(issue_date) = self.issue_date {
            model.issue_date = issue_date;
        }
        if let Some(last_visit_date) = self.last_visit_date {
            model.last_visit_date = last_visit_date;
        }
        if let Some(prepaid_washes) = self.prepaid_washes {
            model.prepaid_washes = prepaid_washes;
        }
        if let Some(notes) = &self.notes {
            model.notes = notes.clone();
        }
        if let Some(email) = &self.email {
            model.email = email.clone();
        }
    }
}
