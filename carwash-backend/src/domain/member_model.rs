// carwash-backend/src/domain/member_model.rs
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Serialize};

/// 月額会員（サブスクリプション）
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub car: String,
    pub is_active: bool,
    pub valid_payment: bool,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    #[sea_orm(nullable)]
    pub email: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// IDの先頭文字がコース（B/D/U）
    pub fn tier_letter(&self) -> Option<char> {
        self.id.chars().next()
    }
}

/// 部分更新。None のフィールドは変更しない
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberChanges {
    pub name: Option<String>,
    pub car: Option<String>,
    pub is_active: Option<bool>,
    pub valid_payment: Option<bool>,
    pub notes: Option<String>,
    pub email: Option<Option<String>>,
}

impl MemberChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.car.is_none()
            && self.is_active.is_none()
            && self.valid_payment.is_none()
            && self.notes.is_none()
            && self.email.is_none()
    }

    /// 指定されたカラムだけを Set にした ActiveModel（主キーは NotSet）
    pub fn to_active_model(&self) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            name: self.name.clone().map_or(NotSet, Set),
            car: self.car.clone().map_or(NotSet, Set),
            is_active: self.is_active.map_or(NotSet, Set),
            valid_payment: self.valid_payment.map_or(NotSet, Set),
            notes: self.notes.clone().map_or(NotSet, Set),
            email: self.email.clone().map_or(NotSet, Set),
        }
    }

    pub fn apply(&self, model: &mut Model) {
        if let Some(name) = &self.name {
            model.name = name.clone();
        }
        if let Some(car) = &self.car {
            model.car = car.clone();
        }
        if let Some(is_active) = self.is_active {
            model.is_active = is_active;
        }
        if let Some(valid_payment) = self.valid_payment {
            model.valid_payment = valid_payment;
        }
        if let Some(notes) = &self.notes {
            model.notes = notes.clone();
        }
        if let Some(email) = &self.email {
            model.email = email.clone();
        }
    }
}
