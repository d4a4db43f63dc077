// src/api/dto/member_dto.rs
use crate::domain::{loyalty_member_model, member_model, prepaid_member_model};
use crate::domain::loyalty_member_model::LoyaltyMemberChanges;
use crate::domain::member_model::MemberChanges;
use crate::domain::prepaid_member_model::PrepaidMemberChanges;
use crate::utils::validation::{validate_not_blank, validate_service_letter};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_true() -> bool {
    true
}

/// PATCH の email: 空文字は削除として扱う
fn email_change(email: Option<String>) -> Option<Option<String>> {
    email.map(|e| {
        let trimmed = e.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

fn normalize_id(id: &str) -> String {
    id.trim().to_ascii_uppercase()
}

// --- Subscription ---

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct CreateMemberDto {
    #[validate(length(min = 1, message = "Member ID is required"))]
    pub id: String,

    #[validate(
        length(max = 100, message = "Name must not exceed 100 characters"),
        custom(function = validate_not_blank)
    )]
    pub name: String,

    #[serde(default)]
    pub car: String,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default = "default_true")]
    pub valid_payment: bool,

    #[serde(default)]
    pub notes: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl CreateMemberDto {
    pub fn into_model(self) -> member_model::Model {
        member_model::Model {
            id: normalize_id(&self.id),
            name: self.name.trim().to_string(),
            car: self.car,
            is_active: self.is_active,
            valid_payment: self.valid_payment,
            notes: self.notes,
            email: self.email,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Validate)]
pub struct UpdateMemberDto {
    #[validate(
        length(max = 100, message = "Name must not exceed 100 characters"),
        custom(function = validate_not_blank)
    )]
    pub name: Option<String>,
    pub car: Option<String>,
    pub is_active: Option<bool>,
    pub valid_payment: Option<bool>,
    pub notes: Option<String>,
    pub email: Option<String>,
}

impl From<UpdateMemberDto> for MemberChanges {
    fn from(dto: UpdateMemberDto) -> Self {
        Self {
            name: dto.name.map(|n| n.trim().to_string()),
            car: dto.car,
            is_active: dto.is_active,
            valid_payment: dto.valid_payment,
            notes: dto.notes,
            email: email_change(dto.email),
        }
    }
}

// --- Loyalty ---

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct CreateLoyaltyMemberDto {
    #[validate(length(min = 1, message = "Member ID is required"))]
    pub id: String,

    #[validate(
        length(max = 100, message = "Name must not exceed 100 characters"),
        custom(function = validate_not_blank)
    )]
    pub name: String,

    pub issue_date: Option<NaiveDate>,
    pub last_visit_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Visit count must not be negative"))]
    pub visit_count: i32,

    #[serde(default)]
    pub notes: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl CreateLoyaltyMemberDto {
    pub fn into_model(self) -> loyalty_member_model::Model {
        loyalty_member_model::Model {
            id: normalize_id(&self.id),
            name: self.name.trim().to_string(),
            issue_date: self.issue_date,
            last_visit_date: self.last_visit_date,
            visit_count: self.visit_count,
            notes: self.notes,
            email: self.email,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Validate)]
pub struct UpdateLoyaltyMemberDto {
    #[validate(
        length(max = 100, message = "Name must not exceed 100 characters"),
        custom(function = validate_not_blank)
    )]
    pub name: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub last_visit_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "Visit count must not be negative"))]
    pub visit_count: Option<i32>,
    pub notes: Option<String>,
    pub email: Option<String>,
}

impl From<UpdateLoyaltyMemberDto> for LoyaltyMemberChanges {
    fn from(dto: UpdateLoyaltyMemberDto) -> Self {
        Self {
            name: dto.name.map(|n| n.trim().to_string()),
            issue_date: dto.issue_date.map(Some),
            last_visit_date: dto.last_visit_date.map(Some),
            visit_count: dto.visit_count,
            notes: dto.notes,
            email: email_change(dto.email),
        }
    }
}

// --- Prepaid ---

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct CreatePrepaidMemberDto {
    #[validate(length(min = 1, message = "Member ID is required"))]
    pub id: String,

    #[validate(
        length(max = 100, message = "Name must not exceed 100 characters"),
        custom(function = validate_not_blank)
    )]
    pub name: String,

    /// 省略時は ID のコース文字
    #[validate(custom(function = validate_service_letter))]
    pub wash_type: Option<String>,

    pub issue_date: Option<NaiveDate>,
    pub last_visit_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(range(min = 0, message = "Prepaid washes must not be negative"))]
    pub prepaid_washes: i32,

    #[serde(default)]
    pub notes: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl CreatePrepaidMemberDto {
    pub fn into_model(self) -> prepaid_member_model::Model {
        let id = normalize_id(&self.id);
        let wash_type = self
            .wash_type
            .unwrap_or_else(|| id.chars().take(1).collect());
        prepaid_member_model::Model {
            id,
            name: self.name.trim().to_string(),
            wash_type,
            issue_date: self.issue_date,
            last_visit_date: self.last_visit_date,
            prepaid_washes: self.prepaid_washes,
            notes: self.notes,
            email: self.email,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Validate)]
pub struct UpdatePrepaidMemberDto {
    #[validate(
        length(max = 100, message = "Name must not exceed 100 characters"),
        custom(function = validate_not_blank)
    )]
    pub name: Option<String>,
    #[validate(custom(function = validate_service_letter))]
    pub wash_type: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub last_visit_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "Prepaid washes must not be negative"))]
    pub prepaid_washes: Option<i32>,
    pub notes: Option<String>,
    pub email: Option<String>,
}

impl From<UpdatePrepaidMemberDto> for PrepaidMemberChanges {
    fn from(dto: UpdatePrepaidMemberDto) -> Self {
        Self {
            name: dto.name.map(|n| n.trim().to_string()),
            wash_type: dto.wash_type,
            issue_date: dto.issue_date.map(Some),
            last_visit_date: dto.last_visit_date.map(Some),
            prepaid_washes: dto.prepaid_washes,
            notes: dto.notes,
            email: email_change(dto.email),
        }
    }
}

/// 作成・更新・削除の結果
#[derive(Serialize, Deserialize, Debug)]
pub struct MemberIdResponse {
    pub id: String,
}
