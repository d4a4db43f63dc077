// carwash-backend/src/domain/member.rs
use crate::domain::visit_category::VisitCategory;
use crate::domain::{loyalty_member_model, member_model, prepaid_member_model};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 会員の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Subscription,
    Loyalty,
    Prepaid,
}

impl MemberKind {
    /// エラーメッセージ用の表示名
    pub fn label(&self) -> &'static str {
        match self {
            Self::Subscription => "Subscription",
            Self::Loyalty => "Loyalty",
            Self::Prepaid => "Prepaid",
        }
    }

    pub fn visit_category(&self) -> VisitCategory {
        match self {
            Self::Subscription => VisitCategory::Subscription,
            Self::Loyalty => VisitCategory::Loyalty,
            Self::Prepaid => VisitCategory::Prepaid,
        }
    }

    /// 存在しないIDへの更新・削除時のメッセージ
    pub fn not_found_message(&self, id: &str) -> String {
        format!("{} member with ID {} does not exist", self.label(), id)
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 3種類の会員レコードをまとめた型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Member {
    Subscription(member_model::Model),
    Loyalty(loyalty_member_model::Model),
    Prepaid(prepaid_member_model::Model),
}

impl Member {
    pub fn id(&self) -> &str {
        match self {
            Self::Subscription(m) => &m.id,
            Self::Loyalty(m) => &m.id,
            Self::Prepaid(m) => &m.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Subscription(m) => &m.name,
            Self::Loyalty(m) => &m.name,
            Self::Prepaid(m) => &m.name,
        }
    }

    pub fn kind(&self) -> MemberKind {
        match self {
            Self::Subscription(_) => MemberKind::Subscription,
            Self::Loyalty(_) => MemberKind::Loyalty,
            Self::Prepaid(_) => MemberKind::Prepaid,
        }
    }
}

impl From<member_model::Model> for Member {
    fn from(model: member_model::Model) -> Self {
        Self::Subscription(model)
    }
}

impl From<loyalty_member_model::Model> for Member {
    fn from(model: loyalty_member_model::Model) -> Self {
        Self::Loyalty(model)
    }
}

impl From<prepaid_member_model::Model> for Member {
    fn from(model: prepaid_member_model::Model) -> Self {
        Self::Prepaid(model)
    }
}
