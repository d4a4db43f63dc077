// carwash-backend/src/domain/visit_category.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// 来店時の顧客カテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitCategory {
    Subscription,
    Loyalty,
    Prepaid,
    Cash,
}

impl VisitCategory {
    /// 文字列からVisitCategoryに変換
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "subscription" => Some(Self::Subscription),
            "loyalty" => Some(Self::Loyalty),
            "prepaid" => Some(Self::Prepaid),
            "cash" => Some(Self::Cash),
            _ => None,
        }
    }

    /// カテゴリ合計カウンターの名前
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
            Self::Loyalty => "loyalty",
            Self::Prepaid => "prepaid",
            Self::Cash => "cash",
        }
    }

    /// サービス種別との複合カウンターに使うプレフィックス
    pub fn counter_prefix(&self) -> &'static str {
        match self {
            Self::Subscription => "sub",
            Self::Loyalty => "loy",
            Self::Prepaid => "pre",
            Self::Cash => "cash",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::Subscription, Self::Loyalty, Self::Prepaid, Self::Cash]
    }
}

impl fmt::Display for VisitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VisitCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str(s).ok_or_else(|| {
            format!(
                "Invalid visit category: '{}'. Valid categories are: {}",
                s,
                Self::all()
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
    }
}

/// 洗車コース（B: Basic, D: Deluxe, U: Unlimited）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "B")]
    Basic,
    #[serde(rename = "D")]
    Deluxe,
    #[serde(rename = "U")]
    Unlimited,
}

impl ServiceType {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "B" => Some(Self::Basic),
            "D" => Some(Self::Deluxe),
            "U" => Some(Self::Unlimited),
            _ => None,
        }
    }

    /// 会員IDの先頭文字からコースを判定
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'B' => Some(Self::Basic),
            'D' => Some(Self::Deluxe),
            'U' => Some(Self::Unlimited),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "B",
            Self::Deluxe => "D",
            Self::Unlimited => "U",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Deluxe => "Deluxe",
            Self::Unlimited => "Unlimited",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::Basic, Self::Deluxe, Self::Unlimited]
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str(s).ok_or_else(|| {
            format!(
                "Invalid service type: '{}'. Valid service types are: B, D, U",
                s
            )
        })
    }
}

/// カテゴリ×サービス種別の複合カウンター名（例: "subB"）
pub fn cross_counter_name(category: VisitCategory, service_type: ServiceType) -> String {
    format!("{}{}", category.counter_prefix(), service_type.as_str())
}
