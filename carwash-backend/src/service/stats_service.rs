// carwash-backend/src/service/stats_service.rs

use crate::domain::loyalty_member_model;
use crate::domain::member_model;
use crate::domain::prepaid_member_model;
use crate::domain::visit_category::ServiceType;
use crate::error::AppResult;
use crate::service::member_cache_service::MemberCache;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    /// コース文字（B/D/U）ごとの人数
    pub by_type: BTreeMap<String, usize>,
    pub by_type_active: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoyaltyStats {
    pub total: usize,
    pub avg_visits: i64,
    pub highest_visits: i32,
    pub near_free_wash: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrepaidStats {
    pub total: usize,
    pub avg_washes: i64,
    pub no_washes_left: usize,
    pub low_washes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipStats {
    pub subscription: SubscriptionStats,
    pub loyalty: LoyaltyStats,
    pub prepaid: PrepaidStats,
}

fn rounded_mean(sum: i64, len: usize) -> i64 {
    if len == 0 {
        0
    } else {
        (sum as f64 / len as f64).round() as i64
    }
}

fn empty_tier_map() -> BTreeMap<String, usize> {
    ServiceType::all()
        .into_iter()
        .map(|t| (t.as_str().to_string(), 0))
        .collect()
}

pub fn subscription_stats(members: &[member_model::Model]) -> SubscriptionStats {
    let mut by_type = empty_tier_map();
    let mut by_type_active = empty_tier_map();
    let mut active = 0;

    for member in members {
        let tier = member
            .tier_letter()
            .and_then(ServiceType::from_letter)
            .map(|t| t.as_str().to_string());

        if let Some(tier) = &tier {
            *by_type.entry(tier.clone()).or_insert(0) += 1;
        }
        if member.is_active {
            active += 1;
            if let Some(tier) = tier {
                *by_type_active.entry(tier).or_insert(0) += 1;
            }
        }
    }

    SubscriptionStats {
        total: members.len(),
        active,
        inactive: members.len() - active,
        by_type,
        by_type_active,
    }
}

pub fn loyalty_stats(members: &[loyalty_member_model::Model]) -> LoyaltyStats {
    let sum: i64 = members.iter().map(|m| i64::from(m.visit_count)).sum();
    LoyaltyStats {
        total: members.len(),
        avg_visits: rounded_mean(sum, members.len()),
        highest_visits: members.iter().map(|m| m.visit_count).max().unwrap_or(0),
        near_free_wash: members.iter().filter(|m| m.is_near_free_wash()).count(),
    }
}

pub fn prepaid_stats(members: &[prepaid_member_model::Model]) -> PrepaidStats {
    let sum: i64 = members.iter().map(|m| i64::from(m.prepaid_washes)).sum();
    PrepaidStats {
        total: members.len(),
        avg_washes: rounded_mean(sum, members.len()),
        no_washes_left: members.iter().filter(|m| !m.has_washes_left()).count(),
        low_washes: members.iter().filter(|m| m.is_running_low()).count(),
    }
}

pub struct StatsService {
    cache: Arc<MemberCache>,
}

impl StatsService {
    pub fn new(cache: Arc<MemberCache>) -> Self {
        Self { cache }
    }

    /// キャッシュ上の会員から集計（未読み込みのコレクションは読み込む）
    pub async fn membership_stats(&self) -> AppResult<MembershipStats> {
        let subscriptions = self.cache.subscriptions.all().await?;
        let loyalty = self.cache.loyalty.all().await?;
        let prepaid = self.cache.prepaid.all().await?;

        Ok(MembershipStats {
            subscription: subscription_stats(&subscriptions),
            loyalty: loyalty_stats(&loyalty),
            prepaid: prepaid_stats(&prepaid),
        })
    }
}
