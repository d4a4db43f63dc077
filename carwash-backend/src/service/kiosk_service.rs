// carwash-backend/src/service/kiosk_service.rs

use crate::domain::daily_visit_model::DailyVisitSnapshot;
use crate::domain::loyalty_member_model::LoyaltyMemberChanges;
use crate::domain::member::{Member, MemberKind};
use crate::domain::prepaid_member_model::PrepaidMemberChanges;
use crate::domain::visit_category::{ServiceType, VisitCategory};
use crate::error::{AppError, AppResult};
use crate::log_with_context;
use crate::service::member_cache_service::MemberCache;
use crate::service::visit_service::VisitService;
use crate::types::DateKey;
use crate::utils::error_helper::validation_error;
use crate::utils::validation::KIOSK_CODE_REGEX;
use serde::Serialize;
use std::sync::Arc;

/// キオスクでの来店記録結果
#[derive(Debug, Clone, Serialize)]
pub struct KioskVisitResult {
    pub member: Member,
    pub service_type: ServiceType,
    pub free_wash: bool,
    pub visit: DailyVisitSnapshot,
}

/// 入力コードを正規化（大文字化）して形式を確認
pub fn normalize_code(code: &str) -> AppResult<String> {
    let code = code.trim().to_ascii_uppercase();
    if !KIOSK_CODE_REGEX.is_match(&code) {
        return Err(validation_error(
            "code",
            &format!("'{}' is not a valid member ID", code),
        ));
    }
    Ok(code)
}

/// コードの先頭で会員種別を判定（L… / ?B… / それ以外）
pub fn route_code(code: &str) -> MemberKind {
    let mut chars = code.chars();
    match (chars.next(), chars.next()) {
        (Some('L'), _) => MemberKind::Loyalty,
        (Some(_), Some('B')) => MemberKind::Prepaid,
        _ => MemberKind::Subscription,
    }
}

fn parse_service_type(value: Option<&str>) -> AppResult<Option<ServiceType>> {
    value
        .map(|v| {
            v.trim()
                .to_ascii_uppercase()
                .parse::<ServiceType>()
                .map_err(|e| validation_error("service_type", &e))
        })
        .transpose()
}

pub struct KioskService {
    cache: Arc<MemberCache>,
    visits: Arc<VisitService>,
}

impl KioskService {
    pub fn new(cache: Arc<MemberCache>, visits: Arc<VisitService>) -> Self {
        Self { cache, visits }
    }

    /// コードから会員を検索（キャッシュ経由）
    pub async fn lookup(&self, code: &str) -> AppResult<Member> {
        let code = normalize_code(code)?;

        let member = match route_code(&code) {
            MemberKind::Loyalty => self.cache.loyalty.get(&code).await?.map(Member::from),
            MemberKind::Prepaid => self.cache.prepaid.get(&code).await?.map(Member::from),
            MemberKind::Subscription => {
                self.cache.subscriptions.get(&code).await?.map(Member::from)
            }
        };

        member.ok_or_else(|| {
            log_with_context!(
                tracing::Level::WARN,
                "Kiosk lookup found no member",
                "code" => &code
            );
            AppError::NotFound(format!("No member found with ID: {}", code))
        })
    }

    /// 会員の来店を記録する
    pub async fn log_member_visit(
        &self,
        code: &str,
        service_type: Option<&str>,
    ) -> AppResult<KioskVisitResult> {
        let requested = parse_service_type(service_type)?;
        let member = self.lookup(code).await?;
        let today = DateKey::today().date();

        let result = match member {
            Member::Subscription(model) => {
                // サブスクはIDの先頭文字のコース
                let tier = model
                    .tier_letter()
                    .and_then(ServiceType::from_letter)
                    .ok_or_else(|| {
                        validation_error("code", "subscription ID has no tier letter")
                    })?;
                let visit = self
                    .visits
                    .record_visit_typed(Some(VisitCategory::Subscription), Some(tier))
                    .await?;
                KioskVisitResult {
                    member: Member::Subscription(model),
                    service_type: tier,
                    free_wash: false,
                    visit,
                }
            }
            Member::Loyalty(mut model) => {
                let free_wash = model.next_visit_is_free();
                let service_type = if free_wash {
                    ServiceType::Unlimited
                } else {
                    requested.ok_or_else(|| {
                        validation_error(
                            "service_type",
                            "a wash type is required for loyalty visits",
                        )
                    })?
                };

                let changes = LoyaltyMemberChanges {
                    visit_count: Some(model.visit_count + 1),
                    last_visit_date: Some(Some(today)),
                    ..Default::default()
                };
                self.cache.loyalty.update(&model.id, changes.clone()).await?;
                changes.apply(&mut model);

                let visit = self
                    .visits
                    .record_visit_typed(Some(VisitCategory::Loyalty), Some(service_type))
                    .await?;
                KioskVisitResult {
                    member: Member::Loyalty(model),
                    service_type,
                    free_wash,
                    visit,
                }
            }
            Member::Prepaid(mut model) => {
                if !model.has_washes_left() {
                    return Err(AppError::ValidationError(
                        "No prepaid washes remaining. Cannot log visit.".to_string(),
                    ));
                }
                let tier = ServiceType::from_letter(model.id.chars().next().unwrap_or(' '))
                    .ok_or_else(|| validation_error("code", "prepaid ID has no tier letter"))?;

                let changes = PrepaidMemberChanges {
                    prepaid_washes: Some(model.prepaid_washes - 1),
                    last_visit_date: Some(Some(today)),
                    ..Default::default()
                };
                self.cache.prepaid.update(&model.id, changes.clone()).await?;
                changes.apply(&mut model);

                let visit = self
                    .visits
                    .record_visit_typed(Some(VisitCategory::Prepaid), Some(tier))
                    .await?;
                KioskVisitResult {
                    member: Member::Prepaid(model),
                    service_type: tier,
                    free_wash: false,
                    visit,
                }
            }
        };

        log_with_context!(
            tracing::Level::INFO,
            "Kiosk visit logged",
            "member_id" => result.member.id(),
            "kind" => result.member.kind().label(),
            "service_type" => result.service_type.as_str(),
            "free_wash" => result.free_wash
        );

        Ok(result)
    }

    /// 非会員（現金）の来店
    pub async fn log_cash_visit(&self, service_type: &str) -> AppResult<DailyVisitSnapshot> {
        let service_type = parse_service_type(Some(service_type))?.ok_or_else(|| {
            validation_error("service_type", "a wash type is required for cash visits")
        })?;
        self.visits
            .record_visit_typed(Some(VisitCategory::Cash), Some(service_type))
            .await
    }
}
