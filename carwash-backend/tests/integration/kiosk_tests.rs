// tests/integration/kiosk_tests.rs
use carwash_backend::config::VisitConfig;
use carwash_backend::domain::member::Member;
use carwash_backend::domain::visit_category::ServiceType;
use carwash_backend::domain::{loyalty_member_model, member_model, prepaid_member_model};
use carwash_backend::error::AppError;
use carwash_backend::repository::MemberStore;
use carwash_backend::service::kiosk_service::KioskService;
use carwash_backend::service::member_cache_service::MemberCache;
use carwash_backend::service::visit_service::VisitService;
use carwash_backend::types::DateKey;
use crate::common::db::TestDatabase;
use std::sync::Arc;

struct KioskFixture {
    kiosk: KioskService,
    cache: Arc<MemberCache>,
    visits: Arc<VisitService>,
    _db: TestDatabase,
}

async fn setup() -> KioskFixture {
    let db = TestDatabase::new().await;
    let cache = Arc::new(MemberCache::new(db.connection.clone()));
    let visits = Arc::new(VisitService::new(
        db.connection.clone(),
        VisitConfig::default(),
    ));

    cache
        .subscriptions
        .create(member_model::Model {
            id: "D201".to_string(),
            name: "Sub Member".to_string(),
            car: "Red F-150".to_string(),
            is_active: true,
            valid_payment: true,
            notes: String::new(),
            email: None,
        })
        .await
        .unwrap();
    for (id, visit_count) in [("L1001", 9), ("L1002", 3)] {
        cache
            .loyalty
            .store()
            .create(loyalty_member_model::Model {
                id: id.to_string(),
                name: "Loyal Member".to_string(),
                issue_date: None,
                last_visit_date: None,
                visit_count,
                notes: String::new(),
                email: None,
            })
            .await
            .unwrap();
    }
    for (id, washes) in [("UB3001", 2), ("BB3002", 0)] {
        cache
            .prepaid
            .store()
            .create(prepaid_member_model::Model {
                id: id.to_string(),
                name: "Prepaid Member".to_string(),
                wash_type: id[..1].to_string(),
                issue_date: None,
                last_visit_date: None,
                prepaid_washes: washes,
                notes: String::new(),
                email: None,
            })
            .await
            .unwrap();
    }

    KioskFixture {
        kiosk: KioskService::new(cache.clone(), visits.clone()),
        cache,
        visits,
        _db: db,
    }
}

#[tokio::test]
async fn test_lookup_routes_by_prefix() {
    let f = setup().await;

    assert!(matches!(
        f.kiosk.lookup("d201").await.unwrap(),
        Member::Subscription(_)
    ));
    assert!(matches!(
        f.kiosk.lookup("L1001").await.unwrap(),
        Member::Loyalty(_)
    ));
    assert!(matches!(
        f.kiosk.lookup(" ub3001 ").await.unwrap(),
        Member::Prepaid(_)
    ));

    match f.kiosk.lookup("B999").await {
        Err(AppError::NotFound(message)) => assert_eq!(message, "No member found with ID: B999"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(matches!(
        f.kiosk.lookup("ZZZ").await,
        Err(AppError::ValidationError(_))
    ));
}

#[tokio::test]
async fn test_subscription_visit_uses_tier_letter() {
    let f = setup().await;

    let result = f.kiosk.log_member_visit("D201", None).await.unwrap();
    assert_eq!(result.service_type, ServiceType::Deluxe);
    assert!(!result.free_wash);
    assert_eq!(result.visit.count, 1);
    assert_eq!(result.visit.counter("subscription"), 1);
    assert_eq!(result.visit.counter("subD"), 1);
}

#[tokio::test]
async fn test_loyalty_tenth_visit_is_free_unlimited() {
    let f = setup().await;

    // visit_count 9 -> 10回目は無料
    let result = f.kiosk.log_member_visit("L1001", None).await.unwrap();
    assert!(result.free_wash);
    assert_eq!(result.service_type, ServiceType::Unlimited);
    assert_eq!(result.visit.counter("loyU"), 1);

    match &result.member {
        Member::Loyalty(model) => {
            assert_eq!(model.visit_count, 10);
            assert_eq!(model.last_visit_date, Some(DateKey::today().date()));
        }
        other => panic!("unexpected member: {:?}", other),
    }

    // DB にも反映されている
    let stored = f.cache.loyalty.store().find_by_id("L1001").await.unwrap().unwrap();
    assert_eq!(stored.visit_count, 10);
}

#[tokio::test]
async fn test_loyalty_paid_visit_requires_service_type() {
    let f = setup().await;

    assert!(matches!(
        f.kiosk.log_member_visit("L1002", None).await,
        Err(AppError::ValidationError(_))
    ));
    // 失敗時は回数も集計も変わらない
    let stored = f.cache.loyalty.get("L1002").await.unwrap().unwrap();
    assert_eq!(stored.visit_count, 3);
    let today = DateKey::today().as_string();
    assert!(f.visits.get_aggregate(&today).await.unwrap().is_none());

    let result = f
        .kiosk
        .log_member_visit("L1002", Some("b"))
        .await
        .unwrap();
    assert!(!result.free_wash);
    assert_eq!(result.service_type, ServiceType::Basic);
    assert_eq!(result.visit.counter("loyB"), 1);
}

#[tokio::test]
async fn test_prepaid_visit_decrements_and_exhausts() {
    let f = setup().await;

    let result = f.kiosk.log_member_visit("UB3001", None).await.unwrap();
    assert_eq!(result.service_type, ServiceType::Unlimited);
    assert_eq!(result.visit.counter("preU"), 1);
    match &result.member {
        Member::Prepaid(model) => assert_eq!(model.prepaid_washes, 1),
        other => panic!("unexpected member: {:?}", other),
    }

    f.kiosk.log_member_visit("UB3001", None).await.unwrap();
    let stored = f.cache.prepaid.store().find_by_id("UB3001").await.unwrap().unwrap();
    assert_eq!(stored.prepaid_washes, 0);

    match f.kiosk.log_member_visit("UB3001", None).await {
        Err(AppError::ValidationError(message)) => {
            assert_eq!(message, "No prepaid washes remaining. Cannot log visit.")
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(matches!(
        f.kiosk.log_member_visit("BB3002", None).await,
        Err(AppError::ValidationError(_))
    ));

    let today = DateKey::today().as_string();
    let aggregate = f.visits.get_aggregate(&today).await.unwrap().unwrap();
    assert_eq!(aggregate.count, 2);
}

#[tokio::test]
async fn test_cash_visit() {
    let f = setup().await;

    let snapshot = f.kiosk.log_cash_visit("D").await.unwrap();
    assert_eq!(snapshot.counter("cash"), 1);
    assert_eq!(snapshot.counter("cashD"), 1);

    assert!(matches!(
        f.kiosk.log_cash_visit("Q").await,
        Err(AppError::ValidationError(_))
    ));
}
