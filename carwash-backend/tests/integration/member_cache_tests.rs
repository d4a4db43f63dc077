// tests/integration/member_cache_tests.rs
use carwash_backend::domain::loyalty_member_model;
use carwash_backend::domain::member_model::{self, MemberChanges};
use carwash_backend::error::AppError;
use carwash_backend::repository::member_repository::MemberRepository;
use carwash_backend::repository::MemberStore;
use carwash_backend::service::member_cache_service::{CollectionStatus, MemberCache};
use crate::common::db::TestDatabase;

fn subscription(id: &str, name: &str) -> member_model::Model {
    member_model::Model {
        id: id.to_string(),
        name: name.to_string(),
        car: "Gray Outback".to_string(),
        is_active: true,
        valid_payment: true,
        notes: String::new(),
        email: None,
    }
}

#[tokio::test]
async fn test_initialize_loads_subscriptions_only() {
    let db = TestDatabase::new().await;
    let repo = MemberRepository::new(db.connection.clone());
    repo.create(subscription("B101", "Alice")).await.unwrap();
    repo.create(subscription("D201", "Bob")).await.unwrap();

    let cache = MemberCache::new(db.connection.clone());
    cache.initialize().await.unwrap();

    let status = cache.status().await;
    assert_eq!(
        status.subscription,
        CollectionStatus {
            initialized: true,
            loading: false,
            error: None,
            count: 2,
        }
    );
    // ポイントカード・回数券は遅延読み込み
    assert!(!status.loyalty.initialized);
    assert!(!status.prepaid.initialized);

    let loyalty = cache.loyalty.all().await.unwrap();
    assert!(loyalty.is_empty());
    assert!(cache.loyalty.status().await.initialized);
}

#[tokio::test]
async fn test_read_through_populates_cache() {
    let db = TestDatabase::new().await;
    let cache = MemberCache::new(db.connection.clone());
    cache.initialize().await.unwrap();
    assert_eq!(cache.subscriptions.status().await.count, 0);

    // キャッシュを通さずに書き込む
    MemberRepository::new(db.connection.clone())
        .create(subscription("U301", "Carol"))
        .await
        .unwrap();

    let found = cache.subscriptions.get("U301").await.unwrap().unwrap();
    assert_eq!(found.name, "Carol");
    assert_eq!(cache.subscriptions.status().await.count, 1);

    assert!(cache.subscriptions.get("U999").await.unwrap().is_none());
    assert_eq!(cache.subscriptions.status().await.count, 1);
}

#[tokio::test]
async fn test_write_through_patches_local_copy() {
    let db = TestDatabase::new().await;
    let cache = MemberCache::new(db.connection.clone());
    cache.initialize().await.unwrap();

    cache
        .subscriptions
        .create(subscription("D202", "Dave"))
        .await
        .unwrap();
    cache
        .subscriptions
        .create(subscription("B102", "Erin"))
        .await
        .unwrap();

    let snapshot = cache.subscriptions.snapshot().await;
    let ids: Vec<&str> = snapshot.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["B102", "D202"]);

    cache
        .subscriptions
        .update(
            "D202",
            MemberChanges {
                notes: Some("prefers hand dry".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let cached = cache.subscriptions.get("D202").await.unwrap().unwrap();
    assert_eq!(cached.notes, "prefers hand dry");

    cache.subscriptions.delete("B102").await.unwrap();
    assert_eq!(cache.subscriptions.snapshot().await.len(), 1);

    // DB 側も同じ状態
    let stored = MemberRepository::new(db.connection.clone())
        .find_all()
        .await
        .unwrap();
    assert_eq!(stored, cache.subscriptions.snapshot().await);
}

#[tokio::test]
async fn test_failed_write_leaves_cache_unchanged() {
    let db = TestDatabase::new().await;
    let cache = MemberCache::new(db.connection.clone());
    cache
        .subscriptions
        .create(subscription("B101", "Alice"))
        .await
        .unwrap();
    let before = cache.subscriptions.snapshot().await;

    let err = cache
        .subscriptions
        .update(
            "B404",
            MemberChanges {
                name: Some("Nobody".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let invalid = cache
        .subscriptions
        .create(subscription("B1", "Broken"))
        .await;
    assert!(invalid.is_err());

    assert_eq!(cache.subscriptions.snapshot().await, before);
}

#[tokio::test]
async fn test_refresh_and_reset() {
    let db = TestDatabase::new().await;
    let cache = MemberCache::new(db.connection.clone());
    cache.initialize().await.unwrap();

    cache
        .loyalty
        .create(loyalty_member_model::Model {
            id: "L100".to_string(),
            name: "Frank".to_string(),
            issue_date: None,
            last_visit_date: None,
            visit_count: 7,
            notes: String::new(),
            email: None,
        })
        .await
        .unwrap();

    let status = cache.refresh_all().await.unwrap();
    assert!(status.subscription.initialized);
    assert!(status.loyalty.initialized);
    assert!(status.prepaid.initialized);
    assert_eq!(status.loyalty.count, 1);

    cache.reset().await;
    let status = cache.status().await;
    assert_eq!(status.subscription, CollectionStatus::default());
    assert_eq!(status.loyalty, CollectionStatus::default());
    assert_eq!(status.prepaid, CollectionStatus::default());
}
