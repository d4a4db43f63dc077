// carwash-backend/src/service/member_cache_service.rs
//
// 会員コレクションのインメモリキャッシュ
// 月額会員はセッション開始時に読み込み、ポイントカード・回数券会員は初回利用時に読み込む

use crate::db::DbPool;
use crate::error::AppResult;
use crate::log_with_context;
use crate::repository::loyalty_member_repository::LoyaltyMemberRepository;
use crate::repository::member_repository::MemberRepository;
use crate::repository::prepaid_member_repository::PrepaidMemberRepository;
use crate::repository::MemberStore;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// コレクションごとの状態
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStatus {
    pub initialized: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub subscription: CollectionStatus,
    pub loyalty: CollectionStatus,
    pub prepaid: CollectionStatus,
}

struct CollectionState<R> {
    records: Vec<R>,
    initialized: bool,
    loading: bool,
    error: Option<String>,
}

impl<R> Default for CollectionState<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            initialized: false,
            loading: false,
            error: None,
        }
    }
}

/// 1種類の会員コレクションのキャッシュ
pub struct MemberCollectionCache<S: MemberStore> {
    store: Arc<S>,
    state: RwLock<CollectionState<S::Record>>,
    // 読み込みを1本に絞る
    load_lock: Mutex<()>,
}

impl<S: MemberStore> MemberCollectionCache<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: RwLock::new(CollectionState::default()),
            load_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// 未読み込みなら一度だけ読み込む
    pub async fn ensure_loaded(&self) -> AppResult<()> {
        if self.state.read().await.initialized {
            return Ok(());
        }

        let _guard = self.load_lock.lock().await;
        // 待っている間に他のタスクが読み込んだ
        if self.state.read().await.initialized {
            return Ok(());
        }
        self.load().await
    }

    /// 強制的に再読み込み
    pub async fn refresh(&self) -> AppResult<()> {
        let _guard = self.load_lock.lock().await;
        self.load().await
    }

    async fn load(&self) -> AppResult<()> {
        let kind = self.store.kind();
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let result = self.store.find_all().await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(records) => {
                log_with_context!(
                    tracing::Level::DEBUG,
                    "Member collection loaded",
                    "kind" => kind.label(),
                    "count" => records.len()
                );
                state.records = records;
                state.initialized = true;
                Ok(())
            }
            Err(e) => {
                let message = format!("Failed to load {} members: {}", kind.label(), e);
                log_with_context!(
                    tracing::Level::ERROR,
                    "Member collection load failed",
                    "kind" => kind.label(),
                    "error" => &message
                );
                state.error = Some(message);
                Err(e)
            }
        }
    }

    /// 全件（必要なら読み込む）
    pub async fn all(&self) -> AppResult<Vec<S::Record>> {
        self.ensure_loaded().await?;
        Ok(self.state.read().await.records.clone())
    }

    /// 読み込み済みの分だけ返す（読み込みは行わない）
    pub async fn snapshot(&self) -> Vec<S::Record> {
        self.state.read().await.records.clone()
    }

    /// キャッシュになければリポジトリから取得して追加
    pub async fn get(&self, id: &str) -> AppResult<Option<S::Record>> {
        {
            let state = self.state.read().await;
            if let Some(record) = state.records.iter().find(|r| S::record_id(r) == id) {
                log_with_context!(
                    tracing::Level::DEBUG,
                    "Cache hit for member",
                    "kind" => self.store.kind().label(),
                    "member_id" => id
                );
                return Ok(Some(record.clone()));
            }
        }

        log_with_context!(
            tracing::Level::DEBUG,
            "Cache miss, fetching member from database",
            "kind" => self.store.kind().label(),
            "member_id" => id
        );
        let fetched = self.store.find_by_id(id).await?;
        if let Some(record) = &fetched {
            let mut state = self.state.write().await;
            Self::upsert_local(&mut state.records, record.clone());
        }
        Ok(fetched)
    }

    pub async fn create(&self, record: S::Record) -> AppResult<String> {
        let id = self.store.create(record.clone()).await?;
        let mut state = self.state.write().await;
        Self::upsert_local(&mut state.records, record);
        Ok(id)
    }

    pub async fn update(&self, id: &str, changes: S::Changes) -> AppResult<String> {
        let updated_id = self.store.update(id, changes.clone()).await?;
        let mut state = self.state.write().await;
        if let Some(record) = state.records.iter_mut().find(|r| S::record_id(r) == id) {
            S::apply_changes(record, &changes);
        }
        Ok(updated_id)
    }

    pub async fn delete(&self, id: &str) -> AppResult<String> {
        let deleted_id = self.store.delete(id).await?;
        let mut state = self.state.write().await;
        state.records.retain(|r| S::record_id(r) != id);
        Ok(deleted_id)
    }

    pub async fn reset(&self) {
        let _guard = self.load_lock.lock().await;
        *self.state.write().await = CollectionState::default();
    }

    pub async fn status(&self) -> CollectionStatus {
        let state = self.state.read().await;
        CollectionStatus {
            initialized: state.initialized,
            loading: state.loading,
            error: state.error.clone(),
            count: state.records.len(),
        }
    }

    fn upsert_local(records: &mut Vec<S::Record>, record: S::Record) {
        let id = S::record_id(&record).to_string();
        match records.iter_mut().find(|r| S::record_id(r) == id) {
            Some(existing) => *existing = record,
            None => {
                records.push(record);
                records.sort_by(|a, b| S::record_id(a).cmp(S::record_id(b)));
            }
        }
    }
}

/// 3種類の会員キャッシュ。AppState で共有する
pub struct MemberCache {
    pub subscriptions: MemberCollectionCache<MemberRepository>,
    pub loyalty: MemberCollectionCache<LoyaltyMemberRepository>,
    pub prepaid: MemberCollectionCache<PrepaidMemberRepository>,
}

impl MemberCache {
    pub fn new(db_pool: DbPool) -> Self {
        Self::with_repositories(
            Arc::new(MemberRepository::new(db_pool.clone())),
            Arc::new(LoyaltyMemberRepository::new(db_pool.clone())),
            Arc::new(PrepaidMemberRepository::new(db_pool)),
        )
    }

    pub fn with_repositories(
        subscriptions: Arc<MemberRepository>,
        loyalty: Arc<LoyaltyMemberRepository>,
        prepaid: Arc<PrepaidMemberRepository>,
    ) -> Self {
        Self {
            subscriptions: MemberCollectionCache::new(subscriptions),
            loyalty: MemberCollectionCache::new(loyalty),
            prepaid: MemberCollectionCache::new(prepaid),
        }
    }

    /// セッション開始時。月額会員だけ先に読み込む
    pub async fn initialize(&self) -> AppResult<()> {
        self.subscriptions.ensure_loaded().await
    }

    /// 全コレクションを再読み込み
    pub async fn refresh_all(&self) -> AppResult<CacheStatus> {
        self.subscriptions.refresh().await?;
        self.loyalty.refresh().await?;
        self.prepaid.refresh().await?;
        Ok(self.status().await)
    }

    /// セッション終了時
    pub async fn reset(&self) {
        self.subscriptions.reset().await;
        self.loyalty.reset().await;
        self.prepaid.reset().await;
    }

    pub async fn status(&self) -> CacheStatus {
        CacheStatus {
            subscription: self.subscriptions.status().await,
            loyalty: self.loyalty.status().await,
            prepaid: self.prepaid.status().await,
        }
    }
}
