//! Coalescing query cache.
//!
//! One slot per `QueryKey`. A slot is either in flight (a shared future every
//! concurrent caller awaits) or ready (a value with its fetch time). Errors
//! are never cached: a failed fetch empties the slot so the next read starts
//! a fresh request.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use levdash_api::{ApiError, ApiResult};
use levdash_core::WalletId;
use levdash_telemetry::Metrics;
use tracing::{debug, trace};

/// Kind of read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Dashboard,
    Positions,
    Stats,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Dashboard => "dashboard",
            QueryKind::Positions => "positions",
            QueryKind::Stats => "stats",
        }
    }
}

/// Cache key: the wallet a read is parameterized by (if any) and its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub wallet: Option<WalletId>,
    pub kind: QueryKind,
}

impl QueryKey {
    pub fn wallet(wallet: &WalletId, kind: QueryKind) -> Self {
        Self {
            wallet: Some(wallet.clone()),
            kind,
        }
    }

    pub fn global(kind: QueryKind) -> Self {
        Self { wallet: None, kind }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.wallet {
            Some(wallet) => write!(f, "{}:{}", self.kind.as_str(), wallet.short()),
            None => write!(f, "{}", self.kind.as_str()),
        }
    }
}

type SharedFetch<V> = Shared<BoxFuture<'static, ApiResult<V>>>;

enum Slot<V> {
    InFlight { id: u64, fetch: SharedFetch<V> },
    Ready { value: V, fetched_at: Instant },
}

/// Query cache for values of type `V`.
pub struct QueryCache<V> {
    slots: Arc<DashMap<QueryKey, Slot<V>>>,
    stale_after: Duration,
    next_id: AtomicU64,
}

impl<V> QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache whose values are refetched once older than `stale_after`.
    pub fn new(stale_after: Duration) -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
            stale_after,
            next_id: AtomicU64::new(1),
        }
    }

    /// Return the cached value for `key`, or join/start a fetch.
    ///
    /// `fetch` is only invoked when this call starts a new request. Concurrent
    /// calls for the same key while a request is in flight await that request.
    pub async fn get_or_fetch<F, Fut>(&self, key: QueryKey, fetch: F) -> ApiResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<V>> + Send + 'static,
    {
        let label = key.kind.as_str();

        let shared = match self.slots.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let joined = match occupied.get() {
                    Slot::Ready { value, fetched_at }
                        if fetched_at.elapsed() < self.stale_after =>
                    {
                        Metrics::query_cache(label, "hit");
                        trace!(%key, "Query cache hit");
                        return Ok(value.clone());
                    }
                    Slot::InFlight { fetch, .. } => Some(fetch.clone()),
                    Slot::Ready { .. } => None,
                };

                match joined {
                    Some(shared) => {
                        Metrics::query_cache(label, "coalesced");
                        trace!(%key, "Joining in-flight query");
                        shared
                    }
                    None => {
                        Metrics::query_cache(label, "stale");
                        debug!(%key, "Cached query is stale, refetching");
                        let (id, shared) = self.spawn_fetch(key.clone(), fetch());
                        occupied.insert(Slot::InFlight {
                            id,
                            fetch: shared.clone(),
                        });
                        shared
                    }
                }
            }
            Entry::Vacant(vacant) => {
                Metrics::query_cache(label, "miss");
                debug!(%key, "Query cache miss");
                let (id, shared) = self.spawn_fetch(key.clone(), fetch());
                vacant.insert(Slot::InFlight {
                    id,
                    fetch: shared.clone(),
                });
                shared
            }
        };

        shared.await
    }

    /// Run `fut` on its own task and settle the slot when it finishes.
    fn spawn_fetch<Fut>(&self, key: QueryKey, fut: Fut) -> (u64, SharedFetch<V>)
    where
        Fut: Future<Output = ApiResult<V>> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let slots = Arc::clone(&self.slots);

        let handle = tokio::spawn(async move {
            let result = fut.await;
            settle(&slots, &key, id, &result);
            result
        });

        let shared = async move {
            handle
                .await
                .unwrap_or_else(|e| Err(ApiError::Network(format!("fetch task failed: {e}"))))
        }
        .boxed()
        .shared();

        (id, shared)
    }

    /// Cached value for `key`, if one is ready (stale or not).
    pub fn peek(&self, key: &QueryKey) -> Option<V> {
        self.slots.get(key).and_then(|slot| match &*slot {
            Slot::Ready { value, .. } => Some(value.clone()),
            Slot::InFlight { .. } => None,
        })
    }

    /// Whether a request for `key` is currently in flight.
    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        matches!(self.slots.get(key).as_deref(), Some(Slot::InFlight { .. }))
    }

    /// Drop the slot for `key`.
    ///
    /// A request in flight for it still completes for its current waiters
    /// but no longer fills the cache.
    pub fn invalidate(&self, key: &QueryKey) {
        if self.slots.remove(key).is_some() {
            debug!(%key, "Query invalidated");
        }
    }

    /// Drop every slot parameterized by `wallet`.
    pub fn invalidate_wallet(&self, wallet: &WalletId) {
        self.slots
            .retain(|key, _| key.wallet.as_ref() != Some(wallet));
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Replace the in-flight slot `id` with its outcome.
///
/// Slots that were invalidated or replaced by a newer fetch are left alone.
fn settle<V: Clone>(
    slots: &DashMap<QueryKey, Slot<V>>,
    key: &QueryKey,
    id: u64,
    result: &ApiResult<V>,
) {
    let Entry::Occupied(mut occupied) = slots.entry(key.clone()) else {
        return;
    };
    let current = matches!(occupied.get(), Slot::InFlight { id: current, .. } if *current == id);
    if !current {
        return;
    }
    match result {
        Ok(value) => {
            occupied.insert(Slot::Ready {
                value: value.clone(),
                fetched_at: Instant::now(),
            });
        }
        Err(_) => {
            occupied.remove();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    fn wallet() -> WalletId {
        WalletId::parse("0xabc123").unwrap()
    }

    fn key() -> QueryKey {
        QueryKey::wallet(&wallet(), QueryKind::Positions)
    }

    #[tokio::test]
    async fn test_second_read_hits_cache() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            let value = cache
                .get_or_fetch(key(), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7u32)
                })
                .await
                .unwrap();
            assert_eq!(value, 7);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.peek(&key()), Some(7));
    }

    #[tokio::test]
    async fn test_concurrent_reads_are_coalesced() {
        let cache = Arc::new(QueryCache::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(Notify::new());

        let mut tasks = Vec::new();
        for _ in 0..5 {
            let cache = cache.clone();
            let calls = calls.clone();
            let release = release.clone();
            tasks.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(key(), move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        release.notified().await;
                        Ok::<_, ApiError>("done".to_string())
                    })
                    .await
            }));
        }

        // Let every task register before releasing the single fetch
        while !cache.is_fetching(&key()) {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        release.notify_one();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "done");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = QueryCache::<u32>::new(Duration::from_secs(60));

        let err = cache
            .get_or_fetch(key(), || async { Err(ApiError::Network("down".to_string())) })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert!(cache.is_empty());

        let value = cache.get_or_fetch(key(), || async { Ok(1) }).await.unwrap();
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = QueryCache::new(Duration::from_secs(60));

        cache.get_or_fetch(key(), || async { Ok(1u32) }).await.unwrap();
        cache.invalidate(&key());
        let value = cache.get_or_fetch(key(), || async { Ok(2u32) }).await.unwrap();

        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn test_invalidate_during_flight_discards_result() {
        let cache = Arc::new(QueryCache::new(Duration::from_secs(60)));
        let release = Arc::new(Notify::new());

        let waiter = {
            let cache = cache.clone();
            let release = release.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch(key(), move || async move {
                        release.notified().await;
                        Ok(1u32)
                    })
                    .await
            })
        };

        while !cache.is_fetching(&key()) {
            tokio::task::yield_now().await;
        }
        cache.invalidate(&key());
        release.notify_one();

        // The original waiter still gets its answer
        assert_eq!(waiter.await.unwrap().unwrap(), 1);
        assert_eq!(cache.peek(&key()), None);
    }

    #[tokio::test]
    async fn test_stale_value_is_refetched() {
        let cache = QueryCache::new(Duration::ZERO);

        cache.get_or_fetch(key(), || async { Ok(1u32) }).await.unwrap();
        let value = cache.get_or_fetch(key(), || async { Ok(2u32) }).await.unwrap();

        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn test_dropped_caller_still_fills_cache() {
        let cache = Arc::new(QueryCache::new(Duration::from_secs(60)));
        let release = Arc::new(Notify::new());

        let waiter = {
            let cache = cache.clone();
            let release = release.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch(key(), move || async move {
                        release.notified().await;
                        Ok(9u32)
                    })
                    .await
            })
        };

        while !cache.is_fetching(&key()) {
            tokio::task::yield_now().await;
        }
        waiter.abort();
        release.notify_one();

        let mut filled = None;
        for _ in 0..100 {
            filled = cache.peek(&key());
            if filled.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(filled, Some(9));
    }

    #[tokio::test]
    async fn test_invalidate_wallet_keeps_other_keys() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let other = WalletId::parse("0xdef456").unwrap();

        cache.get_or_fetch(key(), || async { Ok(1u32) }).await.unwrap();
        cache
            .get_or_fetch(QueryKey::wallet(&other, QueryKind::Positions), || async { Ok(2u32) })
            .await
            .unwrap();
        cache
            .get_or_fetch(QueryKey::global(QueryKind::Stats), || async { Ok(3u32) })
            .await
            .unwrap();

        cache.invalidate_wallet(&wallet());

        assert_eq!(cache.peek(&key()), None);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_wallet_matches_any_casing() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.get_or_fetch(key(), || async { Ok(1u32) }).await.unwrap();

        let upper = WalletId::parse("0xABC123").unwrap();
        assert_eq!(cache.peek(&QueryKey::wallet(&upper, QueryKind::Positions)), Some(1));

        cache.invalidate_wallet(&upper);

        assert!(cache.is_empty());
    }
}
