//! Wallet-gated reads and invalidating mutations.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use levdash_api::{ApiResult, BackendApi, BugReport, DashboardData, MutationAck, PlatformStats};
use levdash_core::{Position, WalletId};
use levdash_session::WalletSession;
use levdash_telemetry::Metrics;
use tracing::{debug, info, warn};

use crate::cache::{QueryCache, QueryKey, QueryKind};
use crate::error::{QueryError, QueryResult};
use crate::latch::ActionLatch;

/// Query layer configuration.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Age after which a cached read is refetched.
    pub stale_after: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(30),
        }
    }
}

/// Outcome of a wallet-gated read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query<V> {
    /// No wallet connected; nothing was requested.
    Disabled,
    Loaded(V),
}

impl<V> Query<V> {
    pub fn loaded(self) -> Option<V> {
        match self {
            Query::Loaded(v) => Some(v),
            Query::Disabled => None,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Query::Disabled)
    }

    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Query<U> {
        match self {
            Query::Loaded(v) => Query::Loaded(f(v)),
            Query::Disabled => Query::Disabled,
        }
    }
}

/// User-triggered mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ClosePosition,
    WithdrawAll,
    BugReport,
    Subscribe,
}

impl Action {
    /// Metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ClosePosition => "close_position",
            Action::WithdrawAll => "withdraw_all",
            Action::BugReport => "bug_report",
            Action::Subscribe => "subscribe",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Action::ClosePosition => "Closing the position",
            Action::WithdrawAll => "Withdrawing all balances",
            Action::BugReport => "Sending the bug report",
            Action::Subscribe => "Subscribing to notifications",
        }
    }

    /// Whether success changes position or balance data of the wallet.
    pub fn invalidates_wallet_reads(&self) -> bool {
        matches!(self, Action::ClosePosition | Action::WithdrawAll)
    }

    fn index(&self) -> usize {
        match self {
            Action::ClosePosition => 0,
            Action::WithdrawAll => 1,
            Action::BugReport => 2,
            Action::Subscribe => 3,
        }
    }
}

/// Entry point for every backend interaction.
pub struct QueryClient {
    backend: Arc<dyn BackendApi>,
    session: Arc<WalletSession>,
    dashboard: QueryCache<DashboardData>,
    positions: QueryCache<Vec<Position>>,
    stats: QueryCache<PlatformStats>,
    latches: [ActionLatch; 4],
}

impl QueryClient {
    pub fn new(
        backend: Arc<dyn BackendApi>,
        session: Arc<WalletSession>,
        config: QueryConfig,
    ) -> Self {
        Self {
            backend,
            session,
            dashboard: QueryCache::new(config.stale_after),
            positions: QueryCache::new(config.stale_after),
            stats: QueryCache::new(config.stale_after),
            latches: Default::default(),
        }
    }

    pub fn session(&self) -> &Arc<WalletSession> {
        &self.session
    }

    fn gate(&self, kind: QueryKind) -> Option<WalletId> {
        let wallet = self.session.wallet_id();
        if wallet.is_none() {
            Metrics::query_cache(kind.as_str(), "disabled");
            debug!(query = kind.as_str(), "No wallet connected, query disabled");
        }
        wallet
    }

    /// Dashboard figures for the connected wallet.
    pub async fn dashboard(&self) -> QueryResult<Query<DashboardData>> {
        let Some(wallet) = self.gate(QueryKind::Dashboard) else {
            return Ok(Query::Disabled);
        };
        let backend = Arc::clone(&self.backend);
        let key = QueryKey::wallet(&wallet, QueryKind::Dashboard);
        let data = self
            .dashboard
            .get_or_fetch(key, move || async move { backend.dashboard(&wallet).await })
            .await?;
        Ok(Query::Loaded(data))
    }

    /// Every position of the connected wallet.
    pub async fn positions(&self) -> QueryResult<Query<Vec<Position>>> {
        let Some(wallet) = self.gate(QueryKind::Positions) else {
            return Ok(Query::Disabled);
        };
        let backend = Arc::clone(&self.backend);
        let key = QueryKey::wallet(&wallet, QueryKind::Positions);
        let positions = self
            .positions
            .get_or_fetch(key, move || async move { backend.user_positions(&wallet).await })
            .await?;
        Ok(Query::Loaded(positions))
    }

    /// The wallet's open position, `Loaded(None)` if there is none.
    pub async fn open_position(&self) -> QueryResult<Query<Option<Position>>> {
        Ok(self.positions().await?.map(|positions| {
            positions.into_iter().find(Position::is_open)
        }))
    }

    /// Cached open position for `wallet` without fetching.
    ///
    /// Outer `None` means nothing is cached.
    pub fn cached_open_position(&self, wallet: &WalletId) -> Option<Option<Position>> {
        self.positions
            .peek(&QueryKey::wallet(wallet, QueryKind::Positions))
            .map(|positions| positions.into_iter().find(Position::is_open))
    }

    /// Platform-wide statistics. Not wallet-gated.
    pub async fn stats(&self) -> QueryResult<PlatformStats> {
        let backend = Arc::clone(&self.backend);
        let stats = self
            .stats
            .get_or_fetch(QueryKey::global(QueryKind::Stats), move || async move {
                backend.stats().await
            })
            .await?;
        Ok(stats)
    }

    /// Drop all cached reads parameterized by `wallet`.
    pub fn invalidate_wallet(&self, wallet: &WalletId) {
        self.dashboard.invalidate_wallet(wallet);
        self.positions.invalidate_wallet(wallet);
        debug!(wallet = %wallet.short(), "Wallet reads invalidated");
    }

    /// Drop every cached read.
    pub fn clear(&self) {
        self.dashboard.clear();
        self.positions.clear();
        self.stats.clear();
    }

    /// Whether `action` is currently pending.
    pub fn is_pending(&self, action: Action) -> bool {
        self.latches[action.index()].is_held()
    }

    /// Close the connected wallet's open position.
    pub async fn close_position(&self) -> QueryResult<MutationAck> {
        self.run_mutation(Action::ClosePosition, |wallet| async move {
            self.backend.close_position(&wallet).await
        })
        .await
    }

    /// Withdraw every deposited balance of the connected wallet.
    pub async fn withdraw_all(&self) -> QueryResult<MutationAck> {
        self.run_mutation(Action::WithdrawAll, |wallet| async move {
            self.backend.withdraw_all(&wallet).await
        })
        .await
    }

    /// Submit a bug report on behalf of the connected wallet.
    ///
    /// The description is expected to be validated by the caller.
    pub async fn save_bug_report(
        &self,
        telegram_id: Option<String>,
        description: String,
    ) -> QueryResult<MutationAck> {
        self.run_mutation(Action::BugReport, |wallet| async move {
            let report = BugReport {
                wallet_id: wallet,
                telegram_id,
                bug_description: description,
            };
            self.backend.save_bug_report(&report).await
        })
        .await
    }

    /// Subscribe the connected wallet to notifications.
    pub async fn subscribe_notifications(&self, telegram_id: &str) -> QueryResult<MutationAck> {
        self.run_mutation(Action::Subscribe, |wallet| async move {
            self.backend
                .subscribe_notifications(&wallet, telegram_id)
                .await
        })
        .await
    }

    /// Run a mutation under its latch and invalidate on success.
    ///
    /// On failure the cache is left untouched.
    async fn run_mutation<F, Fut>(&self, action: Action, call: F) -> QueryResult<MutationAck>
    where
        F: FnOnce(WalletId) -> Fut,
        Fut: Future<Output = ApiResult<MutationAck>>,
    {
        let wallet = self.session.wallet_id().ok_or_else(|| {
            Metrics::mutation(action.as_str(), "rejected");
            QueryError::WalletRequired
        })?;

        let _guard = self.latches[action.index()].try_acquire().ok_or_else(|| {
            Metrics::mutation(action.as_str(), "pending");
            QueryError::AlreadyPending(action.label())
        })?;

        match call(wallet.clone()).await {
            Ok(ack) => {
                if action.invalidates_wallet_reads() {
                    self.invalidate_wallet(&wallet);
                }
                Metrics::mutation(action.as_str(), "ok");
                info!(action = action.as_str(), wallet = %wallet.short(), "Mutation succeeded");
                Ok(ack)
            }
            Err(e) => {
                Metrics::mutation(action.as_str(), "error");
                warn!(action = action.as_str(), error = %e, "Mutation failed");
                Err(e.into())
            }
        }
    }
}
