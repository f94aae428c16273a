//! Backend API abstraction.

use async_trait::async_trait;
use levdash_core::{Position, WalletId};

use crate::error::ApiResult;
use crate::types::{BugReport, DashboardData, MutationAck, PlatformStats};

/// Calls the client makes against the backend.
///
/// Implemented over HTTP by [`crate::HttpBackend`]; tests substitute fakes.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Dashboard figures for a wallet.
    async fn dashboard(&self, wallet: &WalletId) -> ApiResult<DashboardData>;

    /// All positions of a wallet, opened and closed.
    ///
    /// A wallet without positions yields an empty list, not an error.
    async fn user_positions(&self, wallet: &WalletId) -> ApiResult<Vec<Position>>;

    /// Platform-wide statistics.
    async fn stats(&self) -> ApiResult<PlatformStats>;

    /// Close the wallet's open position.
    async fn close_position(&self, wallet: &WalletId) -> ApiResult<MutationAck>;

    /// Withdraw all deposited balances of the wallet.
    async fn withdraw_all(&self, wallet: &WalletId) -> ApiResult<MutationAck>;

    /// Submit a bug report.
    async fn save_bug_report(&self, report: &BugReport) -> ApiResult<MutationAck>;

    /// Subscribe the wallet to notifications via a telegram id.
    async fn subscribe_notifications(
        &self,
        wallet: &WalletId,
        telegram_id: &str,
    ) -> ApiResult<MutationAck>;
}
