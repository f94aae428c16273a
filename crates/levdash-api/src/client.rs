//! HTTP client for the backend REST API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use levdash_core::{Position, WalletId};
use levdash_telemetry::Metrics;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::backend::BackendApi;
use crate::error::{ApiError, ApiResult};
use crate::types::{
    BugReport, DashboardData, ErrorBody, MutationAck, PlatformStats, PositionsPayload,
    SubscribeRequest,
};

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    /// Base URL without trailing slash (e.g., "https://app.example.com").
    base_url: String,
}

impl HttpBackend {
    /// Create a new backend client.
    ///
    /// # Arguments
    /// * `base_url` - Backend origin; `/api/...` paths are appended to it.
    /// * `timeout` - Per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the body of a 2xx response.
    ///
    /// 404 maps to `NotFound`, other non-2xx statuses to `Server` with the
    /// backend's message when the body carries one.
    async fn execute(&self, endpoint: &'static str, request: RequestBuilder) -> ApiResult<String> {
        let started = Instant::now();
        let result = self.execute_inner(request).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.outcome(),
        };
        Metrics::api_request(endpoint, outcome, elapsed_ms);

        match &result {
            Ok(_) => debug!(endpoint, elapsed_ms, "Backend request succeeded"),
            Err(ApiError::NotFound) => debug!(endpoint, "Backend returned 404"),
            Err(e) => warn!(endpoint, error = %e, elapsed_ms, "Backend request failed"),
        }

        result
    }

    async fn execute_inner(&self, request: RequestBuilder) -> ApiResult<String> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read response body: {e}")))?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: ErrorBody::extract(&body),
            });
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> ApiResult<T> {
        let body = self.execute(endpoint, request).await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(endpoint, error = %e, "Backend response failed schema validation");
            ApiError::Malformed(format!("{endpoint}: {e}"))
        })
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn dashboard(&self, wallet: &WalletId) -> ApiResult<DashboardData> {
        debug!(wallet = %wallet.short(), "Fetching dashboard");
        let request = self
            .client
            .get(self.url("/api/dashboard"))
            .query(&[("wallet_id", wallet.as_str())]);
        self.get_json("dashboard", request).await
    }

    async fn user_positions(&self, wallet: &WalletId) -> ApiResult<Vec<Position>> {
        debug!(wallet = %wallet.short(), "Fetching user positions");
        let request = self
            .client
            .get(self.url(&format!("/api/user-positions/{}", wallet.as_str())));

        match self.get_json::<PositionsPayload>("user_positions", request).await {
            Ok(payload) => Ok(payload.into_positions()),
            // No positions recorded for this wallet
            Err(ApiError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn stats(&self) -> ApiResult<PlatformStats> {
        let request = self.client.get(self.url("/api/get_stats"));
        self.get_json("stats", request).await
    }

    async fn close_position(&self, wallet: &WalletId) -> ApiResult<MutationAck> {
        info!(wallet = %wallet.short(), "Closing position");
        let request = self
            .client
            .get(self.url("/api/close-position"))
            .query(&[("wallet_id", wallet.as_str())]);
        let body = self.execute("close_position", request).await?;
        Ok(MutationAck::from_body(&body))
    }

    async fn withdraw_all(&self, wallet: &WalletId) -> ApiResult<MutationAck> {
        info!(wallet = %wallet.short(), "Withdrawing all balances");
        let request = self
            .client
            .get(self.url("/api/withdraw-all"))
            .query(&[("wallet_id", wallet.as_str())]);
        let body = self.execute("withdraw_all", request).await?;
        Ok(MutationAck::from_body(&body))
    }

    async fn save_bug_report(&self, report: &BugReport) -> ApiResult<MutationAck> {
        info!(wallet = %report.wallet_id.short(), "Submitting bug report");
        let request = self
            .client
            .post(self.url("/api/save-bug-report"))
            .json(report);
        let body = self.execute("save_bug_report", request).await?;
        Ok(MutationAck::from_body(&body))
    }

    async fn subscribe_notifications(
        &self,
        wallet: &WalletId,
        telegram_id: &str,
    ) -> ApiResult<MutationAck> {
        info!(wallet = %wallet.short(), "Subscribing to notifications");
        let body = SubscribeRequest {
            wallet_id: wallet.clone(),
            telegram_id: telegram_id.to_string(),
        };
        let request = self
            .client
            .post(self.url("/api/subscribe-to-notification"))
            .json(&body);
        let body = self.execute("subscribe_notifications", request).await?;
        Ok(MutationAck::from_body(&body))
    }
}
