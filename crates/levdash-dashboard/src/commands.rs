//! Command handlers.
//!
//! Each handler is one user action. Errors never escape as raw errors: reads
//! fail with a banner [`Notice`], mutations and validation with a toast.

use std::sync::Arc;

use tracing::{debug, info};

use levdash_api::MutationAck;
use levdash_query::{Action, Query, QueryClient, QueryError};

use crate::aggregator::DashboardAggregator;
use crate::notice::Notice;
use crate::types::{DashboardSnapshot, OpenCheck, OpenRequest, PositionCard, StatsView};
use crate::validation;

/// Result of a command handler.
pub type CommandResult<T> = Result<T, Notice>;

/// Command surface of the dashboard.
#[derive(Clone)]
pub struct Dashboard {
    client: Arc<QueryClient>,
    aggregator: Arc<DashboardAggregator>,
}

impl Dashboard {
    pub fn new(client: Arc<QueryClient>, aggregator: Arc<DashboardAggregator>) -> Self {
        Self { client, aggregator }
    }

    /// Shortened id of the connected wallet.
    pub fn wallet_display(&self) -> Option<String> {
        self.client.session().wallet_id().map(|w| w.short())
    }

    /// Connect through the session's connector.
    pub async fn connect(&self) -> CommandResult<String> {
        let wallet = self.client.session().connect().await.map_err(Notice::toast)?;
        Ok(wallet.short())
    }

    /// Disconnect and forget every cached read.
    pub async fn disconnect(&self) {
        self.client.session().disconnect().await;
        self.client.clear();
    }

    /// Dashboard view with the open position card.
    pub async fn load_dashboard(&self) -> CommandResult<Query<DashboardSnapshot>> {
        let Some(wallet) = self.client.session().wallet_id() else {
            return Ok(Query::Disabled);
        };

        let (data, open) = tokio::join!(self.client.dashboard(), self.client.open_position());
        let (Query::Loaded(data), Query::Loaded(open)) =
            (data.map_err(Notice::banner)?, open.map_err(Notice::banner)?)
        else {
            return Ok(Query::Disabled);
        };

        Ok(Query::Loaded(self.aggregator.snapshot(
            &wallet,
            &data,
            open.as_ref(),
        )))
    }

    /// The open position card, `Loaded(None)` when nothing is open.
    pub async fn load_open_position(&self) -> CommandResult<Query<Option<PositionCard>>> {
        let open = self.client.open_position().await.map_err(Notice::banner)?;
        Ok(open.map(|pos| pos.map(|p| self.aggregator.position_card(&p))))
    }

    /// Full position history, newest first.
    pub async fn load_positions(&self) -> CommandResult<Query<Vec<PositionCard>>> {
        let positions = self.client.positions().await.map_err(Notice::banner)?;
        Ok(positions.map(|list| self.aggregator.position_history(&list)))
    }

    pub async fn load_stats(&self) -> CommandResult<StatsView> {
        let stats = self.client.stats().await.map_err(Notice::banner)?;
        Ok(self.aggregator.stats_view(&stats))
    }

    pub async fn close_position(&self) -> CommandResult<String> {
        let ack = self.client.close_position().await.map_err(Notice::toast)?;
        Ok(confirmation(ack, Action::ClosePosition))
    }

    pub async fn withdraw_all(&self) -> CommandResult<String> {
        let ack = self.client.withdraw_all().await.map_err(Notice::toast)?;
        Ok(confirmation(ack, Action::WithdrawAll))
    }

    pub async fn submit_bug_report(
        &self,
        telegram_id: Option<&str>,
        description: &str,
    ) -> CommandResult<String> {
        let description = validation::bug_description(description).map_err(Notice::toast)?;
        let telegram_id = telegram_id
            .filter(|id| !id.trim().is_empty())
            .map(validation::telegram_id)
            .transpose()
            .map_err(Notice::toast)?;

        let ack = self
            .client
            .save_bug_report(telegram_id, description)
            .await
            .map_err(Notice::toast)?;
        Ok(confirmation(ack, Action::BugReport))
    }

    pub async fn subscribe_notifications(&self, telegram_id: &str) -> CommandResult<String> {
        let telegram_id = validation::telegram_id(telegram_id).map_err(Notice::toast)?;
        let ack = self
            .client
            .subscribe_notifications(&telegram_id)
            .await
            .map_err(Notice::toast)?;
        Ok(confirmation(ack, Action::Subscribe))
    }

    /// Check an open request before handing it to the wallet.
    ///
    /// Validation runs first and never issues a request. A position that is
    /// already open yields [`OpenCheck::ConfirmationRequired`].
    pub async fn precheck_open_position(&self, req: &OpenRequest) -> CommandResult<OpenCheck> {
        self.aggregator.validate_open(req).map_err(Notice::toast)?;

        match self.client.open_position().await.map_err(Notice::toast)? {
            Query::Disabled => Err(Notice::toast(QueryError::WalletRequired)),
            Query::Loaded(Some(open)) => {
                debug!(token = %open.token_symbol, "Open position blocks a new one");
                Ok(OpenCheck::ConfirmationRequired {
                    open: self.aggregator.position_card(&open),
                })
            }
            Query::Loaded(None) => Ok(OpenCheck::Ready),
        }
    }
}

fn confirmation(ack: MutationAck, action: Action) -> String {
    let message = ack
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| default_confirmation(action).to_string());
    info!(action = action.as_str(), %message, "Command completed");
    message
}

fn default_confirmation(action: Action) -> &'static str {
    match action {
        Action::ClosePosition => "Position closed",
        Action::WithdrawAll => "Withdrawal submitted",
        Action::BugReport => "Bug report sent, thank you",
        Action::Subscribe => "Subscribed to notifications",
    }
}
