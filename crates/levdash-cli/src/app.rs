//! Application wiring and command dispatch.
//!
//! Builds the component graph once:
//! - HTTP backend client
//! - Wallet session over a static connector
//! - Query client (cache and mutation latches)
//! - Dashboard commands and aggregator
//!
//! and renders every command result as text or JSON.

use std::fmt::Write as _;
use std::sync::Arc;

use clap::Subcommand;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use levdash_api::HttpBackend;
use levdash_dashboard::{
    Dashboard, DashboardAggregator, DashboardSnapshot, Notice, OpenCheck, OpenRequest,
    PositionCard, Query, StatsView,
};
use levdash_query::QueryClient;
use levdash_session::{StaticConnector, WalletSession};
use levdash_telemetry::Metrics;

use crate::config::AppConfig;
use crate::error::AppResult;

const DISCONNECTED_HINT: &str = "No wallet connected. Pass --wallet or set wallet_address.";

/// User commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Health factor, balances and the open position
    Dashboard,
    /// Position history, newest first
    Positions,
    /// Platform-wide statistics
    Stats,
    /// Close the open position
    Close,
    /// Withdraw every deposited balance
    WithdrawAll,
    /// Check whether a position can be opened
    OpenCheck {
        /// Collateral token symbol
        #[arg(long)]
        token: String,
        /// Amount of collateral
        #[arg(long)]
        amount: Decimal,
        /// Leverage multiplier
        #[arg(long)]
        multiplier: Decimal,
    },
    /// Send a bug report
    BugReport {
        /// Telegram user id to reply to
        #[arg(long)]
        telegram_id: Option<String>,
        /// What went wrong
        description: String,
    },
    /// Subscribe to position notifications
    Subscribe {
        /// Telegram user id
        telegram_id: String,
    },
    /// Metrics recorded by this process, in Prometheus text format
    Metrics,
}

impl Command {
    fn needs_wallet(&self) -> bool {
        !matches!(self, Command::Stats | Command::Metrics)
    }
}

/// Rendered command output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub body: String,
    /// False when the command ended in a notice.
    pub success: bool,
}

impl Rendered {
    fn ok(body: String) -> Self {
        Self {
            body,
            success: true,
        }
    }

    fn failed(body: String) -> Self {
        Self {
            body,
            success: false,
        }
    }
}

/// Main application.
pub struct Application {
    config: AppConfig,
    dashboard: Dashboard,
    json: bool,
}

impl Application {
    pub fn new(config: AppConfig, json: bool) -> AppResult<Self> {
        let backend = HttpBackend::new(config.api_base_url.clone(), config.request_timeout())?;
        let connector = StaticConnector::new(config.wallet_address.clone());
        let session = Arc::new(WalletSession::new(Arc::new(connector)));
        let client = Arc::new(QueryClient::new(
            Arc::new(backend),
            session,
            config.query.query_config(),
        ));
        let aggregator = Arc::new(DashboardAggregator::new(config.token_registry()));

        Ok(Self {
            dashboard: Dashboard::new(client, aggregator),
            config,
            json,
        })
    }

    /// Run one command and render its result.
    pub async fn run(&self, command: Command) -> AppResult<Rendered> {
        debug!(?command, "Running command");

        if command.needs_wallet() && self.config.wallet_address.is_some() {
            match self.dashboard.connect().await {
                Ok(wallet) => info!(%wallet, "Wallet connected"),
                Err(notice) => return self.render_notice(&notice),
            }
        } else if command.needs_wallet() {
            warn!("No wallet address configured");
        }

        let rendered = match command {
            Command::Dashboard => match self.dashboard.load_dashboard().await {
                Ok(query) => self.render_query(query, render_dashboard)?,
                Err(notice) => self.render_notice(&notice)?,
            },
            Command::Positions => match self.dashboard.load_positions().await {
                Ok(query) => self.render_query(query, |rows| render_positions(rows))?,
                Err(notice) => self.render_notice(&notice)?,
            },
            Command::Stats => match self.dashboard.load_stats().await {
                Ok(stats) => self.render_value(&stats, render_stats)?,
                Err(notice) => self.render_notice(&notice)?,
            },
            Command::Close => self.render_message(self.dashboard.close_position().await)?,
            Command::WithdrawAll => self.render_message(self.dashboard.withdraw_all().await)?,
            Command::OpenCheck {
                token,
                amount,
                multiplier,
            } => {
                let req = OpenRequest {
                    token,
                    amount,
                    multiplier,
                };
                match self.dashboard.precheck_open_position(&req).await {
                    Ok(check) => self.render_value(&check, render_open_check)?,
                    Err(notice) => self.render_notice(&notice)?,
                }
            }
            Command::BugReport {
                telegram_id,
                description,
            } => self.render_message(
                self.dashboard
                    .submit_bug_report(telegram_id.as_deref(), &description)
                    .await,
            )?,
            Command::Subscribe { telegram_id } => {
                self.render_message(self.dashboard.subscribe_notifications(&telegram_id).await)?
            }
            Command::Metrics => Rendered::ok(Metrics::render()?),
        };

        Ok(rendered)
    }

    /// Metrics text when `[telemetry] metrics` is enabled.
    pub fn metrics_report(&self) -> AppResult<Option<String>> {
        if !self.config.telemetry.metrics {
            return Ok(None);
        }
        Ok(Some(Metrics::render()?))
    }

    fn render_query<V: Serialize>(
        &self,
        query: Query<V>,
        text: impl FnOnce(&V) -> String,
    ) -> AppResult<Rendered> {
        match query {
            Query::Loaded(value) => self.render_value(&value, text),
            Query::Disabled if self.json => Ok(Rendered::ok(serde_json::to_string_pretty(
                &json!({ "disabled": true, "message": DISCONNECTED_HINT }),
            )?)),
            Query::Disabled => Ok(Rendered::ok(DISCONNECTED_HINT.to_string())),
        }
    }

    fn render_value<V: Serialize>(
        &self,
        value: &V,
        text: impl FnOnce(&V) -> String,
    ) -> AppResult<Rendered> {
        if self.json {
            Ok(Rendered::ok(serde_json::to_string_pretty(value)?))
        } else {
            Ok(Rendered::ok(text(value)))
        }
    }

    fn render_message(&self, result: Result<String, Notice>) -> AppResult<Rendered> {
        match result {
            Ok(message) if self.json => Ok(Rendered::ok(serde_json::to_string_pretty(
                &json!({ "message": message }),
            )?)),
            Ok(message) => Ok(Rendered::ok(message)),
            Err(notice) => self.render_notice(&notice),
        }
    }

    fn render_notice(&self, notice: &Notice) -> AppResult<Rendered> {
        if self.json {
            Ok(Rendered::failed(serde_json::to_string_pretty(&json!({
                "level": notice.level,
                "kind": notice.kind.as_str(),
                "message": notice.message,
            }))?))
        } else {
            Ok(Rendered::failed(format!(
                "[{}] {}",
                notice.kind.as_str(),
                notice.message
            )))
        }
    }
}

fn render_dashboard(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Wallet             {}", snapshot.wallet);
    let _ = writeln!(out, "Health factor      {}", snapshot.health_factor);
    let _ = writeln!(out, "Borrowed           {}", snapshot.borrow_balance);
    let _ = writeln!(out, "Collateral         {}", snapshot.collateral_balance);
    let _ = writeln!(
        out,
        "Current sum        {} ({}, started at {})",
        snapshot.current_sum,
        snapshot.trend.as_str(),
        snapshot.start_sum
    );
    let _ = writeln!(out, "Deposited");
    for balance in &snapshot.deposited_balances {
        let _ = writeln!(out, "  {:<8} {}", balance.symbol, balance.balance);
    }
    match &snapshot.position {
        Some(card) => {
            let _ = writeln!(out, "Open position");
            out.push_str(&render_card(card));
        }
        None => {
            let _ = writeln!(out, "No open position");
        }
    }
    out.trim_end().to_string()
}

fn render_card(card: &PositionCard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Token            {}", card.token_symbol);
    let _ = writeln!(out, "  Amount           {}", card.amount);
    let _ = writeln!(out, "  Start price      {}", card.start_price);
    let _ = writeln!(out, "  Multiplier       {}x", card.multiplier);
    let _ = writeln!(out, "  Status           {}", card.status);
    if card.is_liquidated {
        let _ = writeln!(out, "  Liquidated");
    }
    let _ = writeln!(out, "  Opened           {}", card.created_at);
    out
}

fn render_positions(rows: &[PositionCard]) -> String {
    if rows.is_empty() {
        return "No positions".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:>20} {:>20} {:>6} {:<8} {:<16} {:<16}",
        "TOKEN", "AMOUNT", "START PRICE", "MULT", "STATUS", "OPENED", "CLOSED"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<8} {:>20} {:>20} {:>6} {:<8} {:<16} {:<16}",
            row.token_symbol,
            row.amount,
            row.start_price,
            row.multiplier,
            row.status,
            row.created_at,
            row.closed_at
        );
    }
    out.trim_end().to_string()
}

fn render_stats(stats: &StatsView) -> String {
    format!("TVL    {}\nUsers  {}", stats.tvl, stats.unique_users)
}

fn render_open_check(check: &OpenCheck) -> String {
    match check {
        OpenCheck::Ready => "Ready to open".to_string(),
        OpenCheck::ConfirmationRequired { open } => format!(
            "A position is already open. Close it first.\n{}",
            render_card(open).trim_end()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levdash_dashboard::Trend;

    fn card() -> PositionCard {
        PositionCard {
            token_symbol: "ETH".to_string(),
            token_icon: "token-eth".to_string(),
            amount: "12.30000000".to_string(),
            start_price: "10.50000000".to_string(),
            multiplier: "2.0".to_string(),
            status: "Opened".to_string(),
            is_liquidated: false,
            created_at: "2024-05-01 12:00".to_string(),
            closed_at: "-".to_string(),
        }
    }

    #[test]
    fn test_render_dashboard_text() {
        let snapshot = DashboardSnapshot {
            wallet: "0xAB...1234".to_string(),
            health_factor: "1.42".to_string(),
            borrow_balance: "0.00".to_string(),
            collateral_balance: "0.75000000".to_string(),
            deposited_balances: Vec::new(),
            current_sum: "$1.2K".to_string(),
            start_sum: "$1K".to_string(),
            trend: Trend::Up,
            position: Some(card()),
        };

        let text = render_dashboard(&snapshot);

        assert!(text.contains("0xAB...1234"));
        assert!(text.contains("$1.2K (up, started at $1K)"));
        assert!(text.contains("12.30000000"));
        assert!(text.contains("2.0x"));
    }

    #[test]
    fn test_render_positions_empty() {
        assert_eq!(render_positions(&[]), "No positions");
        assert!(render_positions(&[card()]).contains("Opened"));
    }

    #[test]
    fn test_needs_wallet() {
        assert!(Command::Dashboard.needs_wallet());
        assert!(Command::Close.needs_wallet());
        assert!(!Command::Stats.needs_wallet());
        assert!(!Command::Metrics.needs_wallet());
    }

    #[tokio::test]
    async fn test_disconnected_dashboard_renders_hint() {
        let app = Application::new(AppConfig::default(), false).unwrap();

        let rendered = app.run(Command::Dashboard).await.unwrap();

        assert!(rendered.success);
        assert_eq!(rendered.body, DISCONNECTED_HINT);
    }

    #[tokio::test]
    async fn test_mutation_without_wallet_fails_with_notice() {
        let app = Application::new(AppConfig::default(), true).unwrap();

        let rendered = app.run(Command::Close).await.unwrap();

        assert!(!rendered.success);
        assert!(rendered.body.contains("\"kind\": \"connection\""));
    }

    #[tokio::test]
    async fn test_invalid_wallet_fails_to_connect() {
        let config = AppConfig {
            wallet_address: Some("not-a-wallet".to_string()),
            ..AppConfig::default()
        };
        let app = Application::new(config, false).unwrap();

        let rendered = app.run(Command::Positions).await.unwrap();

        assert!(!rendered.success);
        assert!(rendered.body.starts_with("[connection]"));
    }
}
