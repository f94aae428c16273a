//! levdash-dashboard - View aggregation and command handlers.
//!
//! This crate turns server data into view-ready figures and exposes every
//! user action as a command handler:
//!
//! - `DashboardAggregator`: health/borrow/collateral figures, deposited
//!   balances, position cards and platform stats, all pre-formatted
//! - `Dashboard`: connect/disconnect, reads, mutations and the open-position
//!   precheck, each returning `Result<_, Notice>`
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────┐   ┌──────────────┐
//! │ WalletSession│──▶│   QueryClient    │──▶│  BackendApi  │
//! └──────────────┘   │ (cache, latches) │   └──────────────┘
//!                    └────────┬─────────┘
//!                             ▼
//!                    ┌─────────────────┐
//!                    │    Dashboard     │──▶ Notice (Banner / Toast)
//!                    │  + Aggregator    │──▶ DashboardSnapshot, PositionCard
//!                    └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use levdash_dashboard::{Dashboard, DashboardAggregator};
//!
//! let dashboard = Dashboard::new(client, Arc::new(DashboardAggregator::new(tokens)));
//! dashboard.connect().await?;
//! match dashboard.load_dashboard().await {
//!     Ok(Query::Loaded(snapshot)) => render(snapshot),
//!     Ok(Query::Disabled) => prompt_connect(),
//!     Err(notice) => show(notice),
//! }
//! ```

mod aggregator;
mod commands;
mod notice;
mod types;
pub mod validation;

pub use aggregator::DashboardAggregator;
pub use commands::{CommandResult, Dashboard};
pub use notice::{Notice, NoticeLevel};
pub use types::{
    DashboardSnapshot, OpenCheck, OpenRequest, PositionCard, StatsView, TokenBalanceView, Trend,
};
pub use levdash_query::Query;
