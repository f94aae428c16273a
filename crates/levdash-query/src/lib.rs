//! Query layer for levdash.
//!
//! Sits between the command handlers and the backend:
//! - `QueryCache`: at most one in-flight request per key, concurrent
//!   callers share it; results cached until stale or invalidated
//! - `ActionLatch`: one pending submission per mutation
//! - `QueryClient`: wallet-gated reads and invalidating mutations
//!
//! # Concurrency
//!
//! Fetches run on spawned tasks. A caller that stops waiting only gives up
//! its interest in the result; the request still completes and fills the
//! cache unless the key was invalidated meanwhile.

pub mod cache;
pub mod client;
pub mod error;
pub mod latch;

pub use cache::{QueryCache, QueryKey, QueryKind};
pub use client::{Action, Query, QueryClient, QueryConfig};
pub use error::{QueryError, QueryResult};
pub use latch::{ActionGuard, ActionLatch};
