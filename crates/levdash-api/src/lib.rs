//! Backend REST client for levdash.
//!
//! The backend is an opaque HTTP collaborator. This crate owns the wire
//! schemas, validates every payload at the boundary, and exposes the calls
//! through the [`BackendApi`] trait so the query layer can be tested
//! without a network.

pub mod backend;
pub mod client;
pub mod error;
pub mod types;

pub use backend::BackendApi;
pub use client::HttpBackend;
pub use error::{ApiError, ApiResult};
pub use types::{
    BugReport, DashboardData, ErrorBody, MutationAck, PlatformStats, PositionsPayload,
    RawPosition, SubscribeRequest,
};
