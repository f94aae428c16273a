//! levdash command-line front end.
//!
//! Wires the backend client, wallet session, query layer and dashboard
//! commands together and renders results as text or JSON:
//! - `config`: TOML configuration with defaults for every field
//! - `app`: Command dispatch and rendering

pub mod app;
pub mod config;
pub mod error;

pub use app::{Application, Command, Rendered};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
