//! Application configuration.

use std::path::Path;
use std::time::Duration;

use levdash_core::{TokenInfo, TokenRegistry, WalletId};
use levdash_query::QueryConfig;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "LEVDASH_CONFIG";

/// Configuration file used when neither a flag nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Query cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySection {
    /// Age (ms) after which a cached read is refetched. Default: 30,000.
    #[serde(default = "default_stale_after_ms")]
    pub stale_after_ms: u64,
}

fn default_stale_after_ms() -> u64 {
    30_000
}

impl Default for QuerySection {
    fn default() -> Self {
        Self {
            stale_after_ms: default_stale_after_ms(),
        }
    }
}

impl QuerySection {
    pub fn query_config(&self) -> QueryConfig {
        QueryConfig {
            stale_after: Duration::from_millis(self.stale_after_ms),
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Default log filter, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Print Prometheus metrics to stderr after each command.
    #[serde(default)]
    pub metrics: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics: false,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend base URL, without the `/api` prefix.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Wallet to connect as. `None` leaves the session disconnected.
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub query: QuerySection,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Token reference data. Empty means the built-in defaults.
    #[serde(default)]
    pub tokens: Vec<TokenInfo>,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            wallet_address: None,
            query: QuerySection::default(),
            telemetry: TelemetryConfig::default(),
            tokens: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Resolve and load configuration.
    ///
    /// Precedence: `explicit` path, then `LEVDASH_CONFIG`, then
    /// `config/default.toml`. Only the last one may be missing, in which case
    /// defaults are used.
    pub fn load(explicit: Option<&str>) -> AppResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(&path);
        }
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that cannot work at all.
    ///
    /// A malformed wallet address is not rejected here; connecting with it
    /// fails with a connection notice instead.
    pub fn validate(&self) -> AppResult<()> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "api_base_url must be an http(s) URL, got {url:?}"
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        for token in &self.tokens {
            if token.max_multiplier <= rust_decimal::Decimal::ONE {
                return Err(AppError::Config(format!(
                    "max_multiplier for {} must be greater than 1",
                    token.symbol
                )));
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn token_registry(&self) -> TokenRegistry {
        if self.tokens.is_empty() {
            TokenRegistry::default()
        } else {
            TokenRegistry::new(self.tokens.clone())
        }
    }

    /// Whether a wallet address is configured and well formed.
    pub fn has_valid_wallet(&self) -> bool {
        self.wallet_address
            .as_deref()
            .is_some_and(|a| WalletId::parse(a).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.query.query_config().stale_after, Duration::from_secs(30));
        assert_eq!(config.token_registry().len(), 4);
        assert!(!config.has_valid_wallet());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = AppConfig::from_toml(
            r#"
            api_base_url = "https://api.example.com"
            wallet_address = "0xABCDEF0123456789ABCDEF1234"

            [query]
            stale_after_ms = 500

            [[tokens]]
            symbol = "ETH"
            name = "Ethereum"
            icon = "token-eth"
            max_multiplier = "4.5"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.query.stale_after_ms, 500);
        assert_eq!(config.telemetry.log_level, "warn");
        assert!(config.has_valid_wallet());

        let registry = config.token_registry();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("eth").unwrap().max_multiplier, dec!(4.5));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(AppConfig::from_toml(r#"api_base_url = "localhost""#).is_err());
        assert!(AppConfig::from_toml("request_timeout_secs = 0").is_err());
        assert!(AppConfig::from_toml("request_timeout_secs = \"soon\"").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = AppConfig::load(Some("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("api_base_url"));
        assert!(toml_str.contains("stale_after_ms"));
    }
}
