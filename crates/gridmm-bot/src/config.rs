//! Application configuration.

use crate::error::{AppError, AppResult};
use gridmm_adapter::RestConfig;
use gridmm_core::Symbol;
use gridmm_engine::{EngineConfig, GridConfig, RiskConfig, SweepConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration, usually loaded from a TOML file.
///
/// Every section is optional; a file containing nothing but `symbol`
/// runs with the stock grid. The API token is deliberately absent from
/// the example file and read from `GRIDMM_API_TOKEN` instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Symbol to quote, e.g. "BTC-USD".
    #[serde(default)]
    pub symbol: String,

    /// Account label carried into logs. Purely cosmetic.
    #[serde(default)]
    pub account_id: Option<String>,

    /// REST connection settings.
    #[serde(default)]
    pub exchange: RestConfig,

    /// Grid shape and cycle cadence.
    #[serde(default)]
    pub grid: GridConfig,

    /// Stale-order sweep settings.
    #[serde(default)]
    pub sweep: SweepConfig,

    /// Position risk settings.
    #[serde(default)]
    pub risk: RiskConfig,
}

impl AppConfig {
    /// Resolve the config path and load it.
    ///
    /// Precedence: explicit path, then `GRIDMM_CONFIG`, then
    /// `config/default.toml`. A missing file falls back to defaults so
    /// the bot can be driven from CLI flags alone.
    pub fn load(path_override: Option<&str>) -> AppResult<Self> {
        let config_path = path_override
            .map(str::to_string)
            .or_else(|| std::env::var("GRIDMM_CONFIG").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!(path = %config_path, "Loading configuration");
            Self::from_file(&config_path)?
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Pull secrets from the environment when the file leaves them out.
    fn apply_env(&mut self) {
        if self.exchange.api_token.is_none() {
            self.exchange.api_token = std::env::var("GRIDMM_API_TOKEN").ok();
        }
    }

    /// Engine view of this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            symbol: Symbol::new(self.symbol.as_str()),
            grid: self.grid.clone(),
            sweep: self.sweep.clone(),
            risk: self.risk.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmm_engine::CancelMode;
    use rust_decimal_macros::dec;

    #[test]
    fn test_minimal_file() {
        let config: AppConfig = toml::from_str(r#"symbol = "BTC-USD""#).unwrap();
        assert_eq!(config.symbol, "BTC-USD");
        assert_eq!(config.grid.price_step, dec!(20));
        assert_eq!(config.grid.grid_count, 5);
        assert!(config.exchange.api_token.is_none());
        assert!(config.sweep.enabled);
        assert!(!config.risk.enabled);
        assert!(config.engine_config().validate().is_ok());
    }

    #[test]
    fn test_full_file() {
        let text = r#"
            symbol = "ETH-USD"
            account_id = "desk-7"

            [exchange]
            base_url = "https://api.example.test"
            request_timeout_secs = 3

            [grid]
            price_step = "0.5"
            grid_count = 8
            price_spread = "2.5"
            order_quantity = "0.01"
            quantity_step = "0.01"
            sleep_interval_secs = 2
            cancel_mode = "drift"

            [sweep]
            enabled = false

            [risk]
            enabled = true
            max_position_size = "1.5"
            max_position_age_secs = 600
            reduce_interval_secs = 120
        "#;
        let config: AppConfig = toml::from_str(text).unwrap();
        assert_eq!(config.account_id.as_deref(), Some("desk-7"));
        assert_eq!(config.exchange.base_url, "https://api.example.test");
        assert_eq!(config.grid.grid_count, 8);
        assert_eq!(config.grid.cancel_mode, CancelMode::Drift);
        assert!(!config.sweep.enabled);
        assert!(config.risk.enabled);
        assert_eq!(config.risk.max_position_size, dec!(1.5));

        let engine = config.engine_config();
        assert_eq!(engine.symbol.as_str(), "ETH-USD");
        assert!(engine.validate().is_ok());
        assert_eq!(engine.grid.price_scale(), 1);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = AppConfig::from_file("/nonexistent/gridmm.toml").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_defaults_fail_validation_without_symbol() {
        let config = AppConfig::default();
        assert!(config.engine_config().validate().is_err());
    }
}
