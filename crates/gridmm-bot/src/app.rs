//! Application wiring and lifecycle.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use gridmm_adapter::{ExchangeAdapter, RestAdapter};
use gridmm_engine::{Engine, EngineConfig};
use tracing::{info, Instrument};

/// Main application.
pub struct Application {
    engine_config: EngineConfig,
    adapter: RestAdapter,
    account_id: Option<String>,
}

impl Application {
    /// Validate the configuration and build the REST adapter.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let engine_config = config.engine_config();
        engine_config.validate()?;
        let adapter = RestAdapter::new(&config.exchange)?;

        Ok(Self {
            engine_config,
            adapter,
            account_id: config.account_id,
        })
    }

    /// One round trip against the venue before quoting anything.
    ///
    /// Catches bad URLs, bad tokens, and unknown symbols while the bot
    /// still has no orders at risk.
    pub async fn run_preflight(&self) -> AppResult<()> {
        let symbol = &self.engine_config.symbol;
        let ticker = self
            .adapter
            .get_ticker(symbol)
            .await
            .map_err(|e| AppError::Preflight(format!("Ticker fetch failed: {e}")))?;

        let reference = ticker
            .reference_price()
            .filter(|p| p.is_positive())
            .ok_or_else(|| {
                AppError::Preflight(format!("No usable reference price for {symbol}"))
            })?;

        info!(symbol = %symbol, reference = %reference, "Preflight passed");
        Ok(())
    }

    /// Run the engine until interrupted.
    pub async fn run(self) -> AppResult<()> {
        let account = self.account_id.as_deref().unwrap_or("default").to_string();
        let span = tracing::info_span!("bot", account = %account);

        let mut engine = Engine::new(self.adapter, self.engine_config);
        tokio::select! {
            _ = engine.run().instrument(span) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
            }
        }
        Ok(())
    }
}
