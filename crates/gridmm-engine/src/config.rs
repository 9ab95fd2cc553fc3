//! Engine configuration.
//!
//! All knobs are immutable once the engine is constructed; anything
//! invalid is rejected up front by [`EngineConfig::validate`] instead of
//! surfacing mid-flight.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use gridmm_core::{CoreError, Result, Symbol};

/// How resting orders are chosen for cancellation each cycle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CancelMode {
    /// Cancel exactly the live prices the desired grid no longer wants.
    #[default]
    Reconcile,
    /// Cancel only orders that drifted too far from the reference price,
    /// letting near-the-money orders rest across recenters.
    Drift,
}

/// Grid shape and pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Rung spacing; all order prices land on this lattice.
    #[serde(default = "default_price_step")]
    pub price_step: Decimal,

    /// Rungs per side.
    #[serde(default = "default_grid_count")]
    pub grid_count: u32,

    /// Base distance from the reference price to the first rung.
    #[serde(default = "default_price_spread")]
    pub price_spread: Decimal,

    /// Quantity per rung.
    #[serde(default = "default_order_quantity")]
    pub order_quantity: Decimal,

    /// Lot size used when rounding reduce-order quantities.
    #[serde(default = "default_quantity_step")]
    pub quantity_step: Decimal,

    /// Pause between cycles.
    #[serde(default = "default_sleep_interval_secs")]
    pub sleep_interval_secs: u64,

    /// Cancellation policy.
    #[serde(default)]
    pub cancel_mode: CancelMode,
}

impl GridConfig {
    /// Decimal scale of the price lattice, used to normalize venue prices.
    pub fn price_scale(&self) -> u32 {
        self.price_step.scale()
    }

    fn validate(&self) -> Result<()> {
        if self.price_step <= Decimal::ZERO {
            return Err(CoreError::InvalidConfig(
                "grid.price_step must be positive".to_string(),
            ));
        }
        if self.price_spread < Decimal::ZERO {
            return Err(CoreError::InvalidConfig(
                "grid.price_spread must not be negative".to_string(),
            ));
        }
        if self.order_quantity <= Decimal::ZERO {
            return Err(CoreError::InvalidConfig(
                "grid.order_quantity must be positive".to_string(),
            ));
        }
        if self.quantity_step <= Decimal::ZERO {
            return Err(CoreError::InvalidConfig(
                "grid.quantity_step must be positive".to_string(),
            ));
        }
        if self.sleep_interval_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "grid.sleep_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            price_step: default_price_step(),
            grid_count: default_grid_count(),
            price_spread: default_price_spread(),
            order_quantity: default_order_quantity(),
            quantity_step: default_quantity_step(),
            sleep_interval_secs: default_sleep_interval_secs(),
            cancel_mode: CancelMode::Reconcile,
        }
    }
}

/// Stale-order sweep tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Master switch for the sweep.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Resting age beyond which an order becomes a sweep candidate.
    #[serde(default = "default_stale_seconds")]
    pub stale_seconds: u64,

    /// Probability that a candidate is actually cancelled this cycle.
    /// Spreads churn over time instead of cancelling in bursts.
    #[serde(default = "default_cancel_probability")]
    pub cancel_probability: f64,
}

impl SweepConfig {
    fn validate(&self) -> Result<()> {
        if !self.cancel_probability.is_finite()
            || !(0.0..=1.0).contains(&self.cancel_probability)
        {
            return Err(CoreError::InvalidConfig(
                "sweep.cancel_probability must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stale_seconds: default_stale_seconds(),
            cancel_probability: default_cancel_probability(),
        }
    }
}

/// Position risk limits and trend detection tuning.
///
/// The limit fields are only meaningful (and only validated) when
/// `enabled` is true; a disabled risk section turns off both the
/// position controller and trend-based spread widening.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Master switch for position risk control.
    #[serde(default)]
    pub enabled: bool,

    /// Absolute position size above which reduction kicks in.
    #[serde(default)]
    pub max_position_size: Decimal,

    /// Holding age above which reduction kicks in.
    #[serde(default)]
    pub max_position_age_secs: u64,

    /// Minimum wait between two age-triggered reductions.
    #[serde(default)]
    pub reduce_interval_secs: u64,

    /// Trend strength above which spreads widen and exposure is trimmed.
    #[serde(default = "default_trend_threshold")]
    pub trend_threshold: Decimal,

    /// Trend strength treated as fully saturated.
    #[serde(default = "default_trend_ceiling")]
    pub trend_ceiling: Decimal,

    /// Directional moves tracked by the trend indicator.
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,

    /// Directional moves required before the indicator reports.
    #[serde(default = "default_trend_min_samples")]
    pub trend_min_samples: usize,
}

impl RiskConfig {
    fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.max_position_size <= Decimal::ZERO {
            return Err(CoreError::InvalidConfig(
                "risk.max_position_size must be positive when risk is enabled".to_string(),
            ));
        }
        if self.max_position_age_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "risk.max_position_age_secs must be positive when risk is enabled".to_string(),
            ));
        }
        if self.reduce_interval_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "risk.reduce_interval_secs must be positive when risk is enabled".to_string(),
            ));
        }
        if self.trend_threshold < Decimal::ZERO {
            return Err(CoreError::InvalidConfig(
                "risk.trend_threshold must not be negative".to_string(),
            ));
        }
        if self.trend_ceiling <= self.trend_threshold {
            return Err(CoreError::InvalidConfig(
                "risk.trend_ceiling must exceed risk.trend_threshold".to_string(),
            ));
        }
        if self.trend_window == 0 || self.trend_min_samples == 0 {
            return Err(CoreError::InvalidConfig(
                "risk.trend_window and risk.trend_min_samples must be at least 1".to_string(),
            ));
        }
        if self.trend_min_samples > self.trend_window {
            return Err(CoreError::InvalidConfig(
                "risk.trend_min_samples must not exceed risk.trend_window".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_position_size: Decimal::ZERO,
            max_position_age_secs: 0,
            reduce_interval_secs: 0,
            trend_threshold: default_trend_threshold(),
            trend_ceiling: default_trend_ceiling(),
            trend_window: default_trend_window(),
            trend_min_samples: default_trend_min_samples(),
        }
    }
}

/// Everything the engine needs for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub symbol: Symbol,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub risk: RiskConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.symbol.is_empty() {
            return Err(CoreError::InvalidConfig(
                "symbol must not be empty".to_string(),
            ));
        }
        self.grid.validate()?;
        self.sweep.validate()?;
        self.risk.validate()?;
        Ok(())
    }
}

fn default_price_step() -> Decimal {
    dec!(20)
}

fn default_grid_count() -> u32 {
    5
}

fn default_price_spread() -> Decimal {
    dec!(200)
}

fn default_order_quantity() -> Decimal {
    dec!(0.0001)
}

fn default_quantity_step() -> Decimal {
    dec!(0.0001)
}

fn default_sleep_interval_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_stale_seconds() -> u64 {
    5
}

fn default_cancel_probability() -> f64 {
    0.5
}

fn default_trend_threshold() -> Decimal {
    dec!(25)
}

fn default_trend_ceiling() -> Decimal {
    dec!(60)
}

fn default_trend_window() -> usize {
    64
}

fn default_trend_min_samples() -> usize {
    8
}
