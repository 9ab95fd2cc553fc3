//! Position risk control.
//!
//! A small state machine follows the account between flat and holding,
//! and while holding checks three reduction rules in strict priority:
//! oversize first, then age (throttled by a minimum interval between
//! reductions), then trend exposure. The first rule that matches wins
//! and decides what fraction of the position to close. Reduction is
//! passive: a reduce-only limit order resting one grid offset beyond
//! the reference price on the closing side.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;

use gridmm_core::{OrderRequest, Position, Price, Symbol};
use gridmm_trend::TrendState;

use crate::config::{GridConfig, RiskConfig};

/// Why a reduction was triggered. Each reason carries its own close
/// fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceReason {
    /// Position size breached the hard cap.
    Oversize,
    /// Position has been held past the age limit.
    MaxAge,
    /// Market is trending against a grid that keeps accumulating.
    TrendExposure,
}

impl ReduceReason {
    pub fn close_ratio(&self) -> Decimal {
        match self {
            Self::Oversize => dec!(0.5),
            Self::MaxAge => dec!(0.3),
            Self::TrendExposure => dec!(0.4),
        }
    }
}

impl fmt::Display for ReduceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oversize => write!(f, "oversize"),
            Self::MaxAge => write!(f, "max_age"),
            Self::TrendExposure => write!(f, "trend_exposure"),
        }
    }
}

/// Tracks holding state across cycles.
#[derive(Debug, Default)]
pub struct PositionMonitor {
    opened_at_ms: Option<u64>,
    last_reduce_ms: Option<u64>,
}

impl PositionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened_at_ms(&self) -> Option<u64> {
        self.opened_at_ms
    }

    pub fn last_reduce_ms(&self) -> Option<u64> {
        self.last_reduce_ms
    }

    /// Fold the cycle's position read into the state machine.
    ///
    /// The first non-flat observation records the opening time; going
    /// flat clears both timestamps so the next position starts fresh.
    pub fn observe(&mut self, position: Option<&Position>, now_ms: u64) {
        let holding = position.map(|p| !p.is_flat()).unwrap_or(false);
        if holding {
            if self.opened_at_ms.is_none() {
                self.opened_at_ms = Some(now_ms);
            }
        } else {
            self.opened_at_ms = None;
            self.last_reduce_ms = None;
        }
    }

    /// Apply the reduction rules to a non-flat position. First match
    /// wins; a throttled age breach falls through to the trend rule.
    ///
    /// Only an age-triggered reduction updates `last_reduce_ms`; the
    /// oversize rule keeps firing every cycle until the size is back
    /// under the cap.
    pub fn evaluate(
        &mut self,
        position: &Position,
        trend: TrendState,
        config: &RiskConfig,
        now_ms: u64,
    ) -> Option<ReduceReason> {
        if position.is_flat() {
            return None;
        }

        if position.size.inner() > config.max_position_size {
            return Some(ReduceReason::Oversize);
        }

        if let Some(opened_at) = self.opened_at_ms {
            let age_ms = now_ms.saturating_sub(opened_at);
            if age_ms > config.max_position_age_secs.saturating_mul(1000) {
                let due = match self.last_reduce_ms {
                    None => true,
                    Some(last) => {
                        now_ms.saturating_sub(last)
                            > config.reduce_interval_secs.saturating_mul(1000)
                    }
                };
                if due {
                    self.last_reduce_ms = Some(now_ms);
                    return Some(ReduceReason::MaxAge);
                }
            }
        }

        if trend == TrendState::Trend {
            return Some(ReduceReason::TrendExposure);
        }

        None
    }
}

/// Builds the passive reduce-only order for a triggered reduction.
pub struct ReduceOrderBuilder;

impl ReduceOrderBuilder {
    /// `None` when the close size rounds below one lot; sub-lot
    /// remainders are left to the next breach.
    ///
    /// Longs are closed by a sell resting above the reference, shorts
    /// by a buy resting below, each offset by `spread + price_step` so
    /// the close earns the grid's edge instead of crossing the book.
    pub fn create(
        symbol: &Symbol,
        position: &Position,
        reason: ReduceReason,
        reference: Price,
        spread: Decimal,
        grid: &GridConfig,
    ) -> Option<OrderRequest> {
        let close_size =
            (position.size * reason.close_ratio()).round_to_lot(grid.quantity_step);
        if !close_size.is_positive() {
            return None;
        }

        let offset = Price::new(spread + grid.price_step);
        let raw_price = match position.side {
            gridmm_core::PositionSide::Long => reference + offset,
            gridmm_core::PositionSide::Short => reference - offset,
        };
        let price = raw_price.truncate_scale(grid.price_scale());

        Some(
            OrderRequest::limit(symbol.clone(), position.side.close_side(), close_size, price)
                .reduce_only(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmm_core::{OrderSide, PositionSide, Size};

    fn risk_config() -> RiskConfig {
        RiskConfig {
            enabled: true,
            max_position_size: dec!(1),
            max_position_age_secs: 300,
            reduce_interval_secs: 60,
            ..RiskConfig::default()
        }
    }

    fn long(size: Decimal) -> Position {
        Position {
            side: PositionSide::Long,
            size: Size::new(size),
            entry_price: Some(Price::new(dec!(100000))),
        }
    }

    fn short(size: Decimal) -> Position {
        Position {
            side: PositionSide::Short,
            size: Size::new(size),
            entry_price: Some(Price::new(dec!(100000))),
        }
    }

    const T0: u64 = 1_700_000_000_000;

    #[test]
    fn test_flat_cycles_leave_no_state() {
        let mut monitor = PositionMonitor::new();
        monitor.observe(None, T0);
        monitor.observe(None, T0 + 5_000);
        assert_eq!(monitor.opened_at_ms(), None);
        assert_eq!(monitor.last_reduce_ms(), None);
    }

    #[test]
    fn test_open_time_recorded_once() {
        let mut monitor = PositionMonitor::new();
        let position = long(dec!(0.5));
        monitor.observe(Some(&position), T0);
        monitor.observe(Some(&position), T0 + 5_000);
        assert_eq!(monitor.opened_at_ms(), Some(T0));
    }

    #[test]
    fn test_going_flat_clears_timestamps() {
        let mut monitor = PositionMonitor::new();
        let config = risk_config();
        let position = long(dec!(0.5));

        monitor.observe(Some(&position), T0);
        // Force an age reduction so last_reduce_ms is set.
        let later = T0 + 301_000;
        monitor.observe(Some(&position), later);
        assert_eq!(
            monitor.evaluate(&position, TrendState::Range, &config, later),
            Some(ReduceReason::MaxAge)
        );
        assert!(monitor.last_reduce_ms().is_some());

        let zero = long(dec!(0));
        monitor.observe(Some(&zero), later + 1_000);
        assert_eq!(monitor.opened_at_ms(), None);
        assert_eq!(monitor.last_reduce_ms(), None);
    }

    #[test]
    fn test_oversize_wins_over_age() {
        let mut monitor = PositionMonitor::new();
        let config = risk_config();
        let position = long(dec!(2));

        monitor.observe(Some(&position), T0);
        let later = T0 + 600_000;
        monitor.observe(Some(&position), later);

        // Both size and age are breached; oversize wins and the age
        // throttle stays untouched.
        assert_eq!(
            monitor.evaluate(&position, TrendState::Range, &config, later),
            Some(ReduceReason::Oversize)
        );
        assert_eq!(monitor.last_reduce_ms(), None);
    }

    #[test]
    fn test_size_at_cap_does_not_trigger() {
        let mut monitor = PositionMonitor::new();
        let config = risk_config();
        let position = long(dec!(1));
        monitor.observe(Some(&position), T0);
        assert_eq!(
            monitor.evaluate(&position, TrendState::Range, &config, T0 + 1_000),
            None
        );
    }

    #[test]
    fn test_age_rule_throttled_by_interval() {
        let mut monitor = PositionMonitor::new();
        let config = risk_config();
        let position = long(dec!(0.5));
        monitor.observe(Some(&position), T0);

        let first = T0 + 301_000;
        assert_eq!(
            monitor.evaluate(&position, TrendState::Range, &config, first),
            Some(ReduceReason::MaxAge)
        );
        assert_eq!(monitor.last_reduce_ms(), Some(first));

        // 60s interval: a breach 30s later is throttled.
        let tight = first + 30_000;
        assert_eq!(
            monitor.evaluate(&position, TrendState::Range, &config, tight),
            None
        );
        assert_eq!(monitor.last_reduce_ms(), Some(first));

        // Exactly at the interval is still throttled; past it fires again.
        assert_eq!(
            monitor.evaluate(&position, TrendState::Range, &config, first + 60_000),
            None
        );
        let next = first + 60_001;
        assert_eq!(
            monitor.evaluate(&position, TrendState::Range, &config, next),
            Some(ReduceReason::MaxAge)
        );
        assert_eq!(monitor.last_reduce_ms(), Some(next));
    }

    #[test]
    fn test_throttled_age_falls_through_to_trend() {
        let mut monitor = PositionMonitor::new();
        let config = risk_config();
        let position = long(dec!(0.5));
        monitor.observe(Some(&position), T0);

        let first = T0 + 301_000;
        assert_eq!(
            monitor.evaluate(&position, TrendState::Range, &config, first),
            Some(ReduceReason::MaxAge)
        );

        // Age is still breached but throttled; the trend rule still runs.
        assert_eq!(
            monitor.evaluate(&position, TrendState::Trend, &config, first + 1_000),
            Some(ReduceReason::TrendExposure)
        );
    }

    #[test]
    fn test_trend_rule_fires_within_limits() {
        let mut monitor = PositionMonitor::new();
        let config = risk_config();
        let position = long(dec!(0.5));
        monitor.observe(Some(&position), T0);

        assert_eq!(
            monitor.evaluate(&position, TrendState::Trend, &config, T0 + 1_000),
            Some(ReduceReason::TrendExposure)
        );
        assert_eq!(
            monitor.evaluate(&position, TrendState::Range, &config, T0 + 2_000),
            None
        );
    }

    #[test]
    fn test_close_ratios() {
        assert_eq!(ReduceReason::Oversize.close_ratio(), dec!(0.5));
        assert_eq!(ReduceReason::MaxAge.close_ratio(), dec!(0.3));
        assert_eq!(ReduceReason::TrendExposure.close_ratio(), dec!(0.4));
    }

    #[test]
    fn test_reduce_order_for_long() {
        let grid = GridConfig::default();
        let request = ReduceOrderBuilder::create(
            &Symbol::new("BTC-USD"),
            &long(dec!(2)),
            ReduceReason::Oversize,
            Price::new(dec!(100000)),
            dec!(200),
            &grid,
        )
        .unwrap();

        assert_eq!(request.side, OrderSide::Sell);
        assert_eq!(request.price, Price::new(dec!(100220)));
        assert_eq!(request.quantity, Size::new(dec!(1)));
        assert!(request.reduce_only);
    }

    #[test]
    fn test_reduce_order_for_short() {
        let grid = GridConfig::default();
        let request = ReduceOrderBuilder::create(
            &Symbol::new("BTC-USD"),
            &short(dec!(0.5)),
            ReduceReason::TrendExposure,
            Price::new(dec!(100000)),
            dec!(200),
            &grid,
        )
        .unwrap();

        assert_eq!(request.side, OrderSide::Buy);
        assert_eq!(request.price, Price::new(dec!(99780)));
        assert_eq!(request.quantity, Size::new(dec!(0.2)));
        assert!(request.reduce_only);
    }

    #[test]
    fn test_close_size_rounds_to_lot() {
        let mut grid = GridConfig::default();
        grid.quantity_step = dec!(0.1);
        let request = ReduceOrderBuilder::create(
            &Symbol::new("BTC-USD"),
            &long(dec!(1.79)),
            ReduceReason::MaxAge,
            Price::new(dec!(100000)),
            dec!(200),
            &grid,
        )
        .unwrap();
        // 1.79 * 0.3 = 0.537, floored to the 0.1 lot.
        assert_eq!(request.quantity, Size::new(dec!(0.5)));
    }

    #[test]
    fn test_sub_lot_close_is_skipped() {
        let grid = GridConfig::default();
        let request = ReduceOrderBuilder::create(
            &Symbol::new("BTC-USD"),
            &long(dec!(0.0001)),
            ReduceReason::MaxAge,
            Price::new(dec!(100000)),
            dec!(200),
            &grid,
        );
        // 0.0001 * 0.3 rounds below the 0.0001 lot.
        assert!(request.is_none());
    }

    #[test]
    fn test_reduce_price_lands_on_lattice_scale() {
        let mut grid = GridConfig::default();
        grid.price_step = dec!(0.5);
        let request = ReduceOrderBuilder::create(
            &Symbol::new("BTC-USD"),
            &long(dec!(2)),
            ReduceReason::Oversize,
            Price::new(dec!(100000.777)),
            dec!(1.25),
            &grid,
        )
        .unwrap();
        // 100000.777 + 1.75 = 100002.527, truncated to one decimal.
        assert_eq!(request.price, Price::new(dec!(100002.5)));
    }
}
