//! Rolling directional-strength indicator.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use gridmm_core::Price;

/// Market regime as seen by the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendState {
    /// Price is moving persistently in one direction.
    Trend,
    /// Price is oscillating with no dominant direction.
    Range,
}

impl fmt::Display for TrendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trend => write!(f, "trend"),
            Self::Range => write!(f, "range"),
        }
    }
}

/// Tracks the direction of recent price moves over a rolling window.
///
/// Strength is `|2 * up_ratio - 1| * 100`: 0 for a market that goes up
/// as often as down, 100 for one moving in a single direction. Until
/// `min_samples` directional moves are observed the indicator reports
/// nothing, so consumers fall back to their defaults instead of acting
/// on noise.
#[derive(Debug)]
pub struct DirectionalIndex {
    /// Recent directional moves: true = up, false = down.
    recent_directions: VecDeque<bool>,
    /// Last reference price seen.
    last_price: Option<Decimal>,
    /// Window size, in directional moves.
    window: usize,
    /// Moves required before `strength` reports a value.
    min_samples: usize,
}

impl DirectionalIndex {
    pub fn new(window: usize, min_samples: usize) -> Self {
        Self {
            recent_directions: VecDeque::with_capacity(window),
            last_price: None,
            window,
            min_samples,
        }
    }

    /// Record a reference-price observation.
    ///
    /// Repeats of the same price carry no directional information and
    /// are not counted against the window.
    pub fn record(&mut self, price: Price) {
        let price = price.inner();
        if let Some(last) = self.last_price {
            if price != last {
                let is_up = price > last;
                if self.recent_directions.len() >= self.window {
                    self.recent_directions.pop_front();
                }
                self.recent_directions.push_back(is_up);
            }
        }
        self.last_price = Some(price);
    }

    /// Directional strength in [0, 100], or `None` while warming up.
    pub fn strength(&self) -> Option<Decimal> {
        let total = self.recent_directions.len();
        if total < self.min_samples {
            return None;
        }
        let up_count = self.recent_directions.iter().filter(|&&d| d).count();
        let up_ratio = Decimal::from(up_count as u64) / Decimal::from(total as u64);
        Some((up_ratio * dec!(2) - dec!(1)).abs() * dec!(100))
    }

    /// Classify the market: strength strictly above `threshold` is a trend.
    pub fn classify(&self, threshold: Decimal) -> TrendState {
        match self.strength() {
            Some(strength) if strength > threshold => TrendState::Trend,
            _ => TrendState::Range,
        }
    }
}
