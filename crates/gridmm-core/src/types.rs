//! Common data types for exchange state.
//!
//! Contains the ticker, resting-order, position, and balance snapshots
//! the engine reads back from a venue each cycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decimal::{Price, Size};
use crate::order::{OrderSide, OrderStatus};

/// Trading symbol, e.g. `BTC-USD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Ticker snapshot for one symbol.
///
/// Venues do not always publish all three prices, so each field is
/// optional and consumers pick the best available reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ticker {
    pub mark_price: Option<Price>,
    pub mid_price: Option<Price>,
    pub last_price: Option<Price>,
}

impl Ticker {
    /// Reference price in preference order: mark, then mid, then last.
    pub fn reference_price(&self) -> Option<Price> {
        self.mark_price.or(self.mid_price).or(self.last_price)
    }
}

/// A resting order as reported by the venue.
///
/// `order_id` stays a string here: id formats vary by venue, and the
/// engine decides which ids it can work with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOrder {
    pub order_id: String,
    pub side: OrderSide,
    pub price: Option<Price>,
    pub quantity: Size,
    pub status: OrderStatus,
    /// Placement time in epoch milliseconds, when the venue reports it.
    pub created_at: Option<u64>,
}

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// The order side that shrinks this position.
    pub fn close_side(&self) -> OrderSide {
        match self {
            Self::Long => OrderSide::Sell,
            Self::Short => OrderSide::Buy,
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// An open position on one symbol. `size` is an absolute magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub side: PositionSide,
    pub size: Size,
    pub entry_price: Option<Price>,
}

impl Position {
    pub fn is_flat(&self) -> bool {
        self.size.is_zero()
    }
}

/// One asset's balance as reported by the venue.
///
/// Optional fields mirror the venue response: not every account type
/// reports margin figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub asset: String,
    pub total: Decimal,
    pub available: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equity: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_used: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reference_price_preference() {
        let full = Ticker {
            mark_price: Some(Price::new(dec!(100))),
            mid_price: Some(Price::new(dec!(101))),
            last_price: Some(Price::new(dec!(102))),
        };
        assert_eq!(full.reference_price(), Some(Price::new(dec!(100))));

        let no_mark = Ticker {
            mark_price: None,
            ..full
        };
        assert_eq!(no_mark.reference_price(), Some(Price::new(dec!(101))));

        let last_only = Ticker {
            mark_price: None,
            mid_price: None,
            last_price: Some(Price::new(dec!(102))),
        };
        assert_eq!(last_only.reference_price(), Some(Price::new(dec!(102))));

        assert_eq!(Ticker::default().reference_price(), None);
    }

    #[test]
    fn test_close_side() {
        assert_eq!(PositionSide::Long.close_side(), OrderSide::Sell);
        assert_eq!(PositionSide::Short.close_side(), OrderSide::Buy);
    }

    #[test]
    fn test_position_flatness() {
        let pos = Position {
            side: PositionSide::Long,
            size: Size::ZERO,
            entry_price: None,
        };
        assert!(pos.is_flat());

        let pos = Position {
            size: Size::new(dec!(0.3)),
            ..pos
        };
        assert!(!pos.is_flat());
    }
}
