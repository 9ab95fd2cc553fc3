//! Symmetric grid generation.
//!
//! Rungs are anchored on the `price_step` lattice and capped by a hard
//! band of ±1% around the reference price. A wide spread can push a
//! side's anchor outside the band, in which case that side simply gets
//! fewer rungs, possibly none.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use gridmm_core::{CoreError, Price, Result};

/// Band half-width as a fraction of the reference price.
const BAND_PCT: Decimal = dec!(0.01);

/// Desired resting prices for both sides, each sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LadderPair {
    pub bids: Vec<Price>,
    pub asks: Vec<Price>,
}

impl LadderPair {
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

/// Build the desired grid around `reference`.
///
/// The bid anchor is `floor((reference - spread) / step) * step` and the
/// ask anchor is `ceil((reference + spread) / step) * step`; `count`
/// rungs walk outward from each anchor. Bids only need the lower band
/// check and asks only the upper one, since each side walks away from
/// the reference.
pub fn generate_ladders(
    reference: Price,
    spread: Decimal,
    step: Decimal,
    count: u32,
) -> Result<LadderPair> {
    if step <= Decimal::ZERO {
        return Err(CoreError::InvalidConfig(
            "price step must be positive".to_string(),
        ));
    }
    if spread < Decimal::ZERO {
        return Err(CoreError::InvalidConfig(
            "price spread must not be negative".to_string(),
        ));
    }

    let band_low = reference * (Decimal::ONE - BAND_PCT);
    let band_high = reference * (Decimal::ONE + BAND_PCT);

    let bid_anchor = Price::new(reference.inner() - spread).floor_to_step(step);
    let ask_anchor = Price::new(reference.inner() + spread).ceil_to_step(step);

    let mut bids = Vec::with_capacity(count as usize);
    for i in 0..count {
        let rung = Price::new(bid_anchor.inner() - step * Decimal::from(i));
        if rung >= band_low {
            bids.push(rung);
        }
    }
    bids.reverse();

    let mut asks = Vec::with_capacity(count as usize);
    for i in 0..count {
        let rung = Price::new(ask_anchor.inner() + step * Decimal::from(i));
        if rung <= band_high {
            asks.push(rung);
        }
    }

    Ok(LadderPair { bids, asks })
}
