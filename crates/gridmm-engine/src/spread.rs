//! Trend-aware spread widening.
//!
//! In a trending market the grid backs away from the price: the base
//! spread widens linearly with trend strength, saturating at the band
//! limit so the first rung can never leave the ±1% envelope.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use gridmm_core::Price;

/// Effective spread for this cycle.
///
/// With no reading (indicator warming up, or trend tracking disabled)
/// or a reading at or below `activation`, the configured default wins.
/// Above it, the spread interpolates from `default_spread` at
/// `activation` to 1% of the reference at `saturation`; stronger
/// readings clamp to `saturation`.
pub fn effective_spread(
    strength: Option<Decimal>,
    reference: Price,
    default_spread: Decimal,
    activation: Decimal,
    saturation: Decimal,
) -> Decimal {
    let strength = match strength {
        Some(s) => s,
        None => return default_spread,
    };
    if strength <= activation {
        return default_spread;
    }

    let max_spread = reference.inner() * dec!(0.01);
    let clamped = strength.min(saturation);
    let ratio = (clamped - activation) / (saturation - activation);
    let widened = default_spread + ratio * (max_spread - default_spread);
    widened.min(max_spread)
}
