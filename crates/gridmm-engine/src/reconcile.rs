//! Desired-versus-live ladder reconciliation.
//!
//! Pure set arithmetic: cancel what is live but no longer wanted, place
//! what is wanted but not live, leave the overlap alone. Running it
//! twice against the same inputs yields the same plan, so a crashed
//! cycle costs nothing but time.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;

use gridmm_core::Price;

use crate::book::LadderBook;
use crate::grid::LadderPair;

/// Cancellation and placement plan for one cycle, all price lists
/// sorted ascending.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LadderDiff {
    pub cancel_bids: Vec<Price>,
    pub cancel_asks: Vec<Price>,
    pub place_bids: Vec<Price>,
    pub place_asks: Vec<Price>,
}

impl LadderDiff {
    pub fn is_empty(&self) -> bool {
        self.cancel_bids.is_empty()
            && self.cancel_asks.is_empty()
            && self.place_bids.is_empty()
            && self.place_asks.is_empty()
    }
}

/// Compare the desired grid against the live book.
pub fn diff_ladders(desired: &LadderPair, live: &LadderBook) -> LadderDiff {
    let desired_bids: BTreeSet<Price> = desired.bids.iter().copied().collect();
    let desired_asks: BTreeSet<Price> = desired.asks.iter().copied().collect();

    LadderDiff {
        cancel_bids: live.bid_prices().difference(&desired_bids).copied().collect(),
        cancel_asks: live.ask_prices().difference(&desired_asks).copied().collect(),
        place_bids: desired_bids.difference(live.bid_prices()).copied().collect(),
        place_asks: desired_asks.difference(live.ask_prices()).copied().collect(),
    }
}

/// Drift-based cancellation: drop only orders resting further from the
/// reference than `spread + 2 * step`, strictly.
///
/// An alternative to full reconciliation for slow-moving markets, where
/// near-the-money orders keep their queue position across recenters.
pub fn drift_cancels(
    live: &LadderBook,
    reference: Price,
    spread: Decimal,
    step: Decimal,
) -> (Vec<Price>, Vec<Price>) {
    let max_distance = spread + step * dec!(2);
    let drifted = |price: &&Price| price.distance(reference) > max_distance;

    let bids = live.bid_prices().iter().filter(drifted).copied().collect();
    let asks = live.ask_prices().iter().filter(drifted).copied().collect();
    (bids, asks)
}
