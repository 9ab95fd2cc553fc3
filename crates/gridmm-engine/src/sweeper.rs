//! Probabilistic stale-order sweep.
//!
//! Long-resting orders are the ones most likely to be mispriced, but
//! cancelling every one of them at once empties the book in a burst.
//! Each over-age order is instead cancelled with a configured
//! probability per cycle; survivors are simply candidates again next
//! cycle.

use rand::Rng;

use gridmm_core::OpenOrder;

use crate::config::SweepConfig;

/// Selects which resting orders to cancel for staleness.
#[derive(Debug)]
pub struct StaleSweeper<R: Rng> {
    stale_ms: u64,
    cancel_probability: f64,
    rng: R,
}

impl<R: Rng> StaleSweeper<R> {
    pub fn new(config: &SweepConfig, rng: R) -> Self {
        Self {
            stale_ms: config.stale_seconds.saturating_mul(1000),
            cancel_probability: config.cancel_probability,
            rng,
        }
    }

    /// Pick cancellable ids from a venue snapshot.
    ///
    /// An order qualifies when it is live, carries a parseable id and a
    /// placement time, and has rested strictly longer than the
    /// threshold. The probability draw happens only for qualifying
    /// orders, so selection order stays reproducible under a seeded rng.
    pub fn select(&mut self, orders: &[OpenOrder], now_ms: u64) -> Vec<u64> {
        let mut stale = Vec::new();
        for order in orders {
            if !order.status.is_live() {
                continue;
            }
            let Some(created_at) = order.created_at else {
                continue;
            };
            let Ok(order_id) = order.order_id.trim().parse::<u64>() else {
                continue;
            };
            if now_ms.saturating_sub(created_at) > self.stale_ms
                && self.rng.gen::<f64>() < self.cancel_probability
            {
                stale.push(order_id);
            }
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmm_core::{OrderSide, OrderStatus, Price, Size};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    const NOW_MS: u64 = 1_700_000_100_000;

    fn sweeper(stale_seconds: u64, cancel_probability: f64, seed: u64) -> StaleSweeper<StdRng> {
        let config = SweepConfig {
            enabled: true,
            stale_seconds,
            cancel_probability,
        };
        StaleSweeper::new(&config, StdRng::seed_from_u64(seed))
    }

    fn resting(id: &str, age_ms: u64) -> OpenOrder {
        OpenOrder {
            order_id: id.to_string(),
            side: OrderSide::Buy,
            price: Some(Price::new(dec!(99800))),
            quantity: Size::new(dec!(0.0001)),
            status: OrderStatus::Open,
            created_at: Some(NOW_MS - age_ms),
        }
    }

    #[test]
    fn test_certain_probability_sweeps_all_overage() {
        let orders = vec![resting("1", 6_000), resting("2", 10_000), resting("3", 1_000)];
        let mut sweeper = sweeper(5, 1.0, 7);
        assert_eq!(sweeper.select(&orders, NOW_MS), vec![1, 2]);
    }

    #[test]
    fn test_zero_probability_sweeps_nothing() {
        let orders = vec![resting("1", 60_000), resting("2", 60_000)];
        let mut sweeper = sweeper(5, 0.0, 7);
        assert!(sweeper.select(&orders, NOW_MS).is_empty());
    }

    #[test]
    fn test_exact_threshold_age_is_not_stale() {
        let orders = vec![resting("1", 5_000)];
        let mut sweeper = sweeper(5, 1.0, 7);
        assert!(sweeper.select(&orders, NOW_MS).is_empty());

        let orders = vec![resting("1", 5_001)];
        assert_eq!(sweeper.select(&orders, NOW_MS), vec![1]);
    }

    #[test]
    fn test_missing_created_at_skipped() {
        let mut order = resting("1", 60_000);
        order.created_at = None;
        let mut sweeper = sweeper(5, 1.0, 7);
        assert!(sweeper.select(&[order], NOW_MS).is_empty());
    }

    #[test]
    fn test_unparseable_id_skipped() {
        let orders = vec![resting("legacy-77", 60_000), resting("78", 60_000)];
        let mut sweeper = sweeper(5, 1.0, 7);
        assert_eq!(sweeper.select(&orders, NOW_MS), vec![78]);
    }

    #[test]
    fn test_non_live_orders_skipped() {
        let mut order = resting("1", 60_000);
        order.status = OrderStatus::Filled;
        let mut sweeper = sweeper(5, 1.0, 7);
        assert!(sweeper.select(&[order], NOW_MS).is_empty());
    }

    #[test]
    fn test_same_seed_same_selection() {
        let orders: Vec<OpenOrder> = (0..64)
            .map(|i| resting(&i.to_string(), 6_000 + i))
            .collect();

        let picks_a = sweeper(5, 0.5, 42).select(&orders, NOW_MS);
        let picks_b = sweeper(5, 0.5, 42).select(&orders, NOW_MS);
        assert_eq!(picks_a, picks_b);

        // A coin-flip probability over 64 candidates should neither
        // sweep everything nor nothing.
        assert!(!picks_a.is_empty());
        assert!(picks_a.len() < orders.len());
    }

    #[test]
    fn test_future_created_at_not_stale() {
        let mut order = resting("1", 0);
        order.created_at = Some(NOW_MS + 10_000);
        let mut sweeper = sweeper(5, 1.0, 7);
        assert!(sweeper.select(&[order], NOW_MS).is_empty());
    }
}
