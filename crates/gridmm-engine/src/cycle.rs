//! The per-cycle driver.
//!
//! One cycle runs the full pipeline: reference price, effective spread,
//! desired grid, live-order read, stale sweep, reconciliation (cancels
//! before placements), then position risk. Every step after the
//! reference price degrades on its own: a failed read or write is
//! logged and the cycle keeps going, leaning on the next cycle's
//! snapshot to repair whatever was missed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, info, warn};

use gridmm_adapter::ExchangeAdapter;
use gridmm_core::{OrderRequest, OrderSide, Price, Size, Symbol};
use gridmm_trend::DirectionalIndex;

use crate::book::LadderBook;
use crate::config::{CancelMode, EngineConfig};
use crate::error::{EngineError, EngineResult};
use crate::grid::generate_ladders;
use crate::reconcile::{diff_ladders, drift_cancels, LadderDiff};
use crate::risk::{PositionMonitor, ReduceOrderBuilder, ReduceReason};
use crate::spread::effective_spread;
use crate::sweeper::StaleSweeper;

/// What one cycle saw and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub reference_price: Price,
    pub spread: Decimal,
    pub trend_strength: Option<Decimal>,
    pub desired_bids: usize,
    pub desired_asks: usize,
    pub swept: usize,
    pub cancelled: usize,
    pub placed: usize,
    pub reduce_reason: Option<ReduceReason>,
}

impl CycleReport {
    /// A quiet cycle touched nothing on the venue.
    pub fn is_quiet(&self) -> bool {
        self.swept == 0 && self.cancelled == 0 && self.placed == 0 && self.reduce_reason.is_none()
    }
}

/// Grid engine for a single symbol.
pub struct Engine<A, R: Rng = StdRng> {
    adapter: A,
    config: EngineConfig,
    trend: DirectionalIndex,
    monitor: PositionMonitor,
    sweeper: StaleSweeper<R>,
}

impl<A: ExchangeAdapter> Engine<A> {
    pub fn new(adapter: A, config: EngineConfig) -> Self {
        Self::with_rng(adapter, config, StdRng::from_entropy())
    }
}

impl<A: ExchangeAdapter, R: Rng> Engine<A, R> {
    /// Construct with an explicit rng so sweep behavior can be seeded.
    pub fn with_rng(adapter: A, config: EngineConfig, rng: R) -> Self {
        let trend = DirectionalIndex::new(config.risk.trend_window, config.risk.trend_min_samples);
        let sweeper = StaleSweeper::new(&config.sweep, rng);
        Self {
            adapter,
            config,
            trend,
            monitor: PositionMonitor::new(),
            sweeper,
        }
    }

    /// Run cycles forever, sleeping the configured interval between
    /// them. Failed cycles are logged and retried on the same cadence.
    pub async fn run(&mut self) {
        let interval = Duration::from_secs(self.config.grid.sleep_interval_secs);
        info!(symbol = %self.config.symbol, "Grid engine running");
        loop {
            match self.run_cycle().await {
                Ok(report) if report.is_quiet() => {
                    debug!(
                        reference = %report.reference_price,
                        spread = %report.spread,
                        "Cycle complete, ladder unchanged"
                    );
                }
                Ok(report) => {
                    info!(
                        reference = %report.reference_price,
                        spread = %report.spread,
                        placed = report.placed,
                        cancelled = report.cancelled,
                        swept = report.swept,
                        "Cycle complete"
                    );
                }
                Err(e) => {
                    warn!(error = %e, "Cycle failed, retrying next interval");
                }
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Execute one full cycle.
    ///
    /// The only hard failure is losing the reference price; everything
    /// downstream degrades per component.
    pub async fn run_cycle(&mut self) -> EngineResult<CycleReport> {
        let now_ms = chrono::Utc::now().timestamp_millis() as u64;
        let symbol = self.config.symbol.clone();

        // Reference price. Without one there is nothing to anchor the
        // grid to, so the cycle stops here.
        let ticker = self.adapter.get_ticker(&symbol).await?;
        let reference = ticker
            .reference_price()
            .filter(|p| p.is_positive())
            .ok_or_else(|| EngineError::MissingReferencePrice(symbol.clone()))?;

        // Effective spread. The trend indicator only runs when risk
        // management wants it; otherwise the configured default holds.
        let trend_strength = if self.config.risk.enabled {
            self.trend.record(reference);
            self.trend.strength()
        } else {
            None
        };
        let spread = effective_spread(
            trend_strength,
            reference,
            self.config.grid.price_spread,
            self.config.risk.trend_threshold,
            self.config.risk.trend_ceiling,
        );

        // Desired grid for this cycle.
        let desired = generate_ladders(
            reference,
            spread,
            self.config.grid.price_step,
            self.config.grid.grid_count,
        )?;

        // Live order state. A failed read means an empty book: the
        // worst case is re-placing orders that already rest, never
        // cancelling ones that should stay.
        let orders = match self.adapter.get_open_orders(&symbol).await {
            Ok(orders) => orders,
            Err(e) => {
                warn!(error = %e, "Open-orders read failed, treating book as empty");
                Vec::new()
            }
        };
        let book = LadderBook::from_orders(&orders, self.config.grid.price_scale());

        // Stale sweep, before reconciliation has a chance to refresh
        // the very orders the sweep wants gone.
        let swept = if self.config.sweep.enabled {
            let stale_ids = self.sweeper.select(&orders, now_ms);
            self.cancel_ids(&stale_ids).await
        } else {
            0
        };

        // Reconcile: cancels first, then placements.
        let LadderDiff {
            cancel_bids,
            cancel_asks,
            place_bids,
            place_asks,
        } = diff_ladders(&desired, &book);

        let (cancel_bids, cancel_asks) = match self.config.grid.cancel_mode {
            CancelMode::Reconcile => (cancel_bids, cancel_asks),
            CancelMode::Drift => drift_cancels(&book, reference, spread, self.config.grid.price_step),
        };

        let mut cancel_ids = book.collect_ids(OrderSide::Buy, &cancel_bids);
        cancel_ids.extend(book.collect_ids(OrderSide::Sell, &cancel_asks));
        let cancelled = self.cancel_ids(&cancel_ids).await;

        let placed = self.place_rungs(&symbol, &place_bids, &place_asks).await;

        // Position risk, last: it reacts to fills, not to the orders
        // this cycle just placed.
        let reduce_reason = if self.config.risk.enabled {
            self.check_position_risk(&symbol, spread, now_ms).await
        } else {
            None
        };

        Ok(CycleReport {
            reference_price: reference,
            spread,
            trend_strength,
            desired_bids: desired.bids.len(),
            desired_asks: desired.asks.len(),
            swept,
            cancelled,
            placed,
            reduce_reason,
        })
    }

    /// Cancel a batch of ids, preferring the venue's bulk endpoint and
    /// falling back to per-order cancels when there is none. Returns
    /// how many cancellations went through.
    async fn cancel_ids(&self, ids: &[u64]) -> usize {
        if ids.is_empty() {
            return 0;
        }
        match self.adapter.cancel_orders_by_ids(ids).await {
            Ok(()) => ids.len(),
            Err(e) if e.is_not_supported() => {
                let mut done = 0;
                for &id in ids {
                    match self.adapter.cancel_order(id).await {
                        Ok(()) => done += 1,
                        Err(e) => warn!(order_id = id, error = %e, "Cancel failed"),
                    }
                }
                done
            }
            Err(e) => {
                warn!(error = %e, count = ids.len(), "Bulk cancel failed");
                0
            }
        }
    }

    /// Place the missing rungs, one order per price. A rejected price
    /// affects only itself.
    async fn place_rungs(&self, symbol: &Symbol, bids: &[Price], asks: &[Price]) -> usize {
        let quantity = Size::new(self.config.grid.order_quantity);
        let mut placed = 0;

        for (side, prices) in [(OrderSide::Buy, bids), (OrderSide::Sell, asks)] {
            for &price in prices {
                let request = OrderRequest::limit(symbol.clone(), side, quantity, price);
                match self.adapter.place_order(&request).await {
                    Ok(ack) => {
                        placed += 1;
                        debug!(order_id = %ack.order_id, side = %side, price = %price, "Rung placed");
                    }
                    Err(e) => {
                        warn!(side = %side, price = %price, error = %e, "Rung placement failed");
                    }
                }
            }
        }
        placed
    }

    /// Read the position, advance the monitor, and place a reduce-only
    /// order if a rule fired. A failed position read leaves the monitor
    /// untouched so holding age survives transient read errors.
    async fn check_position_risk(
        &mut self,
        symbol: &Symbol,
        spread: Decimal,
        now_ms: u64,
    ) -> Option<ReduceReason> {
        let position = match self.adapter.get_position(symbol).await {
            Ok(position) => position,
            Err(e) => {
                warn!(error = %e, "Position read failed, skipping risk check");
                return None;
            }
        };

        self.monitor.observe(position.as_ref(), now_ms);
        let position = position.filter(|p| !p.is_flat())?;

        let trend = self.trend.classify(self.config.risk.trend_threshold);
        let reason = self
            .monitor
            .evaluate(&position, trend, &self.config.risk, now_ms)?;
        info!(
            reason = %reason,
            side = %position.side,
            size = %position.size,
            "Position reduction triggered"
        );

        // Fresh reference for the close; the grid's may be a cycle old
        // by now. No usable price means no reduce order this cycle.
        let reference = match self.adapter.get_ticker(symbol).await {
            Ok(ticker) => ticker.reference_price().filter(|p| p.is_positive()),
            Err(e) => {
                warn!(error = %e, "Ticker read for reduce order failed");
                None
            }
        };
        let Some(reference) = reference else {
            return Some(reason);
        };

        if let Some(request) = ReduceOrderBuilder::create(
            symbol,
            &position,
            reason,
            reference,
            spread,
            &self.config.grid,
        ) {
            match self.adapter.place_order(&request).await {
                Ok(ack) => info!(
                    order_id = %ack.order_id,
                    price = %request.price,
                    quantity = %request.quantity,
                    "Reduce order placed"
                ),
                Err(e) => warn!(error = %e, "Reduce order placement failed"),
            }
        }

        Some(reason)
    }
}
