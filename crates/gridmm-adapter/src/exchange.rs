//! Venue-neutral adapter surface.
//!
//! The engine talks to exchanges exclusively through this trait, so a
//! venue integration is one impl block and the engine never changes.

use async_trait::async_trait;

use gridmm_core::{BalanceSnapshot, OpenOrder, OrderAck, OrderRequest, Position, Symbol, Ticker};

use crate::error::{AdapterError, AdapterResult};

/// Operations a venue must provide for the grid to run.
///
/// Read calls return snapshots; write calls are fire-and-forget from the
/// engine's perspective (the next cycle re-reads venue state rather than
/// tracking acks).
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    /// Current ticker for the symbol.
    async fn get_ticker(&self, symbol: &Symbol) -> AdapterResult<Ticker>;

    /// All resting orders for the symbol, any status.
    async fn get_open_orders(&self, symbol: &Symbol) -> AdapterResult<Vec<OpenOrder>>;

    /// Submit one order.
    async fn place_order(&self, request: &OrderRequest) -> AdapterResult<OrderAck>;

    /// Cancel one order by venue id.
    async fn cancel_order(&self, order_id: u64) -> AdapterResult<()>;

    /// Cancel a batch of orders in one call.
    ///
    /// Venues without a batch endpoint inherit this default; callers
    /// detect `NotSupported` and fall back to per-order cancellation.
    async fn cancel_orders_by_ids(&self, order_ids: &[u64]) -> AdapterResult<()> {
        let _ = order_ids;
        Err(AdapterError::NotSupported("bulk cancel"))
    }

    /// Open position for the symbol, `None` when flat.
    async fn get_position(&self, symbol: &Symbol) -> AdapterResult<Option<Position>>;

    /// Account balances across assets.
    async fn get_balances(&self) -> AdapterResult<Vec<BalanceSnapshot>>;
}
