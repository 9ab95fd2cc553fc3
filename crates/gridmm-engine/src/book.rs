//! Live resting-order snapshot, organized for reconciliation.
//!
//! Only orders the venue still considers live make it in; anything with
//! a missing price or an id this client cannot address is dropped
//! rather than failing the batch. Dropping an order means the
//! reconciler sees it as absent, which at worst places one extra order
//! rather than cancelling a good one.

use std::collections::{BTreeMap, BTreeSet};

use gridmm_core::{OpenOrder, OrderSide, Price};

/// Price-indexed view of the live ladder, one entry per side.
#[derive(Debug, Default)]
pub struct LadderBook {
    bids: BTreeSet<Price>,
    asks: BTreeSet<Price>,
    bid_ids: BTreeMap<Price, Vec<u64>>,
    ask_ids: BTreeMap<Price, Vec<u64>>,
}

impl LadderBook {
    /// Index a venue snapshot.
    ///
    /// Prices are truncated to `price_scale` so venue-reported values
    /// compare cleanly against the grid's lattice.
    pub fn from_orders(orders: &[OpenOrder], price_scale: u32) -> Self {
        let mut book = Self::default();
        for order in orders {
            if !order.status.is_live() {
                continue;
            }
            let Some(price) = order.price else {
                continue;
            };
            let Ok(order_id) = order.order_id.trim().parse::<u64>() else {
                continue;
            };
            let price = price.truncate_scale(price_scale);
            match order.side {
                OrderSide::Buy => {
                    book.bids.insert(price);
                    book.bid_ids.entry(price).or_default().push(order_id);
                }
                OrderSide::Sell => {
                    book.asks.insert(price);
                    book.ask_ids.entry(price).or_default().push(order_id);
                }
            }
        }
        book
    }

    pub fn bid_prices(&self) -> &BTreeSet<Price> {
        &self.bids
    }

    pub fn ask_prices(&self) -> &BTreeSet<Price> {
        &self.asks
    }

    /// Ids resting at one price, empty when nothing is there.
    pub fn ids_at(&self, side: OrderSide, price: Price) -> &[u64] {
        let index = match side {
            OrderSide::Buy => &self.bid_ids,
            OrderSide::Sell => &self.ask_ids,
        };
        index.get(&price).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Gather every id at the given prices; unknown prices contribute
    /// nothing, so cancelling an already-gone price is a no-op.
    pub fn collect_ids(&self, side: OrderSide, prices: &[Price]) -> Vec<u64> {
        prices
            .iter()
            .flat_map(|price| self.ids_at(side, *price))
            .copied()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmm_core::{OrderStatus, Size};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn order(id: &str, side: OrderSide, price: Option<Decimal>, status: OrderStatus) -> OpenOrder {
        OpenOrder {
            order_id: id.to_string(),
            side,
            price: price.map(Price::new),
            quantity: Size::new(dec!(0.0001)),
            status,
            created_at: Some(1_700_000_000_000),
        }
    }

    #[test]
    fn test_classifies_sides_and_sorts() {
        let orders = vec![
            order("3", OrderSide::Buy, Some(dec!(99820)), OrderStatus::Open),
            order("1", OrderSide::Buy, Some(dec!(99800)), OrderStatus::Pending),
            order("2", OrderSide::Sell, Some(dec!(100200)), OrderStatus::PartiallyFilled),
        ];
        let book = LadderBook::from_orders(&orders, 0);

        let bids: Vec<Price> = book.bid_prices().iter().copied().collect();
        assert_eq!(bids, vec![Price::new(dec!(99800)), Price::new(dec!(99820))]);
        let asks: Vec<Price> = book.ask_prices().iter().copied().collect();
        assert_eq!(asks, vec![Price::new(dec!(100200))]);
    }

    #[test]
    fn test_terminal_statuses_excluded() {
        let orders = vec![
            order("1", OrderSide::Buy, Some(dec!(99800)), OrderStatus::Filled),
            order("2", OrderSide::Buy, Some(dec!(99820)), OrderStatus::Cancelled),
            order("3", OrderSide::Sell, Some(dec!(100200)), OrderStatus::Rejected),
            order("4", OrderSide::Sell, Some(dec!(100220)), OrderStatus::Unknown),
        ];
        let book = LadderBook::from_orders(&orders, 0);
        assert!(book.is_empty());
    }

    #[test]
    fn test_missing_price_skipped() {
        let orders = vec![
            order("1", OrderSide::Buy, None, OrderStatus::Open),
            order("2", OrderSide::Buy, Some(dec!(99800)), OrderStatus::Open),
        ];
        let book = LadderBook::from_orders(&orders, 0);
        assert_eq!(book.bid_prices().len(), 1);
    }

    #[test]
    fn test_unaddressable_id_skipped() {
        let orders = vec![
            order("abc-123", OrderSide::Buy, Some(dec!(99800)), OrderStatus::Open),
            order("-5", OrderSide::Buy, Some(dec!(99820)), OrderStatus::Open),
            order("42", OrderSide::Buy, Some(dec!(99840)), OrderStatus::Open),
        ];
        let book = LadderBook::from_orders(&orders, 0);
        assert_eq!(book.bid_prices().len(), 1);
        assert_eq!(book.ids_at(OrderSide::Buy, Price::new(dec!(99840))), &[42]);
    }

    #[test]
    fn test_prices_truncated_to_lattice_scale() {
        let orders = vec![
            order("1", OrderSide::Buy, Some(dec!(99800.75)), OrderStatus::Open),
            order("2", OrderSide::Buy, Some(dec!(99800.25)), OrderStatus::Open),
        ];
        let book = LadderBook::from_orders(&orders, 0);

        // Both collapse onto 99800 and keep both ids.
        let price = Price::new(dec!(99800));
        assert_eq!(book.bid_prices().len(), 1);
        assert_eq!(book.ids_at(OrderSide::Buy, price), &[1, 2]);
    }

    #[test]
    fn test_many_orders_one_price() {
        let orders = vec![
            order("10", OrderSide::Sell, Some(dec!(100200)), OrderStatus::Open),
            order("11", OrderSide::Sell, Some(dec!(100200)), OrderStatus::Open),
        ];
        let book = LadderBook::from_orders(&orders, 0);
        let ids = book.collect_ids(OrderSide::Sell, &[Price::new(dec!(100200))]);
        assert_eq!(ids, vec![10, 11]);
    }

    #[test]
    fn test_collect_ids_ignores_unknown_prices() {
        let orders = vec![order("1", OrderSide::Buy, Some(dec!(99800)), OrderStatus::Open)];
        let book = LadderBook::from_orders(&orders, 0);
        let ids = book.collect_ids(
            OrderSide::Buy,
            &[Price::new(dec!(99800)), Price::new(dec!(12345))],
        );
        assert_eq!(ids, vec![1]);
        assert!(book.ids_at(OrderSide::Buy, Price::new(dec!(12345))).is_empty());
    }
}
