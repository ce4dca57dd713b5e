//! Tight-spread detection and child-order synthesis. Listens to market-data *adds*; emits one
//! `ExecutionOrder` only when the §4.2-convention spread is at most 1/128.

use crate::fabric::{ListenerRegistry, Listener, Service, ServiceHandle};
use crate::model::{BidOffer, ExecutionOrder, OrderBook, OrderType, Side};
use crate::price::one_one_twenty_eighth;
use crate::product::{Bond, BondProductService};
use crate::services::market_data::BondMarketDataService;
use std::collections::HashMap;

#[derive(Default)]
pub struct BondAlgoExecutionService {
    orders: HashMap<String, ExecutionOrder>,
    listeners: ListenerRegistry<ExecutionOrder>,
    counter: u64,
}

impl BondAlgoExecutionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: crate::fabric::ListenerHandle<ExecutionOrder>) {
        self.listeners.add(listener);
    }

    pub fn get(&self, product_id: &str) -> Option<&ExecutionOrder> {
        self.orders.get(product_id)
    }

    /// Synthesizes and stores one ExecutionOrder when `bo`'s spread is at most 1/128, and
    /// notifies listeners via `process_update`; otherwise does nothing. The emitted price is
    /// taken from `bo.bid` (the real best offer's price, per the §4.2 field swap).
    pub fn try_synthesize(&mut self, bond: &Bond, bo: BidOffer) {
        // §4.2 convention: `bid` holds the real best offer's price, `offer` the real best bid's.
        // Their difference is the ordinary (positive) market spread.
        let spread = bo.bid.price - bo.offer.price;
        if spread > one_one_twenty_eighth() {
            return;
        }

        let side = if self.counter % 2 == 1 {
            Side::Bid
        } else {
            Side::Offer
        };
        let total = match side {
            Side::Bid => bo.bid.quantity,
            Side::Offer => bo.offer.quantity,
        };
        let hidden = (total * 2) / 3;
        let visible = total - hidden;

        let order = ExecutionOrder {
            product: bond.clone(),
            side,
            order_id: format!("ORDER{}{}{}", bond.maturity_year(), bond.ticker, self.counter),
            order_type: OrderType::Ioc,
            price: bo.bid.price,
            visible_quantity: visible,
            hidden_quantity: hidden,
            parent_order_id: ExecutionOrder::NO_PARENT.to_string(),
            is_child_order: false,
        };

        self.orders.insert(bond.id.clone(), order.clone());
        self.counter += 1;
        self.listeners.notify_update(&order);
    }
}

/// Registered on `BondMarketDataService`'s *add* channel.
pub struct ToAlgoExecutionListener {
    market_data: ServiceHandle<BondMarketDataService>,
    products: ServiceHandle<BondProductService>,
    algo_execution: ServiceHandle<BondAlgoExecutionService>,
}

impl ToAlgoExecutionListener {
    pub fn new(
        market_data: ServiceHandle<BondMarketDataService>,
        products: ServiceHandle<BondProductService>,
        algo_execution: ServiceHandle<BondAlgoExecutionService>,
    ) -> Self {
        Self {
            market_data,
            products,
            algo_execution,
        }
    }
}

impl Listener<OrderBook> for ToAlgoExecutionListener {
    fn process_add(&mut self, data: &OrderBook) {
        let Some(bo) = self.market_data.borrow().best_bid_offer(&data.product_id) else {
            return;
        };
        let bond = self.products.borrow().get(&data.product_id);
        self.algo_execution.borrow_mut().try_synthesize(&bond, bo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Order;
    use rust_decimal_macros::dec;

    fn bo(bid_field: rust_decimal::Decimal, offer_field: rust_decimal::Decimal) -> BidOffer {
        BidOffer {
            bid: Order::new(bid_field, 900_000, Side::Offer),
            offer: Order::new(offer_field, 600_000, Side::Bid),
        }
    }

    #[test]
    fn no_order_when_spread_exceeds_threshold() {
        let mut svc = BondAlgoExecutionService::new();
        // real best bid 99-31 / real best offer 100-00 => spread 1/32 under field-swap convention
        // is represented as bid_field=100-00, offer_field=99-31.
        svc.try_synthesize(&Bond::default(), bo(dec!(100), dec!(99.96875)));
        assert!(svc.get("").is_none());
    }

    #[test]
    fn order_emitted_exactly_at_boundary() {
        let mut svc = BondAlgoExecutionService::new();
        let eighth = one_one_twenty_eighth();
        svc.try_synthesize(&Bond::default(), bo(dec!(100) + eighth, dec!(100)));
        assert!(svc.get("").is_some());
    }

    #[test]
    fn no_order_just_past_boundary() {
        let mut svc = BondAlgoExecutionService::new();
        let just_over = one_one_twenty_eighth() + dec!(0.0000001);
        svc.try_synthesize(&Bond::default(), bo(dec!(100) + just_over, dec!(100)));
        assert!(svc.get("").is_none());
    }

    #[test]
    fn first_order_is_offer_side_with_truncated_hidden() {
        let mut svc = BondAlgoExecutionService::new();
        svc.try_synthesize(&Bond::default(), bo(dec!(100), dec!(100)));
        let order = svc.get("").unwrap();
        assert_eq!(order.side, Side::Offer);
        assert_eq!(order.order_id, "ORDER19700");
        assert_eq!(order.hidden_quantity, (600_000 * 2) / 3);
        assert_eq!(order.visible_quantity, 600_000 - order.hidden_quantity);
    }

    #[test]
    fn price_is_taken_from_bid_field() {
        let mut svc = BondAlgoExecutionService::new();
        let eighth = one_one_twenty_eighth();
        svc.try_synthesize(&Bond::default(), bo(dec!(100) + eighth, dec!(100)));
        let order = svc.get("").unwrap();
        assert_eq!(order.price, dec!(100) + eighth);
    }
}
