//! Per-book signed position tracking, fed from booked trades.

use crate::fabric::{ListenerRegistry, Listener, Service, ServiceHandle};
use crate::model::{Position, Trade};
use crate::product::BondProductService;
use std::collections::HashMap;

#[derive(Default)]
pub struct BondPositionService {
    positions: HashMap<String, Position>,
    listeners: ListenerRegistry<Position>,
}

impl BondPositionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a zeroed Position for every bond known to the product service (§3's invariant:
    /// creating a position initializes all three books to zero).
    pub fn seed_from_products(&mut self, products: &BondProductService) {
        for bond in products.all() {
            self.positions
                .entry(bond.id.clone())
                .or_insert_with(|| Position::new(bond.clone()));
        }
    }

    pub fn add_listener(&mut self, listener: crate::fabric::ListenerHandle<Position>) {
        self.listeners.add(listener);
    }

    /// Applies a trade's signed delta to the product's position, creating the position if
    /// absent, and notifies listeners via `process_update`.
    pub fn add_trade(&mut self, trade: &Trade) {
        let position = self
            .positions
            .entry(trade.product.id.clone())
            .or_insert_with(|| Position::new(trade.product.clone()));
        position.add_trade(trade);
        let updated = position.clone();
        self.listeners.notify_update(&updated);
    }
}

impl Service<str, Position> for BondPositionService {
    fn get(&self, key: &str) -> Position {
        self.positions.get(key).cloned().unwrap_or_default()
    }

    fn on_message(&mut self, _data: Position) {
        // No on_message defined for this intermediate service; positions only change via
        // add_trade, driven by the trade-booking listener below.
    }
}

/// Registered on `BondTradeBookingService`'s *update* channel.
pub struct ToPositionListener {
    position: ServiceHandle<BondPositionService>,
}

impl ToPositionListener {
    pub fn new(position: ServiceHandle<BondPositionService>) -> Self {
        Self { position }
    }
}

impl Listener<Trade> for ToPositionListener {
    fn process_update(&mut self, data: &Trade) {
        self.position.borrow_mut().add_trade(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BookId, TradeSide};
    use crate::product::Bond;
    use rust_decimal_macros::dec;

    #[test]
    fn scenario_single_trade_into_trsy1() {
        let mut svc = BondPositionService::new();
        let bond = Bond {
            id: "BOND1".into(),
            ..Bond::default()
        };
        svc.add_trade(&Trade {
            product: bond.clone(),
            trade_id: "T1".into(),
            price: dec!(100),
            book: BookId::Trsy1,
            quantity: 1_000_000,
            side: TradeSide::Buy,
        });

        let position = svc.get("BOND1");
        assert_eq!(*position.books.get(&BookId::Trsy1).unwrap(), 1_000_000);
        assert_eq!(*position.books.get(&BookId::Trsy2).unwrap(), 0);
        assert_eq!(*position.books.get(&BookId::Trsy3).unwrap(), 0);
        assert_eq!(position.aggregate(), 1_000_000);
    }
}
