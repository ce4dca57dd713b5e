//! Trade booking, keyed by trade id (the one store in the fabric not keyed by product id). Two
//! ingress paths: the `trades.csv` subscribe connector, and the execution bridge that
//! synthesizes a Trade from every booked execution order.

use crate::error::FabricResult;
use crate::fabric::{ListenerRegistry, Listener, Service, ServiceHandle, SubscribeConnector};
use crate::model::{BookId, ExecutionOrder, Side, Trade, TradeSide};
use crate::price::parse_price;
use crate::product::BondProductService;
use std::collections::HashMap;

#[derive(Default)]
pub struct BondTradeBookingService {
    trades: HashMap<String, Trade>,
    listeners: ListenerRegistry<Trade>,
    counter: u64,
}

impl BondTradeBookingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: crate::fabric::ListenerHandle<Trade>) {
        self.listeners.add(listener);
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Stores by trade id, increments the counter (used both for bridge trade synthesis and
    /// book rotation — it advances on every booked trade regardless of ingress path), and
    /// notifies listeners via `process_update`.
    pub fn book_trade(&mut self, trade: Trade) {
        self.trades.insert(trade.trade_id.clone(), trade.clone());
        self.counter += 1;
        self.listeners.notify_update(&trade);
    }
}

impl Service<str, Trade> for BondTradeBookingService {
    fn get(&self, key: &str) -> Trade {
        self.trades.get(key).cloned().unwrap_or_else(|| Trade {
            product: crate::product::Bond::default(),
            trade_id: String::new(),
            price: rust_decimal::Decimal::ZERO,
            book: BookId::Trsy1,
            quantity: 0,
            side: TradeSide::Buy,
        })
    }

    fn on_message(&mut self, data: Trade) {
        self.book_trade(data);
    }
}

/// Reads `trades.csv` (`TradeID,BondIDType,BondID,Side,Quantity,Price,BookId`).
pub struct TradesSubscribeConnector {
    path: String,
    trade_booking: ServiceHandle<BondTradeBookingService>,
    products: ServiceHandle<BondProductService>,
}

impl TradesSubscribeConnector {
    pub fn new(
        path: impl Into<String>,
        trade_booking: ServiceHandle<BondTradeBookingService>,
        products: ServiceHandle<BondProductService>,
    ) -> Self {
        Self {
            path: path.into(),
            trade_booking,
            products,
        }
    }
}

impl SubscribeConnector for TradesSubscribeConnector {
    fn run(&mut self) -> FabricResult<()> {
        tracing::info!(path = %self.path, "trade: begin to read data");
        let mut reader = crate::io::open_reader(&self.path)?;
        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed trade record");
                    continue;
                }
            };
            if let Err(err) = self.process_record(&record) {
                tracing::warn!(error = %err, "skipping malformed trade record");
            }
        }
        tracing::info!("trade: finished");
        Ok(())
    }
}

impl TradesSubscribeConnector {
    fn process_record(&mut self, record: &csv::StringRecord) -> FabricResult<()> {
        if record.len() < 7 {
            return Err(crate::error::FabricError::MalformedRecord(
                record.iter().collect::<Vec<_>>().join(","),
            ));
        }
        let trade_id = record[0].to_string();
        let _id_type: crate::product::BondIdType = record[1].parse()?;
        let bond = self.products.borrow().get(&record[2]);
        let side: TradeSide = record[3].parse()?;
        let quantity: i64 = record[4]
            .parse()
            .map_err(|_| crate::error::FabricError::MalformedRecord(record[4].to_string()))?;
        let price = parse_price(&record[5])?;
        let book: BookId = record[6].parse()?;

        self.trade_booking.borrow_mut().on_message(Trade {
            product: bond,
            trade_id,
            price,
            book,
            quantity,
            side,
        });
        Ok(())
    }
}

/// Registered on `BondExecutionService`'s *add* channel: synthesizes a Trade from every
/// execution order and books it.
pub struct ToTradeBookingListener {
    trade_booking: ServiceHandle<BondTradeBookingService>,
}

impl ToTradeBookingListener {
    pub fn new(trade_booking: ServiceHandle<BondTradeBookingService>) -> Self {
        Self { trade_booking }
    }
}

impl Listener<ExecutionOrder> for ToTradeBookingListener {
    fn process_add(&mut self, data: &ExecutionOrder) {
        let counter = self.trade_booking.borrow().counter();
        let book = BookId::from_counter(counter);
        let side = match data.side {
            Side::Bid => TradeSide::Sell,
            Side::Offer => TradeSide::Buy,
        };
        let trade_id = format!(
            "TRADE{}{}{}",
            data.product.maturity_year(),
            data.product.ticker,
            counter
        );

        let trade = Trade {
            product: data.product.clone(),
            trade_id,
            price: data.price,
            book,
            quantity: data.total_quantity(),
            side,
        };
        self.trade_booking.borrow_mut().book_trade(trade);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Bond;
    use rust_decimal_macros::dec;

    #[test]
    fn bridge_inverts_side_and_sums_quantity() {
        let trade_booking = crate::fabric::handle(BondTradeBookingService::new());
        let mut listener = ToTradeBookingListener::new(trade_booking.clone());

        let order = ExecutionOrder {
            product: Bond::default(),
            side: Side::Bid,
            order_id: "O1".into(),
            order_type: crate::model::OrderType::Ioc,
            price: dec!(100),
            visible_quantity: 200_000,
            hidden_quantity: 400_000,
            parent_order_id: ExecutionOrder::NO_PARENT.into(),
            is_child_order: false,
        };
        listener.process_add(&order);

        let booked = trade_booking.borrow();
        assert_eq!(booked.counter(), 1);
        let trade = booked.trades.values().next().unwrap();
        assert_eq!(trade.side, TradeSide::Sell);
        assert_eq!(trade.quantity, 600_000);
        assert_eq!(trade.book, BookId::Trsy1);
    }
}
