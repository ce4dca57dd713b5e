//! Market-data book store, depth aggregation, the best-bid/best-offer convention (deliberately
//! swapped, §4.2), and the subscribe connector reading `marketdata.csv`.

use crate::error::FabricResult;
use crate::fabric::{ListenerRegistry, Service, ServiceHandle, SubscribeConnector};
use crate::model::{BidOffer, Order, OrderBook, Side};
use crate::price::parse_price;
use crate::product::BondProductService;
use rust_decimal::Decimal;
use std::collections::HashMap;

#[derive(Default)]
pub struct BondMarketDataService {
    books: HashMap<String, OrderBook>,
    listeners: ListenerRegistry<OrderBook>,
}

impl BondMarketDataService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: crate::fabric::ListenerHandle<OrderBook>) {
        self.listeners.add(listener);
    }

    /// The tightest bid/offer pair from the stored book, with the §4.2 field swap preserved:
    /// `bid` carries the real best *offer*'s price/quantity, `offer` carries the real best
    /// *bid*'s. `None` when either side of the book is empty.
    pub fn best_bid_offer(&self, product_id: &str) -> Option<BidOffer> {
        let book = self.books.get(product_id)?;
        let best_bid = book.bids.iter().max_by(|a, b| a.price.cmp(&b.price))?;
        let best_offer = book.offers.iter().min_by(|a, b| a.price.cmp(&b.price))?;
        Some(BidOffer {
            bid: *best_offer,
            offer: *best_bid,
        })
    }

    /// Collapses same-price levels on each side into one Order whose quantity is the sum. Order
    /// of resulting levels is unspecified; aggregating an already-aggregated book is idempotent.
    pub fn aggregate_depth(&self, product_id: &str) -> OrderBook {
        let Some(book) = self.books.get(product_id) else {
            return OrderBook::default();
        };
        OrderBook {
            product_id: book.product_id.clone(),
            bids: aggregate_side(&book.bids, Side::Bid),
            offers: aggregate_side(&book.offers, Side::Offer),
        }
    }
}

fn aggregate_side(orders: &[Order], side: Side) -> Vec<Order> {
    let mut grouped: HashMap<Decimal, i64> = HashMap::new();
    for order in orders {
        *grouped.entry(order.price).or_insert(0) += order.quantity;
    }
    grouped
        .into_iter()
        .map(|(price, quantity)| Order::new(price, quantity, side))
        .collect()
}

impl Service<str, OrderBook> for BondMarketDataService {
    fn get(&self, key: &str) -> OrderBook {
        self.books.get(key).cloned().unwrap_or_default()
    }

    fn on_message(&mut self, data: OrderBook) {
        let product_id = data.product_id.clone();
        self.books.insert(product_id, data.clone());
        self.listeners.notify_add(&data);
    }
}

/// Reads `marketdata.csv` (`BondIDType,BondID,Price,Spread1..5,Size1..5`), reconstructing each
/// side at five depths as `(mid +/- Spread_i, Size_i)`.
pub struct MarketDataSubscribeConnector {
    path: String,
    market_data: ServiceHandle<BondMarketDataService>,
    products: ServiceHandle<BondProductService>,
}

impl MarketDataSubscribeConnector {
    pub fn new(
        path: impl Into<String>,
        market_data: ServiceHandle<BondMarketDataService>,
        products: ServiceHandle<BondProductService>,
    ) -> Self {
        Self {
            path: path.into(),
            market_data,
            products,
        }
    }
}

impl SubscribeConnector for MarketDataSubscribeConnector {
    fn run(&mut self) -> FabricResult<()> {
        tracing::info!(path = %self.path, "market data: begin to read data");
        let mut reader = crate::io::open_reader(&self.path)?;
        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed market data record");
                    continue;
                }
            };
            if let Err(err) = self.process_record(&record) {
                tracing::warn!(error = %err, "skipping malformed market data record");
            }
        }
        tracing::info!("market data: finished");
        Ok(())
    }
}

impl MarketDataSubscribeConnector {
    fn process_record(&mut self, record: &csv::StringRecord) -> FabricResult<()> {
        if record.len() < 13 {
            return Err(crate::error::FabricError::MalformedRecord(
                record.iter().collect::<Vec<_>>().join(","),
            ));
        }
        let id_type: crate::product::BondIdType = record[0].parse()?;
        let bond_id = &record[1];
        let bond = self.products.borrow().get(bond_id);
        debug_assert_eq!(bond.id_type, id_type);

        let mid = parse_price(&record[2])?;
        let mut bids = Vec::with_capacity(5);
        let mut offers = Vec::with_capacity(5);
        for depth in 0..5 {
            let spread: Decimal = record[3 + depth]
                .parse()
                .map_err(|_| crate::error::FabricError::MalformedPrice(record[3 + depth].to_string()))?;
            let size: i64 = record[8 + depth]
                .parse()
                .map_err(|_| crate::error::FabricError::MalformedRecord(record[8 + depth].to_string()))?;
            bids.push(Order::new(mid - spread, size, Side::Bid));
            offers.push(Order::new(mid + spread, size, Side::Offer));
        }

        let book = OrderBook::new(bond.id.clone(), bids, offers);
        self.market_data.borrow_mut().on_message(book);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::handle;
    use rust_decimal_macros::dec;

    fn book(product_id: &str) -> OrderBook {
        OrderBook::new(
            product_id,
            vec![
                Order::new(dec!(100), 10, Side::Bid),
                Order::new(dec!(100), 5, Side::Bid),
                Order::new(dec!(101), 3, Side::Bid),
            ],
            vec![
                Order::new(dec!(102), 7, Side::Offer),
                Order::new(dec!(102), 1, Side::Offer),
            ],
        )
    }

    #[test]
    fn aggregate_depth_collapses_same_price_levels() {
        let svc = handle(BondMarketDataService::new());
        svc.borrow_mut().on_message(book("T1"));
        let aggregated = svc.borrow().aggregate_depth("T1");
        let mut by_price: HashMap<Decimal, i64> =
            aggregated.bids.iter().map(|o| (o.price, o.quantity)).collect();
        by_price.extend(aggregated.offers.iter().map(|o| (o.price, o.quantity)));
        assert_eq!(by_price.get(&dec!(100)), Some(&15));
        assert_eq!(by_price.get(&dec!(101)), Some(&3));
        assert_eq!(by_price.get(&dec!(102)), Some(&8));
    }

    #[test]
    fn aggregate_depth_is_idempotent() {
        let svc = handle(BondMarketDataService::new());
        svc.borrow_mut().on_message(book("T1"));
        let once = svc.borrow().aggregate_depth("T1");
        svc.borrow_mut().on_message(once.clone());
        let twice = svc.borrow().aggregate_depth("T1");

        let sum = |levels: &[Order]| -> i64 { levels.iter().map(|o| o.quantity).sum() };
        assert_eq!(sum(&once.bids), sum(&twice.bids));
        assert_eq!(sum(&once.offers), sum(&twice.offers));
    }

    #[test]
    fn best_bid_offer_swaps_fields_per_quirk() {
        let svc = handle(BondMarketDataService::new());
        svc.borrow_mut().on_message(book("T1"));
        let bo = svc.borrow().best_bid_offer("T1").unwrap();
        // real best bid = 101, real best offer = 102; the "bid" field holds the real offer.
        assert_eq!(bo.bid.price, dec!(102));
        assert_eq!(bo.offer.price, dec!(101));
    }
}
