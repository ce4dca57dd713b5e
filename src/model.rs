//! Value types flowing through the fabric: orders and books, two-way quotes and streams,
//! execution orders, trades, positions, PV01 entries, and client inquiries.

use crate::product::Bond;
use derive_more::Display;
use rust_decimal::Decimal;

/// Side of a resting order or a streamed quote. `ExecutionOrder` repurposes this same enum for
/// its execution side, per the reference convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Side {
    #[display("BID")]
    Bid,
    #[display("OFFER")]
    Offer,
}

impl std::str::FromStr for Side {
    type Err = crate::error::FabricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BID" => Ok(Side::Bid),
            "OFFER" => Ok(Side::Offer),
            other => Err(crate::error::FabricError::UnknownSide(other.to_string())),
        }
    }
}

/// Side of a trade or client inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TradeSide {
    #[display("BUY")]
    Buy,
    #[display("SELL")]
    Sell,
}

impl std::str::FromStr for TradeSide {
    type Err = crate::error::FabricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(TradeSide::Buy),
            "SELL" => Ok(TradeSide::Sell),
            other => Err(crate::error::FabricError::UnknownSide(other.to_string())),
        }
    }
}

/// A single resting price level. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Order {
    pub price: Decimal,
    pub quantity: i64,
    pub side: Side,
}

impl Order {
    pub fn new(price: Decimal, quantity: i64, side: Side) -> Self {
        Self {
            price,
            quantity,
            side,
        }
    }
}

/// The best bid/offer pair composed from a book. **Deliberately preserves the reference's field
/// inversion**: `bid` carries the best *offer's* price and `offer` carries the best *bid's*
/// price. Downstream algo-execution (§4.3) derives price and side from this swapped pair, so
/// fixing the names here would silently change execution output. Do not "fix".
#[derive(Debug, Clone, Copy)]
pub struct BidOffer {
    pub bid: Order,
    pub offer: Order,
}

/// A product's order book: one ordered sequence of bid levels, one of offer levels.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    pub product_id: String,
    pub bids: Vec<Order>,
    pub offers: Vec<Order>,
}

impl OrderBook {
    pub fn new(product_id: impl Into<String>, bids: Vec<Order>, offers: Vec<Order>) -> Self {
        Self {
            product_id: product_id.into(),
            bids,
            offers,
        }
    }
}

/// Product + mid price + bid/offer spread, as read off `prices.csv`.
#[derive(Debug, Clone)]
pub struct PriceQuote {
    pub product: Bond,
    pub mid: Decimal,
    pub spread: Decimal,
}

impl PriceQuote {
    pub fn bid(&self) -> Decimal {
        self.mid - self.spread / Decimal::TWO
    }

    pub fn offer(&self) -> Decimal {
        self.mid + self.spread / Decimal::TWO
    }
}

/// One side of a streamed two-way price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStreamOrder {
    pub price: Decimal,
    pub visible_quantity: i64,
    pub hidden_quantity: i64,
    pub side: Side,
}

/// A product's streamable two-way price.
#[derive(Debug, Clone)]
pub struct PriceStream {
    pub product: Bond,
    pub bid: PriceStreamOrder,
    pub offer: PriceStreamOrder,
}

/// Execution order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderType {
    Fok,
    Ioc,
    Limit,
    Market,
    Stop,
}

impl OrderType {
    /// Label used in `execution.txt`. Preserves the reference's `IOC` → `"LOC"` typo for
    /// byte-identical output.
    pub fn output_label(&self) -> &'static str {
        match self {
            OrderType::Fok => "FOK",
            OrderType::Ioc => "LOC",
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
            OrderType::Stop => "STOP",
        }
    }
}

/// An executable order synthesized by algo-execution, or read back through the execution bridge.
#[derive(Debug, Clone)]
pub struct ExecutionOrder {
    pub product: Bond,
    pub side: Side,
    pub order_id: String,
    pub order_type: OrderType,
    pub price: Decimal,
    pub visible_quantity: i64,
    pub hidden_quantity: i64,
    pub parent_order_id: String,
    pub is_child_order: bool,
}

impl ExecutionOrder {
    pub const NO_PARENT: &'static str = "N/A";

    pub fn total_quantity(&self) -> i64 {
        self.visible_quantity + self.hidden_quantity
    }
}

/// The three sub-ledgers a trade can be booked into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BookId {
    #[display("TRSY1")]
    Trsy1,
    #[display("TRSY2")]
    Trsy2,
    #[display("TRSY3")]
    Trsy3,
}

impl BookId {
    pub const ALL: [BookId; 3] = [BookId::Trsy1, BookId::Trsy2, BookId::Trsy3];

    /// Rotates through the three books by a monotonic counter, per the trade-booking bridge.
    pub fn from_counter(counter: u64) -> Self {
        Self::ALL[(counter % 3) as usize]
    }
}

impl std::str::FromStr for BookId {
    type Err = crate::error::FabricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TRSY1" => Ok(BookId::Trsy1),
            "TRSY2" => Ok(BookId::Trsy2),
            "TRSY3" => Ok(BookId::Trsy3),
            other => Err(crate::error::FabricError::MalformedRecord(format!(
                "unknown book id {other:?}"
            ))),
        }
    }
}

/// A booked trade.
#[derive(Debug, Clone)]
pub struct Trade {
    pub product: Bond,
    pub trade_id: String,
    pub price: Decimal,
    pub book: BookId,
    pub quantity: i64,
    pub side: TradeSide,
}

/// A product's signed net quantity across the three books, plus the aggregate.
#[derive(Debug, Clone)]
pub struct Position {
    pub product: Bond,
    pub books: std::collections::HashMap<BookId, i64>,
}

impl Position {
    /// A fresh position with all three books initialized to zero, per §3's invariant.
    pub fn new(product: Bond) -> Self {
        let mut books = std::collections::HashMap::with_capacity(3);
        for book in BookId::ALL {
            books.insert(book, 0);
        }
        Self { product, books }
    }

    pub fn aggregate(&self) -> i64 {
        self.books.values().sum()
    }

    pub fn add_trade(&mut self, trade: &Trade) {
        let delta = match trade.side {
            TradeSide::Buy => trade.quantity,
            TradeSide::Sell => -trade.quantity,
        };
        *self.books.entry(trade.book).or_insert(0) += delta;
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(Bond::default())
    }
}

/// Per-unit PV01 and signed aggregate quantity for a Bond or a BucketedSector.
#[derive(Debug, Clone)]
pub struct PV01Entry {
    pub product_id: String,
    pub pv01: Decimal,
    pub quantity: i64,
}

impl Default for PV01Entry {
    fn default() -> Self {
        Self {
            product_id: String::new(),
            pv01: Decimal::ZERO,
            quantity: 0,
        }
    }
}

/// Client inquiry lifecycle state. Transitions are monotonic and scripted (§4.10):
/// `RECEIVED -> QUOTED -> DONE` on the happy path, `RECEIVED -> REJECTED -> DONE` on
/// service rejection; `CUSTOMER_REJECTED` is an accepted terminal the system never emits itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum InquiryState {
    #[display("RECEIVED")]
    Received,
    #[display("QUOTED")]
    Quoted,
    #[display("DONE")]
    Done,
    #[display("REJECTED")]
    Rejected,
    #[display("CUSTOMER_REJECTED")]
    CustomerRejected,
}

impl std::str::FromStr for InquiryState {
    type Err = crate::error::FabricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RECEIVED" => Ok(InquiryState::Received),
            "QUOTED" => Ok(InquiryState::Quoted),
            "DONE" => Ok(InquiryState::Done),
            "REJECTED" => Ok(InquiryState::Rejected),
            "CUSTOMER_REJECTED" => Ok(InquiryState::CustomerRejected),
            other => Err(crate::error::FabricError::UnknownInquiryState(
                other.to_string(),
            )),
        }
    }
}

/// A client inquiry, keyed by inquiry id.
#[derive(Debug, Clone)]
pub struct Inquiry {
    pub inquiry_id: String,
    pub product: Bond,
    pub side: TradeSide,
    pub quantity: i64,
    pub price: Decimal,
    pub state: InquiryState,
}

impl Inquiry {
    /// Reconstructs this inquiry with a new state, leaving everything else unchanged. Every
    /// inquiry transition in the reference is a full reconstruction rather than a mutation.
    pub fn with_state(&self, state: InquiryState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }

    /// Reconstructs this inquiry with a new price, leaving the state unchanged. Used by
    /// `send_quote` (§4.10), which quotes a price without itself transitioning state.
    pub fn with_price(&self, price: Decimal) -> Self {
        Self {
            price,
            ..self.clone()
        }
    }
}

impl Default for Inquiry {
    fn default() -> Self {
        Self {
            inquiry_id: String::new(),
            product: Bond::default(),
            side: TradeSide::Buy,
            quantity: 0,
            price: Decimal::ZERO,
            state: InquiryState::Received,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn position_aggregate_equals_sum_of_books() {
        let mut pos = Position::new(Bond::default());
        pos.add_trade(&Trade {
            product: Bond::default(),
            trade_id: "T1".into(),
            price: dec!(100),
            book: BookId::Trsy1,
            quantity: 1_000_000,
            side: TradeSide::Buy,
        });
        assert_eq!(pos.aggregate(), pos.books.values().sum::<i64>());
        assert_eq!(*pos.books.get(&BookId::Trsy1).unwrap(), 1_000_000);
    }

    #[test]
    fn sell_subtracts_from_book() {
        let mut pos = Position::new(Bond::default());
        pos.add_trade(&Trade {
            product: Bond::default(),
            trade_id: "T2".into(),
            price: dec!(100),
            book: BookId::Trsy2,
            quantity: 500_000,
            side: TradeSide::Sell,
        });
        assert_eq!(*pos.books.get(&BookId::Trsy2).unwrap(), -500_000);
        assert_eq!(pos.aggregate(), -500_000);
    }

    #[test]
    fn price_quote_derives_symmetric_bid_offer() {
        let quote = PriceQuote {
            product: Bond::default(),
            mid: dec!(100),
            spread: dec!(0.015625), // 1/64
        };
        assert_eq!(quote.bid() + quote.offer(), quote.mid * Decimal::TWO);
        assert_eq!(quote.offer() - quote.bid(), quote.spread);
    }

    #[test]
    fn book_id_rotates_by_counter() {
        assert_eq!(BookId::from_counter(0), BookId::Trsy1);
        assert_eq!(BookId::from_counter(1), BookId::Trsy2);
        assert_eq!(BookId::from_counter(2), BookId::Trsy3);
        assert_eq!(BookId::from_counter(3), BookId::Trsy1);
    }
}
