//! Two-way price-stream synthesis from pricing quotes. Visible quantity alternates
//! 1,000,000 / 2,000,000 by a monotonic counter; hidden is always double visible (§4.5). This
//! ratio formula is independent of algo-execution's hidden-quantity truncation (§4.3) and must
//! not be unified with it.

use crate::fabric::{ListenerRegistry, Listener, Service, ServiceHandle};
use crate::model::{PriceQuote, PriceStream, PriceStreamOrder, Side};
use rust_decimal::Decimal;
use std::collections::HashMap;

#[derive(Default)]
pub struct BondAlgoStreamingService {
    streams: HashMap<String, PriceStream>,
    listeners: ListenerRegistry<PriceStream>,
    counter: u64,
}

impl BondAlgoStreamingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: crate::fabric::ListenerHandle<PriceStream>) {
        self.listeners.add(listener);
    }

    pub fn get(&self, product_id: &str) -> Option<&PriceStream> {
        self.streams.get(product_id)
    }

    /// Generates a price stream from a quote and stores/notifies it, then advances the counter.
    pub fn add_stream(&mut self, quote: &PriceQuote) {
        let gap = quote.spread / Decimal::TWO;
        let visible: i64 = if self.counter % 2 == 0 {
            1_000_000
        } else {
            2_000_000
        };
        let hidden = 2 * visible;

        let bid = PriceStreamOrder {
            price: quote.mid - gap,
            visible_quantity: visible,
            hidden_quantity: hidden,
            side: Side::Bid,
        };
        let offer = PriceStreamOrder {
            price: quote.mid + gap,
            visible_quantity: visible,
            hidden_quantity: hidden,
            side: Side::Offer,
        };

        let stream = PriceStream {
            product: quote.product.clone(),
            bid,
            offer,
        };
        let product_id = stream.product.id.clone();
        self.streams.insert(product_id, stream.clone());
        self.counter += 1;
        self.listeners.notify_update(&stream);
    }
}

/// Registered on `BondPricingService`'s *add* channel; forwards every quote into
/// `add_stream`.
pub struct ToAlgoStreamingListener {
    algo_streaming: ServiceHandle<BondAlgoStreamingService>,
}

impl ToAlgoStreamingListener {
    pub fn new(algo_streaming: ServiceHandle<BondAlgoStreamingService>) -> Self {
        Self { algo_streaming }
    }
}

impl Listener<PriceQuote> for ToAlgoStreamingListener {
    fn process_add(&mut self, data: &PriceQuote) {
        self.algo_streaming.borrow_mut().add_stream(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Bond;
    use rust_decimal_macros::dec;

    fn quote(mid: Decimal, spread: Decimal) -> PriceQuote {
        PriceQuote {
            product: Bond::default(),
            mid,
            spread,
        }
    }

    #[test]
    fn stream_is_symmetric_around_mid() {
        let mut svc = BondAlgoStreamingService::new();
        svc.add_stream(&quote(dec!(100), dec!(0.015625))); // 1/64
        let stream = svc.get("").unwrap();
        assert_eq!(stream.bid.price + stream.offer.price, dec!(200));
        assert_eq!(stream.offer.price - stream.bid.price, dec!(0.015625));
    }

    #[test]
    fn visible_quantity_alternates_and_hidden_doubles() {
        let mut svc = BondAlgoStreamingService::new();
        svc.add_stream(&quote(dec!(100), dec!(0.015625)));
        let first = svc.get("").unwrap().clone();
        svc.add_stream(&quote(dec!(100), dec!(0.015625)));
        let second = svc.get("").unwrap().clone();

        assert_eq!(first.bid.visible_quantity, 1_000_000);
        assert_eq!(first.bid.hidden_quantity, 2_000_000);
        assert_eq!(second.bid.visible_quantity, 2_000_000);
        assert_eq!(second.bid.hidden_quantity, 4_000_000);
    }
}
