//! Republishes algo-streaming updates as two-way price streams, notifying its own listeners via
//! the *add* channel (consumed by the streaming historical sink, §4.11, which owns
//! `streaming.txt` — this service has no publish connector of its own).

use crate::fabric::{ListenerRegistry, Listener, Service, ServiceHandle};
use crate::model::PriceStream;
use std::collections::HashMap;

#[derive(Default)]
pub struct BondStreamingService {
    streams: HashMap<String, PriceStream>,
    listeners: ListenerRegistry<PriceStream>,
}

impl BondStreamingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: crate::fabric::ListenerHandle<PriceStream>) {
        self.listeners.add(listener);
    }

    /// Stores by product id and notifies listeners via the add channel.
    pub fn publish_price(&mut self, stream: PriceStream) {
        let product_id = stream.product.id.clone();
        self.streams.insert(product_id, stream.clone());
        self.listeners.notify_add(&stream);
    }
}

impl Service<str, PriceStream> for BondStreamingService {
    fn get(&self, key: &str) -> PriceStream {
        self.streams.get(key).cloned().unwrap_or_else(|| PriceStream {
            product: crate::product::Bond::default(),
            bid: crate::model::PriceStreamOrder {
                price: rust_decimal::Decimal::ZERO,
                visible_quantity: 0,
                hidden_quantity: 0,
                side: crate::model::Side::Bid,
            },
            offer: crate::model::PriceStreamOrder {
                price: rust_decimal::Decimal::ZERO,
                visible_quantity: 0,
                hidden_quantity: 0,
                side: crate::model::Side::Offer,
            },
        })
    }

    fn on_message(&mut self, _data: PriceStream) {
        // No on_message defined for this intermediate service; data arrives via publish_price.
    }
}

/// Registered on `BondAlgoStreamingService`'s *update* channel.
pub struct ToStreamingListener {
    streaming: ServiceHandle<BondStreamingService>,
}

impl ToStreamingListener {
    pub fn new(streaming: ServiceHandle<BondStreamingService>) -> Self {
        Self { streaming }
    }
}

impl Listener<PriceStream> for ToStreamingListener {
    fn process_update(&mut self, data: &PriceStream) {
        self.streaming.borrow_mut().publish_price(data.clone());
    }
}
