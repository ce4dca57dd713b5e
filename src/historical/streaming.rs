//! Streaming historical sink: listens on `BondStreamingService`'s *add* channel and persists the
//! bid+offer `PriceStreamOrder` fields to `streaming.txt`.

use crate::fabric::Listener;
use crate::io::PublishSink;
use crate::model::PriceStream;
use std::collections::HashMap;

#[derive(Default)]
struct StreamingStore {
    streams: HashMap<String, PriceStream>,
}

pub struct StreamingHistoricalService {
    store: StreamingStore,
    sink: PublishSink,
}

impl StreamingHistoricalService {
    pub fn new(path: &str) -> Self {
        Self {
            store: StreamingStore::default(),
            sink: PublishSink::create(
                path,
                &[
                    "BondIDType",
                    "BondID",
                    "BidPrice",
                    "BidVisibleQuantity",
                    "BidHiddenQuantity",
                    "OfferPrice",
                    "OfferVisibleQuantity",
                    "OfferHiddenQuantity",
                ],
            ),
        }
    }

    pub fn persist_data(&mut self, stream: &PriceStream) {
        self.store
            .streams
            .insert(stream.product.id.clone(), stream.clone());
        self.sink.publish_fields(&[
            stream.product.id_type.to_string(),
            stream.product.id.clone(),
            crate::price::format_price(stream.bid.price),
            stream.bid.visible_quantity.to_string(),
            stream.bid.hidden_quantity.to_string(),
            crate::price::format_price(stream.offer.price),
            stream.offer.visible_quantity.to_string(),
            stream.offer.hidden_quantity.to_string(),
        ]);
    }
}

impl Listener<PriceStream> for StreamingHistoricalService {
    fn process_add(&mut self, data: &PriceStream) {
        self.persist_data(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PriceStreamOrder, Side};
    use crate::product::Bond;
    use rust_decimal_macros::dec;
    use tempfile::NamedTempFile;

    #[test]
    fn persists_both_sides() {
        let file = NamedTempFile::new().unwrap();
        let mut svc = StreamingHistoricalService::new(file.path().to_str().unwrap());
        svc.persist_data(&PriceStream {
            product: Bond::default(),
            bid: PriceStreamOrder {
                price: dec!(99.984375),
                visible_quantity: 1_000_000,
                hidden_quantity: 2_000_000,
                side: Side::Bid,
            },
            offer: PriceStreamOrder {
                price: dec!(100.015625),
                visible_quantity: 1_000_000,
                hidden_quantity: 2_000_000,
                side: Side::Offer,
            },
        });
        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
