//! Inquiry historical sink: listens on `BondInquiryService`'s update channel and persists every
//! one of the four state passes an inquiry makes on the happy path to `allinquiries.txt`.

use crate::fabric::Listener;
use crate::io::PublishSink;
use crate::model::Inquiry;
use std::collections::HashMap;

#[derive(Default)]
struct InquiryStore {
    inquiries: HashMap<String, Inquiry>,
}

pub struct InquiryHistoricalService {
    store: InquiryStore,
    sink: PublishSink,
}

impl InquiryHistoricalService {
    pub fn new(path: &str) -> Self {
        Self {
            store: InquiryStore::default(),
            sink: PublishSink::create(
                path,
                &[
                    "InquiryID",
                    "BondIDType",
                    "BondID",
                    "Side",
                    "Quantity",
                    "Price",
                    "State",
                ],
            ),
        }
    }

    pub fn persist_data(&mut self, inquiry: &Inquiry) {
        self.store
            .inquiries
            .insert(inquiry.inquiry_id.clone(), inquiry.clone());
        self.sink.publish_fields(&[
            inquiry.inquiry_id.clone(),
            inquiry.product.id_type.to_string(),
            inquiry.product.id.clone(),
            inquiry.side.to_string(),
            inquiry.quantity.to_string(),
            crate::price::format_price(inquiry.price),
            inquiry.state.to_string(),
        ]);
    }
}

impl Listener<Inquiry> for InquiryHistoricalService {
    fn process_update(&mut self, data: &Inquiry) {
        self.persist_data(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InquiryState, TradeSide};
    use crate::product::Bond;
    use rust_decimal_macros::dec;
    use tempfile::NamedTempFile;

    #[test]
    fn every_pass_persists_a_line() {
        let file = NamedTempFile::new().unwrap();
        let mut svc = InquiryHistoricalService::new(file.path().to_str().unwrap());
        let base = Inquiry {
            inquiry_id: "INQ1".into(),
            product: Bond::default(),
            side: TradeSide::Buy,
            quantity: 1_000_000,
            price: dec!(99),
            state: InquiryState::Received,
        };
        for state in [
            InquiryState::Received,
            InquiryState::Received,
            InquiryState::Quoted,
            InquiryState::Done,
        ] {
            svc.persist_data(&base.with_state(state));
        }
        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents.lines().count(), 5); // header + 4 passes
    }
}
