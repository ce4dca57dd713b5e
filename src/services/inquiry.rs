//! Client inquiry lifecycle (§4.10). `RECEIVED -> QUOTED -> DONE` on the happy path,
//! `RECEIVED -> REJECTED -> DONE` on service rejection; `CUSTOMER_REJECTED` is an accepted
//! terminal the system never emits itself.
//!
//! The happy path passes every inquiry through `on_message` four times: the original `RECEIVED`
//! read off the file, a re-injected `RECEIVED` carrying the quoted price, then `QUOTED`, then
//! `DONE`. `send_quote` is only ever invoked once per inquiry id — the quote listener below
//! tracks which ids it has already quoted rather than relying on recursive guard-checking, so the
//! second `RECEIVED` pass updates the store and notifies listeners without re-triggering a quote.
//!
//! This is the one place in the fabric where a service's own listener calls back into that same
//! service (quote listener -> `send_quote` -> connector -> `on_message`, all on
//! `BondInquiryService`), so every entry point here is careful to release its `RefCell` borrow
//! before dispatching to listeners or the connector; holding the borrow across a re-entrant call
//! would panic at runtime instead of just misbehaving.

use crate::error::FabricResult;
use crate::fabric::{Listener, ListenerRegistry, PublishConnector, Service, ServiceHandle, SubscribeConnector};
use crate::model::{Inquiry, InquiryState, TradeSide};
use crate::product::BondProductService;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct BondInquiryService {
    inquiries: HashMap<String, Inquiry>,
    listeners: ListenerRegistry<Inquiry>,
    connector: Option<ServiceHandle<dyn PublishConnector<Inquiry>>>,
}

impl BondInquiryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: crate::fabric::ListenerHandle<Inquiry>) {
        self.listeners.add(listener);
    }

    /// Wires the publish connector `send_quote`/`reject_inquiry` re-publish through. Set once at
    /// topology construction, mirroring the non-owning back-references listeners hold.
    pub fn set_connector(&mut self, connector: ServiceHandle<dyn PublishConnector<Inquiry>>) {
        self.connector = Some(connector);
    }

    /// Stores `data` by inquiry id and notifies listeners, exactly like any other service's
    /// `on_message` — except the store mutation and the listener dispatch each take and release
    /// their own short borrow of `handle`, so a listener that calls back into this same service
    /// (the quote listener does) never finds the cell still borrowed.
    pub fn ingest(handle: &ServiceHandle<Self>, data: Inquiry) {
        handle
            .borrow_mut()
            .inquiries
            .insert(data.inquiry_id.clone(), data.clone());
        // Bound to a local rather than iterated directly off `handle.borrow()`: a `for` loop
        // keeps head-expression temporaries alive for the whole loop, which would hold this
        // borrow across the re-entrant call a listener below makes back into this service.
        let listeners = handle.borrow().listeners.snapshot();
        for listener in listeners {
            listener.borrow_mut().process_update(&data);
        }
    }

    /// Reconstructs the stored inquiry with `price`, leaving its state at `RECEIVED`, and
    /// republishes it through the connector. The connector's `publish` is what carries the
    /// inquiry on to `QUOTED` then `DONE`. Takes the handle rather than `&mut self` so the read
    /// of the stored inquiry and connector is released before the connector (which re-enters
    /// this service via `ingest`) is invoked.
    pub fn send_quote(handle: &ServiceHandle<Self>, inquiry_id: &str, price: Decimal) {
        let (quoted, connector) = {
            let svc = handle.borrow();
            let Some(inquiry) = svc.inquiries.get(inquiry_id) else {
                tracing::warn!(inquiry_id, "send_quote for unknown inquiry");
                return;
            };
            let Some(connector) = svc.connector.clone() else {
                tracing::warn!("inquiry connector not wired, dropping quote");
                return;
            };
            (inquiry.with_price(price), connector)
        };
        connector.borrow_mut().publish(&quoted);
    }

    /// Reconstructs the stored inquiry as `REJECTED` and republishes it through the connector.
    /// Same borrow-then-release discipline as `send_quote`.
    pub fn reject_inquiry(handle: &ServiceHandle<Self>, inquiry_id: &str) {
        let (rejected, connector) = {
            let svc = handle.borrow();
            let Some(inquiry) = svc.inquiries.get(inquiry_id) else {
                tracing::warn!(inquiry_id, "reject_inquiry for unknown inquiry");
                return;
            };
            let Some(connector) = svc.connector.clone() else {
                tracing::warn!("inquiry connector not wired, dropping rejection");
                return;
            };
            (inquiry.with_state(InquiryState::Rejected), connector)
        };
        connector.borrow_mut().publish(&rejected);
    }
}

impl Service<str, Inquiry> for BondInquiryService {
    fn get(&self, key: &str) -> Inquiry {
        self.inquiries.get(key).cloned().unwrap_or_default()
    }

    /// Direct `&mut self` mutation for callers that already hold the only borrow in play (e.g. a
    /// fresh service with no listeners yet). Anything on the live inquiry path re-enters through
    /// this same service and must go through [`BondInquiryService::ingest`] instead.
    fn on_message(&mut self, data: Inquiry) {
        self.inquiries.insert(data.inquiry_id.clone(), data.clone());
        self.listeners.notify_update(&data);
    }
}

/// Reads `inquiries.csv` (`InquiryID,BondIDType,BondID,Side,Quantity,Price,State`).
pub struct InquiriesSubscribeConnector {
    path: String,
    inquiry: ServiceHandle<BondInquiryService>,
    products: ServiceHandle<BondProductService>,
}

impl InquiriesSubscribeConnector {
    pub fn new(
        path: impl Into<String>,
        inquiry: ServiceHandle<BondInquiryService>,
        products: ServiceHandle<BondProductService>,
    ) -> Self {
        Self {
            path: path.into(),
            inquiry,
            products,
        }
    }
}

impl SubscribeConnector for InquiriesSubscribeConnector {
    fn run(&mut self) -> FabricResult<()> {
        tracing::info!(path = %self.path, "inquiry: begin to read data");
        let mut reader = crate::io::open_reader(&self.path)?;
        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed inquiry record");
                    continue;
                }
            };
            if let Err(err) = self.process_record(&record) {
                tracing::warn!(error = %err, "skipping malformed inquiry record");
            }
        }
        tracing::info!("inquiry: finished");
        Ok(())
    }
}

impl InquiriesSubscribeConnector {
    fn process_record(&mut self, record: &csv::StringRecord) -> FabricResult<()> {
        if record.len() < 7 {
            return Err(crate::error::FabricError::MalformedRecord(
                record.iter().collect::<Vec<_>>().join(","),
            ));
        }
        let inquiry_id = record[0].to_string();
        let _id_type: crate::product::BondIdType = record[1].parse()?;
        let bond = self.products.borrow().get(&record[2]);
        let side: TradeSide = record[3].parse()?;
        let quantity: i64 = record[4]
            .parse()
            .map_err(|_| crate::error::FabricError::MalformedRecord(record[4].to_string()))?;
        let price = crate::price::parse_price(&record[5])?;
        let state: InquiryState = record[6].parse()?;

        BondInquiryService::ingest(
            &self.inquiry,
            Inquiry {
                inquiry_id,
                product: bond,
                side,
                quantity,
                price,
                state,
            },
        );
        Ok(())
    }
}

/// Registered on `BondInquiryService`'s own update channel: on every `RECEIVED` it has not yet
/// quoted, calls `send_quote` with the fixed indicative price of 100.0. Tracks already-quoted ids
/// so the re-injected second `RECEIVED` pass (carrying the quoted price) does not recurse.
#[derive(Default)]
pub struct InquiryQuoteListener {
    inquiry: Option<ServiceHandle<BondInquiryService>>,
    quoted: HashSet<String>,
}

impl InquiryQuoteListener {
    pub fn quote_price() -> Decimal {
        Decimal::from(100)
    }

    pub fn new(inquiry: ServiceHandle<BondInquiryService>) -> Self {
        Self {
            inquiry: Some(inquiry),
            quoted: HashSet::new(),
        }
    }
}

impl Listener<Inquiry> for InquiryQuoteListener {
    fn process_update(&mut self, data: &Inquiry) {
        if data.state != InquiryState::Received || self.quoted.contains(&data.inquiry_id) {
            return;
        }
        self.quoted.insert(data.inquiry_id.clone());
        let Some(inquiry) = &self.inquiry else { return };
        BondInquiryService::send_quote(inquiry, &data.inquiry_id, Self::quote_price());
    }
}

/// The publish side of the inquiry lifecycle: branches on state. `REJECTED` re-injects once via
/// `on_message`; anything else re-injects the quoted record, then `QUOTED`, then `DONE`.
pub struct InquiryPublishConnector {
    inquiry: ServiceHandle<BondInquiryService>,
}

impl InquiryPublishConnector {
    pub fn new(inquiry: ServiceHandle<BondInquiryService>) -> Self {
        Self { inquiry }
    }
}

impl PublishConnector<Inquiry> for InquiryPublishConnector {
    fn publish(&mut self, data: &Inquiry) {
        if data.state == InquiryState::Rejected {
            BondInquiryService::ingest(&self.inquiry, data.clone());
            return;
        }
        BondInquiryService::ingest(&self.inquiry, data.clone());
        BondInquiryService::ingest(&self.inquiry, data.with_state(InquiryState::Quoted));
        BondInquiryService::ingest(&self.inquiry, data.with_state(InquiryState::Done));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::handle;
    use crate::product::Bond;
    use rust_decimal_macros::dec;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct CountingListener {
        states: Vec<InquiryState>,
    }

    impl Listener<Inquiry> for CountingListener {
        fn process_update(&mut self, data: &Inquiry) {
            self.states.push(data.state);
        }
    }

    fn inquiry(id: &str) -> Inquiry {
        Inquiry {
            inquiry_id: id.into(),
            product: Bond::default(),
            side: TradeSide::Buy,
            quantity: 1_000_000,
            price: dec!(99),
            state: InquiryState::Received,
        }
    }

    #[test]
    fn happy_path_produces_four_passes() {
        let inquiry_svc = handle(BondInquiryService::new());
        let connector: ServiceHandle<dyn PublishConnector<Inquiry>> =
            Rc::new(RefCell::new(InquiryPublishConnector::new(inquiry_svc.clone())));
        inquiry_svc.borrow_mut().set_connector(connector);

        let counter: crate::fabric::ListenerHandle<Inquiry> =
            Rc::new(RefCell::new(CountingListener::default()));
        inquiry_svc.borrow_mut().add_listener(counter.clone());

        let quote_listener: crate::fabric::ListenerHandle<Inquiry> =
            Rc::new(RefCell::new(InquiryQuoteListener::new(inquiry_svc.clone())));
        inquiry_svc.borrow_mut().add_listener(quote_listener);

        BondInquiryService::ingest(&inquiry_svc, inquiry("INQ1"));

        let counter_ref = counter.borrow();
        let recorded = &counter_ref
            .as_any_states();
        assert_eq!(recorded.len(), 4);
        assert_eq!(
            *recorded,
            vec![
                InquiryState::Received,
                InquiryState::Received,
                InquiryState::Quoted,
                InquiryState::Done,
            ]
        );
    }

    impl CountingListener {
        fn as_any_states(&self) -> Vec<InquiryState> {
            self.states.clone()
        }
    }

    #[test]
    fn rejected_path_skips_quoted_and_done() {
        let inquiry_svc = handle(BondInquiryService::new());
        let connector: ServiceHandle<dyn PublishConnector<Inquiry>> =
            Rc::new(RefCell::new(InquiryPublishConnector::new(inquiry_svc.clone())));
        inquiry_svc.borrow_mut().set_connector(connector);

        let counter: crate::fabric::ListenerHandle<Inquiry> =
            Rc::new(RefCell::new(CountingListener::default()));
        inquiry_svc.borrow_mut().add_listener(counter.clone());

        BondInquiryService::ingest(&inquiry_svc, inquiry("INQ2"));
        BondInquiryService::reject_inquiry(&inquiry_svc, "INQ2");

        let states = counter.borrow().as_any_states();
        // on_message(RECEIVED) -- no quote listener registered this time, so just the one pass
        // plus the explicit reject_inquiry pass.
        assert_eq!(states, vec![InquiryState::Received, InquiryState::Rejected]);
    }
}
