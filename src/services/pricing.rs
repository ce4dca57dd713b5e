//! Two-way quote store fed from `prices.csv`. Notifies listeners on the *add* channel — both
//! algo-streaming (§4.5) and the GUI throttle (§4.12) are registered here.

use crate::error::FabricResult;
use crate::fabric::{ListenerRegistry, Service, ServiceHandle, SubscribeConnector};
use crate::model::PriceQuote;
use crate::price::parse_price;
use crate::product::BondProductService;
use std::collections::HashMap;

#[derive(Default)]
pub struct BondPricingService {
    quotes: HashMap<String, PriceQuote>,
    listeners: ListenerRegistry<PriceQuote>,
}

impl BondPricingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: crate::fabric::ListenerHandle<PriceQuote>) {
        self.listeners.add(listener);
    }
}

impl Service<str, PriceQuote> for BondPricingService {
    fn get(&self, key: &str) -> PriceQuote {
        self.quotes
            .get(key)
            .cloned()
            .unwrap_or_else(|| PriceQuote {
                product: crate::product::Bond::default(),
                mid: rust_decimal::Decimal::ZERO,
                spread: rust_decimal::Decimal::ZERO,
            })
    }

    fn on_message(&mut self, data: PriceQuote) {
        let product_id = data.product.id.clone();
        self.quotes.insert(product_id, data.clone());
        self.listeners.notify_add(&data);
    }
}

/// Reads `prices.csv` (`BondIDType,BondID,Price,Spread`).
pub struct PricesSubscribeConnector {
    path: String,
    pricing: ServiceHandle<BondPricingService>,
    products: ServiceHandle<BondProductService>,
}

impl PricesSubscribeConnector {
    pub fn new(
        path: impl Into<String>,
        pricing: ServiceHandle<BondPricingService>,
        products: ServiceHandle<BondProductService>,
    ) -> Self {
        Self {
            path: path.into(),
            pricing,
            products,
        }
    }
}

impl SubscribeConnector for PricesSubscribeConnector {
    fn run(&mut self) -> FabricResult<()> {
        tracing::info!(path = %self.path, "pricing: begin to read data");
        let mut reader = crate::io::open_reader(&self.path)?;
        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed price record");
                    continue;
                }
            };
            if let Err(err) = self.process_record(&record) {
                tracing::warn!(error = %err, "skipping malformed price record");
            }
        }
        tracing::info!("pricing: finished");
        Ok(())
    }
}

impl PricesSubscribeConnector {
    fn process_record(&mut self, record: &csv::StringRecord) -> FabricResult<()> {
        if record.len() < 4 {
            return Err(crate::error::FabricError::MalformedRecord(
                record.iter().collect::<Vec<_>>().join(","),
            ));
        }
        let _id_type: crate::product::BondIdType = record[0].parse()?;
        let bond = self.products.borrow().get(&record[1]);
        let mid = parse_price(&record[2])?;
        let spread = record[3]
            .parse()
            .map_err(|_| crate::error::FabricError::MalformedPrice(record[3].to_string()))?;

        self.pricing.borrow_mut().on_message(PriceQuote {
            product: bond,
            mid,
            spread,
        });
        Ok(())
    }
}
