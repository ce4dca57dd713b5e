//! Risk historical sink: listens on `BondRiskService`'s update channel, persists a per-bond PV01
//! line, and maintains bucketed-sector roll-ups — on every product update it finds the bucket
//! containing the product, instructs the risk service to recompute that bucket, reads the result
//! back, and persists it tagged `Bucketed Sector`.

use crate::fabric::{Listener, ServiceHandle};
use crate::io::PublishSink;
use crate::model::PV01Entry;
use crate::product::{BondProductService, BucketedSector};
use crate::services::risk::BondRiskService;
use std::collections::HashMap;

pub const BUCKET_TAG: &str = "Bucketed Sector";

#[derive(Default)]
struct RiskStore {
    by_bond: HashMap<String, PV01Entry>,
    by_bucket: HashMap<String, PV01Entry>,
}

pub struct RiskHistoricalService {
    store: RiskStore,
    sink: PublishSink,
    sectors: Vec<BucketedSector>,
    risk: ServiceHandle<BondRiskService>,
    products: ServiceHandle<BondProductService>,
}

impl RiskHistoricalService {
    pub fn new(
        path: &str,
        sectors: Vec<BucketedSector>,
        risk: ServiceHandle<BondRiskService>,
        products: ServiceHandle<BondProductService>,
    ) -> Self {
        Self {
            store: RiskStore::default(),
            sink: PublishSink::create(path, &["ProductIDType", "ProductID", "PV01", "Quantity"]),
            sectors,
            risk,
            products,
        }
    }

    fn find_sector(&self, product_id: &str) -> Option<&BucketedSector> {
        self.sectors
            .iter()
            .find(|sector| sector.bonds.iter().any(|bond| bond.id == product_id))
    }

    /// Persists the per-bond PV01 line, then — if the product belongs to a known bucket —
    /// recomputes and persists that bucket's roll-up. Logs and drops the bucket half when the
    /// product is in no known bucket (§7).
    pub fn persist_bond(&mut self, entry: &PV01Entry) {
        self.store.by_bond.insert(entry.product_id.clone(), entry.clone());
        let id_type = self
            .products
            .borrow()
            .get(&entry.product_id)
            .id_type
            .to_string();
        self.sink.publish_fields(&[
            id_type,
            entry.product_id.clone(),
            entry.pv01.to_string(),
            entry.quantity.to_string(),
        ]);

        let Some(sector) = self.find_sector(&entry.product_id).cloned() else {
            tracing::warn!(product_id = %entry.product_id, "no bucketed sector for product, skipping roll-up");
            return;
        };
        self.risk.borrow_mut().update_bucketed_risk(&sector);
        let Some(bucket_entry) = self.risk.borrow().get_bucketed_risk(&sector.name) else {
            tracing::warn!(sector = %sector.name, "bucketed risk missing after update");
            return;
        };
        self.persist_bucket(&bucket_entry);
    }

    pub fn persist_bucket(&mut self, entry: &PV01Entry) {
        self.store.by_bucket.insert(entry.product_id.clone(), entry.clone());
        self.sink.publish_fields(&[
            BUCKET_TAG.to_string(),
            entry.product_id.clone(),
            entry.pv01.to_string(),
            entry.quantity.to_string(),
        ]);
    }
}

impl Listener<PV01Entry> for RiskHistoricalService {
    fn process_update(&mut self, data: &PV01Entry) {
        self.persist_bond(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::handle;
    use crate::product::Bond;
    use rust_decimal_macros::dec;
    use tempfile::NamedTempFile;

    fn bond(id: &str) -> Bond {
        Bond {
            id: id.into(),
            ..Bond::default()
        }
    }

    #[test]
    fn bond_with_no_bucket_skips_rollup() {
        let file = NamedTempFile::new().unwrap();
        let risk = handle(BondRiskService::new());
        let products = handle(BondProductService::new());
        let mut svc = RiskHistoricalService::new(
            file.path().to_str().unwrap(),
            vec![BucketedSector::new("FrontEnd", vec![bond("2Y")])],
            risk,
            products,
        );
        svc.persist_bond(&PV01Entry {
            product_id: "Unbucketed".into(),
            pv01: dec!(0.01),
            quantity: 100,
        });
        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents.lines().count(), 2); // header + one bond line, no bucket line
    }

    #[test]
    fn bond_with_bucket_persists_rollup_too() {
        let file = NamedTempFile::new().unwrap();
        let risk = handle(BondRiskService::new());
        risk.borrow_mut().seed([("2Y".to_string(), dec!(0.0134))]);
        let products = handle(BondProductService::new());
        let mut svc = RiskHistoricalService::new(
            file.path().to_str().unwrap(),
            vec![BucketedSector::new("FrontEnd", vec![bond("2Y")])],
            risk.clone(),
            products,
        );
        risk.borrow_mut().add_position(&{
            let mut p = crate::model::Position::new(bond("2Y"));
            *p.books.get_mut(&crate::model::BookId::Trsy1).unwrap() = 1_000_000;
            p
        });
        svc.persist_bond(&risk.borrow().get("2Y"));

        let contents = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3); // header + bond line + bucket line
        assert!(lines[2].contains(BUCKET_TAG));
    }
}
