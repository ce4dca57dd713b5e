//! Per-product PV01 roll-up fed from positions, plus bucketed-sector aggregation driven by the
//! risk historical sink (§4.11).

use crate::fabric::{ListenerRegistry, Listener, Service, ServiceHandle};
use crate::model::{PV01Entry, Position};
use crate::product::BucketedSector;
use rust_decimal::Decimal;
use std::collections::HashMap;

#[derive(Default)]
pub struct BondRiskService {
    pv01: HashMap<String, PV01Entry>,
    bucket_pv01: HashMap<String, PV01Entry>,
    listeners: ListenerRegistry<PV01Entry>,
}

impl BondRiskService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the per-unit PV01 for every bond known up front; quantity starts at 0.
    pub fn seed(&mut self, pv01_by_product: impl IntoIterator<Item = (String, Decimal)>) {
        for (product_id, pv01) in pv01_by_product {
            self.pv01.insert(
                product_id.clone(),
                PV01Entry {
                    product_id,
                    pv01,
                    quantity: 0,
                },
            );
        }
    }

    pub fn add_listener(&mut self, listener: crate::fabric::ListenerHandle<PV01Entry>) {
        self.listeners.add(listener);
    }

    /// New aggregate quantity = position.aggregate() + stored quantity; per-unit PV01 is
    /// unchanged. Notifies listeners via `process_update`.
    pub fn add_position(&mut self, position: &Position) {
        let entry = self
            .pv01
            .entry(position.product.id.clone())
            .or_insert_with(|| PV01Entry {
                product_id: position.product.id.clone(),
                pv01: Decimal::ZERO,
                quantity: 0,
            });
        entry.quantity += position.aggregate();
        let updated = entry.clone();
        self.listeners.notify_update(&updated);
    }

    /// Sums signed quantities and PV01-weighted quantities across `sector`'s constituents;
    /// per-unit bucket PV01 is the weighted average, or 0 when total quantity is 0.
    pub fn update_bucketed_risk(&mut self, sector: &BucketedSector) {
        let mut total_quantity: i64 = 0;
        let mut weighted_sum = Decimal::ZERO;
        for bond in &sector.bonds {
            if let Some(entry) = self.pv01.get(&bond.id) {
                total_quantity += entry.quantity;
                weighted_sum += entry.pv01 * Decimal::from(entry.quantity);
            }
        }
        let pv01 = if total_quantity != 0 {
            weighted_sum / Decimal::from(total_quantity)
        } else {
            Decimal::ZERO
        };
        self.bucket_pv01.insert(
            sector.name.clone(),
            PV01Entry {
                product_id: sector.name.clone(),
                pv01,
                quantity: total_quantity,
            },
        );
    }

    /// Looks up a previously computed bucketed roll-up by sector name; `None` when unknown
    /// (§7: logged, update dropped, by the caller).
    pub fn get_bucketed_risk(&self, sector_name: &str) -> Option<PV01Entry> {
        self.bucket_pv01.get(sector_name).cloned()
    }
}

impl Service<str, PV01Entry> for BondRiskService {
    fn get(&self, key: &str) -> PV01Entry {
        self.pv01.get(key).cloned().unwrap_or_default()
    }

    fn on_message(&mut self, _data: PV01Entry) {
        // No on_message defined for this intermediate service; PV01 only changes via
        // add_position, driven by the position listener below.
    }
}

/// Registered on `BondPositionService`'s *update* channel.
pub struct ToRiskListener {
    risk: ServiceHandle<BondRiskService>,
}

impl ToRiskListener {
    pub fn new(risk: ServiceHandle<BondRiskService>) -> Self {
        Self { risk }
    }
}

impl Listener<Position> for ToRiskListener {
    fn process_update(&mut self, data: &Position) {
        self.risk.borrow_mut().add_position(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Bond;
    use rust_decimal_macros::dec;

    fn bond(id: &str) -> Bond {
        Bond {
            id: id.into(),
            ..Bond::default()
        }
    }

    #[test]
    fn scenario_bucket_rollup() {
        let mut svc = BondRiskService::new();
        svc.seed([
            ("2Y".to_string(), dec!(0.0134)),
            ("3Y".to_string(), dec!(0.01034)),
        ]);
        svc.add_position(&{
            let mut p = Position::new(bond("2Y"));
            *p.books.get_mut(&crate::model::BookId::Trsy1).unwrap() = 1_000_000;
            p
        });
        svc.add_position(&{
            let mut p = Position::new(bond("3Y"));
            *p.books.get_mut(&crate::model::BookId::Trsy1).unwrap() = -500_000;
            p
        });

        let sector = BucketedSector::new("FrontEnd", vec![bond("2Y"), bond("3Y")]);
        svc.update_bucketed_risk(&sector);
        let bucket = svc.get_bucketed_risk("FrontEnd").unwrap();

        assert_eq!(bucket.quantity, 500_000);
        let expected = (dec!(0.0134) * dec!(1_000_000) - dec!(0.01034) * dec!(500_000))
            / dec!(500_000);
        assert_eq!(bucket.pv01, expected);
        assert!(bucket.pv01 >= dec!(0.01034) && bucket.pv01 <= dec!(0.0134));
    }

    #[test]
    fn unknown_bucket_returns_none() {
        let svc = BondRiskService::new();
        assert!(svc.get_bucketed_risk("nope").is_none());
    }
}
