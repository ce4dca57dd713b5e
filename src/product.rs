//! The immutable Bond product and the reference-data service that resolves a bond id read off
//! a CSV line into a full `Bond` value.

use crate::fabric::Service;
use chrono::NaiveDate;
use derive_more::Display;
use indexmap::IndexMap;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BondIdType {
    #[display("CUSIP")]
    Cusip,
    #[display("ISIN")]
    Isin,
}

impl std::str::FromStr for BondIdType {
    type Err = crate::error::FabricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CUSIP" => Ok(BondIdType::Cusip),
            "ISIN" => Ok(BondIdType::Isin),
            other => Err(crate::error::FabricError::UnknownBondIdType(other.to_string())),
        }
    }
}

/// A Treasury bond product. Immutable once created; the only mutable state attached to a bond
/// anywhere in the fabric lives in the services keyed by its product id, never on this type.
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub id: String,
    pub id_type: BondIdType,
    pub ticker: String,
    pub coupon: Decimal,
    pub maturity: NaiveDate,
}

impl Default for Bond {
    fn default() -> Self {
        Self {
            id: String::new(),
            id_type: BondIdType::Cusip,
            ticker: String::new(),
            coupon: Decimal::ZERO,
            maturity: NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date"),
        }
    }
}

impl Bond {
    pub fn maturity_year(&self) -> i32 {
        use chrono::Datelike;
        self.maturity.year()
    }
}

/// A named group of constituent bonds whose risk is summarized jointly.
#[derive(Debug, Clone)]
pub struct BucketedSector {
    pub name: String,
    pub bonds: Vec<Bond>,
}

impl BucketedSector {
    pub fn new(name: impl Into<String>, bonds: Vec<Bond>) -> Self {
        Self {
            name: name.into(),
            bonds,
        }
    }
}

/// Reference-data store for Treasury bond products, keyed by product id. Populated once at
/// topology construction and never updated afterward; every connector that parses a bond id off
/// a CSV line resolves it through this service.
#[derive(Default)]
pub struct BondProductService {
    bonds: IndexMap<String, Bond>,
}

impl BondProductService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, bond: Bond) {
        self.bonds.insert(bond.id.clone(), bond);
    }

    pub fn all(&self) -> impl Iterator<Item = &Bond> {
        self.bonds.values()
    }
}

impl Service<str, Bond> for BondProductService {
    fn get(&self, key: &str) -> Bond {
        self.bonds.get(key).cloned().unwrap_or_default()
    }

    fn on_message(&mut self, data: Bond) {
        self.insert(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_bond_resolves_to_default() {
        let svc = BondProductService::new();
        assert_eq!(svc.get("nope"), Bond::default());
    }

    #[test]
    fn bond_id_type_parses_case_insensitively() {
        assert_eq!("cusip".parse::<BondIdType>().unwrap(), BondIdType::Cusip);
        assert_eq!("ISIN".parse::<BondIdType>().unwrap(), BondIdType::Isin);
        assert!("XYZ".parse::<BondIdType>().is_err());
    }
}
