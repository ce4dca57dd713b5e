//! Ambient demo/test data (§3, §6): the fixed set of on-the-run Treasury bonds every service is
//! seeded with, and a deterministic CSV fixture generator that writes `trades.csv`, `prices.csv`,
//! `marketdata.csv`, and `inquiries.csv` under the configured data directory when they are not
//! already present, so a fresh checkout can run end-to-end without hand-authored input files.
//! This is bounded, ambient tooling around the boundary the fabric already draws — it does not
//! change any service algorithm in [`crate::services`].

use crate::model::{BookId, InquiryState, TradeSide};
use crate::price::format_price;
use crate::product::{Bond, BondIdType, BucketedSector};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::io::Write;
use std::path::Path;

/// One on-the-run Treasury bond plus the ambient data the risk and bucket roll-up need: its
/// per-unit PV01 and the name of the bucketed sector it belongs to.
#[derive(Debug, Clone)]
pub struct BondFixture {
    pub bond: Bond,
    pub pv01: Decimal,
    pub sector: &'static str,
}

/// The fixed six-tenor on-the-run curve, with distinct CUSIPs per bond (the original dataset
/// this was distilled from assigns the same CUSIP to two different tenors; that is treated here
/// as a data bug, not a convention — see DESIGN.md).
pub fn reference_bonds(today: NaiveDate) -> Vec<BondFixture> {
    use chrono::Months;

    // (ticker, cusip, tenor in months, coupon, per-unit PV01, bucket)
    let specs: [(&str, &str, u32, &str, &str, &str); 6] = [
        ("2Y", "912828ZZ1", 24, "0.0425", "0.0134", "FrontEnd"),
        ("3Y", "912828YY4", 36, "0.0400", "0.01034", "FrontEnd"),
        ("5Y", "912828XX7", 60, "0.0375", "0.0447", "Belly"),
        ("7Y", "912828WW0", 84, "0.0400", "0.0623", "Belly"),
        ("10Y", "912828VV3", 120, "0.0425", "0.0875", "LongEnd"),
        ("30Y", "912810TT6", 360, "0.0450", "0.1862", "LongEnd"),
    ];

    specs
        .into_iter()
        .map(|(ticker, cusip, months, coupon, pv01, sector)| {
            let maturity = today
                .checked_add_months(Months::new(months))
                .expect("maturity within representable range");
            BondFixture {
                bond: Bond {
                    id: cusip.to_string(),
                    id_type: BondIdType::Cusip,
                    ticker: ticker.to_string(),
                    coupon: coupon.parse().expect("valid coupon literal"),
                    maturity,
                },
                pv01: pv01.parse().expect("valid pv01 literal"),
                sector,
            }
        })
        .collect()
}

/// Named groups used to seed the risk historical sink's bucketed roll-up.
pub fn reference_sectors(bonds: &[BondFixture]) -> Vec<BucketedSector> {
    let mut sectors: Vec<(&'static str, Vec<Bond>)> = Vec::new();
    for fixture in bonds {
        match sectors.iter_mut().find(|(name, _)| *name == fixture.sector) {
            Some((_, members)) => members.push(fixture.bond.clone()),
            None => sectors.push((fixture.sector, vec![fixture.bond.clone()])),
        }
    }
    sectors
        .into_iter()
        .map(|(name, bonds)| BucketedSector::new(name, bonds))
        .collect()
}

/// Writes `trades.csv`, `prices.csv`, `marketdata.csv`, and `inquiries.csv` into `data_dir`, each
/// only if it does not already exist. Deterministic for a given `seed`: re-running with the same
/// seed against an empty directory produces byte-identical files.
pub fn generate_if_absent(data_dir: &str, seed: u64, today: NaiveDate) -> std::io::Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let bonds = reference_bonds(today);
    let mut rng = StdRng::seed_from_u64(seed);

    write_if_absent(data_dir, "prices.csv", || generate_prices(&bonds, &mut rng))?;
    write_if_absent(data_dir, "marketdata.csv", || {
        generate_market_data(&bonds, &mut rng)
    })?;
    write_if_absent(data_dir, "trades.csv", || generate_trades(&bonds, &mut rng))?;
    write_if_absent(data_dir, "inquiries.csv", || {
        generate_inquiries(&bonds, &mut rng)
    })?;
    Ok(())
}

fn write_if_absent(
    data_dir: &str,
    filename: &str,
    generate: impl FnOnce() -> String,
) -> std::io::Result<()> {
    let path = Path::new(data_dir).join(filename);
    if path.exists() {
        tracing::info!(path = %path.display(), "fixture already present, leaving as-is");
        return Ok(());
    }
    let mut file = std::fs::File::create(&path)?;
    file.write_all(generate().as_bytes())?;
    tracing::info!(path = %path.display(), "generated fixture");
    Ok(())
}

fn generate_prices(bonds: &[BondFixture], rng: &mut StdRng) -> String {
    let mut out = String::from("BondIDType,BondID,Price,Spread\n");
    for fixture in bonds {
        let whole = 95 + rng.random_range(0..10);
        let thirty_seconds = rng.random_range(0..32);
        let mid = format_price(Decimal::from(whole) + Decimal::from(thirty_seconds) / Decimal::from(32));
        let spread: Decimal = Decimal::from(rng.random_range(1..5)) / Decimal::from(128);
        out.push_str(&format!(
            "{},{},{},{}\n",
            fixture.bond.id_type, fixture.bond.id, mid, spread
        ));
    }
    out
}

fn generate_market_data(bonds: &[BondFixture], rng: &mut StdRng) -> String {
    let mut out = String::from(
        "BondIDType,BondID,Price,Spread1,Spread2,Spread3,Spread4,Spread5,Size1,Size2,Size3,Size4,Size5\n",
    );
    for fixture in bonds {
        let whole = 99 + rng.random_range(0..2);
        let mid = format_price(Decimal::from(whole));
        let spreads: Vec<String> = (1..=5)
            .map(|depth| (Decimal::from(depth) / Decimal::from(256)).to_string())
            .collect();
        let sizes: Vec<String> = (1..=5)
            .map(|depth| (1_000_000 * depth).to_string())
            .collect();
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            fixture.bond.id_type,
            fixture.bond.id,
            mid,
            spreads.join(","),
            sizes.join(",")
        ));
    }
    out
}

fn generate_trades(bonds: &[BondFixture], rng: &mut StdRng) -> String {
    let mut out = String::from("TradeID,BondIDType,BondID,Side,Quantity,Price,BookId\n");
    for (i, fixture) in bonds.iter().enumerate() {
        let side = if rng.random_bool(0.5) {
            TradeSide::Buy
        } else {
            TradeSide::Sell
        };
        let quantity = 1_000_000 * (1 + rng.random_range(0..5));
        let price = format_price(Decimal::from(99) + Decimal::from(rng.random_range(0..32)) / Decimal::from(32));
        let book = BookId::ALL[i % 3];
        out.push_str(&format!(
            "TRADE{i},{},{},{},{},{},{}\n",
            fixture.bond.id_type, fixture.bond.id, side, quantity, price, book
        ));
    }
    out
}

fn generate_inquiries(bonds: &[BondFixture], rng: &mut StdRng) -> String {
    let mut out = String::from("InquiryID,BondIDType,BondID,Side,Quantity,Price,State\n");
    for (i, fixture) in bonds.iter().enumerate() {
        let side = if rng.random_bool(0.5) {
            TradeSide::Buy
        } else {
            TradeSide::Sell
        };
        let quantity = 500_000 * (1 + rng.random_range(0..3));
        let price = format_price(Decimal::from(99) + Decimal::from(rng.random_range(0..32)) / Decimal::from(32));
        out.push_str(&format!(
            "INQUIRY{i},{},{},{},{},{},{}\n",
            fixture.bond.id_type,
            fixture.bond.id,
            side,
            quantity,
            price,
            InquiryState::Received
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    #[test]
    fn six_distinct_tenors_with_distinct_cusips() {
        let bonds = reference_bonds(today());
        assert_eq!(bonds.len(), 6);
        let mut ids: Vec<&str> = bonds.iter().map(|f| f.bond.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6, "every bond must have a distinct CUSIP");
    }

    #[test]
    fn sectors_partition_bonds_by_tenor() {
        let bonds = reference_bonds(today());
        let sectors = reference_sectors(&bonds);
        assert_eq!(sectors.len(), 3);
        let total: usize = sectors.iter().map(|s| s.bonds.len()).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn same_seed_yields_byte_identical_fixtures() {
        let dir_a = TempDir::new().unwrap();
        let dir_b = TempDir::new().unwrap();
        generate_if_absent(dir_a.path().to_str().unwrap(), 42, today()).unwrap();
        generate_if_absent(dir_b.path().to_str().unwrap(), 42, today()).unwrap();

        for name in ["trades.csv", "prices.csv", "marketdata.csv", "inquiries.csv"] {
            let a = std::fs::read_to_string(dir_a.path().join(name)).unwrap();
            let b = std::fs::read_to_string(dir_b.path().join(name)).unwrap();
            assert_eq!(a, b, "{name} must be byte-identical across runs with the same seed");
        }
    }

    #[test]
    fn does_not_overwrite_existing_fixture() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(dir.path().join("trades.csv"), "custom content\n").unwrap();
        generate_if_absent(dir.path().to_str().unwrap(), 1, today()).unwrap();
        let contents = std::fs::read_to_string(dir.path().join("trades.csv")).unwrap();
        assert_eq!(contents, "custom content\n");
    }
}
