//! Bond price string codec: whole dollars, 32nds, and 256ths, e.g. `100-25+` = 100 + 25/32 +
//! 4/256. The fractional portion is always two digits of 32nds followed by a single character
//! giving the remaining eighth of a 32nd — a digit `0`..`7`, or `+` standing in for the half-tick
//! (`4`/256, i.e. 4 of the 8 possible 256ths within one 32nd). `+` and the digit `4` denote the
//! same quantity; the formatter only ever emits `+`, so round-tripping a string that used a
//! literal `4` is not guaranteed, only round-tripping the formatter's own canonical output is.

use crate::error::{FabricError, FabricResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

const THIRTY_SECOND: Decimal = Decimal::from_parts(32, 0, 0, false, 0);
const TWO_FIFTY_SIX: Decimal = Decimal::from_parts(256, 0, 0, false, 0);

/// Parses a canonical bond price string into an exact decimal dollar price.
pub fn parse_price(raw: &str) -> FabricResult<Decimal> {
    let raw = raw.trim();
    let (whole_str, frac) = raw
        .split_once('-')
        .ok_or_else(|| FabricError::MalformedPrice(raw.to_string()))?;

    let whole = Decimal::from_str(whole_str)
        .map_err(|_| FabricError::MalformedPrice(raw.to_string()))?;

    if frac.len() != 3 {
        return Err(FabricError::MalformedPrice(raw.to_string()));
    }
    let (n32_str, tick_str) = frac.split_at(2);
    let n32: u32 = n32_str
        .parse()
        .map_err(|_| FabricError::MalformedPrice(raw.to_string()))?;
    if n32 > 31 {
        return Err(FabricError::MalformedPrice(raw.to_string()));
    }
    let extra: u32 = match tick_str {
        "+" => 4,
        d => {
            let digit: u32 = d
                .parse()
                .map_err(|_| FabricError::MalformedPrice(raw.to_string()))?;
            if digit > 7 {
                return Err(FabricError::MalformedPrice(raw.to_string()));
            }
            digit
        }
    };

    let ticks_256 = Decimal::from(n32 * 8 + extra);
    Ok(whole + ticks_256 / TWO_FIFTY_SIX)
}

/// Formats an exact decimal dollar price as a canonical bond price string.
pub fn format_price(price: Decimal) -> String {
    let whole_dec = price.trunc();
    let whole = whole_dec.to_i64().unwrap_or(0);
    let frac = price - whole_dec;
    let ticks_256 = (frac * TWO_FIFTY_SIX)
        .round()
        .to_i64()
        .unwrap_or(0)
        .clamp(0, 255);

    let n32 = ticks_256 / 8;
    let extra = ticks_256 % 8;
    let tick_char = if extra == 4 {
        "+".to_string()
    } else {
        extra.to_string()
    };

    format!("{}-{:02}{}", whole, n32, tick_char)
}

/// One 32nd of a dollar, as a `Decimal`.
pub fn one_thirty_second() -> Decimal {
    Decimal::ONE / THIRTY_SECOND
}

/// One 256th of a dollar, as a `Decimal`. Used for the tight-spread boundary (1/128 == 2/256).
pub fn one_two_fifty_sixth() -> Decimal {
    Decimal::ONE / TWO_FIFTY_SIX
}

/// 1/128 of a dollar, the algo-execution tight-spread trigger threshold.
pub fn one_one_twenty_eighth() -> Decimal {
    Decimal::ONE / Decimal::from(128u32)
}
