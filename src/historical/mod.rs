//! The five historical sinks (§4.11): thin store + publish-connector pairs that persist a
//! durable CSV record of every position, risk, execution, streaming, and inquiry update. Each
//! keys by its upstream's natural key and overwrites on write; the risk sink additionally
//! maintains bucketed-sector roll-ups.

pub mod execution;
pub mod inquiry;
pub mod position;
pub mod risk;
pub mod streaming;
