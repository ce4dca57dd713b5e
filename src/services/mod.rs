//! The ten live services: market-data, pricing, algo-streaming, streaming, algo-execution,
//! execution, trade-booking, position, risk, and inquiry. Each module pairs a `Service`
//! implementation with the listener(s) and subscribe connector(s) that drive it, mirroring how
//! the reference groups a service with its connector and listener in one translation unit.

pub mod algo_execution;
pub mod algo_streaming;
pub mod execution;
pub mod inquiry;
pub mod market_data;
pub mod position;
pub mod pricing;
pub mod risk;
pub mod streaming;
pub mod trade_booking;
