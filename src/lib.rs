//! # bond-desk-fabric
//! An event-driven data fabric for a fixed-income (U.S. Treasury) trading desk.
//! It models the flow of quotes, market depth, trades, and client inquiries through a chain
//! of cooperating stateful services that compute positions, risk, streamable two-way prices,
//! executable orders, and historical persistence outputs.
//!
//! ## Overview
//! The fabric is a directed acyclic graph of [`fabric::Service`]s. A service owns a keyed store
//! of domain entities. External data enters through a [`fabric::SubscribeConnector`] (file reader)
//! that calls the service's inbound message handler; internal data propagates through
//! [`fabric::Listener`]s registered on an upstream service and pushing processed data into a
//! downstream service. Outbound data leaves through [`fabric::PublishConnector`]s (file writers).
//!
//! * **fabric**: the generic `Service<K, V>` / `Listener<V>` / `Connector<V>` abstractions that
//!   every concrete service in [`services`] is built from.
//! * **model**: value types for orders, books, quotes, price streams, execution orders, trades,
//!   positions, PV01 entries, and inquiries.
//! * **product**: the immutable `Bond` product and the `BondProductService` reference-data store.
//! * **price**: the 32nds/256ths fractional bond-price string codec.
//! * **services**: the ten live services (market-data, pricing, algo-streaming, streaming,
//!   algo-execution, execution, trade-booking, position, risk, inquiry).
//! * **historical**: the five historical sinks and their publish connectors.
//! * **gui**: the throttled price-tick listener and its file sink.
//! * **topology**: wires every service, listener, and connector into one process-owned graph.

pub mod config;
pub mod error;
pub mod fabric;
pub mod fixtures;
pub mod gui;
pub mod historical;
pub mod io;
pub mod logging;
pub mod model;
pub mod price;
pub mod product;
pub mod rng;
pub mod services;
pub mod topology;
