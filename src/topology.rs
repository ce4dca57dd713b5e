//! Wires every service, listener, and connector into one process-owned graph (§5, §9). Built
//! once at startup from a [`Config`], torn down at exit; nothing outside this module holds an
//! owning reference into the graph it assembles. `run` drives each subscribe connector to
//! completion in turn — pricing and market-data feed the quote/execution chain, trades.csv adds
//! further bookings on top of the execution bridge, and inquiries.csv drives the inquiry
//! lifecycle — matching §5's "no interleaving across independent subscribe connectors".

use crate::config::Config;
use crate::error::FabricResult;
use crate::fabric::{handle, ListenerHandle, ServiceHandle, SubscribeConnector};
use crate::fixtures::{reference_bonds, reference_sectors};
use crate::gui::GuiThrottleListener;
use crate::historical::execution::ExecutionHistoricalService;
use crate::historical::inquiry::InquiryHistoricalService;
use crate::historical::position::PositionHistoricalService;
use crate::historical::risk::RiskHistoricalService;
use crate::historical::streaming::StreamingHistoricalService;
use crate::product::BondProductService;
use crate::rng::{RandomVenueRouter, VenueRouter};
use crate::services::algo_execution::{BondAlgoExecutionService, ToAlgoExecutionListener};
use crate::services::algo_streaming::{BondAlgoStreamingService, ToAlgoStreamingListener};
use crate::services::execution::{BondExecutionService, ToExecutionListener};
use crate::services::inquiry::{
    BondInquiryService, InquiriesSubscribeConnector, InquiryPublishConnector, InquiryQuoteListener,
};
use crate::services::market_data::{BondMarketDataService, MarketDataSubscribeConnector};
use crate::services::position::{BondPositionService, ToPositionListener};
use crate::services::pricing::{BondPricingService, PricesSubscribeConnector};
use crate::services::risk::{BondRiskService, ToRiskListener};
use crate::services::streaming::{BondStreamingService, ToStreamingListener};
use crate::services::trade_booking::{BondTradeBookingService, ToTradeBookingListener, TradesSubscribeConnector};
use chrono::NaiveDate;
use std::rc::Rc;

/// Owns every live service, connector, and historical sink. Dropping a `Topology` tears the
/// whole graph down; nothing in it outlives this struct.
pub struct Topology {
    config: Config,
    products: ServiceHandle<BondProductService>,
    pricing: ServiceHandle<BondPricingService>,
    market_data: ServiceHandle<BondMarketDataService>,
    trade_booking: ServiceHandle<BondTradeBookingService>,
    inquiry: ServiceHandle<BondInquiryService>,

    prices_connector: PricesSubscribeConnector,
    market_data_connector: MarketDataSubscribeConnector,
    trades_connector: TradesSubscribeConnector,
    inquiries_connector: InquiriesSubscribeConnector,
}

impl Topology {
    /// Builds the full graph: seeds reference data, constructs every service, wires every
    /// listener, and prepares the four subscribe connectors. Does not read any input file yet —
    /// that happens in [`Topology::run`].
    pub fn build(config: Config, today: NaiveDate) -> Self {
        Self::build_with_router(config, today, Box::new(RandomVenueRouter::from_entropy()))
    }

    pub fn build_with_router(config: Config, today: NaiveDate, venue_router: Box<dyn VenueRouter>) -> Self {
        let bond_fixtures = reference_bonds(today);
        let sectors = reference_sectors(&bond_fixtures);

        let products = handle(BondProductService::new());
        for fixture in &bond_fixtures {
            products.borrow_mut().insert(fixture.bond.clone());
        }

        let position = handle(BondPositionService::new());
        position.borrow_mut().seed_from_products(&products.borrow());

        let risk = handle(BondRiskService::new());
        risk.borrow_mut()
            .seed(bond_fixtures.iter().map(|f| (f.bond.id.clone(), f.pv01)));

        let pricing = handle(BondPricingService::new());
        let algo_streaming = handle(BondAlgoStreamingService::new());
        let streaming = handle(BondStreamingService::new());

        let market_data = handle(BondMarketDataService::new());
        let algo_execution = handle(BondAlgoExecutionService::new());
        let execution = handle(BondExecutionService::new());
        let trade_booking = handle(BondTradeBookingService::new());

        let inquiry = handle(BondInquiryService::new());

        // --- historical sinks ---
        let position_historical = handle(PositionHistoricalService::new(&config.position_txt()));
        let risk_historical = handle(RiskHistoricalService::new(
            &config.risk_txt(),
            sectors,
            risk.clone(),
            products.clone(),
        ));
        let execution_historical = handle(ExecutionHistoricalService::new(&config.execution_txt()));
        let streaming_historical = handle(StreamingHistoricalService::new(&config.streaming_txt()));
        let inquiry_historical = handle(InquiryHistoricalService::new(&config.all_inquiries_txt()));

        // --- pricing -> algo-streaming -> streaming, plus the GUI throttle off pricing ---
        let to_algo_streaming: ListenerHandle<crate::model::PriceQuote> =
            Rc::new(std::cell::RefCell::new(ToAlgoStreamingListener::new(algo_streaming.clone())));
        pricing.borrow_mut().add_listener(to_algo_streaming);

        let gui_listener: ListenerHandle<crate::model::PriceQuote> = Rc::new(std::cell::RefCell::new(
            GuiThrottleListener::new(&config.gui_txt(), config.gui_throttle_interval, config.gui_throttle_cap),
        ));
        pricing.borrow_mut().add_listener(gui_listener);

        let to_streaming: ListenerHandle<crate::model::PriceStream> =
            Rc::new(std::cell::RefCell::new(ToStreamingListener::new(streaming.clone())));
        algo_streaming.borrow_mut().add_listener(to_streaming);

        let streaming_to_historical: ListenerHandle<crate::model::PriceStream> = streaming_historical;
        streaming.borrow_mut().add_listener(streaming_to_historical);

        // --- market-data -> algo-execution -> execution -> trade-booking bridge ---
        let to_algo_execution: ListenerHandle<crate::model::OrderBook> = Rc::new(std::cell::RefCell::new(
            ToAlgoExecutionListener::new(market_data.clone(), products.clone(), algo_execution.clone()),
        ));
        market_data.borrow_mut().add_listener(to_algo_execution);

        let to_execution: ListenerHandle<crate::model::ExecutionOrder> = Rc::new(std::cell::RefCell::new(
            ToExecutionListener::new(execution.clone(), venue_router),
        ));
        algo_execution.borrow_mut().add_listener(to_execution);

        let to_trade_booking: ListenerHandle<crate::model::ExecutionOrder> = Rc::new(std::cell::RefCell::new(
            ToTradeBookingListener::new(trade_booking.clone()),
        ));
        execution.borrow_mut().add_listener(to_trade_booking);

        let execution_to_historical: ListenerHandle<crate::model::ExecutionOrder> = execution_historical;
        execution.borrow_mut().add_listener(execution_to_historical);

        // --- trade-booking -> position -> risk, plus their historical sinks ---
        let to_position: ListenerHandle<crate::model::Trade> =
            Rc::new(std::cell::RefCell::new(ToPositionListener::new(position.clone())));
        trade_booking.borrow_mut().add_listener(to_position);

        let to_risk: ListenerHandle<crate::model::Position> =
            Rc::new(std::cell::RefCell::new(ToRiskListener::new(risk.clone())));
        position.borrow_mut().add_listener(to_risk);

        let position_to_historical: ListenerHandle<crate::model::Position> = position_historical;
        position.borrow_mut().add_listener(position_to_historical);

        let risk_to_historical: ListenerHandle<crate::model::PV01Entry> = risk_historical;
        risk.borrow_mut().add_listener(risk_to_historical);

        // --- inquiry lifecycle ---
        let inquiry_connector: ServiceHandle<dyn crate::fabric::PublishConnector<crate::model::Inquiry>> =
            Rc::new(std::cell::RefCell::new(InquiryPublishConnector::new(inquiry.clone())));
        inquiry.borrow_mut().set_connector(inquiry_connector);

        let quote_listener: ListenerHandle<crate::model::Inquiry> =
            Rc::new(std::cell::RefCell::new(InquiryQuoteListener::new(inquiry.clone())));
        inquiry.borrow_mut().add_listener(quote_listener);

        let inquiry_to_historical: ListenerHandle<crate::model::Inquiry> = inquiry_historical;
        inquiry.borrow_mut().add_listener(inquiry_to_historical);

        let prices_connector = PricesSubscribeConnector::new(config.prices_csv(), pricing.clone(), products.clone());
        let market_data_connector =
            MarketDataSubscribeConnector::new(config.marketdata_csv(), market_data.clone(), products.clone());
        let trades_connector =
            TradesSubscribeConnector::new(config.trades_csv(), trade_booking.clone(), products.clone());
        let inquiries_connector =
            InquiriesSubscribeConnector::new(config.inquiries_csv(), inquiry.clone(), products.clone());

        Self {
            config,
            products,
            pricing,
            market_data,
            trade_booking,
            inquiry,
            prices_connector,
            market_data_connector,
            trades_connector,
            inquiries_connector,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn products(&self) -> &ServiceHandle<BondProductService> {
        &self.products
    }

    pub fn pricing(&self) -> &ServiceHandle<BondPricingService> {
        &self.pricing
    }

    pub fn market_data(&self) -> &ServiceHandle<BondMarketDataService> {
        &self.market_data
    }

    pub fn trade_booking(&self) -> &ServiceHandle<BondTradeBookingService> {
        &self.trade_booking
    }

    pub fn inquiry(&self) -> &ServiceHandle<BondInquiryService> {
        &self.inquiry
    }

    /// Runs every subscribe connector to completion, in turn: prices, market data, trades, then
    /// inquiries. Per §5 there is no interleaving between them — each one's read loop finishes
    /// before the next begins.
    pub fn run(&mut self) -> FabricResult<()> {
        self.prices_connector.run()?;
        self.market_data_connector.run()?;
        self.trades_connector.run()?;
        self.inquiries_connector.run()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Venue;
    use tempfile::TempDir;

    struct FixedRouter;
    impl VenueRouter for FixedRouter {
        fn choose_venue(&mut self) -> Venue {
            Venue::Cme
        }
    }

    #[test]
    fn end_to_end_run_produces_every_output_file() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().to_str().unwrap().to_string();
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        crate::fixtures::generate_if_absent(&data_dir, 7, today).unwrap();

        let config = Config {
            data_dir,
            ..Config::default()
        };
        let mut topology = Topology::build_with_router(config.clone(), today, Box::new(FixedRouter));
        topology.run().unwrap();

        for output in [
            config.position_txt(),
            config.risk_txt(),
            config.execution_txt(),
            config.streaming_txt(),
            config.gui_txt(),
            config.all_inquiries_txt(),
        ] {
            assert!(std::path::Path::new(&output).exists(), "{output} must be written");
        }
    }
}
