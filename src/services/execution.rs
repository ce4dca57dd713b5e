//! Execution venue routing. Listens to algo-execution *updates*; for each order picks a venue
//! via a pluggable randomness source (§4.4, §9) and notifies its own listeners via the *add*
//! channel — consumed by both the execution historical sink and the trade-booking bridge.

use crate::fabric::{ListenerRegistry, Listener, Service, ServiceHandle};
use crate::model::ExecutionOrder;
use crate::rng::VenueRouter;
use std::collections::HashMap;

#[derive(Default)]
pub struct BondExecutionService {
    orders: HashMap<String, ExecutionOrder>,
    listeners: ListenerRegistry<ExecutionOrder>,
}

impl BondExecutionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: crate::fabric::ListenerHandle<ExecutionOrder>) {
        self.listeners.add(listener);
    }
}

impl Service<str, ExecutionOrder> for BondExecutionService {
    fn get(&self, key: &str) -> ExecutionOrder {
        self.orders.get(key).cloned().unwrap_or_else(|| ExecutionOrder {
            product: crate::product::Bond::default(),
            side: crate::model::Side::Bid,
            order_id: String::new(),
            order_type: crate::model::OrderType::Ioc,
            price: rust_decimal::Decimal::ZERO,
            visible_quantity: 0,
            hidden_quantity: 0,
            parent_order_id: ExecutionOrder::NO_PARENT.to_string(),
            is_child_order: false,
        })
    }

    fn on_message(&mut self, data: ExecutionOrder) {
        let product_id = data.product.id.clone();
        self.orders.insert(product_id, data.clone());
        self.listeners.notify_add(&data);
    }
}

/// Registered on `BondAlgoExecutionService`'s *update* channel. Venue routing is logged for
/// observability but has no bearing on the Trade/Position/Risk computation downstream.
pub struct ToExecutionListener {
    execution: ServiceHandle<BondExecutionService>,
    router: Box<dyn VenueRouter>,
}

impl ToExecutionListener {
    pub fn new(execution: ServiceHandle<BondExecutionService>, router: Box<dyn VenueRouter>) -> Self {
        Self { execution, router }
    }
}

impl Listener<ExecutionOrder> for ToExecutionListener {
    fn process_update(&mut self, data: &ExecutionOrder) {
        let venue = self.router.choose_venue();
        tracing::info!(
            product_id = %data.product.id,
            order_id = %data.order_id,
            %venue,
            "routed execution order"
        );
        self.execution.borrow_mut().on_message(data.clone());
    }
}
