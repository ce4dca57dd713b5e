//! Execution historical sink: listens on `BondExecutionService`'s *add* channel (that service
//! notifies its own listeners via `process_add`, not `process_update`) and persists full
//! ExecutionOrder fields to `execution.txt`, preserving the reference's `IOC` -> `"LOC"` label.

use crate::fabric::Listener;
use crate::io::PublishSink;
use crate::model::ExecutionOrder;
use std::collections::HashMap;

#[derive(Default)]
struct ExecutionStore {
    orders: HashMap<String, ExecutionOrder>,
}

pub struct ExecutionHistoricalService {
    store: ExecutionStore,
    sink: PublishSink,
}

impl ExecutionHistoricalService {
    pub fn new(path: &str) -> Self {
        Self {
            store: ExecutionStore::default(),
            sink: PublishSink::create(
                path,
                &[
                    "OrderType",
                    "OrderID",
                    "BondIDType",
                    "BondID",
                    "Side",
                    "VisibleQuantity",
                    "HiddenQuantity",
                    "Price",
                    "IsChildOrder",
                    "ParentOrderId",
                ],
            ),
        }
    }

    pub fn persist_data(&mut self, order: &ExecutionOrder) {
        self.store
            .orders
            .insert(order.order_id.clone(), order.clone());
        self.sink.publish_fields(&[
            order.order_type.output_label().to_string(),
            order.order_id.clone(),
            order.product.id_type.to_string(),
            order.product.id.clone(),
            order.side.to_string(),
            order.visible_quantity.to_string(),
            order.hidden_quantity.to_string(),
            crate::price::format_price(order.price),
            order.is_child_order.to_string(),
            order.parent_order_id.clone(),
        ]);
    }
}

impl Listener<ExecutionOrder> for ExecutionHistoricalService {
    fn process_add(&mut self, data: &ExecutionOrder) {
        self.persist_data(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderType, Side};
    use crate::product::Bond;
    use rust_decimal_macros::dec;
    use tempfile::NamedTempFile;

    #[test]
    fn ioc_order_type_persists_as_loc() {
        let file = NamedTempFile::new().unwrap();
        let mut svc = ExecutionHistoricalService::new(file.path().to_str().unwrap());
        svc.persist_data(&ExecutionOrder {
            product: Bond::default(),
            side: Side::Offer,
            order_id: "ORDER19700".into(),
            order_type: OrderType::Ioc,
            price: dec!(100),
            visible_quantity: 200_000,
            hidden_quantity: 400_000,
            parent_order_id: ExecutionOrder::NO_PARENT.into(),
            is_child_order: false,
        });
        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert!(contents.contains("LOC"));
        assert!(!contents.contains("IOC"));
    }
}
