//! Position historical sink: listens on `BondPositionService`'s update channel and persists one
//! line per book plus one `AGGREGATED` line to `position.txt`.

use crate::fabric::Listener;
use crate::io::PublishSink;
use crate::model::{BookId, Position};
use std::collections::HashMap;

pub const AGGREGATED_BOOK: &str = "AGGREGATED";

#[derive(Default)]
struct PositionStore {
    positions: HashMap<String, Position>,
}

/// Owns `position.txt` and republishes every position update as book-level and
/// aggregate lines.
pub struct PositionHistoricalService {
    store: PositionStore,
    sink: PublishSink,
}

impl PositionHistoricalService {
    pub fn new(path: &str) -> Self {
        Self {
            store: PositionStore::default(),
            sink: PublishSink::create(
                path,
                &["ProductIDType", "ProductID", "Book", "Quantity"],
            ),
        }
    }

    pub fn persist_data(&mut self, position: &Position) {
        self.store
            .positions
            .insert(position.product.id.clone(), position.clone());

        for book in BookId::ALL {
            let quantity = *position.books.get(&book).unwrap_or(&0);
            self.sink.publish_fields(&[
                position.product.id_type.to_string(),
                position.product.id.clone(),
                book.to_string(),
                quantity.to_string(),
            ]);
        }
        self.sink.publish_fields(&[
            position.product.id_type.to_string(),
            position.product.id.clone(),
            AGGREGATED_BOOK.to_string(),
            position.aggregate().to_string(),
        ]);
    }
}

/// Registered directly on `BondPositionService`'s update channel.
impl Listener<Position> for PositionHistoricalService {
    fn process_update(&mut self, data: &Position) {
        self.persist_data(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BookId;
    use crate::product::Bond;
    use tempfile::NamedTempFile;

    #[test]
    fn persists_one_line_per_book_plus_aggregate() {
        let file = NamedTempFile::new().unwrap();
        let mut svc = PositionHistoricalService::new(file.path().to_str().unwrap());

        let mut position = Position::new(Bond {
            id: "BOND1".into(),
            ..Bond::default()
        });
        *position.books.get_mut(&BookId::Trsy1).unwrap() = 1_000_000;
        svc.persist_data(&position);

        let contents = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        // header + 3 books + 1 aggregate
        assert_eq!(lines.len(), 5);
        assert!(lines.last().unwrap().contains(AGGREGATED_BOOK));
    }
}
