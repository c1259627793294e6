use crate::{address::Address, amount::U256, record::TransferRecord};
use derive_more::Display;
use serde::Serialize;
use tracing::{debug, warn};

///
/// Direction
///

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum Direction {
    Sent,
    Received,
    #[display("Self")]
    #[serde(rename = "Self")]
    SelfTransfer,
}

///
/// ClassifiedRecord
///

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedRecord<'a> {
    pub record: &'a TransferRecord,
    pub direction: Direction,
    pub counterparty: &'a str,
}

impl<'a> ClassifiedRecord<'a> {
    pub fn value(&self) -> U256 {
        self.record.value
    }

    pub fn fee(&self) -> Option<U256> {
        self.record.fee()
    }

    pub fn is_error(&self) -> bool {
        self.record.is_error
    }

    pub fn timestamp(&self) -> u64 {
        self.record.timestamp
    }
}

///
/// ClassifiedView
///
/// `sent` and `received` are disjoint; self-transfers only appear in `all`.
///

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedView<'a> {
    pub all: Vec<ClassifiedRecord<'a>>,
    pub sent: Vec<ClassifiedRecord<'a>>,
    pub received: Vec<ClassifiedRecord<'a>>,
    pub unrelated: usize,
}

impl<'a> ClassifiedView<'a> {
    pub fn self_transfers(&self) -> impl Iterator<Item = &ClassifiedRecord<'a>> {
        self.all.iter().filter(|r| r.direction == Direction::SelfTransfer)
    }
}

/// Tag each record with its direction relative to `address`, preserving order.
/// Records that touch neither endpoint are skipped and counted in `unrelated`.
pub fn classify<'a>(address: &Address, records: &'a [TransferRecord]) -> ClassifiedView<'a> {
    let mut view = ClassifiedView::default();

    for record in records {
        let is_from = address.matches(&record.from);
        let is_to = address.matches(&record.to);

        let (direction, counterparty) = match (is_from, is_to) {
            (true, true) => (Direction::SelfTransfer, record.from.as_str()),
            (true, false) => (Direction::Sent, record.to.as_str()),
            (false, true) => (Direction::Received, record.from.as_str()),
            (false, false) => {
                warn!("record {} does not involve {}, skipping", record.hash, address.short());
                view.unrelated += 1;
                continue;
            }
        };

        let classified = ClassifiedRecord { record, direction, counterparty };
        match direction {
            Direction::Sent => view.sent.push(classified),
            Direction::Received => view.received.push(classified),
            Direction::SelfTransfer => {}
        }
        view.all.push(classified);
    }

    debug!(
        "classified {} records for {}: {} sent, {} received, {} unrelated",
        view.all.len(),
        address.short(),
        view.sent.len(),
        view.received.len(),
        view.unrelated
    );

    view
}
