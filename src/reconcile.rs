use crate::{
    amount::U256,
    config::ErrorPolicy,
    record::{TransferKind, TransferRecord},
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// (block number, intra-block index, kind, trace path). Records without any
/// index sort after the indexed ones of their block.
type SortKey = (u64, u64, TransferKind, Vec<u64>);

// "0_1_10" -> [0, 1, 10], so sibling calls order numerically
fn trace_path(trace_id: Option<&str>) -> Vec<u64> {
    trace_id
        .map(|id| id.split('_').map(|part| part.trim().parse().unwrap_or(u64::MAX)).collect())
        .unwrap_or_default()
}

///
/// Reconciled
///

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    pub merged: Vec<TransferRecord>,
    pub normal_only: Vec<TransferRecord>,
    pub internal_only: Vec<TransferRecord>,
    pub duplicates: usize,
    pub dropped_errors: usize,
}

impl Reconciled {
    /// No history at all: both streams were absent or empty.
    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }
}

/// Merge both streams into one timeline, keeping failed transfers.
///
/// Each record keeps the `kind` it was given at ingestion (see
/// [`crate::record::ingest`]); the stream a record arrives in is not
/// consulted. A record tagged `Normal` that turns up in the internal stream
/// is still a normal transfer, and collapses with its twin from the normal
/// stream.
pub fn reconcile(normal: Option<Vec<TransferRecord>>, internal: Option<Vec<TransferRecord>>) -> Reconciled {
    reconcile_with_policy(normal, internal, ErrorPolicy::Retain)
}

pub fn reconcile_with_policy(
    normal: Option<Vec<TransferRecord>>,
    internal: Option<Vec<TransferRecord>>,
    policy: ErrorPolicy,
) -> Reconciled {
    let mut all: Vec<TransferRecord> = normal.unwrap_or_default();
    all.extend(internal.unwrap_or_default());

    let mut dropped_errors = 0;
    if policy == ErrorPolicy::Drop {
        let before = all.len();
        all.retain(|r| !r.is_error);
        dropped_errors = before - all.len();
    }

    // internal transfers lack an index of their own, so borrow the one of
    // the normal transaction that spawned them
    let parent_index: HashMap<String, u64> = all
        .iter()
        .filter(|r| r.kind == TransferKind::Normal)
        .filter_map(|r| r.transaction_index.map(|idx| (r.hash.clone(), idx)))
        .collect();

    let mut keyed: Vec<(SortKey, TransferRecord)> = all
        .into_iter()
        .map(|r| {
            let index = r.transaction_index.or_else(|| parent_index.get(&r.hash).copied()).unwrap_or(u64::MAX);
            ((r.block_number, index, r.kind, trace_path(r.trace_id.as_deref())), r)
        })
        .collect();

    // stable, so full key collisions keep input order
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));

    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(keyed.len());
        keyed.iter().map(|(_, r)| seen.insert(r.identity())).collect()
    };

    let mut reconciled = Reconciled { dropped_errors, ..Default::default() };

    for ((_, record), keep) in keyed.into_iter().zip(keep) {
        if !keep {
            reconciled.duplicates += 1;
            continue;
        }
        match record.kind {
            TransferKind::Normal => reconciled.normal_only.push(record.clone()),
            TransferKind::Internal => reconciled.internal_only.push(record.clone()),
        }
        reconciled.merged.push(record);
    }

    debug!(
        "reconciled {} records ({} normal, {} internal, {} duplicates, {} errors dropped)",
        reconciled.merged.len(),
        reconciled.normal_only.len(),
        reconciled.internal_only.len(),
        reconciled.duplicates,
        reconciled.dropped_errors
    );

    reconciled
}
