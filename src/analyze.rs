use crate::{
    address::Address,
    aggregate::{aggregate, StatisticsBundle},
    amount::U512,
    classify::classify,
    config::AnalysisConfig,
    reconcile::reconcile_with_policy,
    record::{ingest, RawTransferRecord, TransferKind, TransferRecord},
};
use serde::Serialize;
use tracing::info;

///
/// AddressHistory
///
/// Everything the display layer needs for one address: the three bundles
/// plus the per-kind line items.
///

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressHistory {
    pub address: Address,
    pub total: StatisticsBundle,
    pub sent: StatisticsBundle,
    pub received: StatisticsBundle,
    pub normal_only: Vec<TransferRecord>,
    pub internal_only: Vec<TransferRecord>,
    pub malformed_count: usize,
    pub duplicate_count: usize,
    pub unrelated_count: usize,
    pub dropped_error_count: usize,
}

impl AddressHistory {
    fn empty(address: &Address) -> Self {
        Self {
            address: address.clone(),
            total: StatisticsBundle::default(),
            sent: StatisticsBundle::default(),
            received: StatisticsBundle::default(),
            normal_only: Vec::new(),
            internal_only: Vec::new(),
            malformed_count: 0,
            duplicate_count: 0,
            unrelated_count: 0,
            dropped_error_count: 0,
        }
    }

    /// No transfers in either stream.
    pub fn is_empty(&self) -> bool {
        self.normal_only.is_empty() && self.internal_only.is_empty()
    }

    pub fn merged_len(&self) -> usize {
        self.normal_only.len() + self.internal_only.len()
    }

    /// Gas paid by the address: every successful normal transaction it sent,
    /// self-transfers included.
    pub fn fees_paid(&self) -> U512 {
        self.total.fee_sum.saturating_sub(self.received.fee_sum)
    }
}

/// Run the whole engine with the default error policy.
pub fn analyze_address_history(
    address: &Address,
    normal: Option<Vec<RawTransferRecord>>,
    internal: Option<Vec<RawTransferRecord>>,
) -> AddressHistory {
    analyze_with_config(address, normal, internal, &AnalysisConfig::default())
}

pub fn analyze_with_config(
    address: &Address,
    normal: Option<Vec<RawTransferRecord>>,
    internal: Option<Vec<RawTransferRecord>>,
    config: &AnalysisConfig,
) -> AddressHistory {
    let normal = ingest(normal, TransferKind::Normal);
    let internal = ingest(internal, TransferKind::Internal);
    let malformed_count = normal.malformed + internal.malformed;

    let reconciled = reconcile_with_policy(Some(normal.records), Some(internal.records), config.error_policy);

    if reconciled.is_empty() {
        info!("{} has no transaction history", address.short());
        return AddressHistory {
            malformed_count,
            dropped_error_count: reconciled.dropped_errors,
            ..AddressHistory::empty(address)
        };
    }

    // values come from the merged timeline, fees only from normal transactions
    let merged_view = classify(address, &reconciled.merged);
    let normal_view = classify(address, &reconciled.normal_only);

    let total = aggregate(&merged_view.all, Some(normal_view.all.as_slice()));
    let sent = aggregate(&merged_view.sent, Some(normal_view.sent.as_slice()));
    let received = aggregate(&merged_view.received, Some(normal_view.received.as_slice()));
    let unrelated_count = merged_view.unrelated;

    info!(
        "{}: {} transfers ({} sent, {} received, {} failed, {} malformed), net {}",
        address.short(),
        total.total_count(),
        sent.count,
        received.count,
        total.error_count,
        malformed_count,
        total.net_value()
    );

    AddressHistory {
        address: address.clone(),
        total,
        sent,
        received,
        normal_only: reconciled.normal_only,
        internal_only: reconciled.internal_only,
        malformed_count,
        duplicate_count: reconciled.duplicates,
        unrelated_count,
        dropped_error_count: reconciled.dropped_errors,
    }
}
