use crate::{
    amount::{widen, SignedTotal, U256, U512},
    classify::{ClassifiedRecord, Direction},
    stats::{CounterpartyFrequency, Distribution, Histogram, TimeSeriesPoint},
};
use serde::Serialize;

///
/// StatisticsBundle
///
/// Aggregates for one direction subset. Failed transfers are counted in
/// `error_count` and contribute nothing else.
///

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatisticsBundle {
    pub count: usize,
    pub error_count: usize,
    pub value_sum: U512,
    pub value_samples: Vec<U256>,
    pub fee_sum: U512,
    pub fee_samples: Vec<U256>,
    pub self_transfer_count: usize,
    pub self_value_sum: U512,
    pub counterparty_frequency: CounterpartyFrequency,
    /// One point per entry of `value_samples`.
    pub cumulative_time_series: Vec<TimeSeriesPoint<SignedTotal>>,
    /// One point per entry of `fee_samples`.
    pub cumulative_fee_series: Vec<TimeSeriesPoint<U512>>,
}

impl StatisticsBundle {
    /// Successful plus failed.
    pub fn total_count(&self) -> usize {
        self.count + self.error_count
    }

    /// Net value at the end of the series (received minus sent).
    pub fn net_value(&self) -> SignedTotal {
        self.cumulative_time_series.last().map(|p| p.running).unwrap_or_default()
    }

    pub fn value_distribution(&self) -> Option<Distribution> {
        Distribution::from_samples(&self.value_samples)
    }

    pub fn fee_distribution(&self) -> Option<Distribution> {
        Distribution::from_samples(&self.fee_samples)
    }

    pub fn value_histogram(&self, bins: usize) -> Histogram {
        Histogram::from_samples(&self.value_samples, bins)
    }

    pub fn fee_histogram(&self, bins: usize) -> Histogram {
        Histogram::from_samples(&self.fee_samples, bins)
    }
}

/// Build the bundle for one direction subset. Values come from `view`, fees
/// from `fee_source` (the normal-only view of the same direction), since
/// only normal transactions carry a fee.
pub fn aggregate(view: &[ClassifiedRecord<'_>], fee_source: Option<&[ClassifiedRecord<'_>]>) -> StatisticsBundle {
    let mut bundle = StatisticsBundle::default();
    let mut running = SignedTotal::default();

    for r in view {
        if r.is_error() {
            bundle.error_count += 1;
            continue;
        }

        let value = r.value();
        bundle.count += 1;
        bundle.value_sum = bundle.value_sum + widen(value);
        bundle.value_samples.push(value);
        bundle.counterparty_frequency.record(r.counterparty);

        match r.direction {
            Direction::Received => running.credit(widen(value)),
            Direction::Sent => running.debit(widen(value)),
            Direction::SelfTransfer => {
                bundle.self_transfer_count += 1;
                bundle.self_value_sum = bundle.self_value_sum + widen(value);
            }
        }

        bundle.cumulative_time_series.push(TimeSeriesPoint {
            timestamp: r.timestamp(),
            block_number: r.record.block_number,
            running,
        });
    }

    for r in fee_source.unwrap_or_default() {
        if r.is_error() {
            continue;
        }
        let Some(fee) = r.fee() else {
            continue;
        };

        bundle.fee_sum = bundle.fee_sum + widen(fee);
        bundle.fee_samples.push(fee);
        bundle.cumulative_fee_series.push(TimeSeriesPoint {
            timestamp: r.timestamp(),
            block_number: r.record.block_number,
            running: bundle.fee_sum,
        });
    }

    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{address::Address, classify::classify, record::{TransferKind, TransferRecord}};

    const ME: &str = "0x1111111111111111111111111111111111111111";
    const BOB: &str = "0x2222222222222222222222222222222222222222";
    const CAROL: &str = "0x3333333333333333333333333333333333333333";

    fn record(from: &str, to: &str, value: U256, block: u64, kind: TransferKind) -> TransferRecord {
        TransferRecord {
            hash: format!("0x{block}"),
            block_number: block,
            timestamp: 1_600_000_000 + block,
            transaction_index: Some(0),
            trace_id: None,
            from: from.to_string(),
            to: to.to_string(),
            value,
            gas_used: U256::from(21_000u64),
            gas_price: U256::from(2u64),
            kind,
            is_error: false,
        }
    }

    fn wei(value: u64) -> U256 {
        U256::from(value)
    }

    #[test]
    fn test_empty_view() {
        let bundle = aggregate(&[], None);
        assert_eq!(bundle, StatisticsBundle::default());
        assert_eq!(bundle.net_value(), SignedTotal::default());
        assert!(bundle.value_distribution().is_none());
    }

    #[test]
    fn test_running_balance() {
        let address = Address::parse(ME).unwrap();
        let records = vec![
            record(BOB, ME, wei(500), 1, TransferKind::Normal),
            record(ME, CAROL, wei(200), 2, TransferKind::Normal),
            record(ME, ME, wei(50), 3, TransferKind::Normal),
            record(CAROL, ME, wei(0), 4, TransferKind::Internal),
            record(ME, CAROL, wei(700), 5, TransferKind::Internal),
        ];
        let view = classify(&address, &records);
        let bundle = aggregate(&view.all, Some(view.all.as_slice()));

        let running: Vec<String> = bundle.cumulative_time_series.iter().map(|p| p.running.to_string()).collect();
        assert_eq!(running, vec!["500", "300", "300", "300", "-400"]);
        assert!(bundle.net_value().is_negative());
        assert_eq!(bundle.count, 5);
        assert_eq!(bundle.value_sum, U512::from(1450u64));
        assert_eq!(bundle.value_samples, vec![wei(500), wei(200), wei(50), wei(0), wei(700)]);
        assert_eq!(bundle.self_transfer_count, 1);
        assert_eq!(bundle.self_value_sum, U512::from(50u64));

        // the internal records carry no fee
        assert_eq!(bundle.fee_samples, vec![wei(42_000); 3]);
        assert_eq!(bundle.fee_sum, U512::from(126_000u64));
        assert_eq!(bundle.cumulative_fee_series.last().unwrap().running, bundle.fee_sum);
    }

    #[test]
    fn test_errors_only_counted() {
        let address = Address::parse(ME).unwrap();
        let mut failed = record(ME, BOB, wei(999), 1, TransferKind::Normal);
        failed.is_error = true;
        let records = vec![failed, record(ME, BOB, wei(1), 2, TransferKind::Normal)];
        let view = classify(&address, &records);
        let bundle = aggregate(&view.sent, Some(view.sent.as_slice()));

        assert_eq!(bundle.count, 1);
        assert_eq!(bundle.error_count, 1);
        assert_eq!(bundle.total_count(), 2);
        assert_eq!(bundle.value_sum, U512::one());
        assert_eq!(bundle.fee_samples.len(), 1);
        assert_eq!(bundle.counterparty_frequency.total(), bundle.count);
    }

    #[test]
    fn test_frequency_matches_count() {
        let address = Address::parse(ME).unwrap();
        let records = vec![
            record(ME, BOB, wei(1), 1, TransferKind::Normal),
            record(CAROL, ME, wei(1), 2, TransferKind::Normal),
            record(ME, BOB, wei(1), 3, TransferKind::Normal),
            record(ME, ME, wei(1), 4, TransferKind::Normal),
        ];
        let view = classify(&address, &records);
        let bundle = aggregate(&view.all, None);

        assert_eq!(bundle.counterparty_frequency.total(), bundle.count);
        assert_eq!(bundle.counterparty_frequency.get(BOB), 2);
        assert_eq!(bundle.counterparty_frequency.get(CAROL), 1);
        assert_eq!(bundle.counterparty_frequency.get(ME), 1);
        assert!(bundle.fee_samples.is_empty());
    }

    #[test]
    fn test_sums_beyond_128_bits_are_exact() {
        let address = Address::parse(ME).unwrap();
        let half = U256::one() << 255;
        let records = vec![
            record(BOB, ME, U256::from(5u64), 1, TransferKind::Internal),
            record(BOB, ME, U256::one() << 127, 2, TransferKind::Internal),
            record(BOB, ME, U256::MAX, 3, TransferKind::Internal),
            record(ME, CAROL, half, 4, TransferKind::Internal),
        ];
        let view = classify(&address, &records);

        let total = aggregate(&view.all, None);
        let expected = widen(U256::MAX) + widen(U256::one() << 127) + widen(half) + 5;
        assert_eq!(total.count, 4);
        assert_eq!(total.value_sum, expected);
        assert_eq!(total.value_samples[2], U256::MAX);

        let net = total.net_value();
        assert!(!net.is_negative());
        assert_eq!(net.magnitude(), widen(U256::MAX) - widen(half) + widen(U256::one() << 127) + 5);

        let received = aggregate(&view.received, None);
        assert_eq!(received.value_sum + aggregate(&view.sent, None).value_sum, total.value_sum);
    }
}
