use ledger_stats::{
    analyze_address_history, analyze_with_config, report::ReportOptions, Address, AnalysisConfig, ApiEnvelope,
    ErrorPolicy, RawTransferRecord, Report, TransferKind, U256, U512,
};

const ADDRESS: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
const BOB: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
const CAROL: &str = "0xcccccccccccccccccccccccccccccccccccccccc";
const ERIN: &str = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";

fn wei(value: u128) -> U512 {
    U512::from(value)
}

fn streams() -> (Option<Vec<RawTransferRecord>>, Option<Vec<RawTransferRecord>>) {
    let normal = ApiEnvelope::parse_records(include_str!("fixtures/txlist.json")).unwrap();
    let internal = ApiEnvelope::parse_records(include_str!("fixtures/txlistinternal.json")).unwrap();
    (normal, internal)
}

#[test]
fn test_reconciles_both_streams() {
    let address = Address::parse(ADDRESS).unwrap();
    let (normal, internal) = streams();

    let history = analyze_address_history(&address, normal, internal);

    // one normal row lacks a value; one internal row is repeated
    assert_eq!(history.malformed_count, 1);
    assert_eq!(history.duplicate_count, 1);
    assert_eq!(history.normal_only.len(), 5);
    assert_eq!(history.internal_only.len(), 2);
    assert!(history.normal_only.iter().all(|r| r.kind == TransferKind::Normal));
    assert!(history.internal_only.iter().all(|r| r.kind == TransferKind::Internal));

    // the internal payout of 0xaa02 lands between 0xaa02 and 0xaa03
    let blocks: Vec<u64> = history.total.cumulative_time_series.iter().map(|p| p.block_number).collect();
    assert_eq!(blocks, vec![13_999_000, 14_000_000, 14_000_100, 14_000_100, 14_000_200, 14_000_400]);
}

#[test]
fn test_bundles() {
    let address = Address::parse(ADDRESS).unwrap();
    let (normal, internal) = streams();
    let history = analyze_address_history(&address, normal, internal);

    let total = &history.total;
    assert_eq!(total.count, 6);
    assert_eq!(total.error_count, 1);
    assert_eq!(total.value_sum, wei(4_350_000_000_000_000_000));
    assert_eq!(total.fee_sum, wei(5_700_000_000_000_000));
    assert_eq!(total.self_transfer_count, 1);
    assert_eq!(total.net_value().to_string(), "2350000000000000000");

    let sent = &history.sent;
    assert_eq!(sent.count, 2);
    assert_eq!(sent.error_count, 1);
    assert_eq!(sent.value_sum, wei(1_000_000_000_000_000_000));
    assert_eq!(sent.value_samples, vec![U256::zero(), U256::exp10(18)]);
    assert_eq!(sent.fee_sum, wei(4_230_000_000_000_000));

    let received = &history.received;
    assert_eq!(received.count, 3);
    assert_eq!(received.value_sum, wei(3_350_000_000_000_000_000));
    assert_eq!(received.fee_sum, wei(1_050_000_000_000_000));

    assert_eq!(total.value_sum, sent.value_sum + received.value_sum + total.self_value_sum);
    assert_eq!(history.fees_paid(), total.fee_sum - received.fee_sum);
}

#[test]
fn test_counterparty_frequency() {
    let address = Address::parse(ADDRESS).unwrap();
    let (normal, internal) = streams();
    let history = analyze_address_history(&address, normal, internal);

    let freq = &history.total.counterparty_frequency;
    assert_eq!(freq.total(), history.total.count);
    assert_eq!(freq.get(ERIN), 1);
    assert_eq!(freq.get(BOB), 2);
    assert_eq!(freq.get(CAROL), 2);

    let top: Vec<&str> = freq.top(2).iter().map(|c| c.address.as_str()).collect();
    assert_eq!(top, vec![BOB, CAROL]);

    assert_eq!(history.received.counterparty_frequency.get(CAROL), 1);
    assert_eq!(history.sent.counterparty_frequency.get(ERIN), 0);
}

#[test]
fn test_no_transactions_found() {
    let address = Address::parse(ADDRESS).unwrap();
    let empty = ApiEnvelope::parse_records(include_str!("fixtures/empty.json")).unwrap();
    assert!(empty.is_none());

    let history = analyze_address_history(&address, empty, None);
    assert!(history.is_empty());
    assert_eq!(history.total.count, 0);
    assert!(history.sent.cumulative_time_series.is_empty());

    let report = Report::build(&history, &ReportOptions::from(&AnalysisConfig::default()), chrono::Utc::now());
    assert!(!report.has_history);
}

#[test]
fn test_drop_policy() {
    let address = Address::parse(ADDRESS).unwrap();
    let (normal, internal) = streams();
    let config = AnalysisConfig { error_policy: ErrorPolicy::Drop, ..AnalysisConfig::default() };

    let history = analyze_with_config(&address, normal, internal, &config);
    assert_eq!(history.dropped_error_count, 1);
    assert_eq!(history.total.error_count, 0);
    assert_eq!(history.normal_only.len(), 4);
    assert_eq!(history.sent.value_sum, wei(1_000_000_000_000_000_000));
}

#[test]
fn test_report_serializes() {
    let address = Address::parse(ADDRESS).unwrap();
    let (normal, internal) = streams();
    let history = analyze_address_history(&address, normal, internal);

    let report = Report::build(&history, &ReportOptions::from(&AnalysisConfig::default()), chrono::Utc::now());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["address"], "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    assert_eq!(json["sent"]["count"], 2);
    assert_eq!(json["received"]["value_total"], 3.35);
    assert_eq!(json["sent"]["fee_samples"].as_array().unwrap().len(), 2);
    assert_eq!(json["internal_transactions"].as_array().unwrap().len(), 2);
    assert_eq!(json["data_quality"]["malformed"], 1);
}
