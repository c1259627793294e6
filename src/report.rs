// Presentation layer: turns exact-integer bundles into display-currency
// numbers for tables and charts.

use crate::{
    aggregate::StatisticsBundle,
    analyze::AddressHistory,
    config::{AnalysisConfig, UnitConversion},
    record::TransferRecord,
    stats::{Distribution, Histogram, TimeSeriesPoint},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub unit: UnitConversion,
    pub top_counterparties: usize,
    pub histogram_bins: usize,
}

impl From<&AnalysisConfig> for ReportOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            unit: config.unit,
            top_counterparties: config.top_counterparties,
            histogram_bins: config.histogram_bins,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DistributionReport {
    pub samples: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Serialize)]
pub struct HistogramRow {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SeriesPoint {
    pub time: String,
    pub block_number: u64,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct FrequencyRow {
    pub address: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct BundleReport {
    pub count: usize,
    pub error_count: usize,
    pub value_total: f64,
    pub fee_total: f64,
    pub value_samples: Vec<f64>,
    pub value_distribution: Option<DistributionReport>,
    pub value_histogram: Vec<HistogramRow>,
    /// Per-transaction cost, in timeline order.
    pub fee_samples: Vec<SeriesPoint>,
    pub fee_distribution: Option<DistributionReport>,
    pub fee_histogram: Vec<HistogramRow>,
    pub value_series: Vec<SeriesPoint>,
    pub fee_series: Vec<SeriesPoint>,
}

#[derive(Debug, Serialize)]
pub struct LineItem {
    pub hash: String,
    pub block_number: u64,
    pub time: String,
    pub from: String,
    pub to: String,
    pub value: f64,
    pub fee: Option<f64>,
    pub is_error: bool,
}

#[derive(Debug, Serialize)]
pub struct DataQuality {
    pub malformed: usize,
    pub duplicates: usize,
    pub unrelated: usize,
    pub dropped_errors: usize,
}

///
/// Report
///

#[derive(Debug, Serialize)]
pub struct Report {
    pub address: String,
    pub generated_at: String,
    pub currency: String,
    pub has_history: bool,
    pub net_value: f64,
    pub fees_paid: f64,
    pub total: BundleReport,
    pub sent: BundleReport,
    pub received: BundleReport,
    pub top_sent_to: Vec<FrequencyRow>,
    pub top_received_from: Vec<FrequencyRow>,
    pub normal_transactions: Vec<LineItem>,
    pub internal_transactions: Vec<LineItem>,
    pub data_quality: DataQuality,
}

impl Report {
    pub fn build(history: &AddressHistory, options: &ReportOptions, generated_at: DateTime<Utc>) -> Self {
        let unit = &options.unit;

        Self {
            address: history.address.to_string(),
            generated_at: generated_at.to_rfc3339(),
            currency: unit.currency.to_string(),
            has_history: !history.is_empty(),
            net_value: unit.convert(&history.total.net_value()),
            fees_paid: unit.convert(&history.fees_paid()),
            total: bundle_report(&history.total, options),
            sent: bundle_report(&history.sent, options),
            received: bundle_report(&history.received, options),
            top_sent_to: frequency_rows(&history.sent, options.top_counterparties),
            top_received_from: frequency_rows(&history.received, options.top_counterparties),
            normal_transactions: history.normal_only.iter().map(|r| line_item(r, unit)).collect(),
            internal_transactions: history.internal_only.iter().map(|r| line_item(r, unit)).collect(),
            data_quality: DataQuality {
                malformed: history.malformed_count,
                duplicates: history.duplicate_count,
                unrelated: history.unrelated_count,
                dropped_errors: history.dropped_error_count,
            },
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Address: {}", self.address)];

        if !self.has_history {
            lines.push("This address has no transaction data to display".to_string());
            return lines;
        }

        let c = &self.currency;
        lines.push(format!(
            "Transactions: {} ({} sent, {} received, {} failed)",
            self.total.count + self.total.error_count,
            self.sent.count,
            self.received.count,
            self.total.error_count
        ));
        lines.push(format!("Sent: {:.6} {c}", self.sent.value_total));
        lines.push(format!("Received: {:.6} {c}", self.received.value_total));
        lines.push(format!("Net: {:.6} {c}", self.net_value));
        lines.push(format!("Fees paid: {:.6} {c}", self.fees_paid));

        if let Some(dist) = &self.total.value_distribution {
            lines.push(format!("Median transfer: {:.6} {c} (max {:.6} {c})", dist.median, dist.max));
        }

        if !self.top_sent_to.is_empty() {
            lines.push("Most frequent recipients:".to_string());
            for (i, row) in self.top_sent_to.iter().enumerate() {
                lines.push(format!("  {}. {} - {} tx", i + 1, row.address, row.count));
            }
        }

        if !self.top_received_from.is_empty() {
            lines.push("Most frequent senders:".to_string());
            for (i, row) in self.top_received_from.iter().enumerate() {
                lines.push(format!("  {}. {} - {} tx", i + 1, row.address, row.count));
            }
        }

        let q = &self.data_quality;
        if q.malformed + q.unrelated > 0 {
            lines.push(format!("Skipped records: {} malformed, {} unrelated", q.malformed, q.unrelated));
        }

        lines
    }
}

fn bundle_report(bundle: &StatisticsBundle, options: &ReportOptions) -> BundleReport {
    let unit = &options.unit;

    BundleReport {
        count: bundle.count,
        error_count: bundle.error_count,
        value_total: unit.convert(&bundle.value_sum),
        fee_total: unit.convert(&bundle.fee_sum),
        value_samples: bundle.value_samples.iter().map(|v| unit.convert(v)).collect(),
        value_distribution: bundle.value_distribution().map(|d| distribution_report(&d, unit)),
        value_histogram: histogram_rows(&bundle.value_histogram(options.histogram_bins), unit),
        // each fee sample has its point in the fee series
        fee_samples: bundle
            .fee_samples
            .iter()
            .zip(&bundle.cumulative_fee_series)
            .map(|(fee, p)| series_point(p, unit.convert(fee)))
            .collect(),
        fee_distribution: bundle.fee_distribution().map(|d| distribution_report(&d, unit)),
        fee_histogram: histogram_rows(&bundle.fee_histogram(options.histogram_bins), unit),
        value_series: bundle
            .cumulative_time_series
            .iter()
            .map(|p| series_point(p, unit.convert(&p.running)))
            .collect(),
        fee_series: bundle
            .cumulative_fee_series
            .iter()
            .map(|p| series_point(p, unit.convert(&p.running)))
            .collect(),
    }
}

fn distribution_report(d: &Distribution, unit: &UnitConversion) -> DistributionReport {
    DistributionReport {
        samples: d.samples,
        min: unit.convert(&d.min),
        q1: unit.convert(&d.q1),
        median: unit.convert(&d.median),
        q3: unit.convert(&d.q3),
        max: unit.convert(&d.max),
        mean: unit.convert(&d.mean),
    }
}

fn histogram_rows(histogram: &Histogram, unit: &UnitConversion) -> Vec<HistogramRow> {
    histogram
        .bins
        .iter()
        .map(|b| HistogramRow { lower: unit.convert(&b.lower), upper: unit.convert(&b.upper), count: b.count })
        .collect()
}

fn frequency_rows(bundle: &StatisticsBundle, n: usize) -> Vec<FrequencyRow> {
    bundle
        .counterparty_frequency
        .top(n)
        .into_iter()
        .map(|c| FrequencyRow { address: c.address.clone(), count: c.count })
        .collect()
}

fn series_point<T>(point: &TimeSeriesPoint<T>, value: f64) -> SeriesPoint {
    SeriesPoint { time: format_timestamp(point.timestamp), block_number: point.block_number, value }
}

fn line_item(record: &TransferRecord, unit: &UnitConversion) -> LineItem {
    LineItem {
        hash: record.hash.clone(),
        block_number: record.block_number,
        time: format_timestamp(record.timestamp),
        from: record.from.clone(),
        to: record.to.clone(),
        value: unit.convert(&record.value),
        fee: record.fee().map(|f| unit.convert(&f)),
        is_error: record.is_error,
    }
}

fn format_timestamp(seconds: u64) -> String {
    i64::try_from(seconds)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}
