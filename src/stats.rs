// Exact-integer distribution helpers behind the box plots, histograms and
// frequency tables. Nothing in here touches floating point.

use crate::amount::{widen, U256, U512};
use serde::Serialize;
use std::collections::HashMap;

///
/// Distribution
///

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub samples: usize,
    pub min: U256,
    pub q1: U256,
    pub median: U256,
    pub q3: U256,
    pub max: U256,
    /// Floor of the arithmetic mean.
    pub mean: U256,
}

impl Distribution {
    pub fn from_samples(samples: &[U256]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();

        let n = sorted.len();
        let sum = sorted.iter().fold(U512::zero(), |acc, &x| acc + widen(x));
        // the mean of uint256 samples is itself a uint256
        let mean = U256::try_from(sum / U512::from(n as u64)).unwrap_or(U256::MAX);

        Some(Self {
            samples: n,
            min: sorted[0],
            q1: nearest_rank(&sorted, 25),
            median: nearest_rank(&sorted, 50),
            q3: nearest_rank(&sorted, 75),
            max: sorted[n - 1],
            mean,
        })
    }
}

// Nearest-rank percentile over a sorted, non-empty slice.
fn nearest_rank(sorted: &[U256], percentile: usize) -> U256 {
    let n = sorted.len();
    let rank = (percentile * n).div_ceil(100).max(1);
    sorted[rank.min(n) - 1]
}

///
/// Histogram
///

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramBin {
    /// Inclusive.
    pub lower: U256,
    /// Exclusive, saturating at `U256::MAX` for the last bin.
    pub upper: U256,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    /// Equal-width bins spanning [min, max]. The width is rounded up so every
    /// sample falls in exactly one bin.
    pub fn from_samples(samples: &[U256], bins: usize) -> Self {
        let (Some(&min), Some(&max)) = (samples.iter().min(), samples.iter().max()) else {
            return Self::default();
        };
        let bins = bins.max(1);

        let width = ((max - min) / U256::from(bins as u64)).saturating_add(U256::one());
        let mut histogram: Vec<HistogramBin> = (0..bins as u64)
            .map(|i| {
                let lower = min.saturating_add(U256::from(i).saturating_mul(width));
                HistogramBin { lower, upper: lower.saturating_add(width), count: 0 }
            })
            .collect();

        for &sample in samples {
            // the quotient is below `bins`, so it fits in the low limb
            let idx = ((sample - min) / width).low_u64() as usize;
            histogram[idx.min(bins - 1)].count += 1;
        }

        Self { bins: histogram }
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

///
/// CounterpartyFrequency
///
/// Occurrence counts per counterparty, remembering first-seen order so
/// frequency ties resolve deterministically.
///

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterpartyCount {
    pub address: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CounterpartyFrequency {
    entries: Vec<CounterpartyCount>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl CounterpartyFrequency {
    pub fn record(&mut self, address: &str) {
        match self.index.get(address) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(address.to_string(), self.entries.len());
                self.entries.push(CounterpartyCount { address: address.to_string(), count: 1 });
            }
        }
    }

    pub fn get(&self, address: &str) -> usize {
        self.index.get(address).map(|&i| self.entries[i].count).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counters.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn top(&self, n: usize) -> Vec<&CounterpartyCount> {
        let mut ranked: Vec<&CounterpartyCount> = self.entries.iter().collect();
        // stable: equal counts stay in first-seen order
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(n);
        ranked
    }
}

///
/// TimeSeriesPoint
///

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSeriesPoint<T> {
    pub timestamp: u64,
    pub block_number: u64,
    pub running: T,
}
