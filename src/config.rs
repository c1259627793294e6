use crate::{amount::AsFloat, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub const CONFIG_ENV_VAR: &str = "LEDGER_STATS_CONFIG";

///
/// ErrorPolicy
///
/// What to do with transfers the ledger marks as failed. They never count
/// towards sums either way.
///

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    #[default]
    Retain,
    Drop,
}

///
/// UnitConversion
///
/// Base units -> display currency. Only the report layer applies this.
///

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConversion {
    pub decimals: u32,
    pub rate: f64,
    pub currency: Currency,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum Currency {
    #[default]
    #[serde(rename = "ETH")]
    #[display("ETH")]
    Eth,
    #[serde(rename = "USD")]
    #[display("USD")]
    Usd,
    #[serde(rename = "EUR")]
    #[display("EUR")]
    Eur,
    #[serde(rename = "BTC")]
    #[display("BTC")]
    Btc,
}

impl Default for UnitConversion {
    fn default() -> Self {
        Self { decimals: 18, rate: 1.0, currency: Currency::Eth }
    }
}

impl UnitConversion {
    pub fn convert<T: AsFloat>(&self, base: &T) -> f64 {
        base.as_f64() / 10f64.powi(self.decimals as i32) * self.rate
    }
}

///
/// AnalysisConfig
///

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub error_policy: ErrorPolicy,
    pub top_counterparties: usize,
    pub histogram_bins: usize,
    pub unit: UnitConversion,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::Retain,
            top_counterparties: 10,
            histogram_bins: 20,
            unit: UnitConversion::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;

        info!("loaded config from {}", path.as_ref().display());

        Ok(config)
    }

    /// Config named by `LEDGER_STATS_CONFIG`, or the defaults when it is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_counterparties == 0 {
            return Err(Error::Config("top_counterparties must be at least 1".to_string()));
        }
        if self.histogram_bins == 0 {
            return Err(Error::Config("histogram_bins must be at least 1".to_string()));
        }
        if !self.unit.rate.is_finite() || self.unit.rate < 0.0 {
            return Err(Error::Config(format!("unit.rate must be a non-negative number, got {}", self.unit.rate)));
        }

        Ok(())
    }
}
