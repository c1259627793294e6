pub mod address;
pub mod aggregate;
pub mod amount;
pub mod analyze;
pub mod classify;
pub mod config;
pub mod reconcile;
pub mod record;
pub mod report;
pub mod stats;

pub use address::Address;
pub use aggregate::{aggregate, StatisticsBundle};
pub use amount::{SignedTotal, U256, U512};
pub use analyze::{analyze_address_history, analyze_with_config, AddressHistory};
pub use classify::{classify, ClassifiedRecord, ClassifiedView, Direction};
pub use config::{AnalysisConfig, Currency, ErrorPolicy, UnitConversion};
pub use reconcile::{reconcile, reconcile_with_policy, Reconciled};
pub use record::{ingest, ApiEnvelope, Ingested, RawTransferRecord, TransferKind, TransferRecord};
pub use report::Report;

use thiserror::Error as ThisError;

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid address '{0}': expected 0x followed by 40 hex digits")]
    InvalidAddress(String),

    #[error("malformed transfer record: missing or invalid '{field}'")]
    MalformedRecord { field: &'static str },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
