use crate::{
    amount::{parse_amount, U256},
    Error, Result,
};
use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

///
/// TransferKind
///

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
pub enum TransferKind {
    Normal,
    Internal,
}

///
/// RawTransferRecord
///
/// One row as returned by the explorer's `txlist` / `txlistinternal` actions.
/// Every field is optional here; `TransferRecord::from_raw` decides what is required.
///

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransferRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub hash: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub block_number: Option<String>,
    #[serde(default, rename = "timeStamp", deserialize_with = "string_or_number")]
    pub time_stamp: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub transaction_index: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub contract_address: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub gas: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub gas_used: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub gas_price: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub is_error: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub trace_id: Option<String>,
}

// The explorer quotes every number, but hand-written fixtures often don't.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(if b { "1" } else { "0" }.to_string()),
        _ => None,
    })
}

///
/// ApiEnvelope
///

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

impl ApiEnvelope {
    /// Records carried by a successful response. Any other status (the explorer
    /// answers "No transactions found" with status "0") means the stream is absent.
    pub fn into_records(self) -> Result<Option<Vec<RawTransferRecord>>> {
        if self.status != "1" {
            debug!("explorer response status {} ({}), treating stream as absent", self.status, self.message);
            return Ok(None);
        }

        Ok(Some(serde_json::from_value(self.result)?))
    }

    /// Accepts either a full explorer envelope or a bare array of records.
    pub fn parse_records(json: &str) -> Result<Option<Vec<RawTransferRecord>>> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        if value.is_array() {
            return Ok(Some(serde_json::from_value(value)?));
        }

        let envelope: ApiEnvelope = serde_json::from_value(value)?;
        envelope.into_records()
    }
}

///
/// TransferRecord
///

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRecord {
    pub hash: String,
    pub block_number: u64,
    pub timestamp: u64,
    pub transaction_index: Option<u64>,
    pub trace_id: Option<String>,
    pub from: String,
    pub to: String,
    pub value: U256,
    pub gas_used: U256,
    pub gas_price: U256,
    pub kind: TransferKind,
    pub is_error: bool,
}

/// Fields that decide whether two records describe the same transfer.
pub type IdentityKey<'a> = (&'a str, TransferKind, &'a str, &'a str, U256, u64);

impl TransferRecord {
    pub fn from_raw(raw: RawTransferRecord, kind: TransferKind) -> Result<Self> {
        let hash = required_text(raw.hash, "hash")?;
        let block_number = parse_u64(raw.block_number.as_deref(), "blockNumber")?;
        let timestamp = parse_u64(raw.time_stamp.as_deref(), "timeStamp")?;
        let from = required_text(raw.from, "from")?.to_ascii_lowercase();

        // contract creations carry an empty `to` and name the new contract instead
        let to = match non_empty(raw.to).or_else(|| non_empty(raw.contract_address)) {
            Some(to) => to.to_ascii_lowercase(),
            None => return Err(Error::MalformedRecord { field: "to" }),
        };

        let value = required_amount(raw.value.as_deref(), "value")?;

        let (gas_used, gas_price) = match kind {
            TransferKind::Normal => {
                let gas_used = required_amount(raw.gas_used.as_deref(), "gasUsed")?;
                let gas_price = required_amount(raw.gas_price.as_deref(), "gasPrice")?;
                if gas_used.checked_mul(gas_price).is_none() {
                    return Err(Error::MalformedRecord { field: "gasPrice" });
                }
                (gas_used, gas_price)
            }
            TransferKind::Internal => (
                optional_amount(raw.gas_used.as_deref(), "gasUsed")?.unwrap_or_default(),
                optional_amount(raw.gas_price.as_deref(), "gasPrice")?.unwrap_or_default(),
            ),
        };

        let transaction_index = match non_empty(raw.transaction_index) {
            Some(s) => Some(s.parse::<u64>().map_err(|_| Error::MalformedRecord { field: "transactionIndex" })?),
            None => None,
        };

        let is_error = match raw.is_error.as_deref().map(str::trim) {
            None | Some("") | Some("0") => false,
            Some("1") => true,
            Some(_) => return Err(Error::MalformedRecord { field: "isError" }),
        };

        Ok(Self {
            hash,
            block_number,
            timestamp,
            transaction_index,
            trace_id: non_empty(raw.trace_id),
            from,
            to,
            value,
            gas_used,
            gas_price,
            kind,
            is_error,
        })
    }

    /// Fee paid by the sender. Internal transfers ride on their parent
    /// transaction's fee, so they have none of their own.
    pub fn fee(&self) -> Option<U256> {
        match self.kind {
            // overflow is rejected in `from_raw`
            TransferKind::Normal => Some(self.gas_used.saturating_mul(self.gas_price)),
            TransferKind::Internal => None,
        }
    }

    pub fn identity(&self) -> IdentityKey<'_> {
        (&self.hash, self.kind, &self.from, &self.to, self.value, self.block_number)
    }
}

///
/// Ingested
///

#[derive(Debug, Default)]
pub struct Ingested {
    pub records: Vec<TransferRecord>,
    pub malformed: usize,
}

/// Convert one raw stream, dropping (and counting) rows that lack required fields.
/// An absent stream is an empty one.
pub fn ingest(raw: Option<Vec<RawTransferRecord>>, kind: TransferKind) -> Ingested {
    let Some(raw) = raw else {
        debug!("{kind} stream absent");
        return Ingested::default();
    };

    let mut ingested = Ingested { records: Vec::with_capacity(raw.len()), malformed: 0 };

    for row in raw {
        let hash = row.hash.clone().unwrap_or_else(|| "<no hash>".to_string());
        match TransferRecord::from_raw(row, kind) {
            Ok(record) => ingested.records.push(record),
            Err(e) => {
                warn!("dropping {kind} record {hash}: {e}");
                ingested.malformed += 1;
            }
        }
    }

    debug!("ingested {} {kind} records ({} malformed)", ingested.records.len(), ingested.malformed);

    ingested
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn required_text(s: Option<String>, field: &'static str) -> Result<String> {
    non_empty(s).ok_or(Error::MalformedRecord { field })
}

fn parse_u64(s: Option<&str>, field: &'static str) -> Result<u64> {
    s.map(str::trim)
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or(Error::MalformedRecord { field })
}

fn required_amount(s: Option<&str>, field: &'static str) -> Result<U256> {
    optional_amount(s, field)?.ok_or(Error::MalformedRecord { field })
}

fn optional_amount(s: Option<&str>, field: &'static str) -> Result<Option<U256>> {
    let Some(s) = s.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    parse_amount(s).map(Some).ok_or(Error::MalformedRecord { field })
}
