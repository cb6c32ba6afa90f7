use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::kv::KeyValueStore;
use crate::record::DfmRecord;

/// Schema version written in the envelope
pub const STORAGE_VERSION: u32 = 1;

/// Versioned on-disk collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCollection {
    pub version: u32,
    /// Most recently saved first
    pub records: Vec<DfmRecord>,
}

impl StoredCollection {
    pub fn new(records: Vec<DfmRecord>) -> Self {
        Self {
            version: STORAGE_VERSION,
            records,
        }
    }
}

/// Result of decoding raw stored content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// `{"version": 1, "records": [...]}`
    Versioned(Vec<DfmRecord>),
    /// Bare array written before the envelope existed
    Legacy(Vec<DfmRecord>),
    /// Valid JSON in no known shape (including unknown versions)
    Unrecognized,
}

impl Decoded {
    pub fn into_records(self) -> Vec<DfmRecord> {
        match self {
            Decoded::Versioned(records) | Decoded::Legacy(records) => records,
            Decoded::Unrecognized => Vec::new(),
        }
    }
}

/// Decode raw stored content
///
/// The top-level JSON shape picks the encoding: an object is the versioned
/// envelope, an array is the legacy bare list. Records must be JSON objects.
/// Errors only when `raw` is not JSON at all.
pub fn decode(raw: &str) -> Result<Decoded> {
    let value: Value = serde_json::from_str(raw).context("Stored records are not valid JSON")?;

    let decoded = match value {
        Value::Object(mut envelope) => {
            match envelope.get("version").and_then(Value::as_u64) {
                Some(version) if version == u64::from(STORAGE_VERSION) => {
                    match envelope.remove("records") {
                        Some(Value::Array(items)) => decode_records(items)
                            .map(Decoded::Versioned)
                            .unwrap_or(Decoded::Unrecognized),
                        _ => Decoded::Unrecognized,
                    }
                }
                Some(version) => {
                    warn!("Unsupported DFM storage version: {}", version);
                    Decoded::Unrecognized
                }
                None => Decoded::Unrecognized,
            }
        }
        Value::Array(items) => decode_records(items)
            .map(Decoded::Legacy)
            .unwrap_or(Decoded::Unrecognized),
        _ => Decoded::Unrecognized,
    };

    Ok(decoded)
}

/// All-or-nothing decode of a record list; any non-object entry fails it
fn decode_records(items: Vec<Value>) -> Option<Vec<DfmRecord>> {
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(_) => serde_json::from_value(item).ok(),
            _ => None,
        })
        .collect()
}

/// Durable store of completed sessions
///
/// The whole collection is read on every load and rewritten on every save.
/// Saves through one `RecordStore` are serialized; separate processes
/// writing the same key are not coordinated.
pub struct RecordStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load all persisted records, most recently saved first
    ///
    /// Never fails: missing, unreadable or unrecognized data yields an
    /// empty list and a warning.
    pub async fn load(&self) -> Vec<DfmRecord> {
        let raw = match self.backend.get(&self.key).await {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => return Vec::new(),
            Err(e) => {
                warn!("Failed to load DFM records: {:#}", e);
                return Vec::new();
            }
        };

        match decode(&raw) {
            Ok(Decoded::Unrecognized) => {
                warn!("Unexpected DFM storage format under key {}", self.key);
                Vec::new()
            }
            Ok(decoded) => decoded.into_records(),
            Err(e) => {
                warn!("Failed to load DFM records: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Prepend `record` and rewrite the versioned collection
    pub async fn save(&self, record: DfmRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let existing = self.load().await;
        let mut records = Vec::with_capacity(existing.len() + 1);
        let id = record.id.clone();
        records.push(record);
        records.extend(existing);

        let payload = serde_json::to_string(&StoredCollection::new(records))
            .context("Failed to encode DFM records")?;

        if let Err(e) = self.backend.set(&self.key, payload).await {
            warn!("Failed to persist DFM record {}: {:#}", id, e);
            return Err(e.context("Failed to persist DFM record"));
        }

        info!("Saved DFM record {} via {} store", id, self.backend.name());

        Ok(())
    }
}
