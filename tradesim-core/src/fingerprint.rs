//! Deterministic identification of datasets and runs.
//!
//! - `DatasetHash`: BLAKE3 over the panel's dates, instruments and OHLC inputs.
//! - `RunId`: BLAKE3 over a canonical config serialization plus the dataset hash.
//!
//! Output columns are never hashed, so the dataset hash is the same before
//! and after a run.

use crate::domain::Panel;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn of(panel: &Panel) -> Self {
        let mut hasher = blake3::Hasher::new();
        for symbol in panel.instruments() {
            hasher.update(symbol.as_bytes());
            hasher.update(b"\0");
        }
        for (row, date) in panel.dates().iter().enumerate() {
            hasher.update(date.to_string().as_bytes());
            for table in [panel.open(), panel.high(), panel.low(), panel.close()] {
                for value in table.row(row) {
                    hasher.update(&value.to_le_bytes());
                }
            }
        }
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Run identity: hex BLAKE3 of the canonical config bytes and dataset hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new(canonical_config: &[u8], dataset: Option<&DatasetHash>) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(canonical_config);
        if let Some(dataset) = dataset {
            hasher.update(b"|");
            hasher.update(dataset.0.as_bytes());
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    /// First 12 hex characters, used in directory names.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
