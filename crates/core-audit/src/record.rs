//! Shapes consumed from the external lookup service

use serde::{Deserialize, Serialize};

/// One subscriber record returned by the lookup service
///
/// The positional indexes only locate the record inside the upstream dataset
/// and are carried through for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRecord {
    /// Subscriber phone number
    pub mobile: String,

    /// Subject name
    pub name: String,

    /// National identifier
    pub cnic: String,

    /// Postal address (may be empty)
    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub table_index: u32,

    #[serde(default)]
    pub row_index: u32,
}

/// Response body of the lookup service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResponse {
    pub success: bool,

    /// Query echoed back by the service
    #[serde(default)]
    pub query: String,

    /// Identifier kind detected by the service (mobile, cnic, ...)
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default)]
    pub results_count: usize,

    #[serde(default)]
    pub results: Vec<LookupRecord>,

    /// Human readable message, usually set on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Timestamp reported by the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
}

impl LookupResponse {
    /// Number of matching records
    ///
    /// Falls back to the length of `results` when the service reports zero
    /// but still ships records.
    pub fn count(&self) -> usize {
        if self.results_count == 0 {
            self.results.len()
        } else {
            self.results_count
        }
    }
}
