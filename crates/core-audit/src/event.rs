//! Query events recorded for every completed lookup attempt

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::{LookupRecord, LookupResponse};

/// One completed lookup attempt
///
/// Events are built once and never mutated. `details` holds the raw result
/// records as a JSON array on success, or the failure message otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryEvent {
    pub id: Uuid,

    pub timestamp: DateTime<Utc>,

    /// Query exactly as the operator submitted it
    pub query: String,

    pub success: bool,

    pub results_count: usize,

    pub details: String,
}

impl QueryEvent {
    /// Create an event stamped with a fresh id and the current time
    pub fn new(query: &str, success: bool, results_count: usize, details: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            query: query.to_string(),
            success,
            results_count,
            details,
        }
    }

    /// Event for a response the lookup service returned, successful or not
    pub fn from_response(query: &str, response: &LookupResponse) -> Self {
        let details = if response.success || !response.results.is_empty() {
            serde_json::to_string(&response.results).unwrap_or_else(|_| "[]".to_string())
        } else {
            response
                .message
                .clone()
                .unwrap_or_else(|| "API returned failure".to_string())
        };
        Self::new(query, response.success, response.count(), details)
    }

    /// Event for an attempt that never produced a response
    pub fn from_failure(query: &str, message: &str) -> Self {
        Self::new(query, false, 0, message.to_string())
    }

    /// Decode the detail payload back into records
    ///
    /// Returns `None` when the detail is a failure message rather than a
    /// record list.
    pub fn records(&self) -> Option<Vec<LookupRecord>> {
        serde_json::from_str(&self.details).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: u32) -> LookupRecord {
        LookupRecord {
            mobile: format!("92300{:07}", n),
            name: format!("Subject {}", n),
            cnic: format!("34401{:08}", n),
            address: "Lahore".to_string(),
            table_index: 0,
            row_index: n,
        }
    }

    #[test]
    fn test_event_from_successful_response() {
        let response = LookupResponse {
            success: true,
            query: "923001234567".into(),
            kind: Some("mobile".into()),
            results_count: 2,
            results: vec![record(1), record(2)],
            message: None,
            timestamp: None,
            source: None,
            developer: None,
        };

        let event = QueryEvent::from_response("923001234567", &response);
        assert!(event.success);
        assert_eq!(event.results_count, 2);
        assert_eq!(event.records().unwrap().len(), 2);
    }

    #[test]
    fn test_event_from_explicit_failure_keeps_message() {
        let response: LookupResponse =
            serde_json::from_str(r#"{"success": false, "message": "Rate limited"}"#).unwrap();
        let event = QueryEvent::from_response("3440112345670", &response);
        assert!(!event.success);
        assert_eq!(event.details, "Rate limited");
        assert!(event.records().is_none());
    }

    #[test]
    fn test_event_from_transport_failure() {
        let event = QueryEvent::from_failure("1", "Server returned 500 Internal Server Error");
        assert!(!event.success);
        assert_eq!(event.results_count, 0);
        assert!(event.details.contains("500"));
    }

    #[test]
    fn test_events_get_distinct_ids() {
        let a = QueryEvent::from_failure("x", "e");
        let b = QueryEvent::from_failure("x", "e");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_serialized_field_names() {
        let event = QueryEvent::new("q", true, 0, "[]".into());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"resultsCount\":0"));
        assert!(json.contains("\"query\":\"q\""));
    }
}
