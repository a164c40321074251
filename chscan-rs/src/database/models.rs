//! Database model definitions.

use crate::store::{CommitRecord, CommitSummary};

/// Scan history record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHistoryRecord {
    pub id: i64,
    pub input_id: String,
    pub scan_time: i64,
    pub scan_mode: String,
    pub sort_mode: String,
    pub store_mode: String,
    pub channel_count: Option<i32>,
    pub summary: CommitSummary,
    pub success: bool,
    pub error_message: Option<String>,
}

/// New scan history entry to insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewScanHistory {
    pub input_id: String,
    pub scan_mode: String,
    pub sort_mode: String,
    pub store_mode: String,
    pub channel_count: i32,
    pub summary: CommitSummary,
    pub error_message: Option<String>,
}

impl NewScanHistory {
    /// Build the history entry of one commit attempt.
    pub fn from_commit(input_id: impl Into<String>, record: &CommitRecord) -> Self {
        let (summary, error_message) = match &record.outcome {
            Ok(summary) => (*summary, None),
            Err(message) => (CommitSummary::default(), Some(message.clone())),
        };
        Self {
            input_id: input_id.into(),
            scan_mode: record.mode.to_string(),
            sort_mode: record.sort.as_str().to_string(),
            store_mode: record.store.as_str().to_string(),
            channel_count: record.channel_count as i32,
            summary,
            error_message,
        }
    }

    pub fn success(&self) -> bool {
        self.error_message.is_none()
    }
}
