use serde::{Deserialize, Serialize};

/// How a capture session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// A stop or shutdown trigger ended the session.
    Stopped,
    /// A setup or platform failure ended the session.
    Failed(String),
}

/// Counters collected by the capture loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaptureStats {
    pub chunks_delivered: u64,
    pub copy_failures: u64,
    pub sink_failures: u64,
    pub bytes_written: u64,
}

/// Summary of one acquire → capture → release session.
///
/// Serializable as one JSON line of the session report log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub id: String,
    pub sensor_name: String,
    pub buffer_name: String,
    pub started_at: String,
    pub finished_at: String,
    pub outcome: SessionOutcome,
    pub status_polls: u64,
    #[serde(flatten)]
    pub stats: CaptureStats,
    /// SHA-256 over every byte delivered to the sink, hex encoded.
    pub checksum: String,
}

impl SessionReport {
    /// Opens a report for a session starting now.
    pub fn begin(sensor_name: &str, buffer_name: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sensor_name: sensor_name.to_string(),
            buffer_name: buffer_name.to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            finished_at: String::new(),
            outcome: SessionOutcome::Stopped,
            status_polls: 0,
            stats: CaptureStats::default(),
            checksum: String::new(),
        }
    }

    pub fn finish(&mut self, outcome: SessionOutcome, checksum: String) {
        self.outcome = outcome;
        self.checksum = checksum;
        self.finished_at = chrono::Utc::now().to_rfc3339();
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, SessionOutcome::Failed(_))
    }
}
