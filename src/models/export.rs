//! Log Export Models
//!
//! The "download logs" payload. `logs` is a fixed sample structure used by
//! the dashboard demo, not a dump of the live log stream.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Top-level export file body: `{ timestamp, logs }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogExport {
    pub timestamp: DateTime<Utc>,
    pub logs: SampleLogs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleLogs {
    pub sinner_score: u32,
    pub playbooks: Vec<PlaybookSample>,
    pub forensic_logs: Vec<ForensicLogSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybookSample {
    pub name: String,
    pub triggered: bool,
    pub last_trigger: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForensicLogSample {
    pub id: u32,
    pub timestamp: DateTime<Utc>,
    pub event: String,
    pub status: String,
}

const SAMPLE_SINNER_SCORE: u32 = 45;
const SAMPLE_FORENSIC_ENTRIES: u32 = 10;

impl LogExport {
    /// Build the sample export as of `now`.
    pub fn sample(now: DateTime<Utc>) -> Self {
        let playbooks = vec![
            PlaybookSample {
                name: "Repeated Injection".to_string(),
                triggered: true,
                last_trigger: Some("2024-01-15T12:30:00Z".to_string()),
            },
            PlaybookSample {
                name: "Secret Leakage".to_string(),
                triggered: false,
                last_trigger: None,
            },
        ];
        // One entry per hour going back; every third one blocked.
        let forensic_logs = (0..SAMPLE_FORENSIC_ENTRIES)
            .map(|i| ForensicLogSample {
                id: i + 1,
                timestamp: now - Duration::hours(i64::from(i)),
                event: format!("Security check {}", i + 1),
                status: if i % 3 == 0 { "blocked" } else { "passed" }.to_string(),
            })
            .collect();
        Self {
            timestamp: now,
            logs: SampleLogs {
                sinner_score: SAMPLE_SINNER_SCORE,
                playbooks,
                forensic_logs,
            },
        }
    }

    /// `promptguard-logs-<unix millis>.json`
    pub fn file_name(&self) -> String {
        format!("promptguard-logs-{}.json", self.timestamp.timestamp_millis())
    }
}
