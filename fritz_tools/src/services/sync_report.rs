//! Outcome log for a filler batch.
//!
//! Every per-row outcome becomes a timestamped entry. With echo enabled each
//! entry is also printed to stdout as soon as it is recorded, which is the
//! result stream of `fritz-fillers`. A simulated report (dry run) marks every
//! entry with `(dry run)`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::SourceOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReportLevel::Info => "INFO",
            ReportLevel::Success => "OK",
            ReportLevel::Warning => "WARN",
            ReportLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// A single report entry with timestamp and message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: ReportLevel,
    pub object_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub simulated: bool,
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.level)?;
        if self.simulated {
            f.write_str("(dry run) ")?;
        }
        match &self.object_id {
            Some(id) => write!(f, "{}: {}", id, self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCounters {
    pub sources_existing: usize,
    pub sources_created: usize,
    pub sources_failed: usize,
    pub requests_submitted: usize,
    pub requests_failed: usize,
    pub rows_skipped: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub entries: Vec<ReportEntry>,
    pub counters: SyncCounters,
    #[serde(skip)]
    echo: bool,
    #[serde(default)]
    simulated: bool,
}

impl SyncReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print every entry to stdout as it is recorded.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Mark every entry as coming from a simulated portal.
    pub fn with_simulated(mut self, simulated: bool) -> Self {
        self.simulated = simulated;
        self
    }

    pub fn log(
        &mut self,
        level: ReportLevel,
        object_id: Option<&str>,
        message: impl Into<String>,
    ) {
        let entry = ReportEntry {
            timestamp: chrono::Utc::now(),
            level,
            object_id: object_id.map(str::to_string),
            message: message.into(),
            simulated: self.simulated,
        };
        if self.echo {
            println!("{}", entry);
        }
        self.entries.push(entry);
    }

    /// A row that never reached the portal.
    pub fn row_skipped(&mut self, object_id: Option<&str>, message: impl Into<String>) {
        self.counters.rows_skipped += 1;
        self.log(ReportLevel::Error, object_id, message);
    }

    pub fn source(&mut self, object_id: &str, outcome: SourceOutcome) {
        match outcome {
            SourceOutcome::AlreadyExists => {
                self.counters.sources_existing += 1;
                self.log(ReportLevel::Info, Some(object_id), "source already exists");
            }
            SourceOutcome::Created => {
                self.counters.sources_created += 1;
                self.log(ReportLevel::Success, Some(object_id), "source created");
            }
            SourceOutcome::CreateFailed => {
                self.counters.sources_failed += 1;
                self.log(ReportLevel::Error, Some(object_id), "source creation failed");
            }
        }
    }

    pub fn request_submitted(&mut self, object_id: &str, observation_choice: &str) {
        self.counters.requests_submitted += 1;
        self.log(
            ReportLevel::Success,
            Some(object_id),
            format!("request submitted for {}", observation_choice),
        );
    }

    pub fn request_failed(
        &mut self,
        object_id: &str,
        observation_choice: &str,
        reason: impl fmt::Display,
    ) {
        self.counters.requests_failed += 1;
        self.log(
            ReportLevel::Error,
            Some(object_id),
            format!("request for {} failed: {}", observation_choice, reason),
        );
    }

    /// Whether any row, source or request failed.
    pub fn has_failures(&self) -> bool {
        let c = &self.counters;
        c.sources_failed > 0 || c.requests_failed > 0 || c.rows_skipped > 0
    }

    pub fn summary(&self) -> String {
        let c = &self.counters;
        format!(
            "sources: {} created, {} existing, {} failed; requests: {} submitted, {} failed; rows skipped: {}",
            c.sources_created,
            c.sources_existing,
            c.sources_failed,
            c.requests_submitted,
            c.requests_failed,
            c.rows_skipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_failures() {
        let mut report = SyncReport::new();
        report.source("A", SourceOutcome::Created);
        report.source("B", SourceOutcome::AlreadyExists);
        report.request_submitted("A", "g");
        assert!(!report.has_failures());

        report.request_failed("B", "IFU", "rejected");
        assert!(report.has_failures());
        assert_eq!(report.counters.sources_created, 1);
        assert_eq!(report.counters.sources_existing, 1);
        assert_eq!(report.counters.requests_submitted, 1);
        assert_eq!(report.counters.requests_failed, 1);
        assert_eq!(report.entries.len(), 4);
    }

    #[test]
    fn test_skipped_row_is_a_failure() {
        let mut report = SyncReport::new();
        report.row_skipped(None, "row 3: bad requester");
        assert!(report.has_failures());
        assert_eq!(report.entries[0].to_string(), "[ERROR] row 3: bad requester");
    }

    #[test]
    fn test_entry_display_with_object() {
        let mut report = SyncReport::new();
        report.source("ZTF21abc", SourceOutcome::CreateFailed);
        assert_eq!(
            report.entries[0].to_string(),
            "[ERROR] ZTF21abc: source creation failed"
        );
    }

    #[test]
    fn test_simulated_entries_are_marked() {
        let mut report = SyncReport::new().with_simulated(true);
        report.source("ZTF21abc", SourceOutcome::Created);
        report.row_skipped(None, "row 2: bad ra");
        assert_eq!(
            report.entries[0].to_string(),
            "[OK] (dry run) ZTF21abc: source created"
        );
        assert_eq!(report.entries[1].to_string(), "[ERROR] (dry run) row 2: bad ra");
    }

    #[test]
    fn test_summary() {
        let mut report = SyncReport::new();
        report.source("A", SourceOutcome::Created);
        assert!(report.summary().starts_with("sources: 1 created, 0 existing"));
    }
}
