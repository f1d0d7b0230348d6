//! Session report and text/JSON rendering

use crate::timing::{CollectSummary, ReportRow, TimingEngine};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;
use std::time::Instant;

/// Complete session report
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// What the collection run consumed
    pub summary: SessionSummary,
    /// Keys ranked by press-to-press standard deviation, steadiest first
    pub rows: Vec<ReportRow>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Report generation timestamp
    pub generated_at: String,
    /// Application version
    pub version: String,
    /// Session duration in seconds
    pub duration_secs: f64,
}

/// Session summary statistics
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub events: u64,
    pub key_events: u64,
    pub skipped: u64,
    /// Distinct keys seen, ranked or not
    pub keys_seen: usize,
    pub interrupted: bool,
}

impl SessionReport {
    /// Build the report for a finished collection run
    pub fn new(start_time: Instant, collected: &CollectSummary, engine: &TimingEngine) -> Self {
        Self::from_rows(start_time, collected, engine.key_count(), engine.aggregate())
    }

    pub fn from_rows(
        start_time: Instant,
        collected: &CollectSummary,
        keys_seen: usize,
        rows: Vec<ReportRow>,
    ) -> Self {
        let now: DateTime<Utc> = Utc::now();

        Self {
            metadata: ReportMetadata {
                generated_at: now.to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                duration_secs: start_time.elapsed().as_secs_f64(),
            },
            summary: SessionSummary {
                events: collected.events,
                key_events: collected.key_events,
                skipped: collected.skipped,
                keys_seen,
                interrupted: collected.interrupted,
            },
            rows,
        }
    }

    /// Export report to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Fixed-width text table, one key per line
    pub fn render_plain(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:>5}  {:<14} {:>6} {:>12} {:>10} {:>12}",
            "code", "key", "count", "mean(us)", "min(us)", "stdev(us)"
        );
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:>5}  {:<14} {:>6} {:>12.1} {:>10} {:>12.1}",
                row.key.as_u16(),
                row.name,
                row.count,
                row.mean,
                row.min,
                row.stdev
            );
        }
        if self.rows.is_empty() {
            let _ = writeln!(out, "(no key with enough press-to-press data)");
        }
        out
    }

    /// One-line description of the run
    pub fn footer(&self) -> String {
        format!(
            "{} events ({} key, {} skipped), {} keys seen, {} ranked, {:.1}s{}",
            self.summary.events,
            self.summary.key_events,
            self.summary.skipped,
            self.summary.keys_seen,
            self.rows.len(),
            self.metadata.duration_secs,
            if self.summary.interrupted {
                ", interrupted"
            } else {
                ""
            }
        )
    }
}
