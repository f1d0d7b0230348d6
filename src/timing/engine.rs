//! Routes events to per-key trackers and ranks keys at the end of a run

use super::{KeyTimingTracker, Transition, OUTLIER_THRESHOLD_US};
use crate::keyboard::{EventSource, KeyCode, KeyNames, RawEvent, SourceError, StopFlag};
use serde::Serialize;
use std::collections::HashMap;

/// Knobs for a timing engine
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Samples at or above this are left out of statistics
    pub outlier_threshold_us: u64,
    /// Shown for keys missing from the name table
    pub unknown_key_label: String,
    /// Log all four running statistics after every key event
    pub log_running_stats: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            outlier_threshold_us: OUTLIER_THRESHOLD_US,
            unknown_key_label: "--".to_string(),
            log_running_stats: true,
        }
    }
}

/// One line of the final report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub key: KeyCode,
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub min: u64,
    pub stdev: f64,
}

/// What a call to [`TimingEngine::collect`] consumed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectSummary {
    /// All events read from the source
    pub events: u64,
    /// Events routed to a key tracker
    pub key_events: u64,
    /// Non-key events that were dropped
    pub skipped: u64,
    /// Collection ended because the stop flag was raised
    pub interrupted: bool,
}

/// Owns every key tracker for one collection run
pub struct TimingEngine {
    names: KeyNames,
    options: EngineOptions,
    trackers: HashMap<KeyCode, KeyTimingTracker>,
}

impl TimingEngine {
    pub fn new(names: KeyNames, options: EngineOptions) -> Self {
        Self {
            names,
            options,
            trackers: HashMap::new(),
        }
    }

    /// Read events until the source runs dry or `stop` is raised.
    ///
    /// A raised stop flag is a normal end of collection; everything
    /// processed so far stays available to [`aggregate`](Self::aggregate).
    /// Only failures of the source itself are returned as errors.
    pub fn collect<S>(
        &mut self,
        source: &mut S,
        stop: &StopFlag,
    ) -> Result<CollectSummary, SourceError>
    where
        S: EventSource + ?Sized,
    {
        let mut summary = CollectSummary::default();

        while !stop.is_raised() {
            let Some(event) = source.next_event(stop)? else {
                break;
            };
            summary.events += 1;
            if self.process(&event) {
                summary.key_events += 1;
            } else {
                summary.skipped += 1;
            }
        }
        summary.interrupted = stop.is_raised();

        log::debug!(
            "Collection finished: {} events, {} key events, {} skipped, interrupted={}",
            summary.events,
            summary.key_events,
            summary.skipped,
            summary.interrupted
        );
        Ok(summary)
    }

    /// Handle one event; returns false if it was not a key event
    pub fn process(&mut self, event: &RawEvent) -> bool {
        let Some(key_event) = event.as_key_event() else {
            log::debug!("Skipping non-key event {:?}", event.kind);
            return false;
        };

        let options = &self.options;
        self.trackers
            .entry(key_event.key)
            .or_insert_with(|| {
                KeyTimingTracker::new(key_event.key)
                    .with_outlier_threshold(options.outlier_threshold_us)
                    .with_running_stats(options.log_running_stats)
            })
            .notify(key_event.timestamp_us, key_event.state);
        true
    }

    pub fn tracker(&self, key: KeyCode) -> Option<&KeyTimingTracker> {
        self.trackers.get(&key)
    }

    /// Number of distinct keys seen so far
    pub fn key_count(&self) -> usize {
        self.trackers.len()
    }

    /// Display name for a key, falling back to the placeholder label
    pub fn display_name(&self, key: KeyCode) -> &str {
        self.names
            .name(key)
            .unwrap_or(&self.options.unknown_key_label)
    }

    /// Rank keys by press-to-press consistency, steadiest first.
    ///
    /// Keys without enough press-to-press data (zero mean) are left out.
    pub fn aggregate(&self) -> Vec<ReportRow> {
        let mut rows: Vec<ReportRow> = self
            .trackers
            .values()
            .filter_map(|tracker| {
                let stats = tracker.stats(Transition::PressToPress);
                if stats.mean == 0.0 {
                    return None;
                }
                Some(ReportRow {
                    key: tracker.key(),
                    name: self.display_name(tracker.key()).to_string(),
                    count: stats.count,
                    mean: stats.mean,
                    min: stats.min,
                    stdev: stats.stdev,
                })
            })
            .collect();

        rows.sort_by(|a, b| a.stdev.total_cmp(&b.stdev).then(a.key.cmp(&b.key)));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::{EventKind, ReplaySource};
    use crate::timing::test_helpers::{quiet_engine, taps};

    #[test]
    fn routes_events_to_lazily_created_trackers() {
        let mut engine = quiet_engine();
        assert_eq!(engine.key_count(), 0);

        engine.process(&RawEvent::key(30, 1, 100));
        engine.process(&RawEvent::key(31, 1, 110));
        engine.process(&RawEvent::key(30, 0, 150));

        assert_eq!(engine.key_count(), 2);
        let a = engine.tracker(KeyCode(30)).unwrap();
        assert_eq!(a.series(Transition::PressToRelease).samples(), &[50]);
        assert!(engine.tracker(KeyCode(31)).unwrap().series(Transition::PressToRelease).is_empty());
    }

    #[test]
    fn non_key_events_create_no_tracker() {
        let mut engine = quiet_engine();
        let handled = engine.process(&RawEvent::new(EventKind::Other(0), 30, 1, 100));
        assert!(!handled);
        assert_eq!(engine.key_count(), 0);
    }

    #[test]
    fn aggregate_excludes_keys_without_data_and_sorts_by_stdev() {
        let mut engine = quiet_engine();
        // A: press-press 5, 15 -> mean 10, stdev ~7.07
        for event in taps(30, &[0, 5, 20]) {
            engine.process(&event);
        }
        // B: a single tap, no press-press data
        for event in taps(48, &[0]) {
            engine.process(&event);
        }
        // C: press-press 4, 6 -> mean 5, stdev ~1.41
        for event in taps(46, &[0, 4, 10]) {
            engine.process(&event);
        }

        let rows = engine.aggregate();
        let keys: Vec<u16> = rows.iter().map(|r| r.key.as_u16()).collect();
        assert_eq!(keys, vec![46, 30]);
        assert_eq!(rows[0].name, "C");
        assert!((rows[0].mean - 5.0).abs() < 1e-9);
        assert!((rows[1].mean - 10.0).abs() < 1e-9);
        assert!(rows[0].stdev < rows[1].stdev);
    }

    #[test]
    fn unnamed_keys_use_placeholder() {
        let mut engine = TimingEngine::new(
            KeyNames::empty(),
            EngineOptions {
                log_running_stats: false,
                ..EngineOptions::default()
            },
        );
        for event in taps(30, &[0, 100, 250]) {
            engine.process(&event);
        }
        let rows = engine.aggregate();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "--");
    }

    #[test]
    fn collect_drains_source() {
        let mut engine = quiet_engine();
        let mut events = taps(30, &[0, 100, 250]);
        events.insert(1, RawEvent::new(EventKind::Other(0), 0, 0, 0));
        let mut source = ReplaySource::new(events);

        let summary = engine.collect(&mut source, &StopFlag::new()).unwrap();
        assert_eq!(summary.events, 7);
        assert_eq!(summary.key_events, 6);
        assert_eq!(summary.skipped, 1);
        assert!(!summary.interrupted);
        assert_eq!(engine.aggregate().len(), 1);
    }

    #[test]
    fn collect_returns_immediately_when_already_stopped() {
        let mut engine = quiet_engine();
        let mut source = ReplaySource::new(taps(30, &[0, 100]));
        let stop = StopFlag::new();
        stop.raise();

        let summary = engine.collect(&mut source, &stop).unwrap();
        assert_eq!(summary.events, 0);
        assert!(summary.interrupted);
        assert_eq!(engine.key_count(), 0);
    }

    #[test]
    fn all_zero_press_intervals_are_excluded() {
        let mut engine = quiet_engine();
        for event in taps(30, &[0, 0, 0]) {
            engine.process(&event);
        }
        assert!(engine.aggregate().is_empty());
    }
}
