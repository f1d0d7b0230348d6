//! Per-key press/release state machine

use super::{DelaySeries, DelayStats, OUTLIER_THRESHOLD_US};
use crate::keyboard::{KeyCode, KeyState};
use serde::Serialize;

/// The four timing relationships tracked per key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Hold time: key down until the same key up
    PressToRelease,
    /// Gap: key up until the same key down again
    ReleaseToPress,
    PressToPress,
    ReleaseToRelease,
}

impl Transition {
    pub fn all() -> &'static [Transition] {
        &[
            Self::PressToRelease,
            Self::ReleaseToPress,
            Self::PressToPress,
            Self::ReleaseToRelease,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PressToRelease => "press->release",
            Self::ReleaseToPress => "release->press",
            Self::PressToPress => "press->press",
            Self::ReleaseToRelease => "release->release",
        }
    }
}

/// Filtered statistics of all four series of one key
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackerSummary {
    pub press_to_release: DelayStats,
    pub release_to_press: DelayStats,
    pub press_to_press: DelayStats,
    pub release_to_release: DelayStats,
}

impl TrackerSummary {
    pub fn get(&self, transition: Transition) -> DelayStats {
        match transition {
            Transition::PressToRelease => self.press_to_release,
            Transition::ReleaseToPress => self.release_to_press,
            Transition::PressToPress => self.press_to_press,
            Transition::ReleaseToRelease => self.release_to_release,
        }
    }
}

/// Timing state for a single key
#[derive(Debug, Clone)]
pub struct KeyTimingTracker {
    key: KeyCode,
    last_press_us: Option<u64>,
    last_release_us: Option<u64>,
    last_state: Option<KeyState>,
    press_to_release: DelaySeries,
    release_to_press: DelaySeries,
    press_to_press: DelaySeries,
    release_to_release: DelaySeries,
    duplicate_states: u64,
    ignored_states: u64,
    outlier_threshold_us: u64,
    log_running_stats: bool,
}

impl KeyTimingTracker {
    pub fn new(key: KeyCode) -> Self {
        Self {
            key,
            last_press_us: None,
            last_release_us: None,
            last_state: None,
            press_to_release: DelaySeries::new(),
            release_to_press: DelaySeries::new(),
            press_to_press: DelaySeries::new(),
            release_to_release: DelaySeries::new(),
            duplicate_states: 0,
            ignored_states: 0,
            outlier_threshold_us: OUTLIER_THRESHOLD_US,
            log_running_stats: true,
        }
    }

    /// Use a different outlier cutoff for summaries
    pub fn with_outlier_threshold(mut self, threshold_us: u64) -> Self {
        self.outlier_threshold_us = threshold_us;
        self
    }

    /// Enable or disable the per-event running statistics log line
    pub fn with_running_stats(mut self, enabled: bool) -> Self {
        self.log_running_stats = enabled;
        self
    }

    /// Consume one event for this key.
    ///
    /// A sample is only derived once both endpoints of its transition have
    /// been seen. Repeated states are reported but still processed.
    pub fn notify(&mut self, timestamp_us: u64, state: KeyState) {
        if self.last_state == Some(state) {
            self.duplicate_states += 1;
            log::info!(
                "key {}: repeated {} state at {}us",
                self.key,
                state.name(),
                timestamp_us
            );
        }

        match state {
            KeyState::Down => {
                if let Some(last) = self.last_press_us {
                    self.press_to_press.append(timestamp_us.saturating_sub(last));
                }
                if let Some(last) = self.last_release_us {
                    self.release_to_press.append(timestamp_us.saturating_sub(last));
                }
                self.last_press_us = Some(timestamp_us);
            }
            KeyState::Up => {
                if let Some(last) = self.last_press_us {
                    self.press_to_release.append(timestamp_us.saturating_sub(last));
                }
                if let Some(last) = self.last_release_us {
                    self.release_to_release.append(timestamp_us.saturating_sub(last));
                }
                self.last_release_us = Some(timestamp_us);
            }
            KeyState::Hold | KeyState::Unknown(_) => {
                self.ignored_states += 1;
                log::warn!("key {}: unexpected state {:?}", self.key, state);
            }
        }

        self.last_state = Some(state);

        if self.log_running_stats && log::log_enabled!(log::Level::Info) {
            self.log_summary();
        }
    }

    fn log_summary(&self) {
        let summary = self.summary();
        let parts: Vec<String> = Transition::all()
            .iter()
            .map(|&t| {
                let s = summary.get(t);
                format!("{} {} {:.1}/{}/{:.1}", t.label(), s.count, s.mean, s.min, s.stdev)
            })
            .collect();
        log::info!("key {}: {}", self.key, parts.join(" | "));
    }

    pub fn key(&self) -> KeyCode {
        self.key
    }

    pub fn last_state(&self) -> Option<KeyState> {
        self.last_state
    }

    pub fn series(&self, transition: Transition) -> &DelaySeries {
        match transition {
            Transition::PressToRelease => &self.press_to_release,
            Transition::ReleaseToPress => &self.release_to_press,
            Transition::PressToPress => &self.press_to_press,
            Transition::ReleaseToRelease => &self.release_to_release,
        }
    }

    /// Filtered statistics for one transition
    pub fn stats(&self, transition: Transition) -> DelayStats {
        self.series(transition).stats_below(self.outlier_threshold_us)
    }

    pub fn summary(&self) -> TrackerSummary {
        TrackerSummary {
            press_to_release: self.stats(Transition::PressToRelease),
            release_to_press: self.stats(Transition::ReleaseToPress),
            press_to_press: self.stats(Transition::PressToPress),
            release_to_release: self.stats(Transition::ReleaseToRelease),
        }
    }

    /// Number of events that repeated the previous state
    pub fn duplicate_states(&self) -> u64 {
        self.duplicate_states
    }

    /// Number of events with a state other than down/up
    pub fn ignored_states(&self) -> u64 {
        self.ignored_states
    }
}
