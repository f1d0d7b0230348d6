//! Shared builders for timing tests

use super::{EngineOptions, KeyTimingTracker, TimingEngine};
use crate::keyboard::{KeyCode, KeyNames, KeyState, RawEvent};

/// Default key code used in tests (KeyCode 30 = 'A')
pub const DEFAULT_KEY: KeyCode = KeyCode(30);

/// Hold time used by [`taps`], in microseconds
pub const TAP_HOLD_US: u64 = 1;

/// Feed `(timestamp, state)` pairs to a tracker in order
pub fn feed(tracker: &mut KeyTimingTracker, events: &[(u64, KeyState)]) {
    for &(timestamp_us, state) in events {
        tracker.notify(timestamp_us, state);
    }
}

/// Down/up event pairs for one key, one tap per press time
pub fn taps(code: u16, press_times_us: &[u64]) -> Vec<RawEvent> {
    press_times_us
        .iter()
        .flat_map(|&t| [RawEvent::key(code, 1, t), RawEvent::key(code, 0, t + TAP_HOLD_US)])
        .collect()
}

/// Engine with the standard name table and running-stat logging off
pub fn quiet_engine() -> TimingEngine {
    TimingEngine::new(
        KeyNames::standard(),
        EngineOptions {
            log_running_stats: false,
            ..EngineOptions::default()
        },
    )
}
