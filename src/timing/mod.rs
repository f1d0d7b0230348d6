//! Typing rhythm statistics
//!
//! Each key gets a [`KeyTimingTracker`] that turns its down/up events into
//! four [`DelaySeries`]; the [`TimingEngine`] routes events and ranks keys.

mod engine;
mod series;
mod tracker;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use engine::{CollectSummary, EngineOptions, ReportRow, TimingEngine};
pub use series::{DelaySeries, DelayStats, OUTLIER_THRESHOLD_US};
pub use tracker::{KeyTimingTracker, TrackerSummary, Transition};
