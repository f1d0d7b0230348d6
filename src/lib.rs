//! keytiming - typing rhythm statistics from raw keyboard events
//!
//! Collects key down/up events from an input device, derives four delay
//! distributions per key (hold time, gap, press-to-press and
//! release-to-release) and ranks keys by how consistent their
//! press-to-press timing is.

pub mod config;
pub mod keyboard;
pub mod report;
pub mod timing;
pub mod ui;

pub use config::Config;
pub use timing::{ReportRow, TimingEngine};
