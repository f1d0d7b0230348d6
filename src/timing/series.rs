//! Append-only delay samples and their filtered summary statistics

use serde::Serialize;

/// Samples at or above this many microseconds are idle gaps, not typing
pub const OUTLIER_THRESHOLD_US: u64 = 1_000_000;

/// Summary of a delay series.
///
/// All fields are zero when fewer than two samples survive filtering.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DelayStats {
    pub count: usize,
    pub mean: f64,
    pub min: u64,
    /// Sample standard deviation (n - 1 denominator)
    pub stdev: f64,
}

impl DelayStats {
    /// The "insufficient data" result
    pub const EMPTY: DelayStats = DelayStats {
        count: 0,
        mean: 0.0,
        min: 0,
        stdev: 0.0,
    };
}

/// Intervals observed for one transition type, in observation order
#[derive(Debug, Clone, Default)]
pub struct DelaySeries {
    samples: Vec<u64>,
}

impl DelaySeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, interval_us: u64) {
        self.samples.push(interval_us);
    }

    /// Every stored sample, outliers included
    pub fn samples(&self) -> &[u64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Statistics over samples below [`OUTLIER_THRESHOLD_US`]
    pub fn stats(&self) -> DelayStats {
        self.stats_below(OUTLIER_THRESHOLD_US)
    }

    /// Statistics over samples strictly below `cutoff_us`
    pub fn stats_below(&self, cutoff_us: u64) -> DelayStats {
        let kept: Vec<u64> = self
            .samples
            .iter()
            .copied()
            .filter(|&s| s < cutoff_us)
            .collect();

        if kept.len() < 2 {
            return DelayStats::EMPTY;
        }

        let count = kept.len();
        let mean = kept.iter().map(|&s| s as f64).sum::<f64>() / count as f64;
        let min = kept.iter().copied().min().unwrap_or(0);
        let variance = kept
            .iter()
            .map(|&s| {
                let diff = s as f64 - mean;
                diff * diff
            })
            .sum::<f64>()
            / (count - 1) as f64;

        DelayStats {
            count,
            mean,
            min,
            stdev: variance.sqrt(),
        }
    }
}
