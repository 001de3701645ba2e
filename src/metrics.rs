//! Per-tag request metrics
//!
//! Every request the driver issues is tagged so setup traffic and vote
//! traffic are reported separately. Samples are kept in memory for the
//! duration of the run and summarised once at the end.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use strum::{AsRefStr, Display, EnumString};

/// Label attached to a request for metrics segregation
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestTag {
    Subject,
    Poll,
    Vote,
    Verify,
}

#[derive(Debug, Default)]
struct TagSamples {
    durations: Vec<Duration>,
    failed: u64,
}

/// Thread-safe collector shared by all virtual users
#[derive(Debug, Default)]
pub struct Metrics {
    samples: Mutex<BTreeMap<RequestTag, TagSamples>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed request. `ok` is false for transport errors and
    /// unexpected statuses.
    pub fn record(&self, tag: RequestTag, elapsed: Duration, ok: bool) {
        let mut samples = self.samples.lock();
        let entry = samples.entry(tag).or_default();
        entry.durations.push(elapsed);
        if !ok {
            entry.failed += 1;
        }
    }

    pub fn count(&self, tag: RequestTag) -> u64 {
        self.samples
            .lock()
            .get(&tag)
            .map(|s| s.durations.len() as u64)
            .unwrap_or(0)
    }

    /// Summaries ordered by tag
    pub fn summary(&self) -> Vec<TagSummary> {
        let samples = self.samples.lock();
        samples
            .iter()
            .map(|(tag, s)| TagSummary::from_samples(*tag, &s.durations, s.failed))
            .collect()
    }
}

/// Latency statistics for one tag, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSummary {
    pub tag: RequestTag,
    pub count: u64,
    pub failed: u64,
    pub min_ms: f64,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub max_ms: f64,
}

impl TagSummary {
    pub fn from_samples(tag: RequestTag, durations: &[Duration], failed: u64) -> Self {
        let mut sorted = durations.to_vec();
        sorted.sort_unstable();

        let mean = if sorted.is_empty() {
            Duration::ZERO
        } else {
            sorted.iter().sum::<Duration>() / sorted.len() as u32
        };

        Self {
            tag,
            count: sorted.len() as u64,
            failed,
            min_ms: as_ms(sorted.first().copied().unwrap_or_default()),
            mean_ms: as_ms(mean),
            p50_ms: as_ms(percentile(&sorted, 50.0)),
            p90_ms: as_ms(percentile(&sorted, 90.0)),
            p95_ms: as_ms(percentile(&sorted, 95.0)),
            max_ms: as_ms(sorted.last().copied().unwrap_or_default()),
        }
    }

    /// Fraction of requests that failed
    pub fn failure_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.failed as f64 / self.count as f64
        }
    }
}

/// Nearest-rank percentile over an ascending slice. Zero when empty.
pub fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    let idx = rank.clamp(1, sorted.len()) - 1;
    sorted[idx]
}

fn as_ms(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}
