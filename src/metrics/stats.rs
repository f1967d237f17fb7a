use std::time::Duration;

use serde::Serialize;

use crate::args::PercentileMode;

use super::types::{Metric, Sample};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Aggregate latency and volume figures for one batch of measurements.
///
/// `median`, `p90` and `p95` are positional: see [`calc`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stat {
    pub duration: Duration,
    pub avg: Duration,
    pub min: Duration,
    pub median: Duration,
    pub max: Duration,
    pub p90: Duration,
    pub p95: Duration,
    pub n_read: u64,
}

/// [`Stat`] flattened to integer nanoseconds for machine-readable output.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatNanos {
    pub total_ns: u128,
    pub avg_ns: u128,
    pub min_ns: u128,
    pub median_ns: u128,
    pub max_ns: u128,
    pub p90_ns: u128,
    pub p95_ns: u128,
    pub bytes_read: u64,
}

impl From<&Stat> for StatNanos {
    fn from(stat: &Stat) -> Self {
        Self {
            total_ns: stat.duration.as_nanos(),
            avg_ns: stat.avg.as_nanos(),
            min_ns: stat.min.as_nanos(),
            median_ns: stat.median.as_nanos(),
            max_ns: stat.max.as_nanos(),
            p90_ns: stat.p90.as_nanos(),
            p95_ns: stat.p95.as_nanos(),
            bytes_read: stat.n_read,
        }
    }
}

/// Position of the `percent`th element in a sequence of `len` items:
/// `max(round(len * percent / 100) - 1, 0)`, rounding half away from zero.
#[must_use]
pub fn percent_index(len: usize, percent: usize) -> usize {
    len.saturating_mul(percent)
        .saturating_add(50)
        .checked_div(100)
        .unwrap_or(0)
        .saturating_sub(1)
}

/// Reduces `metrics` in one pass, in the order given.
///
/// Sum, average, min, max and bytes do not depend on order. The percentile
/// fields do: `median` is the duration found at `percent_index(n, 50)`, and
/// `p90`/`p95` are the average of all durations up to and including
/// `percent_index(n, 90)`/`percent_index(n, 95)`. With completion-ordered
/// input these describe cumulative latency up to that share of the run, not
/// the latency distribution. Use [`calc_sorted`] for order statistics.
///
/// An empty slice yields `Stat::default()`.
#[must_use]
pub fn calc<M: Metric>(metrics: &[M]) -> Stat {
    let count = metrics.len();
    if count == 0 {
        return Stat::default();
    }

    let p90_index = percent_index(count, 90);
    let p95_index = percent_index(count, 95);

    let mut total_nanos: u128 = 0;
    let mut n_read: u64 = 0;
    let mut min = Duration::MAX;
    let mut max = Duration::ZERO;
    let mut p90 = Duration::ZERO;
    let mut p95 = Duration::ZERO;

    for (index, metric) in metrics.iter().enumerate() {
        let duration = metric.duration();
        total_nanos = total_nanos.saturating_add(duration.as_nanos());
        n_read = n_read.saturating_add(metric.bytes_read());

        if duration < min {
            min = duration;
        }
        if duration > max {
            max = duration;
        }

        if index == p90_index {
            p90 = average(total_nanos, index.saturating_add(1));
        }
        if index == p95_index {
            p95 = average(total_nanos, index.saturating_add(1));
        }
    }

    let median = metrics
        .get(percent_index(count, 50))
        .map_or(Duration::ZERO, Metric::duration);

    Stat {
        duration: nanos_to_duration(total_nanos),
        avg: average(total_nanos, count),
        min,
        median,
        max,
        p90,
        p95,
        n_read,
    }
}

/// Same reduction as [`calc`] over the measurements ordered by duration, so
/// `median`/`p90`/`p95` follow the latency distribution instead of arrival.
#[must_use]
pub fn calc_sorted<M: Metric>(metrics: &[M]) -> Stat {
    let mut samples: Vec<Sample> = metrics.iter().map(Sample::of).collect();
    samples.sort_by_key(|sample| sample.duration);
    calc(&samples)
}

#[must_use]
pub fn calc_with_mode<M: Metric>(metrics: &[M], mode: PercentileMode) -> Stat {
    match mode {
        PercentileMode::Arrival => calc(metrics),
        PercentileMode::Sorted => calc_sorted(metrics),
    }
}

fn average(total_nanos: u128, count: usize) -> Duration {
    let count = u128::try_from(count).unwrap_or(u128::MAX);
    nanos_to_duration(total_nanos.checked_div(count).unwrap_or(0))
}

fn nanos_to_duration(nanos: u128) -> Duration {
    let secs = nanos.checked_div(NANOS_PER_SEC).unwrap_or(0);
    let subsec = nanos.checked_rem(NANOS_PER_SEC).unwrap_or(0);
    match (u64::try_from(secs), u32::try_from(subsec)) {
        (Ok(secs), Ok(subsec)) => Duration::new(secs, subsec),
        (Err(_), _) | (_, Err(_)) => Duration::MAX,
    }
}
