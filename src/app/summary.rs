use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::args::PercentileMode;
use crate::error::{AppResult, FailureKind};
use crate::metrics::{RequestResult, Stat, StatNanos, calc_with_mode};
use crate::shutdown::StopReason;

/// Everything printed at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Report {
    pub(crate) stat: Stat,
    pub(crate) percentiles: PercentileMode,
    pub(crate) requested: u64,
    pub(crate) attempts: u64,
    pub(crate) failures: BTreeMap<FailureKind, u64>,
    pub(crate) statuses: BTreeMap<u16, u64>,
    pub(crate) elapsed: Duration,
    pub(crate) stopped: Option<StopReason>,
}

#[derive(Debug, Serialize)]
struct JsonReport<'report> {
    percentiles: PercentileMode,
    requested: u64,
    attempts: u64,
    failed: u64,
    failures: &'report BTreeMap<FailureKind, u64>,
    statuses: &'report BTreeMap<u16, u64>,
    stat: StatNanos,
    requests_per_sec_x100: u64,
    elapsed_ms: u128,
    stopped: Option<String>,
}

impl Report {
    /// Aggregates `results` in the order given. Failed attempts count toward
    /// the stat and are also tallied by cause.
    pub(crate) fn from_results(
        results: &[RequestResult],
        percentiles: PercentileMode,
        requested: u64,
        elapsed: Duration,
        stopped: Option<StopReason>,
    ) -> Self {
        let mut failures = BTreeMap::new();
        let mut statuses = BTreeMap::new();
        for result in results {
            if let Some(failure) = result.failure() {
                let count = failures.entry(failure.kind()).or_insert(0_u64);
                *count = count.saturating_add(1);
            }
            if let Some(status) = result.status() {
                let count = statuses.entry(status).or_insert(0_u64);
                *count = count.saturating_add(1);
            }
        }

        Self {
            stat: calc_with_mode(results, percentiles),
            percentiles,
            requested,
            attempts: u64::try_from(results.len()).unwrap_or(u64::MAX),
            failures,
            statuses,
            elapsed,
            stopped,
        }
    }

    pub(crate) fn failed(&self) -> u64 {
        self.failures
            .values()
            .fold(0_u64, |total, count| total.saturating_add(*count))
    }

    /// Completed attempts per second of wall-clock time, scaled by 100.
    pub(crate) fn requests_per_sec_x100(&self) -> u64 {
        if self.attempts == 0 {
            return 0;
        }
        let micros = self.elapsed.as_micros().max(1);
        let scaled = u128::from(self.attempts)
            .saturating_mul(100_000_000)
            .checked_div(micros)
            .unwrap_or(0);
        u64::try_from(scaled).map_or(u64::MAX, |value| value)
    }

    pub(crate) fn render_text(&self) -> String {
        let stat = &self.stat;
        let rps = self.requests_per_sec_x100();
        let mut lines = vec![format!(
            "Requests: {} of {} (failed: {})",
            self.attempts,
            self.requested,
            self.failed()
        )];
        if !self.failures.is_empty() {
            let failures = join_counts(&self.failures);
            lines.push(format!("Failures: {}", failures));
        }
        if !self.statuses.is_empty() {
            let statuses = join_counts(&self.statuses);
            lines.push(format!("Status codes: {}", statuses));
        }
        lines.push(format!("Percentiles: {}", self.percentiles.as_str()));
        lines.push(String::new());
        lines.push(format!("Total: {:?}", stat.duration));
        lines.push(format!("Average: {:?}", stat.avg));
        lines.push(format!("Minimum: {:?}", stat.min));
        lines.push(format!("Median: {:?}", stat.median));
        lines.push(format!("Maximum: {:?}", stat.max));
        lines.push(format!("90%: {:?}", stat.p90));
        lines.push(format!("95%: {:?}", stat.p95));
        lines.push(format!("Bytes read: {}", stat.n_read));
        lines.push(String::new());
        lines.push(format!("Requests/sec: {}.{:02}", rps / 100, rps % 100));
        if let Some(reason) = self.stopped {
            lines.push(format!("Stopped early: {}", reason));
        }
        lines.push(format!("Completed in {:?}", self.elapsed));
        lines.join("\n")
    }

    pub(crate) fn render_json(&self) -> AppResult<String> {
        let report = JsonReport {
            percentiles: self.percentiles,
            requested: self.requested,
            attempts: self.attempts,
            failed: self.failed(),
            failures: &self.failures,
            statuses: &self.statuses,
            stat: StatNanos::from(&self.stat),
            requests_per_sec_x100: self.requests_per_sec_x100(),
            elapsed_ms: self.elapsed.as_millis(),
            stopped: self.stopped.map(|reason| reason.to_string()),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

fn join_counts<K: fmt::Display>(counts: &BTreeMap<K, u64>) -> String {
    counts
        .iter()
        .map(|(key, count)| format!("{}={}", key, count))
        .collect::<Vec<_>>()
        .join(", ")
}
