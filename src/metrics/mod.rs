//! Per-request measurements and their aggregation into run statistics.
mod stats;
mod types;


pub use stats::{Stat, StatNanos, calc, calc_sorted, calc_with_mode, percent_index};
pub use types::{Metric, RequestResult, Sample};
