use std::num::NonZeroUsize;

use super::types::PositiveUsize;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("volley/", env!("CARGO_PKG_VERSION"));

/// Default worker count: one per available CPU.
pub(crate) fn default_concurrency() -> PositiveUsize {
    PositiveUsize::from(std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN))
}
