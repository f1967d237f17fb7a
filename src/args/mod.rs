//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod test_support;

pub use cli::LoadArgs;
pub use types::{OutputFormat, PercentileMode, PositiveUsize};

pub(crate) use defaults::{DEFAULT_USER_AGENT, default_concurrency};
