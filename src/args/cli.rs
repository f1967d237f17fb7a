use clap::Parser;
use std::time::Duration;

use super::defaults::default_concurrency;
use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_positive_usize, parse_timeout_arg,
};
use super::types::{OutputFormat, PercentileMode, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Async HTTP load generator - fires a fixed number of GET requests through a bounded worker pool under a global deadline and reports latency and throughput statistics."
)]
pub struct LoadArgs {
    /// Target URL (GET)
    #[arg(value_name = "URL", conflicts_with = "url")]
    pub target: Option<String>,

    /// Target URL, as an alternative to the positional argument
    #[arg(long, short)]
    pub url: Option<String>,

    /// Number of total requests
    #[arg(long, short = 'r', default_value_t = 10)]
    pub requests: u64,

    /// Max number of concurrent requests (defaults to the number of CPUs)
    #[arg(
        long,
        short = 'c',
        alias = "workers",
        default_value_t = default_concurrency(),
        value_parser = parse_positive_usize
    )]
    pub concurrency: PositiveUsize,

    /// Deadline for the whole run (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        short = 't',
        default_value = "1m",
        value_parser = parse_duration_arg
    )]
    pub timeout: Duration,

    /// Timeout per request (supports ms/s/m/h; 0 disables)
    #[arg(
        long = "request-timeout",
        alias = "rt",
        default_value = "10s",
        value_parser = parse_timeout_arg
    )]
    pub request_timeout: Duration,

    /// TCP connect timeout (supports ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        default_value = "5s",
        value_parser = parse_duration_arg
    )]
    pub connect_timeout: Duration,

    /// How median/p90/p95 are derived: in completion order or sorted by latency
    #[arg(long, value_enum, default_value = "arrival", ignore_case = true)]
    pub percentiles: PercentileMode,

    /// Report format
    #[arg(long = "output-format", value_enum, default_value = "text", ignore_case = true)]
    pub output_format: OutputFormat,

    /// Enable verbose logging (sets log level to debug unless overridden by VOLLEY_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,

    /// Path to config file (TOML/JSON). Defaults to ./volley.toml or ./volley.json if present.
    #[arg(long)]
    pub config: Option<String>,
}

impl LoadArgs {
    /// The target URL, whichever way it was supplied.
    #[must_use]
    pub fn target_url(&self) -> Option<&str> {
        self.target.as_deref().or(self.url.as_deref())
    }
}
