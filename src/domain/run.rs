use std::time::Duration;

use crate::args::{LoadArgs, OutputFormat, PercentileMode, PositiveUsize};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::{RequestParams, parse_target};

/// Validated settings for one local run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunConfig {
    pub(crate) url: String,
    pub(crate) requests: u64,
    pub(crate) concurrency: PositiveUsize,
    pub(crate) timeout: Duration,
    pub(crate) request_timeout: Duration,
    pub(crate) connect_timeout: Duration,
    pub(crate) percentiles: PercentileMode,
    pub(crate) output_format: OutputFormat,
}

impl RunConfig {
    /// Checks the merged CLI/config values. The target must be an http(s)
    /// URL so that malformed input fails here instead of in every worker.
    pub(crate) fn from_args(args: &LoadArgs) -> AppResult<Self> {
        let url = args
            .target_url()
            .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;
        parse_target(url).map_err(AppError::http)?;

        Ok(Self {
            url: url.to_owned(),
            requests: args.requests,
            concurrency: args.concurrency,
            timeout: args.timeout,
            request_timeout: args.request_timeout,
            connect_timeout: args.connect_timeout,
            percentiles: args.percentiles,
            output_format: args.output_format,
        })
    }

    #[must_use]
    pub(crate) fn request_params(&self) -> RequestParams {
        RequestParams::new(self.url.clone(), self.request_timeout)
    }
}
