use std::time::Duration;

use serde::Deserialize;

use crate::args::parsers::parse_duration_value;
use crate::args::{OutputFormat, PercentileMode};
use crate::error::ValidationError;

/// Run settings read from `volley.toml` / `volley.json`. Every field is
/// optional; command-line flags take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    #[serde(alias = "tries")]
    pub requests: Option<u64>,
    #[serde(alias = "workers")]
    pub concurrency: Option<usize>,
    pub timeout: Option<DurationValue>,
    pub request_timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub percentiles: Option<PercentileMode>,
    pub output_format: Option<OutputFormat>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
}

/// A duration given either as whole seconds or as text such as `"250ms"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self, allow_zero: bool) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 && !allow_zero {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration_value(text, allow_zero),
        }
    }
}
