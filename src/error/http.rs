use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported URL scheme '{scheme}' in '{url}'. Use http or https.")]
    UnsupportedScheme { url: String, scheme: String },
    #[error("Failed to build request: {source}")]
    BuildRequestFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
}

impl HttpError {
    /// Returns `true` for errors caused by a malformed or unusable target URL.
    #[must_use]
    pub const fn is_invalid_url(&self) -> bool {
        matches!(
            self,
            HttpError::InvalidUrl { .. } | HttpError::UnsupportedScheme { .. }
        )
    }
}
