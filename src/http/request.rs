use std::time::Duration;

/// Immutable description of the request every attempt issues.
///
/// Built once per run and shared by `Arc` across the queue and all workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    url: String,
    timeout: Duration,
}

impl RequestParams {
    /// A zero `timeout` means the attempt is bounded only by the run context.
    #[must_use]
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}
