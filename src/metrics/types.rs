use std::time::Duration;

use crate::error::RequestFailure;

/// The (duration, bytes) pair the aggregator needs from a measurement.
pub trait Metric {
    fn duration(&self) -> Duration;
    fn bytes_read(&self) -> u64;
}

/// Outcome of one request attempt. Failed attempts keep their elapsed time
/// and whatever body bytes arrived before the failure.
#[derive(Debug)]
pub struct RequestResult {
    duration: Duration,
    bytes_read: u64,
    status: Option<u16>,
    failure: Option<RequestFailure>,
}

impl RequestResult {
    #[must_use]
    pub const fn success(duration: Duration, bytes_read: u64, status: u16) -> Self {
        Self {
            duration,
            bytes_read,
            status: Some(status),
            failure: None,
        }
    }

    #[must_use]
    pub const fn failed(
        duration: Duration,
        bytes_read: u64,
        status: Option<u16>,
        failure: RequestFailure,
    ) -> Self {
        Self {
            duration,
            bytes_read,
            status,
            failure: Some(failure),
        }
    }

    /// HTTP status, when a response head arrived before the attempt ended.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    #[must_use]
    pub const fn failure(&self) -> Option<&RequestFailure> {
        self.failure.as_ref()
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

impl Metric for RequestResult {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

/// A bare measurement, detached from any failure information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sample {
    pub duration: Duration,
    pub bytes_read: u64,
}

impl Sample {
    #[must_use]
    pub const fn new(duration: Duration, bytes_read: u64) -> Self {
        Self {
            duration,
            bytes_read,
        }
    }

    #[must_use]
    pub fn of<M: Metric + ?Sized>(metric: &M) -> Self {
        Self::new(metric.duration(), metric.bytes_read())
    }
}

impl Metric for Sample {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}
