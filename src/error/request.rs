use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::shutdown::StopReason;

/// Why a single request attempt did not complete successfully.
///
/// Failures are carried inside a `RequestResult`, never returned as errors,
/// so a failed attempt still contributes its timing to the run.
#[derive(Debug, Error)]
pub enum RequestFailure {
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("request cancelled")]
    Cancelled,
    #[error("request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read response body: {source}")]
    Body {
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    DeadlineExceeded,
    Cancelled,
    Transport,
    Body,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FailureKind::DeadlineExceeded => "deadline exceeded",
            FailureKind::Cancelled => "cancelled",
            FailureKind::Transport => "transport",
            FailureKind::Body => "body read",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RequestFailure {
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            RequestFailure::DeadlineExceeded => FailureKind::DeadlineExceeded,
            RequestFailure::Cancelled => FailureKind::Cancelled,
            RequestFailure::Transport { .. } => FailureKind::Transport,
            RequestFailure::Body { .. } => FailureKind::Body,
        }
    }

    /// Returns `true` when the attempt was stopped by the run context rather
    /// than by the network.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        matches!(
            self,
            RequestFailure::DeadlineExceeded | RequestFailure::Cancelled
        )
    }
}

impl From<StopReason> for RequestFailure {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::DeadlineExceeded => RequestFailure::DeadlineExceeded,
            StopReason::Cancelled => RequestFailure::Cancelled,
        }
    }
}
