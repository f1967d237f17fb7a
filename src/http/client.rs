use std::time::Duration;

use reqwest::Client;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::HttpError;

/// Builds the client shared by every worker. Per-request deadlines come from
/// the run context, so no overall client timeout is set here.
///
/// # Errors
///
/// Returns an error when the TLS backend cannot be initialised.
pub fn build_client(connect_timeout: Duration) -> Result<Client, HttpError> {
    Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .connect_timeout(connect_timeout)
        .build()
        .map_err(|err| HttpError::BuildClientFailed { source: err })
}
