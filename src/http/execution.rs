use futures_util::StreamExt;
use reqwest::{Client, Response, Url};
use tokio::time::Instant;
use tracing::debug;

use crate::error::{HttpError, RequestFailure};
use crate::metrics::RequestResult;
use crate::shutdown::RunContext;

use super::request::RequestParams;

/// Parses `url` and accepts only `http`/`https` targets.
///
/// # Errors
///
/// Returns an error when the URL is malformed or uses another scheme.
pub fn parse_target(url: &str) -> Result<Url, HttpError> {
    let parsed = Url::parse(url).map_err(|err| HttpError::InvalidUrl {
        url: url.to_owned(),
        source: err,
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(HttpError::UnsupportedScheme {
            url: url.to_owned(),
            scheme: scheme.to_owned(),
        }),
    }
}

/// Issues one GET under `ctx`, tightened by the per-request timeout, and
/// measures it until the body is fully drained.
///
/// Every runtime outcome is reported inside the returned [`RequestResult`];
/// the attempt's elapsed time and the bytes read so far are kept on failure.
///
/// # Errors
///
/// Returns an error only when the request cannot be constructed.
pub async fn execute(
    ctx: &RunContext,
    client: &Client,
    params: &RequestParams,
) -> Result<RequestResult, HttpError> {
    let url = parse_target(params.url())?;
    let request = client
        .get(url)
        .build()
        .map_err(|err| HttpError::BuildRequestFailed { source: err })?;
    let request_ctx = ctx.child_with_timeout(params.timeout());

    let start = Instant::now();
    if let Some(reason) = request_ctx.stop_reason() {
        return Ok(RequestResult::failed(
            start.elapsed(),
            0,
            None,
            reason.into(),
        ));
    }

    let response = tokio::select! {
        biased;
        reason = request_ctx.done() => {
            return Ok(RequestResult::failed(start.elapsed(), 0, None, reason.into()));
        }
        response = client.execute(request) => response,
    };
    let response = match response {
        Ok(response) => response,
        Err(err) => {
            return Ok(RequestResult::failed(
                start.elapsed(),
                0,
                None,
                RequestFailure::Transport { source: err },
            ));
        }
    };

    let status = response.status().as_u16();
    let (bytes_read, failure) = drain_response_body(&request_ctx, response).await;
    let duration = start.elapsed();
    Ok(match failure {
        Some(failure) => RequestResult::failed(duration, bytes_read, Some(status), failure),
        None => RequestResult::success(duration, bytes_read, status),
    })
}

/// Counts body bytes until the stream ends, fails, or `ctx` fires. The
/// response is dropped on every path, which returns or closes the connection.
async fn drain_response_body(
    ctx: &RunContext,
    response: Response,
) -> (u64, Option<RequestFailure>) {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    let done = ctx.done();
    tokio::pin!(done);

    loop {
        tokio::select! {
            biased;
            reason = &mut done => {
                debug!(
                    "Discarding unread response body after {} bytes: {}",
                    total_bytes, reason
                );
                return (total_bytes, Some(reason.into()));
            }
            chunk = stream.next() => match chunk {
                Some(Ok(bytes)) => {
                    total_bytes = total_bytes
                        .saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
                }
                Some(Err(err)) => return (total_bytes, Some(RequestFailure::Body { source: err })),
                None => return (total_bytes, None),
            },
        }
    }
}
