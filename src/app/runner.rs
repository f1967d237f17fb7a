use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::domain::run::RunConfig;
use crate::error::AppResult;
use crate::http::{RequestParams, WorkerPool, build_client};
use crate::metrics::RequestResult;
use crate::shutdown::RunContext;

use super::summary::Report;

/// Upper bound on the result buffer reserved up front.
const MAX_PREALLOCATED_RESULTS: usize = 65_536;

/// Feeds `config.requests` descriptors through the worker pool under `ctx`
/// and aggregates every result that comes back.
pub(crate) async fn run_load(config: &RunConfig, ctx: &RunContext) -> AppResult<Report> {
    let client = build_client(config.connect_timeout)?;
    let params = Arc::new(config.request_params());
    let (queue_tx, queue_rx) = flume::bounded(config.concurrency.get());

    info!(
        "Sending {} requests to {} with {} workers.",
        config.requests, config.url, config.concurrency
    );

    let run_start = Instant::now();
    let producer = tokio::spawn(feed_requests(
        ctx.clone(),
        queue_tx,
        params,
        config.requests,
    ));
    let mut pool = WorkerPool::spawn(ctx, &client, config.concurrency, &queue_rx);
    drop(queue_rx);

    let capacity = usize::try_from(config.requests)
        .unwrap_or(MAX_PREALLOCATED_RESULTS)
        .min(MAX_PREALLOCATED_RESULTS);
    let mut results: Vec<RequestResult> = Vec::with_capacity(capacity);
    while let Some(result) = pool.recv().await {
        results.push(result);
    }
    let elapsed = run_start.elapsed();

    let fed = producer.await?;
    let stats = pool.join().await?;
    debug!(
        "Queued {} requests; workers made {} attempts ({} failed, {} skipped).",
        fed, stats.attempts, stats.failures, stats.skipped
    );

    let attempts = u64::try_from(results.len()).unwrap_or(u64::MAX);
    let stopped = if attempts < config.requests {
        ctx.stop_reason()
    } else {
        None
    };
    if let Some(reason) = stopped {
        info!(
            "Run stopped after {} of {} requests: {}",
            attempts, config.requests, reason
        );
    }

    Ok(Report::from_results(
        &results,
        config.percentiles,
        config.requests,
        elapsed,
        stopped,
    ))
}

/// Queues `count` copies of `params`, then closes the queue by dropping the
/// sender. Stops early when `ctx` fires or every worker is gone.
async fn feed_requests(
    ctx: RunContext,
    queue: flume::Sender<Arc<RequestParams>>,
    params: Arc<RequestParams>,
    count: u64,
) -> u64 {
    let mut fed: u64 = 0;
    let done = ctx.done();
    tokio::pin!(done);

    while fed < count {
        tokio::select! {
            biased;
            _ = &mut done => break,
            sent = queue.send_async(Arc::clone(&params)) => {
                if sent.is_err() {
                    break;
                }
                fed = fed.saturating_add(1);
            }
        }
    }

    fed
}
