use std::sync::Arc;

use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::args::PositiveUsize;
use crate::error::AppResult;
use crate::metrics::RequestResult;
use crate::shutdown::RunContext;

use super::execution::execute;
use super::request::RequestParams;

/// Per-worker tally returned when the worker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub attempts: u64,
    pub failures: u64,
    /// Descriptors dropped because the request could not be built.
    pub skipped: u64,
}

impl WorkerStats {
    const fn merge(&mut self, other: WorkerStats) {
        self.attempts = self.attempts.saturating_add(other.attempts);
        self.failures = self.failures.saturating_add(other.failures);
        self.skipped = self.skipped.saturating_add(other.skipped);
    }
}

/// Takes descriptors from `queue` until it is closed and empty or `ctx`
/// fires, emitting one result per attempt.
///
/// An attempt already in flight is not raced against `ctx` here; it observes
/// the same context inside the executor and reports its own stop cause.
pub(crate) async fn run_worker(
    id: usize,
    ctx: RunContext,
    client: Client,
    queue: flume::Receiver<Arc<RequestParams>>,
    results: mpsc::Sender<RequestResult>,
) -> WorkerStats {
    let mut stats = WorkerStats::default();
    let done = ctx.done();
    tokio::pin!(done);

    loop {
        let params = tokio::select! {
            biased;
            reason = &mut done => {
                debug!("Worker {} stopping: {}", id, reason);
                break;
            }
            params = queue.recv_async() => match params {
                Ok(params) => params,
                Err(_) => break,
            },
        };

        let result = match execute(&ctx, &client, &params).await {
            Ok(result) => result,
            Err(err) => {
                warn!("Worker {} skipped a request: {}", id, err);
                stats.skipped = stats.skipped.saturating_add(1);
                continue;
            }
        };

        stats.attempts = stats.attempts.saturating_add(1);
        if let Some(failure) = result.failure() {
            stats.failures = stats.failures.saturating_add(1);
            if failure.is_stopped() {
                debug!("Worker {} request stopped: {}", id, failure);
            } else {
                warn!("Worker {} request failed: {}", id, failure);
            }
        }

        if results.send(result).await.is_err() {
            debug!("Worker {} result receiver closed.", id);
            break;
        }
    }

    stats
}

/// A fixed set of workers sharing one input queue and one result stream.
///
/// The result stream ends once every worker has exited.
#[derive(Debug)]
pub struct WorkerPool {
    results: mpsc::Receiver<RequestResult>,
    workers: Vec<JoinHandle<WorkerStats>>,
}

impl WorkerPool {
    /// Starts `size` workers on the current runtime. Each worker holds the
    /// only clones of the result sender, so the stream closes when the last
    /// worker returns.
    #[must_use]
    pub fn spawn(
        ctx: &RunContext,
        client: &Client,
        size: PositiveUsize,
        queue: &flume::Receiver<Arc<RequestParams>>,
    ) -> Self {
        let size = size.get();
        let (results_tx, results) = mpsc::channel(size);
        let workers = (0..size)
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    ctx.clone(),
                    client.clone(),
                    queue.clone(),
                    results_tx.clone(),
                ))
            })
            .collect();

        Self { results, workers }
    }

    /// Next result in completion order, or `None` once all workers are done.
    pub async fn recv(&mut self) -> Option<RequestResult> {
        self.results.recv().await
    }

    /// Waits for every worker and sums their tallies. Results not yet
    /// received are discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker task panicked.
    pub async fn join(self) -> AppResult<WorkerStats> {
        let Self { results, workers } = self;
        drop(results);

        let mut total = WorkerStats::default();
        for handle in workers {
            total.merge(handle.await?);
        }
        Ok(total)
    }
}
