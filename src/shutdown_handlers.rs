use tracing::info;

use crate::shutdown::{CancelHandle, RunContext};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Cancels the run on Ctrl+C (and SIGTERM on unix). The task exits on its own
/// once the run context fires for any other reason.
pub fn setup_signal_shutdown_handler(
    ctx: &RunContext,
    cancel: &CancelHandle,
) -> tokio::task::JoinHandle<()> {
    let ctx = ctx.clone();
    let cancel = cancel.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                eprintln!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        {
            tokio::select! {
                _ = ctx.done() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, cancelling outstanding requests.");
                    cancel.cancel();
                }
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    info!("Terminated, cancelling outstanding requests.");
                    cancel.cancel();
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = ctx.done() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, cancelling outstanding requests.");
                    cancel.cancel();
                }
            }
        }
    })
}
