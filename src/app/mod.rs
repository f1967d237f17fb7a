mod runner;
mod summary;


use tracing::error;

use crate::args::OutputFormat;
use crate::domain::run::RunConfig;
use crate::error::AppResult;
use crate::shutdown::RunContext;
use crate::shutdown_handlers::setup_signal_shutdown_handler;

/// Runs one load test against `config.url` and prints the report to stdout.
pub(crate) async fn run_local(config: RunConfig) -> AppResult<()> {
    let (ctx, cancel) = RunContext::with_timeout(config.timeout);
    let signal_handle = setup_signal_shutdown_handler(&ctx, &cancel);

    let outcome = runner::run_load(&config, &ctx).await;
    signal_handle.abort();

    let report = match outcome {
        Ok(report) => report,
        Err(err) => {
            error!("Load run failed: {}", err);
            return Err(err);
        }
    };

    match config.output_format {
        OutputFormat::Text => println!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", report.render_json()?),
    }
    Ok(())
}
