//! `crispr-lab` binary.

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use clap::Parser;
use tokio_util::sync::CancellationToken;

use crispr_lab::cli::args::{Cli, LogFormatArg};
use crispr_lab::cli::commands;
use crispr_lab::error::ExitCode;
use crispr_lab::observability::{LogFormat, init_logging, init_metrics};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let format = match cli.log_format {
        LogFormatArg::Human => LogFormat::Human,
        LogFormatArg::Json => LogFormat::Json,
    };
    init_logging(format, cli.verbose, cli.quiet, cli.color);

    if let Some(port) = cli.metrics_port
        && let Err(e) = init_metrics(Some(port))
    {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }

    let cancel = CancellationToken::new();
    let signal_code = Arc::new(AtomicI32::new(ExitCode::SUCCESS));
    tokio::spawn(watch_signals(cancel.clone(), Arc::clone(&signal_code)));

    let result = commands::dispatch(cli, cancel).await;

    match result {
        Ok(()) => std::process::exit(signal_code.load(Ordering::SeqCst)),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

/// First Ctrl+C or SIGTERM cancels the session gracefully; a second one
/// exits immediately.
async fn watch_signals(cancel: CancellationToken, code: Arc<AtomicI32>) {
    let first = next_signal().await;
    code.store(first, Ordering::SeqCst);
    tracing::info!(code = first, "shutdown requested");
    eprintln!("\nStopping... (press Ctrl+C again to force)");
    cancel.cancel();

    let second = next_signal().await;
    std::process::exit(second);
}

#[cfg(unix)]
async fn next_signal() -> i32 {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => tokio::select! {
            _ = tokio::signal::ctrl_c() => ExitCode::INTERRUPTED,
            _ = sigterm.recv() => ExitCode::TERMINATED,
        },
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable");
            let _ = tokio::signal::ctrl_c().await;
            ExitCode::INTERRUPTED
        }
    }
}

#[cfg(not(unix))]
async fn next_signal() -> i32 {
    let _ = tokio::signal::ctrl_c().await;
    ExitCode::INTERRUPTED
}
