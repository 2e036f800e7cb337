mod actions;
mod cli;
mod codec;
mod config;
mod model;
mod render;
mod session;
mod storage;
mod timeline;
mod tui;

use std::path::PathBuf;
use std::process;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Keep the guard alive for the life of the process so buffered log
    // lines are flushed on exit.
    let _guard = init_logging();

    if let Err(e) = cli::run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// File logging: stderr belongs to the terminal UI, so diagnostics go to
/// `~/.wake/logs/wake.log` instead. `WAKE_LOG_DIR` overrides the
/// directory; `RUST_LOG` overrides the filter.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = std::env::var("WAKE_LOG_DIR")
        .ok()
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".wake").join("logs")))?;
    std::fs::create_dir_all(&log_dir).ok()?;

    let appender = tracing_appender::rolling::never(&log_dir, "wake.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "wake=info".into()))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Some(guard)
}
