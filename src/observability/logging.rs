use std::fs;
use std::path::Path;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::common::error::Result;

const DEFAULT_DIRECTIVE: &str = "dcspray=info";

/// Installs the global subscriber: human readable lines on stderr plus a JSON log file
/// in `log_dir` that rolls over daily. `RUST_LOG` overrides the default filter.
pub fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "dcspray.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(console_layer)
        .init();

    // keep the writer alive for the whole process so buffered lines reach the file
    std::mem::forget(guard);
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}
