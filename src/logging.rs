use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Initializes console logging, plus a JSON log file when a log directory is configured.
///
/// The returned guard flushes the file writer when dropped; keep it alive for the whole run.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    // Respect RUST_LOG if set; otherwise use the configured filter
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let (file_layer, guard) = match &config.dir {
        Some(dir) => match fs::create_dir_all(dir) {
            Ok(()) => {
                // Daily rotation, written off the main thread
                let file_appender = tracing_appender::rolling::daily(dir, "isat2labelme.log");
                let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
                let layer = fmt::layer().json().with_writer(non_blocking_writer);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!("⚠️  Cannot create log directory {}: {}", dir.display(), e);
                (None, None)
            }
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}
