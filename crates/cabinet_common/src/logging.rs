//! Logging utilities for the cabinet services.
//!
//! Every crate logs through `tracing` macros; this module only owns subscriber
//! initialization so the binary and the tests set it up the same way.

use cabinet_config::LoggingConfig;
use std::str::FromStr;
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` still takes precedence when set. Safe to call more than once:
/// only the first successful call installs a subscriber.
pub fn init_with_level(level: Level) {
    let result = tracing_subscriber::registry()
        .with(stderr_layer())
        .with(env_filter(level))
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Initialize logging from the `logging` config section.
///
/// With `dir` set, records are additionally written to a daily-rolling file
/// `cabinet.log.YYYY-MM-DD` in that directory. The returned guard flushes the
/// file writer on drop and must be held for the lifetime of the process.
pub fn init_from_config(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = Level::from_str(&config.level).unwrap_or(Level::INFO);

    let Some(dir) = config.dir.as_deref() else {
        init_with_level(level);
        return None;
    };

    let file_appender = tracing_appender::rolling::daily(dir, "cabinet.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let result = tracing_subscriber::registry()
        .with(stderr_layer())
        .with(fmt::layer().with_ansi(false).with_target(true).with_writer(writer))
        .with(env_filter(level))
        .try_init();

    match result {
        Ok(()) => info!("Logging initialized at level: {} (files in {})", level, dir),
        Err(e) => warn!("Logging already initialized, file output to {} not enabled: {}", dir, e),
    }
    Some(guard)
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,cabinet={level}")))
}
