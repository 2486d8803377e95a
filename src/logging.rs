//! Logging setup using tracing
//!
//! Every run logs to standard output and, unless disabled, to a daily rotated
//! file. Filtering follows `RUST_LOG` and defaults to `info`.

use crate::error::{Result, StarsError};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, fmt::time::ChronoLocal, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory for the log file; `None` logs to standard output only.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
    /// Rotated files kept on disk.
    pub max_files: usize,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: Some(PathBuf::from(".")),
            file_prefix: "project-stars".to_string(),
            max_files: 7,
            default_filter: "info".to_string(),
        }
    }
}

/// Logging context for one process run. Keep it alive until exit; dropping
/// it flushes the file writer.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// # Errors
/// Fails if the log directory cannot be used or a subscriber is already set.
pub fn init(config: &LogConfig) -> Result<LogGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false);

    let (file_layer, file_guard) = match &config.directory {
        Some(directory) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(&config.file_prefix)
                .filename_suffix("log")
                .max_log_files(config.max_files)
                .build(directory)
                .map_err(|e| StarsError::LoggingError(format!("{}: {}", directory.display(), e)))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .with_timer(ChronoLocal::new(FILE_TIMESTAMP_FORMAT.to_string()));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| StarsError::LoggingError(format!("Failed to initialize tracing: {}", e)))?;

    Ok(LogGuard { _file: file_guard })
}
