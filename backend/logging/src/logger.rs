//! Structured Logger
//!
//! Wraps `tracing` with console output on stderr, an optional daily rolling
//! NDJSON file, and `RUST_LOG`-based level control.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file prefix inside the log directory.
const LOG_FILE_NAME: &str = "trackscan.log";

#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Default filter when `RUST_LOG` is not set.
    pub level: String,
    /// Directory for `trackscan.log.YYYY-MM-DD`; no file output when absent.
    pub dir: Option<PathBuf>,
    /// JSON console output instead of human-readable lines.
    pub json: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            json: false,
        }
    }
}

/// Initialize the global subscriber. Later calls are no-ops.
pub fn init_logger(options: &LoggerOptions) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.level));

    let file_layer = options.dir.as_ref().map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_NAME);
        fmt::layer().json().with_writer(appender).with_ansi(false)
    });

    // stdout is reserved for command output
    let json_console = options
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_console = (!options.json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_console)
        .with(text_console)
        .with(file_layer)
        .try_init();
}
