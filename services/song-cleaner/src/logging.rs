//!
//! src/logging.rs
//!
//! Initializes logger from the LoggingConfig handed over by main.
//! The returned guard must outlive the server so buffered lines flush
//!

use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use tracing_error::ErrorLayer;
use tracing_appender::non_blocking;

use crate::config::{LogFormat, LoggingConfig};
use crate::errors::CleanerError;

pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard
}

pub fn init_logging(cfg: &LoggingConfig) -> Result<LoggingGuard, CleanerError> {
    let (writer, guard) = non_blocking(std::io::stdout());
    let filter = EnvFilter::try_new(&cfg.filter_directives)
        .map_err(|e| CleanerError::Config(
            format!("log filter {}: {e}", cfg.filter_directives)
        ))?;

    let json_layer = (cfg.format == LogFormat::Json).then(|| {
        fmt::layer()
            .with_writer(writer.clone())
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_ansi(false)
            .with_target(cfg.include_target)
            .with_file(cfg.include_file_line)
            .with_line_number(cfg.include_file_line)
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(true)
    });

    let pretty_layer = (cfg.format == LogFormat::Pretty).then(|| {
        fmt::layer()
            .with_writer(writer)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_ansi(cfg.with_ansi)
            .with_target(cfg.include_target)
            .with_file(cfg.include_file_line)
            .with_line_number(cfg.include_file_line)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| CleanerError::Config(format!("logger init: {e}")))?;

    Ok( LoggingGuard { _guard: guard } )
}
