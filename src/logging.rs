use log::{debug, error, info, log_enabled, warn, Level};

/// Initializes the logger with the `env_logger` crate.
///
/// Verbosity is controlled through `RUST_LOG`; decoder diagnostics
/// (rejected rows, candidate frame dumps) are emitted at `debug`.
///
/// Safe to call more than once: tests and embedding applications may already
/// have installed a logger, in which case that one is kept.
pub fn init_logger() {
    if let Err(err) = env_logger::try_init() {
        debug!("Keeping existing logger: {err}");
    }
}

/// Initializes the logger with a default filter when `RUST_LOG` is unset.
///
/// Used by the CLI so that `-v` flags map onto log levels.
pub fn init_logger_with_level(level: log::LevelFilter) {
    if let Err(err) = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()
    {
        debug!("Keeping existing logger: {err}");
    }
}

/// Logs an error message.
pub fn log_error(message: &str) {
    if log_enabled!(Level::Error) {
        error!("{message}");
    }
}

/// Logs a warning message.
pub fn log_warn(message: &str) {
    if log_enabled!(Level::Warn) {
        warn!("{message}");
    }
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}

/// Logs a debug message.
pub fn log_debug(message: &str) {
    if log_enabled!(Level::Debug) {
        debug!("{message}");
    }
}
