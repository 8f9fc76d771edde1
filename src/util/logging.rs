// LogStudio - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug (sets the filter to debug)
//   - Config file: [logging] level = "debug"
//
// Output: stderr by default, or the file named by [logging] file.
// Log lines from the files being viewed are never echoed at info level.

use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Initialise the logging subsystem.
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default "info".
/// When `log_file` cannot be opened the subscriber falls back to stderr and
/// reports the failure once logging is up.
pub fn init(debug_flag: bool, config_level: Option<&str>, log_file: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(super::constants::DEFAULT_LOG_LEVEL)
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .compact();

    let mut file_error = None;
    match log_file.map(|p| (p, std::fs::OpenOptions::new().create(true).append(true).open(p))) {
        Some((_, Ok(file))) => {
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        Some((path, Err(e))) => {
            file_error = Some((path.to_string(), e));
            builder.with_writer(std::io::stderr).init();
        }
        None => {
            builder.with_writer(std::io::stderr).init();
        }
    }

    if let Some((path, e)) = file_error {
        tracing::warn!(path = %path, error = %e, "Cannot open log file; logging to stderr");
    }

    tracing::debug!(
        app = super::constants::APP_NAME,
        version = super::constants::APP_VERSION,
        "Logging initialised"
    );
}
