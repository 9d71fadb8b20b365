//! Logging setup

use crate::config::LoggingConfig;
use tracing::Level;

/// Initialize logging.
///
/// Logs go to stderr so stdout stays free for ingestion results. Unknown
/// levels fall back to `info`. Calling this twice keeps the first
/// subscriber.
pub fn init_logging(config: &LoggingConfig) {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}
