//! Logging setup
//!
//! The filter comes from `WISHVAULT_LOG` (e.g. `debug` or
//! `wishvault_core=trace`) and defaults to `warn`. Logs go to stderr, or to
//! the configured `log_file` without ANSI colors.

use std::fs::OpenOptions;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use wishvault_core::Config;

/// Environment variable holding the log filter
const LOG_ENV: &str = "WISHVAULT_LOG";

/// Default filter when `WISHVAULT_LOG` is unset or invalid
const DEFAULT_FILTER: &str = "warn";

pub fn init(config: &Config) {
    let env_filter = filter_from(std::env::var(LOG_ENV).ok().as_deref());

    if let Some(ref log_path) = config.log_file {
        let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
                return;
            }
        };

        // Ignore error if already initialized
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(log_file)
            .try_init();
        debug!("Logging to {:?}", log_path);
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
