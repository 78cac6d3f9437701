//! Structured-logging bootstrap for [`LoggerConfig`]. The HTTP/process
//! bootstrap that owns `fn main` is out of scope per §1, but it is the
//! caller this function exists for — it installs the global subscriber this
//! crate's `debug!`/`error!` call sites write through.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggerConfig;

/// Installs a global `tracing` subscriber from `config`. `development`
/// selects a human-readable, ANSI-colored format; otherwise logs are
/// emitted as JSON lines for ingestion by a log pipeline. Returns an error
/// if a global subscriber is already installed.
pub fn init(config: &LoggerConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.development {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_standard_level_names() {
        for level in ["debug", "info", "warn", "error"] {
            assert!(EnvFilter::try_new(level).is_ok());
        }
    }
}
