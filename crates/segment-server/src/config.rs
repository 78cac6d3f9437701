//! Recognized configuration options (§6). Loading-as-a-framework-concern is
//! out of scope per §1, but the option structs themselves are part of the
//! core's contract with its (out-of-scope) HTTP and bootstrap layers, so
//! they are carried here, loaded via `clap`'s `env` feature the way the
//! teacher crate already depends on it.

use std::time::Duration;

use clap::Parser;

/// Top-level configuration, aggregating every recognized option group.
#[derive(Debug, Clone, Parser)]
pub struct Config {
    #[command(flatten)]
    pub postgres: PostgresConfig,
    #[command(flatten)]
    pub http: HttpConfig,
    #[command(flatten)]
    pub cache: CacheConfig,
    #[command(flatten)]
    pub cleaner: CleanerConfig,
    #[command(flatten)]
    pub logger: LoggerConfig,
}

/// Postgres connection parameters.
#[derive(Debug, Clone, Parser)]
pub struct PostgresConfig {
    #[arg(long, env = "POSTGRES_HOST", default_value = "localhost")]
    pub host: String,
    #[arg(long, env = "POSTGRES_PORT", default_value_t = 5432)]
    pub port: u16,
    #[arg(long, env = "POSTGRES_USER", default_value = "postgres")]
    pub user: String,
    #[arg(long, env = "POSTGRES_PASSWORD", default_value = "")]
    pub password: String,
    #[arg(long, env = "POSTGRES_DB", default_value = "segments")]
    pub database: String,
    #[arg(long, env = "POSTGRES_POOL_SIZE", default_value_t = 10)]
    pub pool_size: u32,
    #[arg(long, env = "POSTGRES_SSL_MODE", default_value = "prefer")]
    pub ssl_mode: String,
}

/// Request-surface settings for the (out-of-scope) HTTP layer. Kept as data
/// only — this crate never binds a socket on it.
#[derive(Debug, Clone, Parser)]
pub struct HttpConfig {
    #[arg(long, env = "HTTP_HOST", default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, env = "HTTP_PORT", default_value_t = 8080)]
    pub port: u16,
    #[arg(long, env = "HTTP_READ_TIMEOUT", default_value_t = 10)]
    pub read_timeout_s: u64,
    #[arg(long, env = "HTTP_WRITE_TIMEOUT", default_value_t = 10)]
    pub write_timeout_s: u64,
}

/// TTLs for the history-snapshot and per-user caches.
#[derive(Debug, Clone, Parser)]
pub struct CacheConfig {
    #[arg(long, env = "CSV_CACHE_EXPIRATION", default_value_t = 600)]
    pub csv_expiration_s: u64,
    #[arg(long, env = "SEGMENT_CACHE_EXPIRATION", default_value_t = 60)]
    pub segment_expiration_s: u64,
}

impl CacheConfig {
    #[must_use]
    pub fn csv_expiration(&self) -> Duration {
        Duration::from_secs(self.csv_expiration_s)
    }

    #[must_use]
    pub fn segment_expiration(&self) -> Duration {
        Duration::from_secs(self.segment_expiration_s)
    }
}

/// Sweeper period. `interval_s <= 0` disables the sweeper.
#[derive(Debug, Clone, Parser)]
pub struct CleanerConfig {
    #[arg(long, env = "CLEANER_INTERVAL", default_value_t = 30)]
    pub interval_s: i64,
}

impl CleanerConfig {
    /// `None` when the sweeper should not run.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        if self.interval_s <= 0 {
            None
        } else {
            Some(Duration::from_secs(self.interval_s.unsigned_abs()))
        }
    }
}

/// Structured-logging knobs.
#[derive(Debug, Clone, Parser)]
pub struct LoggerConfig {
    #[arg(long, env = "LOGGER_DEVELOPMENT", default_value_t = false)]
    pub development: bool,
    #[arg(long, env = "LOGGER_LEVEL", default_value = "info")]
    pub level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleaner_interval_disabled_at_or_below_zero() {
        assert_eq!(CleanerConfig { interval_s: 0 }.interval(), None);
        assert_eq!(CleanerConfig { interval_s: -5 }.interval(), None);
    }

    #[test]
    fn cleaner_interval_enabled_above_zero() {
        assert_eq!(
            CleanerConfig { interval_s: 30 }.interval(),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn config_parses_from_env_defaults_with_no_args() {
        let config = Config::parse_from(["segment-server"]);
        assert_eq!(config.postgres.host, "localhost");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.cache.segment_expiration_s, 60);
    }
}
