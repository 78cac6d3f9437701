//! Connection-pool construction. Out of scope per §1 beyond "the pool must
//! exist" — this is the minimal `PgPoolOptions` wiring the store methods
//! need a `PgPool` to run against.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

use crate::config::PostgresConfig;

/// Builds a connection pool from [`PostgresConfig`].
pub async fn connect(config: &PostgresConfig) -> Result<PgPool, sqlx::Error> {
    let ssl_mode = match config.ssl_mode.as_str() {
        "disable" => PgSslMode::Disable,
        "allow" => PgSslMode::Allow,
        "prefer" => PgSslMode::Prefer,
        "require" => PgSslMode::Require,
        "verify-ca" => PgSslMode::VerifyCa,
        "verify-full" => PgSslMode::VerifyFull,
        _ => PgSslMode::Prefer,
    };

    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
        .ssl_mode(ssl_mode);

    PgPoolOptions::new()
        .max_connections(config.pool_size)
        .connect_with(options)
        .await
}
