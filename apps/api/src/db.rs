use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;

/// A stuck acquire should fail the request well before the engine timeout.
const ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Creates the PostgreSQL connection pool, sized from configuration.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    info!(
        "Connecting to PostgreSQL (up to {} connections)...",
        config.db_max_connections
    );

    let pool = pool_options(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

fn pool_options(max_connections: u32) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_is_sized_from_configuration() {
        let options = pool_options(4);
        assert_eq!(options.get_max_connections(), 4);
        assert_eq!(
            options.get_acquire_timeout(),
            Duration::from_secs(ACQUIRE_TIMEOUT_SECS)
        );
    }
}
