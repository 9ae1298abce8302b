use crate::config::get_config;
use crate::error::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(30))
}

pub async fn create_pool() -> Result<PgPool> {
    let config = get_config();
    let pool = pool_options().connect(&config.database_url).await?;
    Ok(pool)
}

/// Pool that opens connections on first use. Lets the router be built
/// without a reachable database.
pub fn create_lazy_pool(database_url: &str) -> Result<PgPool> {
    Ok(pool_options().connect_lazy(database_url)?)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}
