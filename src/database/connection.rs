use crate::config::MigrationConfig;
use crate::error::MigrationResult;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::Row;
use std::time::Duration;
use tracing::info;

pub struct DatabaseConnection {
    pool: MySqlPool,
}

impl DatabaseConnection {
    pub async fn connect(config: &MigrationConfig) -> MigrationResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.database_url)
            .await?;

        info!(table_prefix = %config.table_prefix, "Connected to WordPress database");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<bool, sqlx::Error> {
        health_check(&self.pool).await
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

pub(crate) async fn health_check(pool: &MySqlPool) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 AS health").fetch_one(pool).await?;
    let health: i64 = row.try_get("health")?;
    Ok(health == 1)
}
