//! Warehouse client wrapper.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::config::WarehouseConfig;
use etl_core::{DbErrorCode, Error, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use telemetry::metrics;
use tracing::{debug, info};

/// Warehouse client holding the stage's connection pool.
#[derive(Clone)]
pub struct WarehouseClient {
    pool: PgPool,
}

impl WarehouseClient {
    /// Connects to the warehouse.
    pub async fn connect(config: WarehouseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_with(config.connect_options())
            .await
            .map_err(|e| {
                Error::database(
                    DbErrorCode::ConnectFailed,
                    format!("connect to {}:{}: {}", config.host, config.port, e),
                )
            })?;

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Connected to warehouse"
        );

        Ok(Self { pool })
    }

    /// Returns the inner pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Closes every connection. Further statements fail.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Warehouse pool closed");
    }

    /// Runs one statement, recording latency and mapping the driver error.
    pub(crate) async fn timed<T, F>(&self, code: DbErrorCode, label: &str, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        let start = Instant::now();
        let result = fut.await;
        metrics()
            .statement_latency_ms
            .observe(start.elapsed().as_millis() as u64);
        metrics().statements_executed.inc();

        result.map_err(|e| {
            metrics().statement_errors.inc();
            Error::database(code, format!("{}: {}", label, e))
        })
    }
}
