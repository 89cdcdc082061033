//! Warehouse health checks and schema setup.

use crate::client::WarehouseClient;
use etl_core::{BatchOutcome, DbErrorCode};
use tracing::{debug, error, info, warn};

/// Check warehouse connection health.
pub async fn check_connection(client: &WarehouseClient) -> bool {
    match sqlx::query("SELECT 1").execute(client.pool()).await {
        Ok(_) => {
            debug!("Warehouse connection healthy");
            true
        }
        Err(e) => {
            error!("Warehouse health check failed: {}", e);
            false
        }
    }
}

/// Create the given tables.
///
/// Every statement runs even if an earlier one fails; failures are
/// collected into the outcome rather than returned.
pub async fn init_schema(client: &WarehouseClient, tables: &[(&str, &str)]) -> BatchOutcome {
    let mut results = Vec::with_capacity(tables.len());

    for (name, ddl) in tables {
        let result = client
            .timed(
                DbErrorCode::SchemaFailed,
                name,
                sqlx::query(ddl).execute(client.pool()),
            )
            .await
            .map(|r| r.rows_affected());

        if let Err(e) = &result {
            warn!(table = %name, error = %e, "Table creation failed");
        }
        results.push((format!("create {}", name), result));
    }

    let outcome = BatchOutcome::from_ddl(results);
    if outcome.is_success() {
        info!(tables = tables.len(), "Schema initialized");
    } else {
        warn!(
            failures = outcome.failures().len(),
            tables = tables.len(),
            "Schema initialized with failures"
        );
    }
    outcome
}
