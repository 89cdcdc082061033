//! Foreign-key backfill and processed-flag updates.

use crate::client::WarehouseClient;
use etl_core::{BatchOutcome, DbErrorCode, Dimension, Result};
use tracing::{info, warn};

/// `UPDATE ... FROM` setting one fact key from its dimension.
///
/// Only keys that are still null are touched, so re-running never rewrites
/// a resolved key.
pub fn backfill_sql(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Date => {
            "UPDATE public.etl_1 AS f SET date_id = d.id FROM public.dim_date AS d \
             WHERE f.date = d.date AND f.date_id IS NULL"
        }
        Dimension::Time => {
            "UPDATE public.etl_1 AS f SET time_id = d.id FROM public.dim_time AS d \
             WHERE f.time = d.time AND f.time_id IS NULL"
        }
        Dimension::Location => {
            "UPDATE public.etl_1 AS f SET location_id = d.id FROM public.dim_location AS d \
             WHERE f.client_ip = d.client_ip AND f.location_id IS NULL"
        }
        Dimension::Request => {
            "UPDATE public.etl_1 AS f SET request_id = d.id FROM public.dim_request AS d \
             WHERE f.method = d.method \
               AND f.client_browser = d.client_browser \
               AND (f.client_referrer = d.client_referrer \
                    OR (f.client_referrer IS NULL AND d.client_referrer IS NULL)) \
               AND f.status = d.status \
               AND f.duration = d.duration \
               AND f.request_id IS NULL"
        }
        Dimension::File => {
            "UPDATE public.etl_1 AS f SET file_id = d.id FROM public.dim_file AS d \
             WHERE f.uri_stem = d.uri_stem \
               AND (f.bytes_sent = d.bytes_sent \
                    OR (f.bytes_sent IS NULL AND d.bytes_sent IS NULL)) \
               AND f.file_id IS NULL"
        }
        Dimension::Visit => {
            "UPDATE public.etl_1 AS f SET visit_id = d.id FROM public.dim_visit AS d \
             WHERE COALESCE(f.client_cookie, '') = d.client_cookie AND f.visit_id IS NULL"
        }
    }
}

/// Run the six key backfills. Each statement runs regardless of earlier
/// failures.
pub async fn backfill_foreign_keys(client: &WarehouseClient) -> BatchOutcome {
    let mut results = Vec::with_capacity(Dimension::ALL.len());

    for dimension in Dimension::ALL {
        let result = client
            .timed(
                DbErrorCode::UpdateFailed,
                dimension.fact_key(),
                sqlx::query(backfill_sql(dimension)).execute(client.pool()),
            )
            .await
            .map(|r| r.rows_affected());

        match &result {
            Ok(rows) => info!(dimension = %dimension, rows, "Foreign key backfilled"),
            Err(e) => warn!(dimension = %dimension, error = %e, "Foreign key backfill failed"),
        }
        results.push((format!("backfill {}", dimension.fact_key()), result));
    }

    BatchOutcome::collect(results)
}

/// Mark every unprocessed staging row as normalized.
pub async fn mark_staging_processed(client: &WarehouseClient) -> Result<u64> {
    let result = client
        .timed(
            DbErrorCode::UpdateFailed,
            "flag s3_load",
            sqlx::query("UPDATE public.s3_load SET in_etl_1 = TRUE WHERE in_etl_1 = FALSE")
                .execute(client.pool()),
        )
        .await?;
    Ok(result.rows_affected())
}

/// Mark every unprocessed fact row as dimensionalized.
pub async fn mark_facts_processed(client: &WarehouseClient) -> Result<u64> {
    let result = client
        .timed(
            DbErrorCode::UpdateFailed,
            "flag etl_1",
            sqlx::query("UPDATE public.etl_1 SET in_etl_2 = TRUE WHERE in_etl_2 = FALSE")
                .execute(client.pool()),
        )
        .await?;
    Ok(result.rows_affected())
}
