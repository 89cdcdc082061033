//! Row inserts for the staging, fact and dimension tables.
//!
//! One statement per row. Callers decide whether a failure aborts the run.

use crate::client::WarehouseClient;
use etl_core::{
    DateDim, DbErrorCode, FactRow, FileDim, LocationDim, LogRecord, RequestDim, Result, TimeDim,
    VisitDim,
};
use telemetry::metrics;
use tracing::trace;

/// Builds the staging insert for one record.
///
/// Columns are the record format's fields plus `in_etl_1`, so a full record
/// binds 19 values and a reduced record binds 15.
pub fn staging_insert_sql(record: &LogRecord) -> (String, Vec<&str>) {
    let values = record.staging_values();
    let mut columns: Vec<&str> = values.iter().map(|(column, _)| *column).collect();
    columns.push("in_etl_1");

    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
    let sql = format!(
        "INSERT INTO public.s3_load ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    );

    (sql, values.into_iter().map(|(_, value)| value).collect())
}

/// Insert one parsed log line into staging, unprocessed.
pub async fn insert_staging_record(client: &WarehouseClient, record: &LogRecord) -> Result<()> {
    let (sql, values) = staging_insert_sql(record);

    let mut query = sqlx::query(&sql);
    for value in values {
        query = query.bind(value);
    }
    query = query.bind(false);

    client
        .timed(
            DbErrorCode::InsertFailed,
            "insert s3_load",
            query.execute(client.pool()),
        )
        .await?;

    metrics().staging_rows_inserted.inc();
    trace!(format = ?record.format, "Staging row inserted");
    Ok(())
}

const INSERT_FACT: &str = r#"
INSERT INTO public.etl_1 (
    id, date, time, server_ip, method, uri_stem, uri_query, server_port,
    username, client_ip, client_browser, client_cookie, client_referrer,
    status, substatus, win32_status, bytes_sent, bytes_received, duration,
    in_etl_2
) VALUES (
    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
    $11, $12, $13, $14, $15, $16, $17, $18, $19, FALSE
)
"#;

/// Insert one fact row, unprocessed and with every dimension key null.
pub async fn insert_fact_row(client: &WarehouseClient, row: &FactRow) -> Result<()> {
    let query = sqlx::query(INSERT_FACT)
        .bind(&row.id)
        .bind(row.date)
        .bind(row.time)
        .bind(&row.server_ip)
        .bind(&row.method)
        .bind(&row.uri_stem)
        .bind(&row.uri_query)
        .bind(row.server_port)
        .bind(&row.username)
        .bind(&row.client_ip)
        .bind(&row.client_browser)
        .bind(&row.client_cookie)
        .bind(&row.client_referrer)
        .bind(row.status)
        .bind(row.substatus)
        .bind(row.win32_status)
        .bind(row.bytes_sent)
        .bind(row.bytes_received)
        .bind(row.duration);

    client
        .timed(
            DbErrorCode::InsertFailed,
            "insert etl_1",
            query.execute(client.pool()),
        )
        .await?;

    metrics().fact_rows_inserted.inc();
    Ok(())
}

pub async fn insert_date_dim(client: &WarehouseClient, dim: &DateDim) -> Result<()> {
    let query = sqlx::query(
        "INSERT INTO public.dim_date (id, date, day, week, month, quarter, year) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(&dim.id)
    .bind(dim.date)
    .bind(dim.day)
    .bind(dim.week)
    .bind(dim.month)
    .bind(dim.quarter)
    .bind(dim.year);

    execute_dimension_insert(client, "insert dim_date", query).await
}

pub async fn insert_time_dim(client: &WarehouseClient, dim: &TimeDim) -> Result<()> {
    let query = sqlx::query(
        "INSERT INTO public.dim_time (id, time, hour, minute, second) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&dim.id)
    .bind(dim.time)
    .bind(dim.hour)
    .bind(dim.minute)
    .bind(dim.second);

    execute_dimension_insert(client, "insert dim_time", query).await
}

pub async fn insert_location_dim(client: &WarehouseClient, dim: &LocationDim) -> Result<()> {
    let query = sqlx::query(
        "INSERT INTO public.dim_location (id, client_ip, postcode, city, region, country) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&dim.id)
    .bind(&dim.client_ip)
    .bind(&dim.postcode)
    .bind(&dim.city)
    .bind(&dim.region)
    .bind(&dim.country);

    execute_dimension_insert(client, "insert dim_location", query).await
}

pub async fn insert_request_dim(client: &WarehouseClient, dim: &RequestDim) -> Result<()> {
    let query = sqlx::query(
        "INSERT INTO public.dim_request (id, method, client_browser, client_referrer, status, duration) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&dim.id)
    .bind(&dim.key.method)
    .bind(&dim.key.client_browser)
    .bind(&dim.key.client_referrer)
    .bind(dim.key.status)
    .bind(dim.key.duration);

    execute_dimension_insert(client, "insert dim_request", query).await
}

pub async fn insert_file_dim(client: &WarehouseClient, dim: &FileDim) -> Result<()> {
    let query = sqlx::query(
        "INSERT INTO public.dim_file (id, uri_stem, bytes_sent, file_type, is_crawler) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&dim.id)
    .bind(&dim.uri_stem)
    .bind(dim.bytes_sent)
    .bind(&dim.file_type)
    .bind(dim.is_crawler);

    execute_dimension_insert(client, "insert dim_file", query).await
}

pub async fn insert_visit_dim(client: &WarehouseClient, dim: &VisitDim) -> Result<()> {
    let query = sqlx::query("INSERT INTO public.dim_visit (id, client_cookie) VALUES ($1, $2)")
        .bind(&dim.id)
        .bind(&dim.client_cookie);

    execute_dimension_insert(client, "insert dim_visit", query).await
}

async fn execute_dimension_insert(
    client: &WarehouseClient,
    label: &str,
    query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
) -> Result<()> {
    client
        .timed(DbErrorCode::InsertFailed, label, query.execute(client.pool()))
        .await?;
    metrics().dimension_rows_inserted.inc();
    Ok(())
}
