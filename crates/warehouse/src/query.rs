//! Select statements: staging reads, dimension anti-joins, and read-back
//! helpers used by tests and admin.

use crate::client::WarehouseClient;
use chrono::{NaiveDate, NaiveDateTime};
use etl_core::{DbErrorCode, Dimension, Error, RequestKey, Result, StagingRow};
use serde::Serialize;
use sqlx::FromRow;

/// Staging row as stored, every column text and nullable.
#[derive(Debug, Clone, FromRow)]
pub struct StagingRowRecord {
    pub date: Option<String>,
    pub time: Option<String>,
    pub server_ip: Option<String>,
    pub method: Option<String>,
    pub uri_stem: Option<String>,
    pub uri_query: Option<String>,
    pub server_port: Option<String>,
    pub username: Option<String>,
    pub client_ip: Option<String>,
    pub client_browser: Option<String>,
    pub client_cookie: Option<String>,
    pub client_referrer: Option<String>,
    pub status: Option<String>,
    pub substatus: Option<String>,
    pub win32_status: Option<String>,
    pub bytes_sent: Option<String>,
    pub bytes_received: Option<String>,
    pub duration: Option<String>,
}

impl From<StagingRowRecord> for StagingRow {
    fn from(r: StagingRowRecord) -> Self {
        StagingRow {
            date: r.date,
            time: r.time,
            server_ip: r.server_ip,
            method: r.method,
            uri_stem: r.uri_stem,
            uri_query: r.uri_query,
            server_port: r.server_port,
            username: r.username,
            client_ip: r.client_ip,
            client_browser: r.client_browser,
            client_cookie: r.client_cookie,
            client_referrer: r.client_referrer,
            status: r.status,
            substatus: r.substatus,
            win32_status: r.win32_status,
            bytes_sent: r.bytes_sent,
            bytes_received: r.bytes_received,
            duration: r.duration,
        }
    }
}

const SELECT_UNPROCESSED_STAGING: &str = r#"
SELECT date, time, server_ip, method, uri_stem, uri_query, server_port,
       username, client_ip, client_browser, client_cookie, client_referrer,
       status, substatus, win32_status, bytes_sent, bytes_received, duration
FROM public.s3_load
WHERE in_etl_1 = FALSE
"#;

/// Fetch every staging row not yet normalized, by column name.
pub async fn fetch_unprocessed_staging(client: &WarehouseClient) -> Result<Vec<StagingRow>> {
    let rows: Vec<StagingRowRecord> = client
        .timed(
            DbErrorCode::QueryFailed,
            "select s3_load",
            sqlx::query_as(SELECT_UNPROCESSED_STAGING).fetch_all(client.pool()),
        )
        .await?;
    Ok(rows.into_iter().map(StagingRow::from).collect())
}

/// Distinct fact dates with no `dim_date` row.
pub async fn missing_dates(client: &WarehouseClient) -> Result<Vec<NaiveDate>> {
    client
        .timed(
            DbErrorCode::QueryFailed,
            "select missing dim_date",
            sqlx::query_scalar(
                "SELECT DISTINCT f.date FROM public.etl_1 AS f \
                 LEFT JOIN public.dim_date AS d ON f.date = d.date \
                 WHERE f.in_etl_2 = FALSE AND d.id IS NULL",
            )
            .fetch_all(client.pool()),
        )
        .await
}

/// Distinct fact timestamps with no `dim_time` row.
pub async fn missing_times(client: &WarehouseClient) -> Result<Vec<NaiveDateTime>> {
    client
        .timed(
            DbErrorCode::QueryFailed,
            "select missing dim_time",
            sqlx::query_scalar(
                "SELECT DISTINCT f.time FROM public.etl_1 AS f \
                 LEFT JOIN public.dim_time AS d ON f.time = d.time \
                 WHERE f.in_etl_2 = FALSE AND d.id IS NULL",
            )
            .fetch_all(client.pool()),
        )
        .await
}

/// Distinct client addresses with no `dim_location` row.
pub async fn missing_client_ips(client: &WarehouseClient) -> Result<Vec<String>> {
    client
        .timed(
            DbErrorCode::QueryFailed,
            "select missing dim_location",
            sqlx::query_scalar(
                "SELECT DISTINCT f.client_ip FROM public.etl_1 AS f \
                 LEFT JOIN public.dim_location AS d ON f.client_ip = d.client_ip \
                 WHERE f.in_etl_2 = FALSE AND d.id IS NULL",
            )
            .fetch_all(client.pool()),
        )
        .await
}

#[derive(Debug, FromRow)]
struct RequestKeyRecord {
    method: String,
    client_browser: String,
    client_referrer: Option<String>,
    status: i32,
    duration: i32,
}

/// Distinct request attributes with no `dim_request` row. A null referrer
/// matches a null referrer.
pub async fn missing_requests(client: &WarehouseClient) -> Result<Vec<RequestKey>> {
    let rows: Vec<RequestKeyRecord> = client
        .timed(
            DbErrorCode::QueryFailed,
            "select missing dim_request",
            sqlx::query_as(
                "SELECT DISTINCT f.method, f.client_browser, f.client_referrer, f.status, f.duration \
                 FROM public.etl_1 AS f \
                 LEFT JOIN public.dim_request AS d \
                   ON f.method = d.method \
                  AND f.client_browser = d.client_browser \
                  AND (f.client_referrer = d.client_referrer \
                       OR (f.client_referrer IS NULL AND d.client_referrer IS NULL)) \
                  AND f.status = d.status \
                  AND f.duration = d.duration \
                 WHERE f.in_etl_2 = FALSE AND d.id IS NULL",
            )
            .fetch_all(client.pool()),
        )
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| RequestKey {
            method: r.method,
            client_browser: r.client_browser,
            client_referrer: r.client_referrer,
            status: r.status,
            duration: r.duration,
        })
        .collect())
}

/// Distinct `(uri_stem, bytes_sent)` pairs with no `dim_file` row. A null
/// byte count matches a null byte count.
pub async fn missing_files(client: &WarehouseClient) -> Result<Vec<(String, Option<i32>)>> {
    client
        .timed(
            DbErrorCode::QueryFailed,
            "select missing dim_file",
            sqlx::query_as(
                "SELECT DISTINCT f.uri_stem, f.bytes_sent FROM public.etl_1 AS f \
                 LEFT JOIN public.dim_file AS d \
                   ON f.uri_stem = d.uri_stem \
                  AND (f.bytes_sent = d.bytes_sent \
                       OR (f.bytes_sent IS NULL AND d.bytes_sent IS NULL)) \
                 WHERE f.in_etl_2 = FALSE AND d.id IS NULL",
            )
            .fetch_all(client.pool()),
        )
        .await
}

/// Distinct cookies with no `dim_visit` row, null mapped to `''`.
pub async fn missing_cookies(client: &WarehouseClient) -> Result<Vec<String>> {
    client
        .timed(
            DbErrorCode::QueryFailed,
            "select missing dim_visit",
            sqlx::query_scalar(
                "SELECT DISTINCT COALESCE(f.client_cookie, '') FROM public.etl_1 AS f \
                 LEFT JOIN public.dim_visit AS d ON COALESCE(f.client_cookie, '') = d.client_cookie \
                 WHERE f.in_etl_2 = FALSE AND d.id IS NULL",
            )
            .fetch_all(client.pool()),
        )
        .await
}

/// Count every row in a pipeline table.
pub async fn count_rows(client: &WarehouseClient, table: &str) -> Result<i64> {
    if !is_pipeline_table(table) {
        return Err(Error::internal(format!("unknown table: {}", table)));
    }
    let sql = format!("SELECT COUNT(*) FROM public.{}", table);
    client
        .timed(
            DbErrorCode::QueryFailed,
            "count",
            sqlx::query_scalar(&sql).fetch_one(client.pool()),
        )
        .await
}

/// Count staging rows still waiting for normalize.
pub async fn count_unprocessed_staging(client: &WarehouseClient) -> Result<i64> {
    client
        .timed(
            DbErrorCode::QueryFailed,
            "count unprocessed s3_load",
            sqlx::query_scalar("SELECT COUNT(*) FROM public.s3_load WHERE in_etl_1 = FALSE")
                .fetch_one(client.pool()),
        )
        .await
}

/// Count fact rows still waiting for dimensionalize.
pub async fn count_unprocessed_facts(client: &WarehouseClient) -> Result<i64> {
    client
        .timed(
            DbErrorCode::QueryFailed,
            "count unprocessed etl_1",
            sqlx::query_scalar("SELECT COUNT(*) FROM public.etl_1 WHERE in_etl_2 = FALSE")
                .fetch_one(client.pool()),
        )
        .await
}

/// Fact row read back with its dimension keys (for verification).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FactKeysRow {
    pub id: String,
    pub date_id: Option<String>,
    pub time_id: Option<String>,
    pub location_id: Option<String>,
    pub request_id: Option<String>,
    pub file_id: Option<String>,
    pub visit_id: Option<String>,
    pub time: NaiveDateTime,
    pub uri_stem: String,
    pub client_ip: String,
    pub client_cookie: Option<String>,
    pub status: i32,
    pub duration: i32,
    pub bytes_sent: Option<i32>,
    pub bytes_received: Option<i32>,
    pub in_etl_2: bool,
}

impl FactKeysRow {
    pub fn key(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Date => self.date_id.as_deref(),
            Dimension::Time => self.time_id.as_deref(),
            Dimension::Location => self.location_id.as_deref(),
            Dimension::Request => self.request_id.as_deref(),
            Dimension::File => self.file_id.as_deref(),
            Dimension::Visit => self.visit_id.as_deref(),
        }
    }
}

/// Fetch every fact row ordered by time (for verification).
pub async fn query_fact_keys(client: &WarehouseClient) -> Result<Vec<FactKeysRow>> {
    client
        .timed(
            DbErrorCode::QueryFailed,
            "select etl_1",
            sqlx::query_as(
                "SELECT id, date_id, time_id, location_id, request_id, file_id, visit_id, \
                        time, uri_stem, client_ip, client_cookie, status, duration, \
                        bytes_sent, bytes_received, in_etl_2 \
                 FROM public.etl_1 ORDER BY time, id",
            )
            .fetch_all(client.pool()),
        )
        .await
}

/// File dimension row (for verification).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FileDimRow {
    pub id: String,
    pub uri_stem: String,
    pub bytes_sent: Option<i32>,
    pub file_type: Option<String>,
    pub is_crawler: bool,
}

/// Fetch every file dimension row (for verification).
pub async fn query_file_dims(client: &WarehouseClient) -> Result<Vec<FileDimRow>> {
    client
        .timed(
            DbErrorCode::QueryFailed,
            "select dim_file",
            sqlx::query_as(
                "SELECT id, uri_stem, bytes_sent, file_type, is_crawler \
                 FROM public.dim_file ORDER BY uri_stem",
            )
            .fetch_all(client.pool()),
        )
        .await
}

fn is_pipeline_table(table: &str) -> bool {
    crate::schema::all_tables()
        .iter()
        .any(|(name, _)| *name == table)
}
