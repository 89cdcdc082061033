//! Warehouse table schemas.
//!
//! Column widths follow the access-log layout; every table lives in
//! `public` and is created idempotently.

/// Staging table: one raw log line per row, all text.
pub const CREATE_STAGING_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS public.s3_load (
    date VARCHAR(20),
    time VARCHAR(20),
    server_ip VARCHAR(20),
    method VARCHAR(10),
    uri_stem VARCHAR(80),
    uri_query VARCHAR(1000),
    server_port VARCHAR(10),
    username VARCHAR(60),
    client_ip VARCHAR(20),
    client_browser VARCHAR(1000),
    client_cookie VARCHAR(1000),
    client_referrer VARCHAR(1000),
    status VARCHAR(10),
    substatus VARCHAR(10),
    win32_status VARCHAR(100),
    bytes_sent VARCHAR(100),
    bytes_received VARCHAR(100),
    duration VARCHAR(100),
    in_etl_1 BOOLEAN
)
"#;

/// Fact table: typed events with nullable dimension keys.
pub const CREATE_FACT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS public.etl_1 (
    id VARCHAR(50),
    date_id VARCHAR(50),
    time_id VARCHAR(50),
    location_id VARCHAR(50),
    request_id VARCHAR(50),
    file_id VARCHAR(50),
    visit_id VARCHAR(50),
    date DATE,
    time TIMESTAMP,
    server_ip VARCHAR(20),
    method VARCHAR(10),
    uri_stem VARCHAR(80),
    uri_query VARCHAR(1000),
    server_port INT,
    username VARCHAR(60),
    client_ip VARCHAR(20),
    client_browser VARCHAR(1000),
    client_cookie VARCHAR(1000),
    client_referrer VARCHAR(1000),
    status INT,
    substatus INT,
    win32_status INT,
    bytes_sent INT,
    bytes_received INT,
    duration INT,
    in_etl_2 BOOLEAN
)
"#;

pub const CREATE_DIM_DATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS public.dim_date (
    id VARCHAR(50),
    date DATE,
    day INTEGER,
    week INTEGER,
    month INTEGER,
    quarter INTEGER,
    year INTEGER
)
"#;

pub const CREATE_DIM_TIME_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS public.dim_time (
    id VARCHAR(50),
    time TIMESTAMP,
    hour INTEGER,
    minute INTEGER,
    second INTEGER
)
"#;

pub const CREATE_DIM_LOCATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS public.dim_location (
    id VARCHAR(50),
    client_ip VARCHAR(200),
    postcode VARCHAR(10),
    city VARCHAR(300),
    region VARCHAR(200),
    country VARCHAR(200)
)
"#;

pub const CREATE_DIM_REQUEST_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS public.dim_request (
    id VARCHAR(50),
    method VARCHAR(10),
    client_browser VARCHAR(1000),
    client_referrer VARCHAR(1000),
    status INTEGER,
    duration INTEGER
)
"#;

pub const CREATE_DIM_FILE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS public.dim_file (
    id VARCHAR(50),
    uri_stem VARCHAR(80),
    bytes_sent INTEGER,
    file_type VARCHAR(10),
    is_crawler BOOLEAN
)
"#;

pub const CREATE_DIM_VISIT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS public.dim_visit (
    id VARCHAR(50),
    client_cookie VARCHAR(1000)
)
"#;

/// Tables owned by the ingest stage.
pub fn staging_tables() -> Vec<(&'static str, &'static str)> {
    vec![("s3_load", CREATE_STAGING_TABLE)]
}

/// Tables owned by the normalize stage.
pub fn fact_tables() -> Vec<(&'static str, &'static str)> {
    vec![("etl_1", CREATE_FACT_TABLE)]
}

/// Tables owned by the dimensionalize stage.
pub fn dimension_tables() -> Vec<(&'static str, &'static str)> {
    vec![
        ("dim_date", CREATE_DIM_DATE_TABLE),
        ("dim_time", CREATE_DIM_TIME_TABLE),
        ("dim_location", CREATE_DIM_LOCATION_TABLE),
        ("dim_request", CREATE_DIM_REQUEST_TABLE),
        ("dim_file", CREATE_DIM_FILE_TABLE),
        ("dim_visit", CREATE_DIM_VISIT_TABLE),
    ]
}

/// Every table, in pipeline order.
pub fn all_tables() -> Vec<(&'static str, &'static str)> {
    let mut tables = staging_tables();
    tables.extend(fact_tables());
    tables.extend(dimension_tables());
    tables
}
