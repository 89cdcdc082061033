//! Staging-to-fact normalization.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::log_format::LogFormat;

/// Textual null marker written by the web server for absent values.
pub const NULL_MARKER: &str = "-";

/// A staging row as read back from the warehouse, by column name.
///
/// Every staging column is nullable text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingRow {
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

impl StagingRow {
    /// Recognize which log layout produced this row.
    ///
    /// Reduced rows never carry cookie, referrer or byte counts; full rows
    /// always carry referrer and byte counts. Rows missing a required text
    /// column, or mixing the two patterns, are unrecognized.
    pub fn format(&self) -> Option<LogFormat> {
        let required_text = [
            &self.date,
            &self.time,
            &self.server_ip,
            &self.method,
            &self.uri_stem,
            &self.uri_query,
            &self.username,
            &self.client_ip,
            &self.client_browser,
        ];
        if required_text.iter().any(|v| v.is_none()) {
            return None;
        }

        let optional = [
            &self.client_referrer,
            &self.bytes_sent,
            &self.bytes_received,
        ];
        if optional.iter().all(|v| v.is_none()) && self.client_cookie.is_none() {
            Some(LogFormat::Reduced)
        } else if optional.iter().all(|v| v.is_some()) {
            Some(LogFormat::Full)
        } else {
            None
        }
    }
}

/// A normalized fact row bound for `etl_1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRow {
    pub id: String,
    pub date: NaiveDate,
    pub time: NaiveDateTime,
    pub server_ip: String,
    pub method: String,
    pub uri_stem: String,
    pub uri_query: String,
    pub server_port: i32,
    pub username: String,
    pub client_ip: String,
    pub client_browser: String,
    pub client_cookie: String,
    pub client_referrer: Option<String>,
    pub status: i32,
    pub substatus: i32,
    pub win32_status: i32,
    pub bytes_sent: Option<i32>,
    pub bytes_received: Option<i32>,
    pub duration: i32,
}

impl FactRow {
    /// Normalize a staging row, assigning a fresh id.
    ///
    /// `Ok(None)` means the row shape is unrecognized and should be skipped.
    /// An error means a required value could not be cast; the caller is
    /// expected to abort the run.
    pub fn from_staging(row: &StagingRow) -> Result<Option<Self>> {
        Self::with_id(Uuid::new_v4().to_string(), row)
    }

    /// Same as [`FactRow::from_staging`] with a caller-supplied id.
    pub fn with_id(id: String, row: &StagingRow) -> Result<Option<Self>> {
        let Some(format) = row.format() else {
            return Ok(None);
        };

        let date_str = required_text("date", &row.date)?;
        let time_str = required_text("time", &row.time)?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|_| Error::invalid_field("date", date_str))?;
        let timestamp = format!("{} {}", date_str, time_str);
        let time = NaiveDateTime::parse_from_str(&timestamp, "%Y-%m-%d %H:%M:%S%.f")
            .map_err(|_| Error::invalid_field("time", timestamp.as_str()))?;

        let (bytes_sent, bytes_received) = match format {
            LogFormat::Full => (
                optional_int("bytes_sent", &row.bytes_sent)?,
                optional_int("bytes_received", &row.bytes_received)?,
            ),
            LogFormat::Reduced => (None, None),
        };

        Ok(Some(Self {
            id,
            date,
            time,
            server_ip: required_text("server_ip", &row.server_ip)?.to_string(),
            method: required_text("method", &row.method)?.to_string(),
            uri_stem: required_text("uri_stem", &row.uri_stem)?.to_string(),
            uri_query: required_text("uri_query", &row.uri_query)?.to_string(),
            server_port: required_int("server_port", &row.server_port)?,
            username: required_text("username", &row.username)?.to_string(),
            client_ip: required_text("client_ip", &row.client_ip)?.to_string(),
            client_browser: required_text("client_browser", &row.client_browser)?.to_string(),
            client_cookie: row.client_cookie.clone().unwrap_or_default(),
            client_referrer: row.client_referrer.clone(),
            status: required_int("status", &row.status)?,
            substatus: required_int("substatus", &row.substatus)?,
            win32_status: required_int("win32_status", &row.win32_status)?,
            bytes_sent,
            bytes_received,
            duration: required_int("duration", &row.duration)?,
        }))
    }
}

fn required_text<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str> {
    value.as_deref().ok_or_else(|| Error::missing_field(field))
}

fn required_int(field: &str, value: &Option<String>) -> Result<i32> {
    let raw = required_text(field, value)?;
    raw.trim()
        .parse::<i32>()
        .map_err(|_| Error::invalid_field(field, raw))
}

fn optional_int(field: &str, value: &Option<String>) -> Result<Option<i32>> {
    match value.as_deref() {
        None | Some(NULL_MARKER) => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| Error::invalid_field(field, raw)),
    }
}
