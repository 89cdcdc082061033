//! Dimension rows and their derived attributes.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stem requested by well-behaved crawlers.
pub const CRAWLER_STEM: &str = "/robots.txt";

static FILE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[A-Za-z0-9]+$").expect("static regex"));

/// The six dimensions of the star schema, in population order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Date,
    Time,
    Location,
    Request,
    File,
    Visit,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Self::Date,
        Self::Time,
        Self::Location,
        Self::Request,
        Self::File,
        Self::Visit,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            Self::Date => "dim_date",
            Self::Time => "dim_time",
            Self::Location => "dim_location",
            Self::Request => "dim_request",
            Self::File => "dim_file",
            Self::Visit => "dim_visit",
        }
    }

    /// Foreign-key column on the fact table.
    pub fn fact_key(&self) -> &'static str {
        match self {
            Self::Date => "date_id",
            Self::Time => "time_id",
            Self::Location => "location_id",
            Self::Request => "request_id",
            Self::File => "file_id",
            Self::Visit => "visit_id",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Calendar quarter of a month number (1-based).
pub fn quarter_for_month(month: u32) -> i32 {
    match month {
        1..=3 => 1,
        4..=6 => 2,
        7..=9 => 3,
        _ => 4,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateDim {
    pub id: String,
    pub date: NaiveDate,
    pub day: i32,
    pub week: i32,
    pub month: i32,
    pub quarter: i32,
    pub year: i32,
}

impl DateDim {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: new_id(),
            date,
            day: date.day() as i32,
            week: date.iso_week().week() as i32,
            month: date.month() as i32,
            quarter: quarter_for_month(date.month()),
            year: date.year(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeDim {
    pub id: String,
    pub time: NaiveDateTime,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

impl TimeDim {
    pub fn new(time: NaiveDateTime) -> Self {
        Self {
            id: new_id(),
            time,
            hour: time.hour() as i32,
            minute: time.minute() as i32,
            second: time.second() as i32,
        }
    }
}

/// Result of an IP geolocation lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDim {
    pub id: String,
    pub client_ip: String,
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: String,
}

impl LocationDim {
    pub fn new(client_ip: impl Into<String>, location: GeoLocation) -> Self {
        Self {
            id: new_id(),
            client_ip: client_ip.into(),
            postcode: location.postcode,
            city: location.city,
            region: location.region,
            country: location.country,
        }
    }
}

/// Defining attributes of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: String,
    pub client_browser: String,
    pub client_referrer: Option<String>,
    pub status: i32,
    pub duration: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDim {
    pub id: String,
    pub key: RequestKey,
}

impl RequestDim {
    pub fn new(key: RequestKey) -> Self {
        Self { id: new_id(), key }
    }
}

/// Trailing file extension of a URI stem, dot included.
pub fn file_type(uri_stem: &str) -> Option<String> {
    FILE_EXTENSION
        .find(uri_stem)
        .map(|m| m.as_str().to_string())
}

pub fn is_crawler(uri_stem: &str) -> bool {
    uri_stem == CRAWLER_STEM
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDim {
    pub id: String,
    pub uri_stem: String,
    pub bytes_sent: Option<i32>,
    pub file_type: Option<String>,
    pub is_crawler: bool,
}

impl FileDim {
    pub fn new(uri_stem: impl Into<String>, bytes_sent: Option<i32>) -> Self {
        let uri_stem = uri_stem.into();
        Self {
            id: new_id(),
            file_type: file_type(&uri_stem),
            is_crawler: is_crawler(&uri_stem),
            uri_stem,
            bytes_sent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitDim {
    pub id: String,
    pub client_cookie: String,
}

impl VisitDim {
    /// A null cookie is stored as the empty string.
    pub fn new(client_cookie: Option<String>) -> Self {
        Self {
            id: new_id(),
            client_cookie: client_cookie.unwrap_or_default(),
        }
    }
}
