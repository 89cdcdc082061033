//! W3C extended access-log parsing.
//!
//! Two line layouts are accepted. Each one is described by an explicit
//! position-to-field table so that parsing never relies on bare indices.

use serde::{Deserialize, Serialize};

/// Supported log line layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 18 fields, including cookie, referrer and byte counts.
    #[default]
    Full,
    /// 14 fields, without cookie, referrer or byte counts.
    Reduced,
}

/// A named field of a log line, mapped one-to-one onto a staging column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogField {
    Date,
    Time,
    ServerIp,
    Method,
    UriStem,
    UriQuery,
    ServerPort,
    Username,
    ClientIp,
    ClientBrowser,
    ClientCookie,
    ClientReferrer,
    Status,
    Substatus,
    Win32Status,
    BytesSent,
    BytesReceived,
    Duration,
}

const FULL_FIELDS: [LogField; 18] = [
    LogField::Date,
    LogField::Time,
    LogField::ServerIp,
    LogField::Method,
    LogField::UriStem,
    LogField::UriQuery,
    LogField::ServerPort,
    LogField::Username,
    LogField::ClientIp,
    LogField::ClientBrowser,
    LogField::ClientCookie,
    LogField::ClientReferrer,
    LogField::Status,
    LogField::Substatus,
    LogField::Win32Status,
    LogField::BytesSent,
    LogField::BytesReceived,
    LogField::Duration,
];

const REDUCED_FIELDS: [LogField; 14] = [
    LogField::Date,
    LogField::Time,
    LogField::ServerIp,
    LogField::Method,
    LogField::UriStem,
    LogField::UriQuery,
    LogField::ServerPort,
    LogField::Username,
    LogField::ClientIp,
    LogField::ClientBrowser,
    LogField::Status,
    LogField::Substatus,
    LogField::Win32Status,
    LogField::Duration,
];

impl LogFormat {
    /// Pick the layout for a tokenized line.
    pub fn from_token_count(count: usize) -> Option<Self> {
        match count {
            18 => Some(Self::Full),
            14 => Some(Self::Reduced),
            _ => None,
        }
    }

    /// Fields in line order.
    pub fn fields(&self) -> &'static [LogField] {
        match self {
            Self::Full => &FULL_FIELDS,
            Self::Reduced => &REDUCED_FIELDS,
        }
    }

    pub fn token_count(&self) -> usize {
        self.fields().len()
    }
}

impl LogField {
    /// Staging column name.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
            Self::ServerIp => "server_ip",
            Self::Method => "method",
            Self::UriStem => "uri_stem",
            Self::UriQuery => "uri_query",
            Self::ServerPort => "server_port",
            Self::Username => "username",
            Self::ClientIp => "client_ip",
            Self::ClientBrowser => "client_browser",
            Self::ClientCookie => "client_cookie",
            Self::ClientReferrer => "client_referrer",
            Self::Status => "status",
            Self::Substatus => "substatus",
            Self::Win32Status => "win32_status",
            Self::BytesSent => "bytes_sent",
            Self::BytesReceived => "bytes_received",
            Self::Duration => "duration",
        }
    }
}

/// One parsed log line, every field named.
///
/// Fields the line's format does not carry are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub format: LogFormat,
    pub date: String,
    pub time: String,
    pub server_ip: String,
    pub method: String,
    pub uri_stem: String,
    pub uri_query: String,
    pub server_port: String,
    pub username: String,
    pub client_ip: String,
    pub client_browser: String,
    pub client_cookie: Option<String>,
    pub client_referrer: Option<String>,
    pub status: String,
    pub substatus: String,
    pub win32_status: String,
    pub bytes_sent: Option<String>,
    pub bytes_received: Option<String>,
    pub duration: String,
}

impl LogRecord {
    /// Build a record from tokens laid out as `format` describes.
    ///
    /// Returns `None` when the token count does not match the format.
    pub fn from_tokens(format: LogFormat, tokens: &[&str]) -> Option<Self> {
        if tokens.len() != format.token_count() {
            return None;
        }

        let mut record = Self {
            format,
            ..Self::default()
        };
        for (field, token) in format.fields().iter().zip(tokens) {
            record.set(*field, token);
        }
        Some(record)
    }

    fn set(&mut self, field: LogField, value: &str) {
        let value = value.to_string();
        match field {
            LogField::Date => self.date = value,
            LogField::Time => self.time = value,
            LogField::ServerIp => self.server_ip = value,
            LogField::Method => self.method = value,
            LogField::UriStem => self.uri_stem = value,
            LogField::UriQuery => self.uri_query = value,
            LogField::ServerPort => self.server_port = value,
            LogField::Username => self.username = value,
            LogField::ClientIp => self.client_ip = value,
            LogField::ClientBrowser => self.client_browser = value,
            LogField::ClientCookie => self.client_cookie = Some(value),
            LogField::ClientReferrer => self.client_referrer = Some(value),
            LogField::Status => self.status = value,
            LogField::Substatus => self.substatus = value,
            LogField::Win32Status => self.win32_status = value,
            LogField::BytesSent => self.bytes_sent = Some(value),
            LogField::BytesReceived => self.bytes_received = Some(value),
            LogField::Duration => self.duration = value,
        }
    }

    /// Value of a single field, if the record carries it.
    pub fn get(&self, field: LogField) -> Option<&str> {
        match field {
            LogField::Date => Some(&self.date),
            LogField::Time => Some(&self.time),
            LogField::ServerIp => Some(&self.server_ip),
            LogField::Method => Some(&self.method),
            LogField::UriStem => Some(&self.uri_stem),
            LogField::UriQuery => Some(&self.uri_query),
            LogField::ServerPort => Some(&self.server_port),
            LogField::Username => Some(&self.username),
            LogField::ClientIp => Some(&self.client_ip),
            LogField::ClientBrowser => Some(&self.client_browser),
            LogField::ClientCookie => self.client_cookie.as_deref(),
            LogField::ClientReferrer => self.client_referrer.as_deref(),
            LogField::Status => Some(&self.status),
            LogField::Substatus => Some(&self.substatus),
            LogField::Win32Status => Some(&self.win32_status),
            LogField::BytesSent => self.bytes_sent.as_deref(),
            LogField::BytesReceived => self.bytes_received.as_deref(),
            LogField::Duration => Some(&self.duration),
        }
    }

    /// Column/value pairs for the staging insert, in line order.
    pub fn staging_values(&self) -> Vec<(&'static str, &str)> {
        self.format
            .fields()
            .iter()
            .filter_map(|field| self.get(*field).map(|value| (field.column(), value)))
            .collect()
    }
}

/// Outcome of parsing a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// `#`-prefixed directive such as `#Fields:` or `#Software:`.
    Directive,
    Record(LogRecord),
    /// Token count matched no supported format.
    Rejected { token_count: usize },
}

/// Parse one line. A trailing carriage return is ignored.
pub fn parse_line(line: &str) -> ParsedLine {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.starts_with('#') {
        return ParsedLine::Directive;
    }

    let tokens: Vec<&str> = line.split(' ').collect();
    match LogFormat::from_token_count(tokens.len())
        .and_then(|format| LogRecord::from_tokens(format, &tokens))
    {
        Some(record) => ParsedLine::Record(record),
        None => ParsedLine::Rejected {
            token_count: tokens.len(),
        },
    }
}

/// Parse a whole log object.
pub fn parse_log(contents: &str) -> impl Iterator<Item = ParsedLine> + '_ {
    contents.lines().map(parse_line)
}
