//! Test fixtures: log lines, log objects and raw staging rows.

use etl_core::StagingRow;
use log_source::ObjectLocation;

pub const HEADER: &str = "#Software: Microsoft Internet Information Services 7.5\r\n\
#Version: 1.0\r\n\
#Date: 2011-04-07 00:00:01\r\n\
#Fields: date time s-ip cs-method cs-uri-stem cs-uri-query s-port cs-username c-ip cs(User-Agent) cs(Cookie) cs(Referer) sc-status sc-substatus sc-win32-status sc-bytes sc-bytes-received time-taken";

/// 18-token line: index page from a browser with a cookie.
pub const FULL_INDEX: &str = "2011-04-07 00:00:01 10.0.0.1 GET /index.html - 80 - 1.2.3.4 Mozilla/5.0 ASPSESSIONID=abc http://example.com/ 200 0 0 5120 310 15";

/// 18-token line: same visitor fetching an image, bytes received unknown.
pub const FULL_IMAGE: &str = "2011-04-07 00:00:02 10.0.0.1 GET /img/logo.png - 80 - 1.2.3.4 Mozilla/5.0 ASPSESSIONID=abc http://example.com/index.html 200 0 0 2048 - 4";

/// 14-token line: crawler request without cookie, referrer or byte counts.
pub const REDUCED_ROBOTS: &str =
    "2011-04-07 00:00:03 10.0.0.1 GET /robots.txt - 80 - 66.249.1.1 Googlebot/2.1 404 0 2 31";

/// 14-token line from an address the geolocator cannot resolve.
pub const REDUCED_UNKNOWN: &str =
    "2011-04-07 00:00:04 10.0.0.1 GET /data - 80 - 10.9.9.9 curl/7.1 200 0 0 3";

/// Neither 18 nor 14 tokens.
pub const MALFORMED: &str = "2011-04-07 00:00:05 10.0.0.1 GET /truncated";

/// A log object with a header, four good lines and one malformed line.
pub fn sample_log() -> String {
    [
        HEADER,
        FULL_INDEX,
        FULL_IMAGE,
        REDUCED_ROBOTS,
        MALFORMED,
        REDUCED_UNKNOWN,
    ]
    .join("\r\n")
        + "\r\n"
}

pub fn sample_location() -> ObjectLocation {
    ObjectLocation {
        bucket: "la-ticket-bucket-eu".into(),
        key: "BI_logs/u_ex110407.log".into(),
    }
}

fn s(v: &str) -> Option<String> {
    Some(v.to_string())
}

/// The crawler row used throughout the end-to-end examples.
pub fn robots_staging_row() -> StagingRow {
    StagingRow {
        date: s("2024-01-01"),
        time: s("00:00:01"),
        server_ip: s("10.0.0.1"),
        method: s("GET"),
        uri_stem: s("/robots.txt"),
        uri_query: s("-"),
        server_port: s("80"),
        username: s("-"),
        client_ip: s("1.2.3.4"),
        client_browser: s("bot"),
        client_cookie: s("-"),
        client_referrer: s("-"),
        status: s("200"),
        substatus: s("0"),
        win32_status: s("0"),
        bytes_sent: s("100"),
        bytes_received: s("-"),
        duration: s("5"),
    }
}

/// A reduced-shape row: cookie, referrer and byte counts all null.
pub fn reduced_staging_row() -> StagingRow {
    StagingRow {
        time: s("00:00:02"),
        uri_stem: s("/index.html"),
        client_cookie: None,
        client_referrer: None,
        bytes_sent: None,
        bytes_received: None,
        ..robots_staging_row()
    }
}

/// A row whose nulls match neither shape.
pub fn mixed_staging_row() -> StagingRow {
    StagingRow {
        time: s("00:00:03"),
        bytes_received: None,
        ..robots_staging_row()
    }
}
