//! Client address geolocation for the location dimension.
//!
//! One HTTP lookup per distinct address, no caching. `postal`, `city` and
//! `region` are optional in the response; `country` is required.

use async_trait::async_trait;
use etl_core::{Error, GeoLocation, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;
use validator::Validate;

/// Resolves a client address to a location.
#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn locate(&self, ip: &str) -> Result<GeoLocation>;
}

/// Geolocation service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GeoConfig {
    /// Base URL; the address is appended as the last path segment
    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://ipinfo.io/".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    postal: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
}

/// Parse an ipinfo-style JSON body.
pub fn parse_geo_response(ip: &str, body: &str) -> Result<GeoLocation> {
    let response: IpInfoResponse = serde_json::from_str(body)?;
    let country = response
        .country
        .ok_or_else(|| Error::geolocation(format!("{}: response has no country", ip)))?;

    Ok(GeoLocation {
        postcode: response.postal,
        city: response.city,
        region: response.region,
        country,
    })
}

/// ipinfo.io-compatible locator.
pub struct IpInfoLocator {
    http: reqwest::Client,
    base_url: Url,
}

impl IpInfoLocator {
    pub fn new(config: &GeoConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::config(format!("geolocation base url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "geolocation base url cannot take a path: {}",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("weblog-etl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::geolocation(format!("build http client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    /// `GET {base}/{ip}`, the address being one extra path segment.
    pub fn lookup_url(&self, ip: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::geolocation(format!("{}: base url cannot take a path", ip)))?
            .pop_if_empty()
            .push(ip);
        Ok(url)
    }
}

#[async_trait]
impl GeoLocator for IpInfoLocator {
    async fn locate(&self, ip: &str) -> Result<GeoLocation> {
        let url = self.lookup_url(ip)?;
        debug!(ip = ip, "Looking up client address");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::geolocation(format!("{}: {}", ip, e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::geolocation(format!("{}: {}", ip, e)))?;

        parse_geo_response(ip, &body).map_err(|e| match e {
            Error::Serialization(e) => Error::geolocation(format!("{}: {}", ip, e)),
            other => other,
        })
    }
}
