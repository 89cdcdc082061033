//! Fetching raw log objects.

use crate::config::{ObjectLocation, ObjectStoreConfig};
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Region, SharedCredentialsProvider};
use aws_sdk_s3::Client;
use bytes::Bytes;
use etl_core::{Error, Result};
use tracing::{debug, error, info};
use validator::Validate;

/// Source of raw log objects.
///
/// The ingest stage depends on this rather than on S3 directly, so tests can
/// substitute an in-memory source.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Fetch the whole object.
    async fn fetch(&self, location: &ObjectLocation) -> Result<Bytes>;
}

/// S3 log source using static credentials.
#[derive(Clone)]
pub struct S3LogSource {
    client: Client,
    region: String,
}

impl S3LogSource {
    /// Build a client for the configured region and optional endpoint.
    ///
    /// Fails on empty credentials or an invalid region, bucket, key or endpoint.
    pub async fn new(config: &ObjectStoreConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::config(format!("object store: {}", e)))?;
        if config.access_key.is_empty() || config.secret_key.is_empty() {
            return Err(Error::config("object store credentials are empty"));
        }

        debug!("Creating S3 log source for region: {}", config.region);

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "weblog-etl",
        );
        let creds_provider = SharedCredentialsProvider::new(credentials);
        let region_provider = RegionProviderChain::first_try(Region::new(config.region.clone()));

        let mut config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(region_provider)
            .credentials_provider(creds_provider);

        if let Some(endpoint) = &config.endpoint {
            config_builder = config_builder.endpoint_url(endpoint);
        }

        let sdk_config = config_builder.load().await;
        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        // S3-compatible stores expect path-style addressing
        if config.endpoint.is_some() {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(s3_config_builder.build()),
            region: config.region.clone(),
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl LogSource for S3LogSource {
    async fn fetch(&self, location: &ObjectLocation) -> Result<Bytes> {
        debug!("Downloading object {}", location);

        let response = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to download object {}: {}", location, e);
                Error::object_store(format!("get {}: {}", location, e))
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| Error::object_store(format!("read {}: {}", location, e)))?
            .into_bytes();

        info!(object = %location, bytes = body.len(), "Log object downloaded");
        Ok(body)
    }
}
