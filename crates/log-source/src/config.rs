//! Object-store configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Bucket and key of the log object read by each ingest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ObjectLocation {
    #[validate(length(min = 1))]
    pub bucket: String,
    #[validate(length(min = 1))]
    pub key: String,
}

impl std::fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Object-store connection and location.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObjectStoreConfig {
    /// Static access key id
    #[serde(default, skip_serializing)]
    pub access_key: String,
    /// Static secret key
    #[serde(default, skip_serializing)]
    pub secret_key: String,
    /// Region of the bucket
    #[serde(default = "default_region")]
    #[validate(length(min = 1))]
    pub region: String,
    /// Custom endpoint for S3-compatible stores (path-style addressing)
    #[serde(default)]
    #[validate(url)]
    pub endpoint: Option<String>,
    #[serde(default = "default_bucket")]
    #[validate(length(min = 1))]
    pub bucket: String,
    #[serde(default = "default_key")]
    #[validate(length(min = 1))]
    pub key: String,
}

fn default_region() -> String {
    "eu-west-1".to_string()
}

fn default_bucket() -> String {
    "la-ticket-bucket-eu".to_string()
}

fn default_key() -> String {
    "BI_logs/u_ex110407.log".to_string()
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            secret_key: String::new(),
            region: default_region(),
            endpoint: None,
            bucket: default_bucket(),
            key: default_key(),
        }
    }
}

impl ObjectStoreConfig {
    /// The configured object.
    pub fn location(&self) -> ObjectLocation {
        ObjectLocation {
            bucket: self.bucket.clone(),
            key: self.key.clone(),
        }
    }
}
