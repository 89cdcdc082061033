//! Pipeline configuration.
//!
//! Layered as defaults → optional `config/etl.toml` → `ETL__`-style
//! environment, then the required credentials and endpoint are read from
//! their well-known variable names.

use etl_core::{Error, Result};
use log_source::ObjectStoreConfig;
use pipeline::GeoConfig;
use serde::{Deserialize, Serialize};
use validator::Validate;
use warehouse::WarehouseConfig;

/// Variables every stage needs, in the order they are reported.
pub const REQUIRED_VARS: [&str; 7] = [
    "AWS_ACCESS_KEY",
    "AWS_SECRET_KEY",
    "DB_NAME",
    "REDSHIFT_USER",
    "REDSHIFT_PW",
    "REDSHIFT_ENDPT",
    "REDSHIFT_PORT",
];

/// Printed to stderr when required variables are missing.
pub const USAGE: &str = "\
Required environment variables:
  AWS_ACCESS_KEY   access key id for the log bucket
  AWS_SECRET_KEY   secret key for the log bucket
  DB_NAME          warehouse database name
  REDSHIFT_USER    warehouse user
  REDSHIFT_PW      warehouse password
  REDSHIFT_ENDPT   warehouse endpoint host
  REDSHIFT_PORT    warehouse endpoint port

Optional overrides use the ETL_ prefix with `__` between sections,
e.g. ETL_OBJECT_STORE__BUCKET, ETL_OBJECT_STORE__KEY, ETL_GEO__BASE_URL.
A .env file in the working directory is read first.";

/// Everything a stage needs, built once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    #[serde(default)]
    #[validate(nested)]
    pub object_store: ObjectStoreConfig,

    #[serde(default)]
    #[validate(nested)]
    pub warehouse: WarehouseConfig,

    #[serde(default)]
    #[validate(nested)]
    pub geo: GeoConfig,
}

impl PipelineConfig {
    /// Fill the required fields from `lookup`, reporting every missing name
    /// at once. Empty values count as missing.
    pub fn apply_required<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let values: Vec<Option<String>> = REQUIRED_VARS
            .iter()
            .map(|name| lookup(name).filter(|v| !v.trim().is_empty()))
            .collect();

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .zip(&values)
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingConfig(missing));
        }

        let mut values = values.into_iter().flatten();
        let mut next = || values.next().unwrap_or_default();

        self.object_store.access_key = next();
        self.object_store.secret_key = next();
        self.warehouse.database = next();
        self.warehouse.username = next();
        self.warehouse.password = next();
        self.warehouse.host = next();

        let port = next();
        self.warehouse.port = port
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("REDSHIFT_PORT is not a port number: {}", port)))?;

        Ok(())
    }

    /// Validate field values after loading.
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| Error::config(format!("invalid configuration: {}", e)))
    }
}

/// Load configuration from files and environment.
pub fn load_config() -> Result<PipelineConfig> {
    let defaults = config::Config::try_from(&PipelineConfig::default())
        .map_err(|e| Error::config(e.to_string()))?;

    let layered = config::Config::builder()
        .add_source(defaults)
        .add_source(
            config::File::with_name("config/etl")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::default()
                .prefix("ETL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| Error::config(format!("build configuration: {}", e)))?;

    let mut config: PipelineConfig = layered
        .try_deserialize()
        .map_err(|e| Error::config(format!("deserialize configuration: {}", e)))?;

    config.apply_required(|name| std::env::var(name).ok())?;
    config.check()?;

    Ok(config)
}
