//! Warehouse configuration.

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use validator::Validate;

/// Warehouse connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WarehouseConfig {
    /// Endpoint host name
    #[validate(length(min = 1))]
    pub host: String,
    /// Endpoint port
    #[validate(range(min = 1))]
    pub port: u16,
    /// Database name
    #[validate(length(min = 1))]
    pub database: String,
    /// User name
    #[validate(length(min = 1))]
    pub username: String,
    /// Password
    #[serde(default, skip_serializing)]
    pub password: String,
    /// Connection pool size
    #[serde(default = "default_max_connections")]
    #[validate(range(min = 1))]
    pub max_connections: u32,
    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Require TLS instead of preferring it
    #[serde(default)]
    pub require_ssl: bool,
}

fn default_max_connections() -> u32 {
    1
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 5439,
            database: String::new(),
            username: String::new(),
            password: String::new(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
            require_ssl: false,
        }
    }
}

impl WarehouseConfig {
    /// Connection options for the Postgres wire protocol.
    pub fn connect_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(&self.password)
            .ssl_mode(ssl_mode)
    }
}
