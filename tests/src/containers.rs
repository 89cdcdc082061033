//! Testcontainer setup for the warehouse.
//!
//! Redshift speaks the Postgres wire protocol, so a stock Postgres image
//! serves as the warehouse in tests.

use std::time::Duration;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};
use warehouse::WarehouseConfig;

pub const TEST_DATABASE: &str = "weblogs";
pub const TEST_USER: &str = "etl";
pub const TEST_PASSWORD: &str = "etl-test";

/// Container handle for the warehouse.
pub struct TestContainers {
    #[allow(dead_code)]
    postgres: ContainerAsync<GenericImage>,
    pub host: String,
    pub port: u16,
}

impl TestContainers {
    /// Start the Postgres container and wait until it accepts connections.
    pub async fn start() -> Self {
        let image = GenericImage::new("postgres", "16-alpine")
            .with_wait_for(WaitFor::message_on_stderr(
                "database system is ready to accept connections",
            ))
            .with_exposed_port(5432.tcp())
            .with_env_var("POSTGRES_DB", TEST_DATABASE)
            .with_env_var("POSTGRES_USER", TEST_USER)
            .with_env_var("POSTGRES_PASSWORD", TEST_PASSWORD);

        let postgres = image.start().await.expect("Failed to start Postgres");
        let port = postgres.get_host_port_ipv4(5432).await.unwrap();

        let containers = Self {
            postgres,
            host: "127.0.0.1".to_string(),
            port,
        };
        wait_for_postgres(&containers.warehouse_config(), Duration::from_secs(30)).await;
        containers
    }

    /// Warehouse configuration pointing at the container.
    pub fn warehouse_config(&self) -> WarehouseConfig {
        WarehouseConfig {
            host: self.host.clone(),
            port: self.port,
            database: TEST_DATABASE.to_string(),
            username: TEST_USER.to_string(),
            password: TEST_PASSWORD.to_string(),
            ..WarehouseConfig::default()
        }
    }
}

/// Wait for the server to accept a query. The init scripts restart the
/// server once, so the first ready message can be premature.
async fn wait_for_postgres(config: &WarehouseConfig, timeout: Duration) {
    let start = std::time::Instant::now();

    while start.elapsed() < timeout {
        if let Ok(mut conn) = sqlx::ConnectOptions::connect(&config.connect_options()).await {
            if sqlx::query("SELECT 1").execute(&mut conn).await.is_ok() {
                tracing::debug!(port = config.port, "test warehouse ready");
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    panic!(
        "Postgres at {}:{} not ready after {:?}",
        config.host, config.port, timeout
    );
}
