//! Warehouse connection checks run before every stage.
//!
//! Requires Docker to be running for the Postgres testcontainer.

use integration_tests::setup::TestContext;
use warehouse::check_connection;

#[tokio::test]
async fn test_live_warehouse_answers_health_check() {
    let ctx = TestContext::new().await;

    assert!(check_connection(&ctx.warehouse).await);
}

#[tokio::test]
async fn test_closed_pool_fails_health_check() {
    let ctx = TestContext::new().await;
    ctx.warehouse.close().await;

    assert!(!check_connection(&ctx.warehouse).await);
}
