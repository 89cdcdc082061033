//! End-to-end tests for the three stages.
//!
//! Log object (MockLogSource) → `s3_load` → `etl_1` → dimensions, with the
//! geolocation service mocked and a Postgres testcontainer as warehouse.
//!
//! Requires Docker to be running.

use etl_core::{BatchOutcome, Dimension};
use integration_tests::{fixtures, mocks::MockGeoLocator, setup::TestContext};
use warehouse::{
    count_rows, count_unprocessed_facts, count_unprocessed_staging, query_fact_keys,
    query_file_dims,
};

fn geo() -> MockGeoLocator {
    MockGeoLocator::new()
        .with_location("1.2.3.4", "GB", Some("London"))
        .with_location("66.249.1.1", "US", Some("Mountain View"))
}

#[tokio::test]
async fn test_sample_log_flows_into_star_schema() {
    let ctx = TestContext::with_geo(geo()).await;
    ctx.put_log(fixtures::sample_log());

    let ingest = ctx.ingest_worker().run().await.expect("ingest failed");
    assert_eq!(ingest.rows_staged, 4);
    assert_eq!(ingest.lines_rejected, 1);

    let normalize = ctx.normalize_worker().run().await.expect("normalize failed");
    assert_eq!(normalize.facts_inserted, 4);
    assert_eq!(count_unprocessed_staging(&ctx.warehouse).await.unwrap(), 0);

    let dims = ctx
        .dimension_worker()
        .run()
        .await
        .expect("dimensionalize failed");
    assert!(dims.schema.is_success());
    assert!(dims.backfill.is_success());
    assert_eq!(dims.facts_flagged, 4);

    assert_eq!(dims.inserted(Dimension::Date), 1);
    assert_eq!(dims.inserted(Dimension::Time), 4);
    assert_eq!(dims.inserted(Dimension::Location), 2);
    assert_eq!(dims.inserted(Dimension::File), 4);
    // ASPSESSIONID=abc plus the empty cookie of the reduced lines.
    assert_eq!(dims.inserted(Dimension::Visit), 2);

    let mut lookups = ctx.geo.lookups();
    lookups.sort();
    assert_eq!(lookups, vec!["1.2.3.4", "10.9.9.9", "66.249.1.1"]);

    let files = query_file_dims(&ctx.warehouse).await.unwrap();
    let file = |stem: &str| files.iter().find(|f| f.uri_stem == stem).unwrap();
    assert_eq!(file("/index.html").file_type.as_deref(), Some(".html"));
    assert!(!file("/index.html").is_crawler);
    assert_eq!(file("/img/logo.png").file_type.as_deref(), Some(".png"));
    assert!(file("/robots.txt").is_crawler);
    assert_eq!(file("/data").file_type, None);
    assert_eq!(file("/data").bytes_sent, None);

    let facts = query_fact_keys(&ctx.warehouse).await.unwrap();
    assert_eq!(facts.len(), 4);
    assert!(facts.iter().all(|f| f.in_etl_2));
    for fact in &facts {
        for dimension in [Dimension::Date, Dimension::Time, Dimension::Request, Dimension::File, Dimension::Visit] {
            assert!(fact.key(dimension).is_some(), "{} unset for {}", dimension, fact.uri_stem);
        }
        let located = fact.location_id.is_some();
        assert_eq!(located, fact.client_ip != "10.9.9.9", "{}", fact.client_ip);
    }
    assert_eq!(count_unprocessed_facts(&ctx.warehouse).await.unwrap(), 0);
}

#[tokio::test]
async fn test_second_object_only_adds_new_dimension_values() {
    let ctx = TestContext::with_geo(geo()).await;

    ctx.put_log(fixtures::FULL_INDEX);
    ctx.ingest_worker().run().await.unwrap();
    ctx.normalize_worker().run().await.unwrap();
    ctx.dimension_worker().run().await.unwrap();

    ctx.put_log([fixtures::FULL_INDEX, fixtures::REDUCED_ROBOTS].join("\n"));
    ctx.ingest_worker().run().await.unwrap();
    let normalize = ctx.normalize_worker().run().await.unwrap();
    assert_eq!(normalize.facts_inserted, 2);

    let dims = ctx.dimension_worker().run().await.unwrap();

    // Only the crawler line brings new values.
    assert_eq!(dims.inserted(Dimension::Date), 0);
    assert_eq!(dims.inserted(Dimension::Location), 1);
    assert_eq!(dims.inserted(Dimension::File), 1);
    assert_eq!(dims.inserted(Dimension::Time), 1);
    assert!(matches!(dims.backfill, BatchOutcome::Success { .. }));

    assert_eq!(count_rows(&ctx.warehouse, "etl_1").await.unwrap(), 3);
    assert_eq!(count_rows(&ctx.warehouse, "dim_file").await.unwrap(), 2);
    assert_eq!(count_rows(&ctx.warehouse, "dim_date").await.unwrap(), 1);

    let facts = query_fact_keys(&ctx.warehouse).await.unwrap();
    let index_files: Vec<_> = facts
        .iter()
        .filter(|f| f.uri_stem == "/index.html")
        .map(|f| f.file_id.clone())
        .collect();
    assert_eq!(index_files.len(), 2);
    assert_eq!(index_files[0], index_files[1]);
}
