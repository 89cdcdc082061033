//! Normalize stage tests: `s3_load` → `etl_1`.
//!
//! Requires Docker to be running for the Postgres testcontainer.

use etl_core::{Error, StagingRow};
use integration_tests::{fixtures, setup::TestContext};
use warehouse::{count_rows, count_unprocessed_facts, count_unprocessed_staging, query_fact_keys};

#[tokio::test]
async fn test_full_row_becomes_typed_fact() {
    let ctx = TestContext::new().await;
    ctx.create_tables().await;
    ctx.insert_staging_row(&fixtures::robots_staging_row())
        .await
        .unwrap();

    let report = ctx.normalize_worker().run().await.expect("normalize failed");

    assert_eq!(report.rows_fetched, 1);
    assert_eq!(report.facts_inserted, 1);
    assert_eq!(report.rows_skipped, 0);
    assert_eq!(report.rows_flagged, 1);

    let facts = query_fact_keys(&ctx.warehouse).await.unwrap();
    assert_eq!(facts.len(), 1);
    let fact = &facts[0];
    assert_eq!(fact.time.to_string(), "2024-01-01 00:00:01");
    assert_eq!(fact.status, 200);
    assert_eq!(fact.duration, 5);
    assert_eq!(fact.bytes_sent, Some(100));
    assert_eq!(fact.bytes_received, None);
    assert_eq!(fact.client_cookie.as_deref(), Some("-"));
    assert!(!fact.in_etl_2);
    assert!(fact.date_id.is_none() && fact.file_id.is_none());
}

#[tokio::test]
async fn test_reduced_row_gets_empty_cookie() {
    let ctx = TestContext::new().await;
    ctx.create_tables().await;
    ctx.insert_staging_row(&fixtures::reduced_staging_row())
        .await
        .unwrap();

    ctx.normalize_worker().run().await.unwrap();

    let facts = query_fact_keys(&ctx.warehouse).await.unwrap();
    assert_eq!(facts[0].client_cookie.as_deref(), Some(""));
    assert_eq!(facts[0].bytes_sent, None);
}

#[tokio::test]
async fn test_unrecognized_rows_are_skipped_but_flagged() {
    let ctx = TestContext::new().await;
    ctx.create_tables().await;
    ctx.insert_staging_row(&fixtures::robots_staging_row())
        .await
        .unwrap();
    ctx.insert_staging_row(&fixtures::mixed_staging_row())
        .await
        .unwrap();

    let report = ctx.normalize_worker().run().await.unwrap();

    assert_eq!(report.rows_fetched, 2);
    assert_eq!(report.facts_inserted, 1);
    assert_eq!(report.rows_skipped, 1);
    assert_eq!(report.rows_flagged, 2);
    assert_eq!(count_unprocessed_staging(&ctx.warehouse).await.unwrap(), 0);
}

#[tokio::test]
async fn test_processed_rows_are_not_normalized_twice() {
    let ctx = TestContext::new().await;
    ctx.create_tables().await;
    ctx.insert_staging_row(&fixtures::robots_staging_row())
        .await
        .unwrap();

    ctx.normalize_worker().run().await.unwrap();
    let second = ctx.normalize_worker().run().await.unwrap();

    assert_eq!(second.rows_fetched, 0);
    assert_eq!(second.rows_flagged, 0);
    assert_eq!(count_rows(&ctx.warehouse, "etl_1").await.unwrap(), 1);
    assert_eq!(count_unprocessed_facts(&ctx.warehouse).await.unwrap(), 1);
}

#[tokio::test]
async fn test_null_marker_in_required_number_aborts() {
    let ctx = TestContext::new().await;
    ctx.create_tables().await;
    let row = StagingRow {
        duration: Some("-".into()),
        ..fixtures::robots_staging_row()
    };
    ctx.insert_staging_row(&row).await.unwrap();

    let err = ctx.normalize_worker().run().await.unwrap_err();

    assert!(matches!(err, Error::InvalidField { ref field, .. } if field == "duration"));
    // Aborted before the flags were flipped.
    assert_eq!(count_unprocessed_staging(&ctx.warehouse).await.unwrap(), 1);
}

#[tokio::test]
async fn test_ingested_lines_normalize() {
    let ctx = TestContext::new().await;
    ctx.put_log(fixtures::sample_log());
    ctx.ingest_worker().run().await.unwrap();

    let report = ctx.normalize_worker().run().await.unwrap();

    assert_eq!(report.facts_inserted, 4);
    assert_eq!(report.rows_skipped, 0);
    assert_eq!(count_unprocessed_staging(&ctx.warehouse).await.unwrap(), 0);
}
