//! Ingest stage tests: log object → `s3_load`.
//!
//! Requires Docker to be running for the Postgres testcontainer.

use etl_core::{BatchOutcome, Error};
use integration_tests::{fixtures, setup::TestContext};
use warehouse::{count_rows, count_unprocessed_staging};

#[tokio::test]
async fn test_ingest_stages_every_well_formed_line() {
    let ctx = TestContext::new().await;
    ctx.put_log(fixtures::sample_log());

    let report = ctx.ingest_worker().run().await.expect("ingest failed");

    assert_eq!(report.schema, BatchOutcome::Success { rows_affected: 0 });
    assert_eq!(report.lines_read, 9);
    assert_eq!(report.directives_skipped, 4);
    assert_eq!(report.lines_rejected, 1);
    assert_eq!(report.rows_staged, 4);

    assert_eq!(count_rows(&ctx.warehouse, "s3_load").await.unwrap(), 4);
    assert_eq!(count_unprocessed_staging(&ctx.warehouse).await.unwrap(), 4);
    assert_eq!(ctx.source.requested(), vec![fixtures::sample_location()]);
}

#[tokio::test]
async fn test_reduced_lines_leave_optional_columns_null() {
    let ctx = TestContext::new().await;
    ctx.put_log(fixtures::REDUCED_ROBOTS);

    let report = ctx.ingest_worker().run().await.unwrap();
    assert_eq!(report.rows_staged, 1);

    let nulls = ctx
        .scalar_i64(
            "SELECT COUNT(*) FROM public.s3_load WHERE client_cookie IS NULL \
             AND client_referrer IS NULL AND bytes_sent IS NULL AND bytes_received IS NULL \
             AND duration = '31' AND in_etl_1 = FALSE",
        )
        .await;
    assert_eq!(nulls, 1);
}

#[tokio::test]
async fn test_full_lines_keep_null_marker_as_text() {
    let ctx = TestContext::new().await;
    ctx.put_log(fixtures::FULL_IMAGE);

    ctx.ingest_worker().run().await.unwrap();

    let rows = ctx
        .scalar_i64(
            "SELECT COUNT(*) FROM public.s3_load WHERE bytes_sent = '2048' \
             AND bytes_received = '-' AND client_cookie = 'ASPSESSIONID=abc'",
        )
        .await;
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_header_only_log_stages_nothing() {
    let ctx = TestContext::new().await;
    ctx.put_log(fixtures::HEADER);

    let report = ctx.ingest_worker().run().await.unwrap();

    assert_eq!(report.directives_skipped, 4);
    assert_eq!(report.rows_staged, 0);
    assert_eq!(count_rows(&ctx.warehouse, "s3_load").await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_object_aborts_after_table_creation() {
    let ctx = TestContext::new().await;

    let err = ctx.ingest_worker().run().await.unwrap_err();

    assert!(matches!(err, Error::ObjectStore(_)));
    assert!(err.is_fatal());
    // The table was created before the download failed.
    assert_eq!(count_rows(&ctx.warehouse, "s3_load").await.unwrap(), 0);
}

#[tokio::test]
async fn test_repeated_ingest_appends() {
    let ctx = TestContext::new().await;
    ctx.put_log(fixtures::FULL_INDEX);

    ctx.ingest_worker().run().await.unwrap();
    ctx.ingest_worker().run().await.unwrap();

    assert_eq!(count_rows(&ctx.warehouse, "s3_load").await.unwrap(), 2);
}
