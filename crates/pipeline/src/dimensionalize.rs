//! Dimensionalize stage: `etl_1` → six dimensions.
//!
//! For each dimension, in order, distinct values of unprocessed facts that
//! have no dimension row yet are enriched and inserted. Fact keys are then
//! backfilled and every unprocessed fact is flagged, resolved or not.

use crate::enrichment::GeoLocator;
use crate::report::{DimensionLoad, DimensionReport};
use etl_core::{
    DateDim, Dimension, FileDim, LocationDim, RequestDim, Result, TimeDim, VisitDim,
};
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;
use telemetry::metrics;
use tracing::{debug, info, warn};
use warehouse::{
    backfill_foreign_keys, init_schema, insert, mark_facts_processed, missing_client_ips,
    missing_cookies, missing_dates, missing_files, missing_requests, missing_times, schema,
    WarehouseClient,
};

/// Worker that builds the dimension tables and links facts to them.
pub struct DimensionWorker {
    warehouse: WarehouseClient,
    geo: Arc<dyn GeoLocator>,
}

impl DimensionWorker {
    pub fn new(warehouse: WarehouseClient, geo: Arc<dyn GeoLocator>) -> Self {
        Self { warehouse, geo }
    }

    /// Runs the stage once.
    pub async fn run(&self) -> Result<DimensionReport> {
        info!("Dimensionalize starting");

        let schema = init_schema(&self.warehouse, &schema::dimension_tables()).await;

        let mut loads = Vec::with_capacity(Dimension::ALL.len());
        for dimension in Dimension::ALL {
            let load = self.load(dimension).await?;
            debug!(dimension = %dimension, inserted = load.inserted, "Dimension done");
            loads.push(load);
        }

        let backfill = backfill_foreign_keys(&self.warehouse).await;
        let facts_flagged = mark_facts_processed(&self.warehouse).await?;

        Ok(DimensionReport {
            schema,
            loads,
            backfill,
            facts_flagged,
        })
    }

    async fn load(&self, dimension: Dimension) -> Result<DimensionLoad> {
        let client = &self.warehouse;
        let mut inserted = 0;
        let mut unresolved = 0;

        match dimension {
            Dimension::Date => {
                for date in distinct(missing_dates(client).await?) {
                    insert::insert_date_dim(client, &DateDim::new(date)).await?;
                    inserted += 1;
                }
            }
            Dimension::Time => {
                for time in distinct(missing_times(client).await?) {
                    insert::insert_time_dim(client, &TimeDim::new(time)).await?;
                    inserted += 1;
                }
            }
            Dimension::Location => {
                for ip in distinct(missing_client_ips(client).await?) {
                    metrics().geo_lookups.inc();
                    match self.geo.locate(&ip).await {
                        Ok(location) => {
                            insert::insert_location_dim(client, &LocationDim::new(ip, location))
                                .await?;
                            inserted += 1;
                        }
                        Err(e) if !e.is_fatal() => {
                            warn!(ip = %ip, error = %e, "Geolocation failed, address left unresolved");
                            metrics().geo_failures.inc();
                            unresolved += 1;
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
            Dimension::Request => {
                for key in distinct(missing_requests(client).await?) {
                    insert::insert_request_dim(client, &RequestDim::new(key)).await?;
                    inserted += 1;
                }
            }
            Dimension::File => {
                for (uri_stem, bytes_sent) in distinct(missing_files(client).await?) {
                    insert::insert_file_dim(client, &FileDim::new(uri_stem, bytes_sent)).await?;
                    inserted += 1;
                }
            }
            Dimension::Visit => {
                for cookie in distinct(missing_cookies(client).await?) {
                    insert::insert_visit_dim(client, &VisitDim::new(Some(cookie))).await?;
                    inserted += 1;
                }
            }
        }

        Ok(DimensionLoad {
            dimension,
            inserted,
            unresolved,
        })
    }
}

/// Drops repeated values, keeping first-seen order.
fn distinct<T: Eq + Hash + Clone>(values: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}
