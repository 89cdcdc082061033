//! Mock implementations for testing.

use async_trait::async_trait;
use bytes::Bytes;
use etl_core::{Error, GeoLocation, Result};
use log_source::{LogSource, ObjectLocation};
use parking_lot::Mutex;
use pipeline::GeoLocator;
use std::collections::HashMap;
use std::sync::Arc;

/// Mock log source serving objects from memory.
///
/// This implements the same `LogSource` trait as `S3LogSource`, so the
/// ingest worker runs unchanged without a bucket.
#[derive(Clone, Default)]
pub struct MockLogSource {
    objects: Arc<Mutex<HashMap<String, Bytes>>>,
    /// Every location requested, in order.
    requests: Arc<Mutex<Vec<ObjectLocation>>>,
}

impl MockLogSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `contents` for `location`.
    pub fn put(&self, location: &ObjectLocation, contents: impl Into<Bytes>) {
        self.objects
            .lock()
            .insert(location.to_string(), contents.into());
    }

    pub fn requested(&self) -> Vec<ObjectLocation> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LogSource for MockLogSource {
    async fn fetch(&self, location: &ObjectLocation) -> Result<Bytes> {
        self.requests.lock().push(location.clone());
        self.objects
            .lock()
            .get(&location.to_string())
            .cloned()
            .ok_or_else(|| Error::object_store(format!("no such object: {}", location)))
    }
}

/// Mock geolocator answering from a fixed table.
///
/// Addresses without an entry fail with a geolocation error, the way a
/// country-less response does.
#[derive(Clone, Default)]
pub struct MockGeoLocator {
    locations: Arc<Mutex<HashMap<String, GeoLocation>>>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl MockGeoLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(self, ip: &str, country: &str, city: Option<&str>) -> Self {
        self.locations.lock().insert(
            ip.to_string(),
            GeoLocation {
                postcode: None,
                city: city.map(str::to_string),
                region: None,
                country: country.to_string(),
            },
        );
        self
    }

    /// Every address looked up, in order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().len()
    }
}

#[async_trait]
impl GeoLocator for MockGeoLocator {
    async fn locate(&self, ip: &str) -> Result<GeoLocation> {
        self.lookups.lock().push(ip.to_string());
        self.locations
            .lock()
            .get(ip)
            .cloned()
            .ok_or_else(|| Error::geolocation(format!("{}: response has no country", ip)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> ObjectLocation {
        ObjectLocation {
            bucket: "bucket".into(),
            key: "logs/a.log".into(),
        }
    }

    #[tokio::test]
    async fn test_mock_source_serves_and_records() {
        let source = MockLogSource::new();
        source.put(&location(), "line\n");

        let bytes = source.fetch(&location()).await.unwrap();
        assert_eq!(&bytes[..], b"line\n");
        assert_eq!(source.requested(), vec![location()]);
    }

    #[tokio::test]
    async fn test_mock_source_missing_object_fails() {
        let err = MockLogSource::new().fetch(&location()).await.unwrap_err();
        assert!(matches!(err, Error::ObjectStore(_)));
    }

    #[tokio::test]
    async fn test_mock_geolocator_unknown_address_fails() {
        let geo = MockGeoLocator::new().with_location("1.2.3.4", "GB", Some("London"));

        assert_eq!(geo.locate("1.2.3.4").await.unwrap().country, "GB");
        assert!(geo.locate("5.6.7.8").await.is_err());
        assert_eq!(geo.lookups(), vec!["1.2.3.4", "5.6.7.8"]);
    }
}
