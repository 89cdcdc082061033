//! Integration test harness: a Postgres testcontainer standing in for the
//! warehouse, with in-memory log source and geolocation mocks.

pub mod containers;
pub mod fixtures;
pub mod mocks;
