//! Incremental geocoding of customer locations into a GeoJSON feature
//! collection.
//!
//! Records come from a tabular JSON export or a CSV file. Each address is
//! normalized, looked up in the previously written collection and only sent
//! to the geocoding providers when it hasn't been resolved before.

pub mod address;
pub mod cache;
pub mod config;
pub mod geocode;
pub mod geojson;
pub mod merge;
pub mod region;
pub mod sources;
pub mod store;
pub mod utils;
