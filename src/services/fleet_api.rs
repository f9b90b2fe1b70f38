//! Trait for a provider that reports a live fleet and its stations.

use anyhow::Result;
use transit_watch::model::VehicleRecord;
use transit_watch::parser::Station;

/// Abstraction over a fleet tracking provider (e.g., Amtraker).
#[async_trait::async_trait]
pub trait FleetApi {
    /// Returns every train the provider currently knows about.
    async fn fetch_all_trains(&self) -> Result<Vec<VehicleRecord>>;

    /// Returns the current run of train number `id`.
    async fn fetch_train(&self, id: &str) -> Result<VehicleRecord>;

    async fn fetch_all_stations(&self) -> Result<Vec<Station>>;

    async fn fetch_station(&self, code: &str) -> Result<Station>;
}
