use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;
use transit_watch::fetch::{HttpClient, fetch_bytes};
use transit_watch::model::VehicleRecord;
use transit_watch::parser::{self, Station};

use crate::services::fleet_api::FleetApi;

/// Client for the Amtraker v3 API (`/trains`, `/stations`).
pub struct AmtrakerClient<C> {
    base_url: String,
    http: C,
}

impl<C: HttpClient> AmtrakerClient<C> {
    pub fn new(base_url: impl Into<String>, http: C) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        let url = format!("{}/{}", self.base_url, path);
        let bytes = fetch_bytes(&self.http, &url).await?;
        debug!(url = %url, bytes = bytes.len(), "Amtraker response received");
        Ok(bytes)
    }
}

#[async_trait]
impl<C: HttpClient> FleetApi for AmtrakerClient<C> {
    async fn fetch_all_trains(&self) -> Result<Vec<VehicleRecord>> {
        parser::parse_trains(&self.get("trains").await?)
    }

    async fn fetch_train(&self, id: &str) -> Result<VehicleRecord> {
        parser::parse_train(&self.get(&format!("trains/{id}")).await?, id)
    }

    async fn fetch_all_stations(&self) -> Result<Vec<Station>> {
        parser::parse_stations(&self.get("stations").await?)
    }

    async fn fetch_station(&self, code: &str) -> Result<Station> {
        parser::parse_station(&self.get(&format!("stations/{code}")).await?, code)
    }
}
