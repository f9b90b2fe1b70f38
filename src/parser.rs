//! JSON decoding for the Amtraker v3 API.
//!
//! `/trains` answers with a map of train number to the runs currently
//! carrying that number; `/stations` with a map of station code to station.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

use crate::model::{StopRecord, StopStatus, VehicleRecord, VehicleState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AmtrakTrain {
    #[serde(rename = "trainID")]
    train_id: Option<String>,
    train_state: Option<String>,
    train_timely: Option<String>,
    velocity: Option<f64>,
    orig_name: Option<String>,
    dest_name: Option<String>,
    route_name: Option<String>,
    #[serde(default)]
    stations: Vec<AmtrakStop>,
}

#[derive(Debug, Deserialize)]
struct AmtrakStop {
    name: Option<String>,
    code: Option<String>,
    status: Option<String>,
}

/// A station as listed by `/stations`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Station {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub tz: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub trains: Vec<String>,
}

impl AmtrakTrain {
    /// Builds the record for this run. A run without `trainID` is labelled
    /// with the train number it was listed under.
    fn into_record(self, number: &str) -> VehicleRecord {
        let id = self.train_id.unwrap_or_else(|| {
            warn!(number, route = ?self.route_name, "Train run has no trainID, using its number");
            number.to_string()
        });

        let stops = self
            .stations
            .into_iter()
            .filter_map(|s| {
                Some(StopRecord {
                    name: s.name?,
                    code: s.code,
                    status: StopStatus::from_feed(s.status.as_deref().unwrap_or("")),
                })
            })
            .collect();

        VehicleRecord {
            id,
            state: VehicleState::from_feed(self.train_state.as_deref().unwrap_or("")),
            timeliness: self.train_timely,
            speed: self.velocity,
            origin: self.orig_name,
            destination: self.dest_name,
            route: self.route_name,
            stops,
        }
    }
}

/// Decodes a `/trains` response into one record per running train, in the
/// order the response lists them.
///
/// # Errors
///
/// Returns an error if the body is not the expected JSON.
pub fn parse_trains(bytes: &[u8]) -> Result<Vec<VehicleRecord>> {
    let runs: Map<String, Value> =
        serde_json::from_slice(bytes).context("Failed to decode trains response")?;

    let mut records = Vec::with_capacity(runs.len());
    for (number, run) in runs {
        let run: Vec<AmtrakTrain> = serde_json::from_value(run)
            .with_context(|| format!("Failed to decode runs of train {number}"))?;
        if let Some(train) = run.into_iter().next() {
            records.push(train.into_record(&number));
        }
    }
    Ok(records)
}

/// Decodes a `/trains/{id}` response and returns the train keyed by `id`.
pub fn parse_train(bytes: &[u8], id: &str) -> Result<VehicleRecord> {
    let mut runs: BTreeMap<String, Vec<AmtrakTrain>> =
        serde_json::from_slice(bytes).context("Failed to decode train response")?;

    let train = runs
        .remove(id)
        .and_then(|run| run.into_iter().next())
        .ok_or_else(|| anyhow::anyhow!("Train {id} not present in response"))?;
    Ok(train.into_record(id))
}

/// Decodes a `/stations` response, ordered by station code.
pub fn parse_stations(bytes: &[u8]) -> Result<Vec<Station>> {
    let stations: BTreeMap<String, Station> =
        serde_json::from_slice(bytes).context("Failed to decode stations response")?;
    Ok(stations.into_values().collect())
}

/// Decodes a `/stations/{code}` response.
pub fn parse_station(bytes: &[u8], code: &str) -> Result<Station> {
    let mut stations: BTreeMap<String, Station> =
        serde_json::from_slice(bytes).context("Failed to decode station response")?;
    stations
        .remove(code)
        .ok_or_else(|| anyhow::anyhow!("Station {code} not present in response"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{ErrorPolicy, LatenessStats};

    const TRAINS: &str = r#"{
        "5": [{
            "trainID": "5-14",
            "routeName": "California Zephyr",
            "trainState": "Active",
            "trainTimely": "1 Hour, 12 Minutes Late",
            "velocity": 61.25,
            "origName": "Chicago Union Station",
            "destName": "Emeryville",
            "stations": [
                {"name": "Chicago Union Station", "code": "CHI", "status": "Departed"},
                {"name": "Naperville", "code": "NPV", "status": "Enroute"}
            ]
        }],
        "19": [{
            "trainID": "19-15",
            "routeName": "Crescent",
            "trainState": "Predeparture"
        }]
    }"#;

    #[test]
    fn test_parse_trains() {
        let records = parse_trains(TRAINS.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        let zephyr = records.iter().find(|r| r.id == "5-14").unwrap();
        assert!(zephyr.is_active());
        assert_eq!(zephyr.speed, Some(61.25));
        assert_eq!(zephyr.route.as_deref(), Some("California Zephyr"));
        assert_eq!(zephyr.next_stop().unwrap().name, "Naperville");

        let crescent = records.iter().find(|r| r.id == "19-15").unwrap();
        assert!(!crescent.is_active());
        assert_eq!(crescent.timeliness, None);
        assert_eq!(crescent.speed, None);
    }

    #[test]
    fn test_parse_trains_keeps_response_order() {
        let body = r#"{
            "7": [{"trainID": "7-1", "trainState": "Active", "trainTimely": "20 Minutes Late"}],
            "19": [{"trainID": "19-1", "trainState": "Active", "trainTimely": "20 Minutes Late"}],
            "5": [{"trainID": "5-1", "trainState": "Active", "trainTimely": "3 Minutes Late"}]
        }"#;
        let records = parse_trains(body.as_bytes()).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["7-1", "19-1", "5-1"]);

        let stats = LatenessStats::from_snapshot(&records, ErrorPolicy::Abort).unwrap();
        assert_eq!(stats.latest.key(), Some(20));
        assert_eq!(stats.latest.record().unwrap().id, "7-1");
    }

    #[test]
    fn test_parse_trains_missing_id_uses_number() {
        let body = r#"{
            "3": [{"trainID": "3-14", "trainState": "Active", "trainTimely": "On Time"}],
            "7": [{"routeName": "Empire Builder", "trainState": "Active", "trainTimely": "4 Minutes Late"}]
        }"#;
        let records = parse_trains(body.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "3-14");
        assert_eq!(records[1].id, "7");
        assert_eq!(records[1].route.as_deref(), Some("Empire Builder"));
    }

    #[test]
    fn test_parse_trains_bad_run_names_train() {
        let body = r#"{"3": [{"trainID": "3-14", "velocity": "fast"}]}"#;
        let err = parse_trains(body.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("train 3"), "{err}");
    }

    #[test]
    fn test_parse_trains_invalid_json() {
        assert!(parse_trains(b"<html>").is_err());
    }

    #[test]
    fn test_parse_train() {
        let record = parse_train(TRAINS.as_bytes(), "5").unwrap();
        assert_eq!(record.id, "5-14");
        assert!(parse_train(TRAINS.as_bytes(), "6").is_err());
    }

    #[test]
    fn test_parse_stations() {
        let body = r#"{
            "CHI": {"name": "Chicago Union Station", "code": "CHI", "tz": "America/Chicago", "trains": ["5-14"]},
            "NPV": {"name": "Naperville", "code": "NPV"}
        }"#;

        let stations = parse_stations(body.as_bytes()).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].code, "CHI");
        assert_eq!(stations[0].trains, vec!["5-14".to_string()]);

        let npv = parse_station(body.as_bytes(), "NPV").unwrap();
        assert_eq!(npv.name, "Naperville");
        assert_eq!(npv.tz, None);
    }
}
