//! Provider-neutral view of one fleet snapshot.

use serde::Serialize;

/// Operational state of a vehicle at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VehicleState {
    Active,
    Other(String),
}

impl VehicleState {
    pub fn from_feed(raw: &str) -> Self {
        match raw {
            "Active" => VehicleState::Active,
            other => VehicleState::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StopStatus {
    Departed,
    Other(String),
}

impl StopStatus {
    pub fn from_feed(raw: &str) -> Self {
        match raw {
            "Departed" => StopStatus::Departed,
            other => StopStatus::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopRecord {
    pub name: String,
    pub code: Option<String>,
    pub status: StopStatus,
}

/// A single in-service vehicle as reported by the feed.
///
/// Fields the feed may omit are `None` rather than a placeholder value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleRecord {
    pub id: String,
    pub state: VehicleState,
    pub timeliness: Option<String>,
    pub speed: Option<f64>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub route: Option<String>,
    pub stops: Vec<StopRecord>,
}

impl VehicleRecord {
    /// Creates an active record with no optional fields set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: VehicleState::Active,
            timeliness: None,
            speed: None,
            origin: None,
            destination: None,
            route: None,
            stops: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == VehicleState::Active
    }

    /// True when the timeliness text reports the vehicle as late.
    pub fn is_late(&self) -> bool {
        self.timeliness
            .as_deref()
            .is_some_and(|text| text.contains("Late"))
    }

    /// The first stop the vehicle has not yet departed from.
    pub fn next_stop(&self) -> Option<&StopRecord> {
        self.stops.iter().find(|s| s.status != StopStatus::Departed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(name: &str, status: &str) -> StopRecord {
        StopRecord {
            name: name.to_string(),
            code: None,
            status: StopStatus::from_feed(status),
        }
    }

    #[test]
    fn test_next_stop_skips_departed() {
        let mut train = VehicleRecord::new("7-14");
        train.stops = vec![
            stop("Chicago Union Station", "Departed"),
            stop("Naperville", "Departed"),
            stop("Galesburg", "Enroute"),
            stop("Omaha", "Enroute"),
        ];

        assert_eq!(train.next_stop().unwrap().name, "Galesburg");
    }

    #[test]
    fn test_next_stop_none_when_all_departed() {
        let mut train = VehicleRecord::new("7-14");
        train.stops = vec![stop("Chicago Union Station", "Departed")];

        assert!(train.next_stop().is_none());
    }

    #[test]
    fn test_is_late_requires_late_word() {
        let mut train = VehicleRecord::new("1");
        assert!(!train.is_late());

        train.timeliness = Some("On Time".to_string());
        assert!(!train.is_late());

        train.timeliness = Some("12 Minutes Late".to_string());
        assert!(train.is_late());
    }

    #[test]
    fn test_state_from_feed() {
        assert_eq!(VehicleState::from_feed("Active"), VehicleState::Active);
        assert_eq!(
            VehicleState::from_feed("Predeparture"),
            VehicleState::Other("Predeparture".to_string())
        );
    }
}
