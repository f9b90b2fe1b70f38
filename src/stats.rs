use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::delay;
use crate::error::{Error, Result};
use crate::model::VehicleRecord;

/// What a scan does when one record cannot be evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop at the first bad record and return its error.
    #[default]
    Abort,
    /// Log the bad record, note it in the result and keep scanning.
    Skip,
}

/// Running maximum over a scan.
///
/// A candidate replaces the champion only when its key is strictly greater,
/// so among equal keys the first one offered is kept.
#[derive(Debug, Clone)]
pub struct ExtremalRecord<'a, K> {
    best: Option<(&'a VehicleRecord, K)>,
}

#[derive(Serialize)]
struct Champion<'r, K> {
    record: &'r VehicleRecord,
    key: &'r K,
}

impl<K: Serialize> Serialize for ExtremalRecord<'_, K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.best
            .as_ref()
            .map(|&(record, ref key)| Champion { record, key })
            .serialize(serializer)
    }
}

impl<K> Default for ExtremalRecord<'_, K> {
    fn default() -> Self {
        Self { best: None }
    }
}

impl<'a, K: PartialOrd + Copy> ExtremalRecord<'a, K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a candidate; returns `true` if it became the new champion.
    pub fn offer(&mut self, record: &'a VehicleRecord, key: K) -> bool {
        let wins = match &self.best {
            None => true,
            Some((_, best)) => key > *best,
        };
        if wins {
            self.best = Some((record, key));
        }
        wins
    }

    pub fn record(&self) -> Option<&'a VehicleRecord> {
        self.best.map(|(record, _)| record)
    }

    pub fn key(&self) -> Option<K> {
        self.best.map(|(_, key)| key)
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_none()
    }
}

/// A record the scan could not evaluate under [`ErrorPolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub id: String,
    pub reason: String,
}

fn handle(
    policy: ErrorPolicy,
    record: &VehicleRecord,
    err: Error,
    skipped: &mut Vec<SkippedRecord>,
) -> Result<()> {
    match policy {
        ErrorPolicy::Abort => Err(err.for_record(&record.id)),
        ErrorPolicy::Skip => {
            warn!(record = %record.id, error = %err, "Skipping record");
            skipped.push(SkippedRecord {
                id: record.id.clone(),
                reason: err.to_string(),
            });
            Ok(())
        }
    }
}

/// Lateness summary over the active vehicles of one snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LatenessStats<'a> {
    pub latest: ExtremalRecord<'a, u32>,
    /// Active vehicles whose text contains "Late", parsed or not.
    pub late: usize,
    pub total: usize,
    /// Parsed delay of every late vehicle, in scan order.
    pub durations: Vec<u32>,
    pub skipped: Vec<SkippedRecord>,
}

impl<'a> LatenessStats<'a> {
    /// Scans `records` for the most delayed active vehicle.
    ///
    /// Vehicles with no timeliness text, or text without "Late", count as on
    /// time.
    pub fn from_snapshot(records: &'a [VehicleRecord], policy: ErrorPolicy) -> Result<Self> {
        let mut s = LatenessStats::default();

        for record in records.iter().filter(|r| r.is_active()) {
            s.total += 1;

            let Some(text) = record.timeliness.as_deref().filter(|_| record.is_late()) else {
                continue;
            };
            s.late += 1;

            match delay::parse(text) {
                Ok(parsed) => {
                    s.durations.push(parsed.minutes);
                    if s.latest.offer(record, parsed.minutes) {
                        debug!(record = %record.id, minutes = parsed.minutes, "New latest vehicle");
                    }
                }
                Err(e) => handle(policy, record, e, &mut s.skipped)?,
            }
        }

        Ok(s)
    }

    pub fn late_pct(&self) -> f64 {
        pct(self.late, self.total)
    }

    /// Mean and population standard deviation of the parsed delays.
    pub fn spread(&self) -> (f64, f64) {
        let minutes = self.durations_f64();
        let avg = mean(&minutes);
        (avg, stddev(&minutes, avg))
    }

    pub fn durations_f64(&self) -> Vec<f64> {
        self.durations.iter().map(|&m| f64::from(m)).collect()
    }
}

/// Speed summary over the active vehicles of one snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SpeedStats<'a> {
    pub fastest: ExtremalRecord<'a, f64>,
    /// Speed of every active vehicle that reported one, in scan order.
    pub speeds: Vec<f64>,
    pub skipped: Vec<SkippedRecord>,
}

impl<'a> SpeedStats<'a> {
    /// Scans `records` for the fastest active vehicle.
    pub fn from_snapshot(records: &'a [VehicleRecord], policy: ErrorPolicy) -> Result<Self> {
        let mut s = SpeedStats::default();

        for record in records.iter().filter(|r| r.is_active()) {
            match record.speed {
                Some(speed) => {
                    s.speeds.push(speed);
                    s.fastest.offer(record, speed);
                }
                None => {
                    let err = Error::MissingField {
                        record: record.id.clone(),
                        field: "velocity",
                    };
                    handle(policy, record, err, &mut s.skipped)?;
                }
            }
        }

        Ok(s)
    }

    /// Mean and population standard deviation of the reported speeds.
    pub fn spread(&self) -> (f64, f64) {
        let avg = mean(&self.speeds);
        (avg, stddev(&self.speeds, avg))
    }
}

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}
