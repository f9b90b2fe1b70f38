//! Scheduled-versus-estimated departure arithmetic and its wording.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde::Serialize;

use crate::error::{Error, Result};

/// Timestamp layout used by the departure feeds.
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";
const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses a feed timestamp and expresses it in `zone`.
///
/// Accepts [`WIRE_FORMAT`], RFC 3339 (for a trailing `Z`), and offset-less
/// timestamps, which are taken to be local to `zone`.
pub fn parse_feed_time<Tz: TimeZone>(raw: &str, zone: &Tz) -> Result<DateTime<Tz>> {
    let raw = raw.trim();

    if let Ok(t) = DateTime::parse_from_str(raw, WIRE_FORMAT) {
        return Ok(t.with_timezone(zone));
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(t.with_timezone(zone));
    }

    NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)
        .ok()
        .and_then(|naive| zone.from_local_datetime(&naive).earliest())
        .ok_or_else(|| Error::UnparsableTimestamp {
            text: raw.to_string(),
        })
}

/// Whole minutes from `from` to `to`, truncated toward zero.
pub fn minutes_between<Tz: TimeZone>(from: &DateTime<Tz>, to: &DateTime<Tz>) -> i64 {
    to.clone().signed_duration_since(from.clone()).num_seconds() / 60
}

/// Early/late classification of a delta, rendered as "on time",
/// "1 minute late", "3 minutes early".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Punctuality {
    OnTime,
    Late(u64),
    Early(u64),
}

impl Punctuality {
    pub fn from_minutes(minutes: i64) -> Self {
        match minutes {
            0 => Punctuality::OnTime,
            m if m > 0 => Punctuality::Late(m.unsigned_abs()),
            m => Punctuality::Early(m.unsigned_abs()),
        }
    }
}

impl fmt::Display for Punctuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (n, word) = match *self {
            Punctuality::OnTime => return f.write_str("on time"),
            Punctuality::Late(n) => (n, "late"),
            Punctuality::Early(n) => (n, "early"),
        };
        let unit = if n == 1 { "minute" } else { "minutes" };
        write!(f, "{n} {unit} {word}")
    }
}

/// Signed difference between the estimated and timetabled times.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct PunctualityDelta<Tz: TimeZone> {
    /// Estimated minus timetabled, in whole minutes.
    pub minutes: i64,
    pub timetabled: DateTime<Tz>,
    pub estimated: DateTime<Tz>,
}

impl<Tz: TimeZone> PunctualityDelta<Tz> {
    pub fn punctuality(&self) -> Punctuality {
        Punctuality::from_minutes(self.minutes)
    }
}

pub fn delta<Tz: TimeZone>(timetabled: DateTime<Tz>, estimated: DateTime<Tz>) -> PunctualityDelta<Tz> {
    PunctualityDelta {
        minutes: minutes_between(&timetabled, &estimated),
        timetabled,
        estimated,
    }
}

/// One departure from a stop board.
#[derive(Debug, Clone, PartialEq)]
pub struct Departure<Tz: TimeZone> {
    pub timetabled: DateTime<Tz>,
    pub estimated: Option<DateTime<Tz>>,
}

impl<Tz: TimeZone> Departure<Tz> {
    /// Parses the raw timestamps of a stop event into `zone`.
    pub fn from_feed(timetabled: &str, estimated: Option<&str>, zone: &Tz) -> Result<Self> {
        Ok(Self {
            timetabled: parse_feed_time(timetabled, zone)?,
            estimated: estimated.map(|raw| parse_feed_time(raw, zone)).transpose()?,
        })
    }

    /// Minutes until the vehicle leaves: the estimate when there is one,
    /// otherwise the timetable.
    pub fn leaving_in(&self, now: &DateTime<Tz>) -> i64 {
        let leaves = self.estimated.as_ref().unwrap_or(&self.timetabled);
        minutes_between(now, leaves)
    }

    /// `None` when the feed carried no estimate.
    pub fn punctuality(&self) -> Option<PunctualityDelta<Tz>> {
        self.estimated
            .clone()
            .map(|estimated| delta(self.timetabled.clone(), estimated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};

    fn zurich() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn at(raw: &str) -> DateTime<FixedOffset> {
        parse_feed_time(raw, &zurich()).unwrap()
    }

    #[test]
    fn test_parse_wire_format() {
        let t = at("2021-11-03T08:15:00+0100");
        assert_eq!(t.to_rfc3339(), "2021-11-03T08:15:00+01:00");
    }

    #[test]
    fn test_parse_converts_to_local_zone() {
        let t = at("2021-11-03T07:15:00Z");
        assert_eq!(t.to_rfc3339(), "2021-11-03T08:15:00+01:00");
    }

    #[test]
    fn test_parse_naive_attaches_local_zone() {
        let t = at("2021-11-03T08:15:00");
        assert_eq!(t.to_rfc3339(), "2021-11-03T08:15:00+01:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            parse_feed_time("tomorrow", &Utc),
            Err(Error::UnparsableTimestamp {
                text: "tomorrow".to_string()
            })
        );
    }

    #[test]
    fn test_delta_phrasing() {
        let base = at("2021-11-03T08:15:00+0100");

        let d = delta(base, base + Duration::minutes(1));
        assert_eq!(d.minutes, 1);
        assert_eq!(d.punctuality().to_string(), "1 minute late");

        let d = delta(base, base + Duration::minutes(2));
        assert_eq!(d.punctuality().to_string(), "2 minutes late");

        let d = delta(base, base);
        assert_eq!(d.punctuality().to_string(), "on time");

        let d = delta(base, base - Duration::minutes(1));
        assert_eq!(d.punctuality().to_string(), "1 minute early");

        let d = delta(base, base - Duration::minutes(4));
        assert_eq!(d.punctuality(), Punctuality::Early(4));
        assert_eq!(d.punctuality().to_string(), "4 minutes early");
    }

    #[test]
    fn test_delta_antisymmetric() {
        let a = at("2021-11-03T08:15:00+0100");
        let b = at("2021-11-03T08:22:00+0100");

        assert_eq!(delta(a, b).minutes, 7);
        assert_eq!(delta(b, a).minutes, -7);
    }

    #[test]
    fn test_delta_truncates_toward_zero() {
        let base = at("2021-11-03T08:15:00+0100");

        assert_eq!(delta(base, base + Duration::seconds(119)).minutes, 1);
        assert_eq!(delta(base, base - Duration::seconds(119)).minutes, -1);
        assert_eq!(delta(base, base + Duration::seconds(59)).punctuality(), Punctuality::OnTime);
    }

    #[test]
    fn test_delta_across_offsets() {
        let timetabled = at("2021-11-03T08:15:00+0100");
        let estimated = at("2021-11-03T07:18:00+0000");

        assert_eq!(delta(timetabled, estimated).minutes, 3);
    }

    #[test]
    fn test_departure_with_estimate() {
        let dep = Departure::from_feed(
            "2021-11-03T08:15:00+0100",
            Some("2021-11-03T08:18:00+0100"),
            &zurich(),
        )
        .unwrap();
        let now = at("2021-11-03T08:10:00+0100");

        assert_eq!(dep.leaving_in(&now), 8);
        assert_eq!(dep.punctuality().unwrap().minutes, 3);
    }

    #[test]
    fn test_departure_without_estimate_uses_timetable() {
        let dep = Departure::from_feed("2021-11-03T08:15:00+0100", None, &zurich()).unwrap();
        let now = at("2021-11-03T08:10:30+0100");

        assert_eq!(dep.leaving_in(&now), 4);
        assert!(dep.punctuality().is_none());
    }
}
