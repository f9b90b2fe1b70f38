//! Console rendering for snapshot reports.
//!
//! Supports plain text lines, pretty JSON and a text bar chart.

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::histogram::HistogramSpec;
use crate::model::VehicleRecord;
use crate::punctuality::{Departure, Punctuality};
use crate::stats::{LatenessStats, SpeedStats};

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl fmt::Debug) {
    debug!("{:#?}", value);
}

/// Renders a value as pretty-printed JSON.
pub fn to_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn or_unknown(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("?")
}

/// "{route} from {origin} towards {destination}".
pub fn describe(vehicle: &VehicleRecord) -> String {
    format!(
        "{} from {} towards {}",
        or_unknown(&vehicle.route),
        or_unknown(&vehicle.origin),
        or_unknown(&vehicle.destination)
    )
}

/// Lines summarising a lateness scan, ending with the latest train's next
/// stop when it has one.
pub fn lateness_lines(stats: &LatenessStats) -> Vec<String> {
    let mut lines = vec![format!("{} / {} trains are late", stats.late, stats.total)];

    if let Some(latest) = stats.latest.record() {
        lines.push(format!(
            "{} is {}",
            describe(latest),
            or_unknown(&latest.timeliness)
        ));
        if let Some(stop) = latest.next_stop() {
            lines.push(format!("Next Station: {}", stop.name));
        }
    }
    if !stats.skipped.is_empty() {
        lines.push(format!("{} trains skipped (unreadable status)", stats.skipped.len()));
    }

    lines
}

pub fn speed_lines(stats: &SpeedStats) -> Vec<String> {
    let mut lines = Vec::new();

    if let (Some(fastest), Some(speed)) = (stats.fastest.record(), stats.fastest.key()) {
        lines.push(format!("{} is travelling {:.2} mph", describe(fastest), speed));
    } else {
        lines.push("No active trains are reporting a speed".to_string());
    }
    if !stats.skipped.is_empty() {
        lines.push(format!("{} trains skipped (no speed)", stats.skipped.len()));
    }

    lines
}

/// The stop-board line for one departure, e.g.
/// "This Tram is 2 minutes late, leaving in 5 minute(s)!".
pub fn departure_line<Tz: TimeZone>(departure: &Departure<Tz>, mode: &str, now: &DateTime<Tz>) -> String {
    let Some(delta) = departure.punctuality() else {
        return "No estimated time :(".to_string();
    };
    let leaving_in = departure.leaving_in(now);

    match delta.punctuality() {
        Punctuality::OnTime => {
            format!("This {mode} is on time, leaving in {leaving_in} minute(s) :)")
        }
        p => format!("This {mode} is {p}, leaving in {leaving_in} minute(s)!"),
    }
}

/// Text bar chart of a sample laid out by a [`HistogramSpec`].
pub struct HistogramChart<'a> {
    pub title: &'a str,
    pub unit: &'a str,
    pub spec: HistogramSpec,
    pub counts: Vec<usize>,
}

impl<'a> HistogramChart<'a> {
    pub fn new(title: &'a str, unit: &'a str, spec: HistogramSpec, sample: &[f64]) -> Self {
        Self {
            title,
            unit,
            spec,
            counts: spec.counts(sample),
        }
    }
}

impl fmt::Display for HistogramChart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} bins, {})", self.title, self.spec.bin_count, self.unit)?;

        let edges = self.spec.edges();
        for (i, count) in self.counts.iter().enumerate() {
            let bar = "*".repeat(*count);
            writeln!(f, "{:>6.0} - {:<6.0} | {}", edges[i], edges[i + 1], bar)?;
        }

        Ok(())
    }
}
