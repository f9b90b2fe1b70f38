//! Parses free-text lateness phrases ("1 Hour, 5 Minutes Late") into minutes.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::error::{Error, Result};

/// The lateness phrasings the parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DelayShape {
    /// `<H> Hour(s), <M> Minute(s) Late`
    HourMinute,
    /// `<M> Minute(s) Late`
    MinuteOnly,
    /// `<H> Hour(s) Late`
    HourOnly,
}

impl DelayShape {
    /// Shapes in the order they are tried.
    pub const ALL: [DelayShape; 3] = [
        DelayShape::HourMinute,
        DelayShape::MinuteOnly,
        DelayShape::HourOnly,
    ];

    fn pattern(self) -> &'static Regex {
        match self {
            DelayShape::HourMinute => &HOUR_MINUTE,
            DelayShape::MinuteOnly => &MINUTE_ONLY,
            DelayShape::HourOnly => &HOUR_ONLY,
        }
    }

    fn minutes(self, caps: &Captures) -> Option<u32> {
        match self {
            DelayShape::HourMinute => {
                let hours = group(caps, "hours")?;
                let minutes = group(caps, "minutes")?;
                hours.checked_mul(60)?.checked_add(minutes)
            }
            DelayShape::MinuteOnly => group(caps, "minutes"),
            DelayShape::HourOnly => group(caps, "hours")?.checked_mul(60),
        }
    }
}

static HOUR_MINUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<hours>\d*) Hours?, (?P<minutes>\d*) Minutes? Late$").unwrap()
});
static MINUTE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<minutes>\d*) Minutes? Late$").unwrap());
static HOUR_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<hours>\d*) Hours? Late$").unwrap());

/// An empty digit group counts as zero; digits that overflow are rejected.
fn group(caps: &Captures, name: &str) -> Option<u32> {
    match caps.name(name).map(|m| m.as_str()) {
        None | Some("") => Some(0),
        Some(digits) => digits.parse().ok(),
    }
}

/// A lateness magnitude in whole minutes. Late is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParsedDuration {
    pub minutes: u32,
    pub shape: DelayShape,
}

/// Converts a lateness phrase into minutes.
///
/// Callers check for the word "Late" first; on-time and early text is never
/// passed here.
///
/// # Errors
///
/// Returns [`Error::UnparsableFormat`] when no [`DelayShape`] matches the
/// text or its numbers do not fit.
pub fn parse(text: &str) -> Result<ParsedDuration> {
    let trimmed = text.trim();

    for shape in DelayShape::ALL {
        if let Some(caps) = shape.pattern().captures(trimmed) {
            return shape
                .minutes(&caps)
                .map(|minutes| ParsedDuration { minutes, shape })
                .ok_or_else(|| Error::UnparsableFormat {
                    text: text.to_string(),
                });
        }
    }

    Err(Error::UnparsableFormat {
        text: text.to_string(),
    })
}
