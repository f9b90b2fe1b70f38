//! Typed failures raised by the report core.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("unrecognized lateness text {text:?}")]
    UnparsableFormat { text: String },
    #[error("cannot bin an empty sample")]
    EmptySample,
    #[error("bin width must be positive and finite, got {width}")]
    InvalidBinWidth { width: f64 },
    #[error("{upper} / {width} needs more than {max} bins")]
    TooManyBins { upper: f64, width: f64, max: usize },
    #[error("record {record} has no `{field}`")]
    MissingField { record: String, field: &'static str },
    #[error("unrecognized timestamp {text:?}")]
    UnparsableTimestamp { text: String },
    #[error("unknown station {name:?} (known: {})", .known.join(", "))]
    UnknownStation { name: String, known: Vec<String> },
    #[error("record {record}: {source}")]
    Record {
        record: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attaches the identifier of the vehicle record that produced `self`.
    pub fn for_record(self, record: &str) -> Self {
        Error::Record {
            record: record.to_string(),
            source: Box::new(self),
        }
    }
}
