use anyhow::Result;
use std::collections::BTreeMap;

use crate::error::Error;

/// Maps station names to provider station codes.
///
/// Stored as a plain JSON object on disk:
/// ```json
/// {
///   "CERN": "8587918",
///   "Saint-Genis, Lion": "1401791"
/// }
/// ```
/// Lookups ignore case.
#[derive(Debug, Clone, Default)]
pub struct StationDirectory {
    entries: BTreeMap<String, String>,
}

impl StationDirectory {
    /// Loads the directory from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&content)?;
        Ok(Self::from_pairs(entries))
    }

    pub fn from_pairs<I, N, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(name, code)| (name.as_ref().to_lowercase(), code.into()))
            .collect();
        Self { entries }
    }

    /// Returns the code for `name`, or [`Error::UnknownStation`] listing the
    /// known names.
    pub fn resolve(&self, name: &str) -> std::result::Result<&str, Error> {
        self.entries
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownStation {
                name: name.to_string(),
                known: self.entries.keys().cloned().collect(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
