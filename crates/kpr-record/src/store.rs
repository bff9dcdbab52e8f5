//! JSON record-set container.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use kpr_core::{Error, Result};

use crate::reader::EventReader;

#[derive(Debug, Deserialize)]
struct Container {
    record_sets: BTreeMap<String, Vec<Value>>,
}

/// An open record container holding named, ordered record sets.
pub struct RecordFile {
    path: PathBuf,
    sets: BTreeMap<String, Vec<Value>>,
}

impl RecordFile {
    /// Open and parse the container at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let container: Container = serde_json::from_str(&text)?;
        Ok(Self {
            path: path.to_path_buf(),
            sets: container.record_sets,
        })
    }

    /// Path this container was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of the record sets in this container, sorted.
    pub fn record_set_names(&self) -> Vec<&str> {
        self.sets.keys().map(|s| s.as_str()).collect()
    }

    /// Attach a reader to the named record set.
    ///
    /// The record schema is validated against the first entry here, before
    /// any streaming starts: a missing field or column is fatal and names
    /// the offending field.
    pub fn record_set(&self, name: &str) -> Result<EventReader<'_>> {
        let records = self
            .sets
            .get(name)
            .ok_or_else(|| Error::RecordSetNotFound(name.to_string()))?;
        EventReader::attach(name, records)
    }
}
