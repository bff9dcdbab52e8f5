//! Bounds-checked sequential access to one record set.

use serde::Deserialize;
use serde_json::Value;

use kpr_core::{Error, Result};

use crate::event::EventRecord;

/// Reader over one named record set.
///
/// Owns a single scratch [`EventRecord`] that is overwritten by each
/// [`read`](EventReader::read) call; the returned borrow keeps the record
/// alive only until the next read, so no per-event state outlives the
/// loop iteration that produced it.
#[derive(Debug)]
pub struct EventReader<'a> {
    name: String,
    records: &'a [Value],
    scratch: EventRecord,
    truncated_entries: u64,
}

impl<'a> EventReader<'a> {
    pub(crate) fn attach(name: &str, records: &'a [Value]) -> Result<Self> {
        if let Some(first) = records.first() {
            EventRecord::deserialize(first)
                .map_err(|e| Error::Schema(format!("record set '{name}': {e}")))?;
        }
        Ok(Self {
            name: name.to_string(),
            records,
            scratch: EventRecord::default(),
            truncated_entries: 0,
        })
    }

    /// Record set name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entries in the record set.
    pub fn entry_count(&self) -> usize {
        self.records.len()
    }

    /// Entries so far whose declared counts exceeded a compiled capacity.
    pub fn truncated_entries(&self) -> u64 {
        self.truncated_entries
    }

    /// Materialize entry `index` into the scratch record.
    ///
    /// Declared counts are clamped to the compiled capacities before any
    /// column is indexed; a clamp is diagnosed once per offending entry. A
    /// column shorter than the effective count is a short read and maps to
    /// [`Error::ReadFailure`]: skip the entry, do not abort the stream.
    pub fn read(&mut self, index: usize) -> Result<&EventRecord> {
        let entries = self.records.len();
        let value = self
            .records
            .get(index)
            .ok_or(Error::OutOfRange { index, entries })?;
        let mut record = EventRecord::deserialize(value).map_err(|e| Error::ReadFailure {
            index,
            reason: e.to_string(),
        })?;
        let clipped = record
            .conform()
            .map_err(|reason| Error::ReadFailure { index, reason })?;
        if !clipped.is_empty() {
            self.truncated_entries += 1;
            tracing::warn!(
                entry = index,
                categories = ?clipped,
                "declared count exceeds capacity, clipping"
            );
        }
        self.scratch = record;
        Ok(&self.scratch)
    }
}
