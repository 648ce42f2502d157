//! Notification records and a host that retains them.

use serde_json::Value;

use super::Host;

/// One host notification: the path written and the value reported for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub path: String,
    pub value: Value,
}

/// Host that appends every notification to an in-memory log, newest last.
#[derive(Debug, Default)]
pub struct RecordingHost {
    records: Vec<ChangeRecord>,
}

impl RecordingHost {
    pub fn new() -> RecordingHost {
        RecordingHost::default()
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&ChangeRecord> {
        self.records.last()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Drains the log, leaving it empty.
    pub fn take(&mut self) -> Vec<ChangeRecord> {
        std::mem::take(&mut self.records)
    }
}

impl Host for RecordingHost {
    fn update(&mut self, path: &str, value: &Value) {
        self.records.push(ChangeRecord {
            path: path.to_string(),
            value: value.clone(),
        });
    }
}
