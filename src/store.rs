use crate::dlog;
use crate::error::StoreError;
use crate::types::WorkoutRecord;
use serde_json::Value as JsonValue;
use std::collections::HashSet;

/// Ordered, in-memory collection of workouts. Insertion order is creation
/// order and display order (oldest first).
#[derive(Debug, Clone, Default)]
pub struct WorkoutStore {
    records: Vec<WorkoutRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: usize,
    pub skipped: usize,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: WorkoutRecord) {
        self.records.push(record);
    }

    pub fn find_by_id(&self, id: &str) -> Result<&WorkoutRecord, StoreError> {
        self.records
            .iter()
            .find(|w| w.id() == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    /// Replace the contents with the given field-bags.
    ///
    /// Entries go straight through the tagged deserializer, so stored ids,
    /// timestamps and metrics are kept verbatim. Entries that are missing
    /// fields, carry an unknown `kind` or repeat an earlier id are skipped.
    pub fn restore(&mut self, raw: Vec<JsonValue>) -> RestoreReport {
        self.records.clear();
        let mut seen: HashSet<String> = HashSet::new();
        let mut report = RestoreReport::default();

        for (index, entry) in raw.into_iter().enumerate() {
            let record = match serde_json::from_value::<WorkoutRecord>(entry) {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(index, err = %err, "skipping unreadable stored workout");
                    report.skipped += 1;
                    continue;
                }
            };

            if !seen.insert(record.id().to_string()) {
                tracing::warn!(index, id = %record.id(), "skipping stored workout with duplicate id");
                report.skipped += 1;
                continue;
            }

            self.records.push(record);
            report.restored += 1;
        }

        report
    }

    /// Restore from the persisted text. A `null` value counts as no prior
    /// state; anything that is not a JSON array is `PersistenceCorrupt` and
    /// leaves the store empty.
    pub fn restore_json(&mut self, text: &str) -> Result<RestoreReport, StoreError> {
        match parse_raw(text) {
            Ok(raw) => Ok(self.restore(raw)),
            Err(err) => {
                self.records.clear();
                Err(err)
            }
        }
    }

    pub fn serialize(&self) -> serde_json::Result<Vec<JsonValue>> {
        self.records.iter().map(serde_json::to_value).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.records)
    }

    pub fn clear(&mut self) {
        dlog!("store cleared records={}", self.records.len());
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkoutRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[WorkoutRecord] {
        &self.records
    }
}

fn parse_raw(text: &str) -> Result<Vec<JsonValue>, StoreError> {
    let value: JsonValue = serde_json::from_str(text)
        .map_err(|e| StoreError::PersistenceCorrupt(e.to_string()))?;

    match value {
        JsonValue::Array(items) => Ok(items),
        JsonValue::Null => Ok(Vec::new()),
        other => Err(StoreError::PersistenceCorrupt(format!(
            "expected an array, found {}",
            json_type_name(&other)
        ))),
    }
}

const fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
