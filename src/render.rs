//! Display content derived from a workout record. The marker and list views
//! only read these; nothing here touches the store.

use crate::types::{WorkoutDetails, WorkoutKind, WorkoutRecord};

pub const fn icon(kind: WorkoutKind) -> &'static str {
    match kind {
        WorkoutKind::Running => "🏃‍♂️",
        WorkoutKind::Cycling => "🚴‍♀️",
    }
}

/// Marker popup text, e.g. "🏃‍♂️ Running on April 14".
pub fn popup_content(record: &WorkoutRecord) -> String {
    format!("{} {}", icon(record.kind()), record.label())
}

/// Style class for the marker popup, e.g. "running-popup".
pub fn popup_class(kind: WorkoutKind) -> String {
    format!("{kind}-popup")
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub icon: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

/// Everything a list entry shows for one workout, keyed by the record id.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub id: String,
    pub kind: WorkoutKind,
    pub title: String,
    pub rows: [DetailRow; 4],
}

impl ListEntry {
    pub fn from_record(record: &WorkoutRecord) -> Self {
        let (metric, extra) = match *record.details() {
            WorkoutDetails::Running {
                cadence_spm,
                pace_min_per_km,
            } => (
                DetailRow {
                    icon: "⚡️",
                    value: pace_min_per_km,
                    unit: "min/km",
                },
                DetailRow {
                    icon: "🦶🏼",
                    value: cadence_spm,
                    unit: "spm",
                },
            ),
            WorkoutDetails::Cycling {
                elevation_gain_m,
                speed_km_per_hr,
            } => (
                DetailRow {
                    icon: "⚡️",
                    value: speed_km_per_hr,
                    unit: "km/h",
                },
                DetailRow {
                    icon: "⛰",
                    value: elevation_gain_m,
                    unit: "m",
                },
            ),
        };

        Self {
            id: record.id().to_string(),
            kind: record.kind(),
            title: record.label().to_string(),
            rows: [
                DetailRow {
                    icon: icon(record.kind()),
                    value: record.distance_km(),
                    unit: "km",
                },
                DetailRow {
                    icon: "⏱",
                    value: record.duration_min(),
                    unit: "min",
                },
                metric,
                extra,
            ],
        }
    }

    /// One-line text form used by the terminal list.
    pub fn to_line(&self) -> String {
        let details: Vec<String> = self
            .rows
            .iter()
            .map(|r| format!("{} {} {}", r.icon, r.value, r.unit))
            .collect();
        format!("[{}] {}  {}", self.id, self.title, details.join("  "))
    }
}
