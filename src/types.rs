use crate::error::ValidationError;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Zoom level used when centering the map on a location or a workout.
pub const DEFAULT_ZOOM: u8 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "running" => Ok(Self::Running),
            "cycling" => Ok(Self::Cycling),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

/// Variant payload of a workout. The `kind` tag travels with it when
/// serialized, so a stored record comes back as the same variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum WorkoutDetails {
    Running {
        cadence_spm: f64,
        pace_min_per_km: f64,
    },
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_hr: f64,
    },
}

impl WorkoutDetails {
    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// One completed workout. Fields are fixed at construction; there are no
/// setters and derived metrics are never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    id: String,
    created_at: DateTime<Utc>,
    distance_km: f64,
    duration_min: f64,
    coordinates: Coordinates,
    label: String,
    #[serde(flatten)]
    details: WorkoutDetails,
}

impl WorkoutRecord {
    /// Inputs are expected to be validated already (finite, distance and
    /// duration strictly positive).
    pub fn running(
        distance_km: f64,
        duration_min: f64,
        coordinates: Coordinates,
        cadence_spm: f64,
    ) -> Self {
        Self::running_at(Utc::now(), distance_km, duration_min, coordinates, cadence_spm)
    }

    pub fn running_at(
        created_at: DateTime<Utc>,
        distance_km: f64,
        duration_min: f64,
        coordinates: Coordinates,
        cadence_spm: f64,
    ) -> Self {
        let details = WorkoutDetails::Running {
            cadence_spm,
            pace_min_per_km: pace(distance_km, duration_min),
        };
        Self::with_details(created_at, distance_km, duration_min, coordinates, details)
    }

    pub fn cycling(
        distance_km: f64,
        duration_min: f64,
        coordinates: Coordinates,
        elevation_gain_m: f64,
    ) -> Self {
        Self::cycling_at(
            Utc::now(),
            distance_km,
            duration_min,
            coordinates,
            elevation_gain_m,
        )
    }

    pub fn cycling_at(
        created_at: DateTime<Utc>,
        distance_km: f64,
        duration_min: f64,
        coordinates: Coordinates,
        elevation_gain_m: f64,
    ) -> Self {
        let details = WorkoutDetails::Cycling {
            elevation_gain_m,
            speed_km_per_hr: speed(distance_km, duration_min),
        };
        Self::with_details(created_at, distance_km, duration_min, coordinates, details)
    }

    fn with_details(
        created_at: DateTime<Utc>,
        distance_km: f64,
        duration_min: f64,
        coordinates: Coordinates,
        details: WorkoutDetails,
    ) -> Self {
        let local_day = created_at.with_timezone(&Local).date_naive();
        Self {
            id: new_id(),
            created_at,
            distance_km,
            duration_min,
            coordinates,
            label: describe(details.kind(), local_day),
            details,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub const fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub const fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub const fn kind(&self) -> WorkoutKind {
        self.details.kind()
    }

    pub const fn details(&self) -> &WorkoutDetails {
        &self.details
    }

    pub const fn pace_min_per_km(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Running {
                pace_min_per_km, ..
            } => Some(pace_min_per_km),
            WorkoutDetails::Cycling { .. } => None,
        }
    }

    pub const fn speed_km_per_hr(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Cycling {
                speed_km_per_hr, ..
            } => Some(speed_km_per_hr),
            WorkoutDetails::Running { .. } => None,
        }
    }

    pub const fn cadence_spm(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Running { cadence_spm, .. } => Some(cadence_spm),
            WorkoutDetails::Cycling { .. } => None,
        }
    }

    pub const fn elevation_gain_m(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Cycling {
                elevation_gain_m, ..
            } => Some(elevation_gain_m),
            WorkoutDetails::Running { .. } => None,
        }
    }
}

/// Round to one decimal place, halves away from zero. Values too large to
/// scale are already whole and come back unchanged.
pub fn round_one_decimal(value: f64) -> f64 {
    let scaled = value * 10.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 10.0
}

/// Minutes per kilometre.
pub fn pace(distance_km: f64, duration_min: f64) -> f64 {
    round_one_decimal(duration_min / distance_km)
}

/// Kilometres per hour.
pub fn speed(distance_km: f64, duration_min: f64) -> f64 {
    round_one_decimal(distance_km / (duration_min / 60.0))
}

/// "Running on April 14"
pub fn describe(kind: WorkoutKind, day: NaiveDate) -> String {
    format!("{} on {}", kind.title(), day.format("%B %-d"))
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    const HERE: Coordinates = Coordinates::new(69.0, 69.0);

    #[test]
    fn running_pace_is_duration_over_distance_rounded() {
        for (distance, duration) in [(10.0, 45.0), (3.0, 20.0), (7.5, 41.0), (0.4, 3.0)] {
            let w = WorkoutRecord::running(distance, duration, HERE, 170.0);
            assert_eq!(
                w.pace_min_per_km(),
                Some(round_one_decimal(duration / distance))
            );
            assert_eq!(w.speed_km_per_hr(), None);
        }

        let w = WorkoutRecord::running(10.0, 45.0, HERE, 200.0);
        assert_eq!(w.pace_min_per_km(), Some(4.5));
        assert_eq!(w.cadence_spm(), Some(200.0));
        assert_eq!(w.kind(), WorkoutKind::Running);
    }

    #[test]
    fn cycling_speed_is_distance_per_hour_rounded() {
        for (distance, duration) in [(20.0, 60.0), (27.0, 95.0), (5.0, 7.0)] {
            let w = WorkoutRecord::cycling(distance, duration, HERE, 0.0);
            assert_eq!(
                w.speed_km_per_hr(),
                Some(round_one_decimal(distance / (duration / 60.0)))
            );
        }

        let w = WorkoutRecord::cycling(20.0, 60.0, HERE, 300.0);
        assert_eq!(w.speed_km_per_hr(), Some(20.0));
        assert_eq!(w.elevation_gain_m(), Some(300.0));
        assert_eq!(w.pace_min_per_km(), None);
    }

    #[test]
    fn rounding_goes_away_from_zero_on_halves() {
        assert_eq!(round_one_decimal(0.25), 0.3);
        assert_eq!(round_one_decimal(-0.25), -0.3);
        assert_eq!(round_one_decimal(4.44), 4.4);
        assert_eq!(round_one_decimal(2.0), 2.0);
    }

    #[test]
    fn rounding_huge_values_stays_finite() {
        assert_eq!(round_one_decimal(1.7e308), 1.7e308);
        assert_eq!(round_one_decimal(-1.7e308), -1.7e308);

        let w = WorkoutRecord::running(1.0, 1.7e308, HERE, 150.0);
        assert_eq!(w.pace_min_per_km(), Some(1.7e308));
    }

    #[test]
    fn label_names_kind_month_and_day() {
        let day = NaiveDate::from_ymd_opt(2024, 4, 14).unwrap();
        assert_eq!(describe(WorkoutKind::Running, day), "Running on April 14");
        assert_eq!(describe(WorkoutKind::Cycling, day), "Cycling on April 14");

        let created = Utc.with_ymd_and_hms(2024, 4, 14, 12, 0, 0).unwrap();
        let w = WorkoutRecord::cycling_at(created, 1.0, 5.0, HERE, 0.0);
        let local_day = created.with_timezone(&Local).date_naive();
        assert_eq!(w.label(), describe(WorkoutKind::Cycling, local_day));
        assert_eq!(w.created_at(), created);
    }

    #[test]
    fn ids_do_not_collide_under_rapid_creation() {
        let ids: HashSet<String> = (0..1000)
            .map(|_| WorkoutRecord::running(1.0, 5.0, HERE, 150.0).id().to_string())
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn serializes_as_flat_camel_case_field_bag() {
        let w = WorkoutRecord::running(10.0, 45.0, HERE, 200.0);
        let v = serde_json::to_value(&w).unwrap();

        assert_eq!(v["kind"], "running");
        assert_eq!(v["id"], w.id());
        assert_eq!(v["distanceKm"], 10.0);
        assert_eq!(v["durationMin"], 45.0);
        assert_eq!(v["cadenceSpm"], 200.0);
        assert_eq!(v["paceMinPerKm"], 4.5);
        assert_eq!(v["coordinates"]["lat"], 69.0);
        assert_eq!(v["coordinates"]["lng"], 69.0);
        assert_eq!(v["label"], w.label());
        assert!(v["createdAt"].is_string());
        assert!(v.get("speedKmPerHr").is_none());
    }

    #[test]
    fn deserializing_keeps_variant_and_stored_metrics() {
        let raw = serde_json::json!({
            "id": "abc",
            "kind": "cycling",
            "createdAt": "2024-04-14T10:00:00.000Z",
            "distanceKm": 20.0,
            "durationMin": 60.0,
            "coordinates": { "lat": 1.5, "lng": 2.5 },
            "label": "Cycling on April 14",
            "elevationGainM": 300.0,
            "speedKmPerHr": 19.0
        });
        let w: WorkoutRecord = serde_json::from_value(raw).unwrap();

        assert_eq!(w.id(), "abc");
        assert_eq!(w.kind(), WorkoutKind::Cycling);
        // Stored value wins; nothing is re-derived on load.
        assert_eq!(w.speed_km_per_hr(), Some(19.0));
        assert_eq!(w.label(), "Cycling on April 14");
        assert_eq!(w.coordinates(), Coordinates::new(1.5, 2.5));
    }

    #[test]
    fn created_at_keeps_the_instant_in_utc_form() {
        let raw = serde_json::json!({
            "id": "abc",
            "kind": "running",
            "createdAt": "2024-04-14T12:00:00.000+02:00",
            "distanceKm": 10.0,
            "durationMin": 45.0,
            "coordinates": { "lat": 1.5, "lng": 2.5 },
            "label": "Running on April 14",
            "cadenceSpm": 180.0,
            "paceMinPerKm": 4.5
        });
        let w: WorkoutRecord = serde_json::from_value(raw).unwrap();

        assert_eq!(
            w.created_at(),
            Utc.with_ymd_and_hms(2024, 4, 14, 10, 0, 0).unwrap()
        );
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["createdAt"], "2024-04-14T10:00:00Z");
    }

    #[test]
    fn kind_parses_only_known_names() {
        assert_eq!("running".parse::<WorkoutKind>().unwrap(), WorkoutKind::Running);
        assert_eq!(" cycling ".parse::<WorkoutKind>().unwrap(), WorkoutKind::Cycling);
        assert!(matches!(
            "swimming".parse::<WorkoutKind>(),
            Err(ValidationError::UnknownKind(k)) if k == "swimming"
        ));
    }
}
