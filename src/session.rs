use crate::database::{KeyValueStore, WORKOUTS_KEY};
use crate::dlog;
use crate::error::{LocationUnavailable, ValidationError};
use crate::render::{ListEntry, popup_class, popup_content};
use crate::store::WorkoutStore;
use crate::types::{Coordinates, DEFAULT_ZOOM, WorkoutDetails, WorkoutKind, WorkoutRecord};

/// Interactive map. Location picks are delivered by calling
/// [`SessionController::handle_location_pick`].
pub trait MapSurface {
    fn set_view(&mut self, center: Coordinates, zoom: u8);
    fn add_marker(&mut self, at: Coordinates, popup_content: &str, style_class: &str);
    fn clear_markers(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Type,
    Distance,
    Duration,
    Cadence,
    Elevation,
}

impl FormField {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Distance => "distance",
            Self::Duration => "duration",
            Self::Cadence => "cadence",
            Self::Elevation => "elevation",
        }
    }
}

/// Workout entry form. Submissions are delivered by calling
/// [`SessionController::submit`].
pub trait FormSurface {
    /// Raw text of a field, as typed.
    fn read_field(&self, field: FormField) -> String;
    fn show(&mut self);
    fn hide(&mut self);
    fn toggle_field_visibility(&mut self, field: FormField);
    fn clear(&mut self);
    fn focus_field(&mut self, field: FormField);
}

pub trait WorkoutListView {
    fn render_entry(&mut self, entry: &ListEntry);
    /// Drop every rendered entry.
    fn reinitialize(&mut self);
}

/// One-line user notifications.
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// One-shot location lookup.
pub trait LocationProvider {
    fn current_location(&mut self) -> Result<Coordinates, LocationUnavailable>;
}

/// The view capabilities a controller drives.
pub struct SessionContext {
    pub map: Box<dyn MapSurface>,
    pub form: Box<dyn FormSurface>,
    pub list: Box<dyn WorkoutListView>,
    pub notifier: Box<dyn Notifier>,
}

impl SessionContext {
    fn render(&mut self, record: &WorkoutRecord, with_marker: bool) {
        if with_marker {
            self.map.add_marker(
                record.coordinates(),
                &popup_content(record),
                &popup_class(record.kind()),
            );
        }
        self.list.render_entry(&ListEntry::from_record(record));
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionState {
    Idle,
    AwaitingInput { location: Coordinates },
}

/// Owns the workout store for the session and reacts to view events.
pub struct SessionController {
    ctx: SessionContext,
    storage: Box<dyn KeyValueStore>,
    store: WorkoutStore,
    state: SessionState,
    map_ready: bool,
    // Cleared when stored workouts could not be read; writing then would
    // replace them with this session's records only.
    can_persist: bool,
}

impl SessionController {
    pub fn new(ctx: SessionContext, storage: Box<dyn KeyValueStore>) -> Self {
        Self {
            ctx,
            storage,
            store: WorkoutStore::new(),
            state: SessionState::Idle,
            map_ready: false,
            can_persist: true,
        }
    }

    /// Center the map on the current location, then restore persisted
    /// workouts and render each of them. Without a location the map stays
    /// uninitialised and only list entries are rendered.
    pub fn start(&mut self, location: &mut dyn LocationProvider) {
        match location.current_location() {
            Ok(here) => {
                tracing::info!(location = %here, "map centered on current location");
                self.ctx.map.set_view(here, DEFAULT_ZOOM);
                self.map_ready = true;
            }
            Err(err) => {
                tracing::warn!(err = %err, "starting without a map");
                self.ctx.notifier.notify("Could not get your position");
            }
        }

        self.load();
    }

    fn load(&mut self) {
        let text = match self.storage.get(WORKOUTS_KEY) {
            Ok(Some(text)) => text,
            Ok(None) => {
                dlog!("no stored workouts key={WORKOUTS_KEY}");
                return;
            }
            Err(err) => {
                tracing::error!(err = %err, "reading stored workouts failed; saving disabled");
                self.can_persist = false;
                self.ctx
                    .notifier
                    .notify("Could not read saved workouts; new workouts will not be saved");
                return;
            }
        };

        match self.store.restore_json(&text) {
            Ok(report) => tracing::info!(
                restored = report.restored,
                skipped = report.skipped,
                "restored workouts"
            ),
            Err(err) => {
                tracing::warn!(err = %err, "ignoring stored workouts");
                return;
            }
        }

        for record in self.store.iter() {
            self.ctx.render(record, self.map_ready);
        }
    }

    /// Open the form for a new workout at `at`. A second pick while the form
    /// is open replaces the captured location.
    pub fn handle_location_pick(&mut self, at: Coordinates) {
        if !self.map_ready {
            dlog!("location pick without map ignored at={at}");
            return;
        }
        self.state = SessionState::AwaitingInput { location: at };
        self.ctx.form.show();
        self.ctx.form.focus_field(FormField::Distance);
    }

    /// Swap the cadence and elevation fields. Does not touch session state.
    pub fn handle_type_change(&mut self) {
        self.ctx.form.toggle_field_visibility(FormField::Cadence);
        self.ctx.form.toggle_field_visibility(FormField::Elevation);
    }

    /// Validate the form and record a workout at the captured location.
    ///
    /// Returns the new workout's id, or `None` when no location was picked.
    /// On a validation error the user is notified and the form stays open.
    pub fn submit(&mut self) -> Result<Option<String>, ValidationError> {
        let SessionState::AwaitingInput { location } = self.state else {
            dlog!("submit without a picked location ignored");
            return Ok(None);
        };

        let record = match read_workout(self.ctx.form.as_ref(), location) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(err = %err, "workout rejected");
                self.ctx.notifier.notify(err.user_message());
                return Err(err);
            }
        };

        let id = record.id().to_string();
        tracing::info!(id = %id, kind = %record.kind(), "workout added");
        self.store.append(record);
        if let Some(record) = self.store.records().last() {
            self.ctx.render(record, self.map_ready);
        }
        self.persist();

        self.ctx.form.clear();
        self.ctx.form.hide();
        self.state = SessionState::Idle;
        Ok(Some(id))
    }

    /// Close the form without recording anything.
    pub fn cancel(&mut self) {
        if let SessionState::AwaitingInput { .. } = self.state {
            self.ctx.form.clear();
            self.ctx.form.hide();
            self.state = SessionState::Idle;
        }
    }

    /// Re-center the map on a listed workout. Unknown ids are ignored.
    pub fn select_entry(&mut self, id: &str) {
        if !self.map_ready {
            return;
        }
        match self.store.find_by_id(id) {
            Ok(record) => self.ctx.map.set_view(record.coordinates(), DEFAULT_ZOOM),
            Err(err) => {
                dlog!("list selection ignored id={id}: {err}");
            }
        }
    }

    /// Forget every workout, in memory and in storage, and reset the views.
    pub fn reset(&mut self) {
        self.store.clear();
        match self.storage.remove(WORKOUTS_KEY) {
            // Nothing stored is left to overwrite.
            Ok(()) => self.can_persist = true,
            Err(err) => {
                tracing::error!(err = %err, "removing stored workouts failed");
                self.ctx.notifier.notify("Could not erase saved workouts");
            }
        }
        self.state = SessionState::Idle;
        self.ctx.form.clear();
        self.ctx.form.hide();
        self.ctx.map.clear_markers();
        self.ctx.list.reinitialize();
        tracing::info!("workouts reset");
    }

    fn persist(&mut self) {
        if !self.can_persist {
            dlog!("save skipped: stored workouts were never read");
            return;
        }
        let json = match self.store.to_json() {
            Ok(json) => json,
            Err(err) => {
                tracing::error!(err = %err, "serializing workouts failed");
                self.ctx.notifier.notify("Could not save workouts");
                return;
            }
        };

        if let Err(err) = self.storage.set(WORKOUTS_KEY, &json) {
            tracing::error!(err = %err, "saving workouts failed");
            self.ctx.notifier.notify("Could not save workouts");
        }
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub const fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub const fn is_map_ready(&self) -> bool {
        self.map_ready
    }

    pub const fn can_persist(&self) -> bool {
        self.can_persist
    }

    pub fn into_storage(self) -> Box<dyn KeyValueStore> {
        self.storage
    }
}

/// Read and validate the form, then build the record.
///
/// Distance and duration must be positive for both kinds, cadence must be
/// positive for running; elevation gain only has to be a number.
pub fn read_workout(
    form: &dyn FormSurface,
    at: Coordinates,
) -> Result<WorkoutRecord, ValidationError> {
    let kind: WorkoutKind = form.read_field(FormField::Type).parse()?;
    let distance = positive_field(form, FormField::Distance)?;
    let duration = positive_field(form, FormField::Duration)?;

    let record = match kind {
        WorkoutKind::Running => {
            let cadence = positive_field(form, FormField::Cadence)?;
            WorkoutRecord::running(distance, duration, at, cadence)
        }
        WorkoutKind::Cycling => {
            let elevation = number_field(form, FormField::Elevation)?;
            WorkoutRecord::cycling(distance, duration, at, elevation)
        }
    };

    // JSON has no infinity, so such a record would not survive a reload.
    let (metric, value) = match *record.details() {
        WorkoutDetails::Running {
            pace_min_per_km, ..
        } => ("pace", pace_min_per_km),
        WorkoutDetails::Cycling {
            speed_km_per_hr, ..
        } => ("speed", speed_km_per_hr),
    };
    if !value.is_finite() {
        return Err(ValidationError::MetricOutOfRange { metric });
    }

    Ok(record)
}

fn positive_field(form: &dyn FormSurface, field: FormField) -> Result<f64, ValidationError> {
    let v = number_field(form, field)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(ValidationError::NotPositive {
            field: field.name(),
        })
    }
}

fn number_field(form: &dyn FormSurface, field: FormField) -> Result<f64, ValidationError> {
    parse_number(&form.read_field(field)).ok_or(ValidationError::NotANumber {
        field: field.name(),
    })
}

/// Number-input coercion: blank reads as zero, anything non-finite is
/// rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct StaticForm(HashMap<FormField, &'static str>);

    impl StaticForm {
        fn new(fields: &[(FormField, &'static str)]) -> Self {
            Self(fields.iter().copied().collect())
        }
    }

    impl FormSurface for StaticForm {
        fn read_field(&self, field: FormField) -> String {
            self.0.get(&field).copied().unwrap_or_default().to_string()
        }
        fn show(&mut self) {}
        fn hide(&mut self) {}
        fn toggle_field_visibility(&mut self, _field: FormField) {}
        fn clear(&mut self) {}
        fn focus_field(&mut self, _field: FormField) {}
    }

    const AT: Coordinates = Coordinates::new(69.0, 69.0);

    #[test]
    fn parse_number_coerces_like_a_number_input() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number(""), Some(0.0));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn valid_running_form_builds_running_record() {
        let form = StaticForm::new(&[
            (FormField::Type, "running"),
            (FormField::Distance, "10"),
            (FormField::Duration, "45"),
            (FormField::Cadence, "200"),
        ]);
        let w = read_workout(&form, AT).unwrap();
        assert_eq!(w.kind(), WorkoutKind::Running);
        assert_eq!(w.pace_min_per_km(), Some(4.5));
        assert_eq!(w.coordinates(), AT);
    }

    #[test]
    fn cycling_accepts_zero_or_blank_elevation() {
        for elevation in ["0", "", "-20"] {
            let form = StaticForm::new(&[
                (FormField::Type, "cycling"),
                (FormField::Distance, "20"),
                (FormField::Duration, "60"),
                (FormField::Elevation, elevation),
            ]);
            let w = read_workout(&form, AT).unwrap();
            assert_eq!(w.speed_km_per_hr(), Some(20.0));
        }
    }

    #[test]
    fn rejects_non_positive_and_non_numeric_fields() {
        let cases = [
            (
                ("running", "10", "45", "-1", ""),
                ValidationError::NotPositive { field: "cadence" },
            ),
            (
                ("running", "0", "45", "180", ""),
                ValidationError::NotPositive { field: "distance" },
            ),
            (
                ("cycling", "20", "", "", "5"),
                ValidationError::NotPositive { field: "duration" },
            ),
            (
                ("cycling", "20", "60", "", "lots"),
                ValidationError::NotANumber { field: "elevation" },
            ),
            (
                ("running", "ten", "45", "180", ""),
                ValidationError::NotANumber { field: "distance" },
            ),
        ];

        for ((kind, distance, duration, cadence, elevation), expected) in cases {
            let form = StaticForm::new(&[
                (FormField::Type, kind),
                (FormField::Distance, distance),
                (FormField::Duration, duration),
                (FormField::Cadence, cadence),
                (FormField::Elevation, elevation),
            ]);
            assert_eq!(read_workout(&form, AT).unwrap_err(), expected);
        }
    }

    #[test]
    fn rejects_inputs_whose_pace_or_speed_overflows() {
        let running = StaticForm::new(&[
            (FormField::Type, "running"),
            (FormField::Distance, "1e-310"),
            (FormField::Duration, "30"),
            (FormField::Cadence, "180"),
        ]);
        assert_eq!(
            read_workout(&running, AT).unwrap_err(),
            ValidationError::MetricOutOfRange { metric: "pace" }
        );

        let cycling = StaticForm::new(&[
            (FormField::Type, "cycling"),
            (FormField::Distance, "1e300"),
            (FormField::Duration, "1e-300"),
            (FormField::Elevation, "0"),
        ]);
        assert_eq!(
            read_workout(&cycling, AT).unwrap_err(),
            ValidationError::MetricOutOfRange { metric: "speed" }
        );
    }

    #[test]
    fn accepts_huge_but_finite_pace() {
        let form = StaticForm::new(&[
            (FormField::Type, "running"),
            (FormField::Distance, "1"),
            (FormField::Duration, "1.7e308"),
            (FormField::Cadence, "180"),
        ]);
        let w = read_workout(&form, AT).unwrap();
        assert_eq!(w.pace_min_per_km(), Some(1.7e308));
    }

    #[test]
    fn rejects_unknown_workout_type() {
        let form = StaticForm::new(&[
            (FormField::Type, "rowing"),
            (FormField::Distance, "5"),
            (FormField::Duration, "30"),
        ]);
        assert_eq!(
            read_workout(&form, AT).unwrap_err(),
            ValidationError::UnknownKind("rowing".to_string())
        );
    }
}
