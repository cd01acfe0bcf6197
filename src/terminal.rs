//! Terminal stand-ins for the map, form, list and notification surfaces.

use crate::cli::AddWorkout;
use crate::dlog;
use crate::error::LocationUnavailable;
use crate::render::ListEntry;
use crate::session::{
    FormField, FormSurface, LocationProvider, MapSurface, Notifier, WorkoutListView,
};
use crate::types::Coordinates;
use std::collections::{HashMap, HashSet};

/// Prints view changes instead of drawing them.
#[derive(Debug, Default)]
pub struct TerminalMap {
    echo: bool,
    markers: usize,
}

impl TerminalMap {
    pub const fn new(echo: bool) -> Self {
        Self { echo, markers: 0 }
    }
}

impl MapSurface for TerminalMap {
    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        if self.echo {
            println!("map centered on {center} (zoom {zoom})");
        }
    }

    fn add_marker(&mut self, at: Coordinates, popup_content: &str, style_class: &str) {
        self.markers += 1;
        dlog!("marker at={at} class={style_class} content={popup_content}");
    }

    fn clear_markers(&mut self) {
        dlog!("markers cleared count={}", self.markers);
        self.markers = 0;
    }
}

/// Form whose fields were filled from command-line arguments.
#[derive(Debug)]
pub struct ArgsForm {
    values: HashMap<FormField, String>,
    hidden: HashSet<FormField>,
    open: bool,
}

impl Default for ArgsForm {
    fn default() -> Self {
        // Running layout: elevation starts hidden.
        Self {
            values: HashMap::new(),
            hidden: HashSet::from([FormField::Elevation]),
            open: false,
        }
    }
}

impl ArgsForm {
    pub fn from_args(workout: &AddWorkout) -> Self {
        let mut form = Self::default();
        let fields = match workout {
            AddWorkout::Running {
                distance,
                duration,
                cadence,
                ..
            } => [
                (FormField::Type, "running"),
                (FormField::Distance, distance.as_str()),
                (FormField::Duration, duration.as_str()),
                (FormField::Cadence, cadence.as_str()),
            ],
            AddWorkout::Cycling {
                distance,
                duration,
                elevation,
                ..
            } => [
                (FormField::Type, "cycling"),
                (FormField::Distance, distance.as_str()),
                (FormField::Duration, duration.as_str()),
                (FormField::Elevation, elevation.as_str()),
            ],
        };
        for (field, value) in fields {
            form.values.insert(field, value.to_string());
        }
        form
    }

    pub fn is_visible(&self, field: FormField) -> bool {
        !self.hidden.contains(&field)
    }

    pub const fn is_open(&self) -> bool {
        self.open
    }
}

impl FormSurface for ArgsForm {
    fn read_field(&self, field: FormField) -> String {
        self.values.get(&field).cloned().unwrap_or_default()
    }

    fn show(&mut self) {
        self.open = true;
    }

    fn hide(&mut self) {
        self.open = false;
    }

    fn toggle_field_visibility(&mut self, field: FormField) {
        if !self.hidden.remove(&field) {
            self.hidden.insert(field);
        }
    }

    fn clear(&mut self) {
        // The type selector keeps its value, like a <select>.
        self.values.retain(|field, _| *field == FormField::Type);
    }

    fn focus_field(&mut self, field: FormField) {
        dlog!("focus field={}", field.name());
    }
}

/// Prints list entries to stdout.
#[derive(Debug, Default)]
pub struct TerminalList {
    echo: bool,
}

impl TerminalList {
    pub const fn new(echo: bool) -> Self {
        Self { echo }
    }
}

impl WorkoutListView for TerminalList {
    fn render_entry(&mut self, entry: &ListEntry) {
        if self.echo {
            println!("{}", entry.to_line());
        }
    }

    fn reinitialize(&mut self) {
        if self.echo {
            println!("workout list cleared");
        }
    }
}

/// Notifications go to stderr.
#[derive(Debug, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

/// Reports a location given up front, or failure when none was given.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Option<Coordinates>);

impl LocationProvider for FixedLocation {
    fn current_location(&mut self) -> Result<Coordinates, LocationUnavailable> {
        self.0
            .ok_or_else(|| LocationUnavailable("no --here location given".to_string()))
    }
}
