use crate::types::Coordinates;
use crate::utils::parse_coordinates;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_DB: &str = "mapty.sqlite3";

fn coordinates(s: &str) -> Result<Coordinates, String> {
    parse_coordinates(s).map_err(|e| format!("{e:#}"))
}

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log running and cycling workouts at map locations"
)]
pub struct Cli {
    /// SQLite file holding saved workouts.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DB, global = true)]
    pub db: PathBuf,

    /// Current location as LAT,LNG. Without it the map is unavailable.
    #[arg(long, value_name = "LAT,LNG", value_parser = coordinates, allow_hyphen_values = true, global = true)]
    pub here: Option<Coordinates>,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Record a workout at a location.
    Add {
        #[command(subcommand)]
        workout: AddWorkout,
    },
    /// Print saved workouts, oldest first.
    List,
    /// Center the map on a saved workout.
    Show {
        /// Workout id as printed by `list`.
        id: String,
    },
    /// Delete every saved workout.
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum AddWorkout {
    Running {
        #[arg(long, value_name = "LAT,LNG", value_parser = coordinates, allow_hyphen_values = true)]
        at: Coordinates,
        /// Kilometres.
        #[arg(long, allow_hyphen_values = true)]
        distance: String,
        /// Minutes.
        #[arg(long, allow_hyphen_values = true)]
        duration: String,
        /// Steps per minute.
        #[arg(long, allow_hyphen_values = true)]
        cadence: String,
    },
    Cycling {
        #[arg(long, value_name = "LAT,LNG", value_parser = coordinates, allow_hyphen_values = true)]
        at: Coordinates,
        /// Kilometres.
        #[arg(long, allow_hyphen_values = true)]
        distance: String,
        /// Minutes.
        #[arg(long, allow_hyphen_values = true)]
        duration: String,
        /// Metres climbed.
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        elevation: String,
    },
}
