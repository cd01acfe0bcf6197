#![deny(warnings, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Result, bail};
use clap::Parser;
use mapty::cli::{AddWorkout, Cli, Cmd};
use mapty::database::SqliteStore;
use mapty::session::{SessionContext, SessionController};
use mapty::terminal::{ArgsForm, FixedLocation, StderrNotifier, TerminalList, TerminalMap};
use mapty::utils;

#[macro_use]
extern crate mapty;

fn main() -> Result<()> {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let storage = SqliteStore::open(&cli.db)?;
    dlog!("mode={:?} db={}", cli.cmd, cli.db.display());

    let (form, here) = match &cli.cmd {
        Cmd::Add { workout } => {
            let at = match workout {
                AddWorkout::Running { at, .. } | AddWorkout::Cycling { at, .. } => *at,
            };
            // Adding implies the map is open where the workout happened.
            (ArgsForm::from_args(workout), cli.here.or(Some(at)))
        }
        _ => (ArgsForm::default(), cli.here),
    };

    let echo_list = matches!(cli.cmd, Cmd::List | Cmd::Add { .. });
    let echo_map = matches!(cli.cmd, Cmd::Show { .. });
    let ctx = SessionContext {
        map: Box::new(TerminalMap::new(echo_map)),
        form: Box::new(form),
        list: Box::new(TerminalList::new(echo_list)),
        notifier: Box::new(StderrNotifier),
    };

    let mut session = SessionController::new(ctx, Box::new(storage));
    session.start(&mut FixedLocation(here));

    match cli.cmd {
        Cmd::Add { workout } => {
            let at = match workout {
                AddWorkout::Running { at, .. } => at,
                AddWorkout::Cycling { at, .. } => {
                    session.handle_type_change();
                    at
                }
            };
            session.handle_location_pick(at);
            match session.submit() {
                Ok(Some(id)) => println!("added {id}"),
                Ok(None) => bail!("map is not available; pass --here LAT,LNG"),
                Err(err) => bail!("workout not saved: {err}"),
            }
        }
        Cmd::List => {
            if session.store().is_empty() {
                println!("no workouts yet");
            }
        }
        Cmd::Show { id } => {
            if !session.is_map_ready() {
                bail!("map is not available; pass --here LAT,LNG");
            }
            session.select_entry(&id);
        }
        Cmd::Reset => {
            let n = session.store().len();
            session.reset();
            println!("removed {n} workouts");
        }
    }

    Ok(())
}
