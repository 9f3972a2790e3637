#[macro_use]
extern crate prettytable;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Local, NaiveDate};
use directories::ProjectDirs;
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod calendar;
mod cli;
mod error;
mod interface;
mod model;
mod planner;
mod storage;
mod store;
mod time;

use crate::planner::Planner;
use crate::storage::Storage;
use crate::store::TaskStore;
use cli::{Command::*, CommandLineArgs};

fn find_default_storage_file() -> Option<PathBuf> {
    let base_dirs = ProjectDirs::from("com", "gozque", "dayslots")?;
    let root_dir = base_dirs.data_dir();
    if !root_dir.exists() {
        std::fs::create_dir_all(root_dir).ok()?;
    }
    let mut path = PathBuf::from(root_dir);
    path.push("storage.sqlite");
    Some(path)
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    // Get the command-line arguments.
    let CommandLineArgs {
        action,
        storage_file,
        date,
    } = CommandLineArgs::from_args();

    // Unpack the storage file.
    let storage_file = storage_file
        .or_else(find_default_storage_file)
        .ok_or_else(|| anyhow!("Failed to find storage file."))?;
    debug!(path = %storage_file.display(), "opening storage");

    let storage = Storage::open(&storage_file)
        .with_context(|| format!("Failed to open {}.", storage_file.display()))?;
    let mut store = TaskStore::open(storage);

    let now: DateTime<Local> = Local::now();
    let today = now.date_naive();

    // Perform the action.
    match action {
        Add {
            description,
            hours,
            minutes,
            estimate,
            at,
        } => {
            let estimated_time = interface::estimated_time(estimate, hours, minutes);
            let mut planner = planner_for(&mut store, date, today);
            interface::add_task(&mut planner, description, estimated_time, at, now)
        }
        Actual {
            hour,
            hours,
            minutes,
        } => {
            let mut planner = planner_for(&mut store, date, today);
            interface::set_actual_time(&mut planner, hour, &hours, &minutes)
        }
        Done { hour } => interface::toggle_completed(&mut planner_for(&mut store, date, today), hour),
        Rm { hour } => interface::remove_task(&mut planner_for(&mut store, date, today), hour),
        List => interface::list(&planner_for(&mut store, date, today)),
        Summary => interface::summary(&planner_for(&mut store, date, today)),
        Clear { yes } => interface::clear(&mut planner_for(&mut store, date, today), yes),
        Calendar { action } => {
            interface::calendar(&mut planner_for(&mut store, date, today), action, today)
        }
    }?;
    Ok(())
}

/// The planner on the date given on the command line, or else on the
/// date selected in the calendar.
fn planner_for(store: &mut TaskStore, date: Option<NaiveDate>, today: NaiveDate) -> Planner<'_> {
    let active_date =
        date.unwrap_or_else(|| calendar::Calendar::load(store.storage(), today).selected_date());
    Planner::new(store, active_date)
}
