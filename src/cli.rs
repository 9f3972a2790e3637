use chrono::NaiveDate;
use humantime::parse_duration;
use std::path::PathBuf;
use std::time::Duration;
use structopt::StructOpt;

use crate::model::is_slot_hour;

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Write a task into a slot of the active date.
    Add {
        /// The task description text.
        #[structopt()]
        description: String,

        /// Estimated hours.
        #[structopt(short = "H", long)]
        hours: Option<String>,

        /// Estimated minutes.
        #[structopt(short = "M", long)]
        minutes: Option<String>,

        /// The estimated duration as a single value, e.g. "1h 30m" (parse_duration).
        /// Takes precedence over --hours and --minutes.
        #[structopt(short, long, parse(try_from_str=parse_duration))]
        estimate: Option<Duration>,

        /// The slot hour. Defaults to the first free slot from now on.
        #[structopt(long, parse(try_from_str=parse_slot_hour))]
        at: Option<u32>,
    },
    /// Record the time actually spent on the task of a slot.
    Actual {
        #[structopt(parse(try_from_str=parse_slot_hour))]
        hour: u32,

        hours: String,

        #[structopt(default_value = "0")]
        minutes: String,
    },
    /// Mark the task of a slot as done, or as not done if it was.
    Done {
        #[structopt(parse(try_from_str=parse_slot_hour))]
        hour: u32,
    },
    /// Remove the task of a slot.
    Rm {
        #[structopt(parse(try_from_str=parse_slot_hour))]
        hour: u32,
    },
    /// List the slots and the summary of the active date.
    List,
    /// Show estimated against actual time for the active date.
    Summary,
    /// Remove every task of every date.
    Clear {
        /// Confirm that all tasks should go.
        #[structopt(short, long)]
        yes: bool,
    },
    /// Show the calendar, move through months or pick the active date.
    Calendar {
        #[structopt(subcommand)]
        action: Option<CalendarAction>,
    },
}

#[derive(Debug, StructOpt)]
pub enum CalendarAction {
    /// Show the displayed month.
    Show,
    /// Display the previous month.
    Prev,
    /// Display the next month.
    Next,
    /// Display the current month and select today.
    Today,
    /// Select a day of the displayed month as the active date.
    Pick {
        day: u32,
    },
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "dayslots",
    about = "An hourly day planner, from 9 to 5."
)]
pub struct CommandLineArgs {
    #[structopt(subcommand)]
    pub action: Command,

    /// Use a different storage file.
    #[structopt(parse(from_os_str), short, long, env = "DAYSLOTS_STORAGE")]
    pub storage_file: Option<PathBuf>,

    /// Work on this date (YYYY-MM-DD) instead of the one selected in the calendar.
    #[structopt(short, long)]
    pub date: Option<NaiveDate>,
}

fn parse_slot_hour(text: &str) -> Result<u32, String> {
    let hour = text
        .parse::<u32>()
        .map_err(|_| format!("'{}' is not an hour", text))?;
    if is_slot_hour(hour) {
        Ok(hour)
    } else {
        Err(format!("there is no slot at {}, slots go from 9 to 17", hour))
    }
}
