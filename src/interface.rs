use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, Timelike};
use prettytable::{Cell, Row, Table};
use std::convert::TryFrom;
use std::time::Duration;

use crate::calendar::{Calendar, CellMonth};
use crate::cli::CalendarAction;
use crate::model::{Budget, DaySummary};
use crate::planner::{Planner, Slot};
use crate::time::{format_hour, TimeSpan};

const TEXT_WIDTH: usize = 40;
const EMPTY_SLOT: &str = "No task scheduled";

pub fn add_task(
    planner: &mut Planner,
    description: String,
    estimated_time: TimeSpan,
    at: Option<u32>,
    now: DateTime<Local>,
) -> Result<()> {
    let hour = planner
        .add_task(&description, estimated_time, at, now.hour())?
        .hour;
    print_slot(planner, hour);
    print_summary(&planner.summary());
    Ok(())
}

/// Estimated time from the command line: a humantime duration when given,
/// the separate hours and minutes fields otherwise.
pub fn estimated_time(
    estimate: Option<Duration>,
    hours: Option<String>,
    minutes: Option<String>,
) -> TimeSpan {
    match estimate {
        Some(duration) => {
            TimeSpan::from_minutes(u32::try_from(duration.as_secs() / 60).unwrap_or(u32::MAX))
        }
        None => TimeSpan::parse(
            hours.as_deref().unwrap_or(""),
            minutes.as_deref().unwrap_or(""),
        ),
    }
}

pub fn set_actual_time(planner: &mut Planner, hour: u32, hours: &str, minutes: &str) -> Result<()> {
    if planner
        .set_actual_time(hour, TimeSpan::parse(hours, minutes))?
        .is_some()
    {
        print_slot(planner, hour);
        print_summary(&planner.summary());
    }
    Ok(())
}

pub fn toggle_completed(planner: &mut Planner, hour: u32) -> Result<()> {
    if planner.toggle_completed(hour)?.is_some() {
        print_slot(planner, hour);
        print_summary(&planner.summary());
    }
    Ok(())
}

pub fn remove_task(planner: &mut Planner, hour: u32) -> Result<()> {
    if planner.delete(hour)? {
        print_slot(planner, hour);
        print_summary(&planner.summary());
    }
    Ok(())
}

pub fn clear(planner: &mut Planner, confirmed: bool) -> Result<()> {
    planner.clear_all(confirmed)?;
    println!("All tasks cleared.");
    Ok(())
}

pub fn list(planner: &Planner) -> Result<()> {
    println!("{}", fmt_long_date(planner.active_date()));
    slots_table(&planner.slots()).printstd();
    print_summary(&planner.summary());
    Ok(())
}

pub fn summary(planner: &Planner) -> Result<()> {
    let summary = planner.summary();
    println!("{}", fmt_long_date(summary.date));
    print_summary(&summary);
    Ok(())
}

/// Run a calendar action. When it selects a date, that date becomes the
/// active one and its slots are shown.
pub fn calendar(
    planner: &mut Planner,
    action: Option<CalendarAction>,
    today: NaiveDate,
) -> Result<()> {
    let mut calendar = Calendar::load(planner.storage(), today);
    let selected = match action.unwrap_or(CalendarAction::Show) {
        CalendarAction::Show => None,
        CalendarAction::Prev => {
            calendar.change_month(-1)?;
            None
        }
        CalendarAction::Next => {
            calendar.change_month(1)?;
            None
        }
        CalendarAction::Today => Some(calendar.go_to_today(today)),
        CalendarAction::Pick { day } => Some(calendar.select_day(day)?),
    };
    calendar.save(planner.storage())?;

    println!("{}", calendar.title());
    calendar_table(&calendar, today).printstd();

    if let Some(date) = selected {
        planner.set_active_date(date);
        println!();
        list(planner)?;
    }
    Ok(())
}

fn print_slot(planner: &Planner, hour: u32) {
    slots_table(&[planner.slot(hour)]).printstd();
}

fn print_summary(summary: &DaySummary) {
    summary_table(summary).printstd();
}

/// e.g. "Friday, March 1, 2024"
pub fn fmt_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

pub fn slots_table(slots: &[Slot]) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["slot", "task", "estimated", "actual", "done"]);
    for slot in slots {
        match slot.task {
            Some(task) => {
                let style = if task.completed { "Fg" } else { "" };
                table.add_row(Row::new(vec![
                    Cell::new(&format_hour(slot.hour)),
                    Cell::new(&textwrap::fill(&task.text, TEXT_WIDTH)).style_spec(style),
                    Cell::new(&task.estimated_time.fmt_short()),
                    Cell::new(&task.actual_time.fmt_short()),
                    Cell::new(if task.completed { "yes" } else { "" }),
                ]));
            }
            None => {
                table.add_row(row![format_hour(slot.hour), EMPTY_SLOT, "", "", ""]);
            }
        }
    }
    table
}

pub fn summary_table(summary: &DaySummary) -> Table {
    let style = match summary.budget() {
        Budget::Under => "Fg",
        Budget::Over => "Fr",
        Budget::Even => "",
    };
    let mut table = Table::new();
    table.set_titles(row!["tasks", "estimated", "actual", "difference"]);
    table.add_row(Row::new(vec![
        Cell::new(&summary.task_count.to_string()),
        Cell::new(&summary.fmt_estimated()),
        Cell::new(&summary.fmt_actual()),
        Cell::new(&summary.fmt_difference()).style_spec(style),
    ]));
    table
}

/// The month grid. Today is bold, the selected date is bracketed and
/// days of the neighbour months are dimmed.
pub fn calendar_table(calendar: &Calendar, today: NaiveDate) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"]);
    for week in calendar.grid(today).chunks(7) {
        let cells = week
            .iter()
            .map(|cell| {
                let text = if cell.is_selected {
                    format!("[{}]", cell.day)
                } else {
                    cell.day.to_string()
                };
                let style = match (cell.month, cell.is_today) {
                    (CellMonth::Displayed, true) => "bFc",
                    (CellMonth::Displayed, false) => "",
                    _ => "i",
                };
                Cell::new(&text).style_spec(style)
            })
            .collect();
        table.add_row(Row::new(cells));
    }
    table
}
