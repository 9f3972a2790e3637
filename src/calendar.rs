use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::Storage;

/// Storage key of the calendar state.
pub const CALENDAR_KEY: &str = "plannerCalendar";

/// Number of cells of the month grid: six weeks of seven days.
pub const GRID_CELLS: usize = 42;

/// The date picker: which month is displayed and which date is selected.
/// It knows nothing about tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    displayed_month: NaiveDate,
    selected_date: NaiveDate,
}

/// Which month a cell of the grid belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMonth {
    Previous,
    Displayed,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    pub month: CellMonth,
    pub is_today: bool,
    pub is_selected: bool,
}

impl Calendar {
    /// A calendar showing the month of `today`, with `today` selected.
    pub fn new(today: NaiveDate) -> Calendar {
        Calendar {
            displayed_month: first_of_month(today),
            selected_date: today,
        }
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    /// Header label, e.g. "March 2024".
    pub fn title(&self) -> String {
        self.displayed_month.format("%B %Y").to_string()
    }

    /// Move the displayed month by `offset` months. The selection stays.
    pub fn change_month(&mut self, offset: i32) -> Result<()> {
        let months = Months::new(offset.unsigned_abs());
        let moved = if offset >= 0 {
            self.displayed_month.checked_add_months(months)
        } else {
            self.displayed_month.checked_sub_months(months)
        };
        self.displayed_month =
            moved.ok_or_else(|| anyhow!("Cannot move the calendar {} months.", offset))?;
        debug!(month = %self.displayed_month, "calendar month changed");
        Ok(())
    }

    /// Select a day of the displayed month and return it as the new active date.
    pub fn select_day(&mut self, day: u32) -> Result<NaiveDate> {
        let date = self
            .displayed_month
            .with_day(day)
            .ok_or_else(|| anyhow!("{} has no day {}.", self.title(), day))?;
        self.selected_date = date;
        debug!(date = %date, "calendar date selected");
        Ok(date)
    }

    /// Display and select today.
    pub fn go_to_today(&mut self, today: NaiveDate) -> NaiveDate {
        *self = Calendar::new(today);
        today
    }

    /// The month grid, weeks starting on Sunday, padded with the end of
    /// the previous month and the start of the next one.
    pub fn grid(&self, today: NaiveDate) -> Vec<DayCell> {
        let first = first_of_month(self.displayed_month);
        let leading = first.weekday().num_days_from_sunday();
        let days = days_in_month(first);
        let previous_days = first
            .pred_opt()
            .map(|last_of_previous| last_of_previous.day())
            .unwrap_or(31);

        let mut cells = Vec::with_capacity(GRID_CELLS);
        for i in (1..=leading).rev() {
            cells.push(DayCell {
                day: previous_days - i + 1,
                month: CellMonth::Previous,
                is_today: false,
                is_selected: false,
            });
        }
        for day in 1..=days {
            let date = first.with_day(day);
            cells.push(DayCell {
                day,
                month: CellMonth::Displayed,
                is_today: date == Some(today),
                is_selected: date == Some(self.selected_date),
            });
        }
        let mut day = 1;
        while cells.len() < GRID_CELLS {
            cells.push(DayCell {
                day,
                month: CellMonth::Next,
                is_today: false,
                is_selected: false,
            });
            day += 1;
        }
        cells
    }

    /// Read the persisted calendar. Falls back to today when absent or unreadable.
    pub fn load(storage: &Storage, today: NaiveDate) -> Calendar {
        match storage.get(CALENDAR_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Calendar>(&json) {
                Ok(calendar) => Calendar {
                    displayed_month: first_of_month(calendar.displayed_month),
                    selected_date: calendar.selected_date,
                },
                Err(err) => {
                    warn!("stored calendar is corrupt, showing today: {}", err);
                    Calendar::new(today)
                }
            },
            Ok(None) => Calendar::new(today),
            Err(err) => {
                warn!("could not read calendar, showing today: {:#}", err);
                Calendar::new(today)
            }
        }
    }

    pub fn save(&self, storage: &Storage) -> Result<()> {
        let json = serde_json::to_string(self).context("Failed to serialize calendar.")?;
        storage
            .set(CALENDAR_KEY, &json)
            .context("Failed to save calendar.")
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn days_in_month(first: NaiveDate) -> u32 {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}
