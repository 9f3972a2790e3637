use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use crate::error::PlannerError;
use crate::model::{is_slot_hour, summarize, DaySummary, Task, TaskFields, SLOT_HOURS};
use crate::storage::Storage;
use crate::store::TaskStore;
use crate::time::TimeSpan;

/// One hourly slot of the active date and the task bound to it, if any.
#[derive(Debug)]
pub struct Slot<'a> {
    pub hour: u32,
    pub task: Option<&'a Task>,
}

/// The application state: the task store and the date being looked at.
/// Every user request goes through here and maps to one store operation.
pub struct Planner<'a> {
    store: &'a mut TaskStore,
    active_date: NaiveDate,
}

impl<'a> Planner<'a> {
    pub fn new(store: &'a mut TaskStore, active_date: NaiveDate) -> Planner<'a> {
        Planner { store, active_date }
    }

    pub fn storage(&self) -> &Storage {
        self.store.storage()
    }

    pub fn active_date(&self) -> NaiveDate {
        self.active_date
    }

    /// Switch to another date, e.g. when the calendar selection changes.
    pub fn set_active_date(&mut self, date: NaiveDate) {
        self.active_date = date;
    }

    /// Write a task into a slot of the active date. Without an explicit
    /// hour the first free slot from `current_hour` on is used.
    pub fn add_task(
        &mut self,
        text: &str,
        estimated_time: TimeSpan,
        at: Option<u32>,
        current_hour: u32,
    ) -> Result<&Task> {
        let text = text.trim();
        if text.is_empty() || estimated_time.is_zero() {
            return Err(PlannerError::MissingTaskOrEstimate.into());
        }
        let hour = match at {
            Some(hour) if !is_slot_hour(hour) => return Err(PlannerError::NoSuchSlot(hour).into()),
            Some(hour) => hour,
            None => target_hour(self.store, self.active_date, current_hour),
        };

        info!(date = %self.active_date, hour, "saving task");
        self.store.upsert(
            self.active_date,
            hour,
            TaskFields {
                text: text.to_string(),
                estimated_time,
            },
        )
    }

    pub fn set_actual_time(&mut self, hour: u32, actual_time: TimeSpan) -> Result<Option<&Task>> {
        self.store
            .set_actual_time(self.active_date, hour, actual_time)
    }

    pub fn toggle_completed(&mut self, hour: u32) -> Result<Option<&Task>> {
        self.store.toggle_completed(self.active_date, hour)
    }

    pub fn delete(&mut self, hour: u32) -> Result<bool> {
        self.store.delete(self.active_date, hour)
    }

    /// Remove every task of every date. Needs an explicit confirmation.
    pub fn clear_all(&mut self, confirmed: bool) -> Result<()> {
        if !confirmed {
            return Err(PlannerError::ClearNotConfirmed.into());
        }
        info!("clearing all tasks");
        self.store.clear_all()
    }

    pub fn slots(&self) -> Vec<Slot<'_>> {
        SLOT_HOURS
            .map(|hour| Slot {
                hour,
                task: self.store.task_at(self.active_date, hour),
            })
            .collect()
    }

    pub fn slot(&self, hour: u32) -> Slot<'_> {
        Slot {
            hour,
            task: self.store.task_at(self.active_date, hour),
        }
    }

    pub fn summary(&self) -> DaySummary {
        summarize(self.store.tasks(), self.active_date)
    }
}

/// The slot a new task goes to: the first free one on `date` from
/// `current_hour` (but never before 9) to 17, or 9 when none is free.
pub fn target_hour(store: &TaskStore, date: NaiveDate, current_hour: u32) -> u32 {
    let first = current_hour.max(*SLOT_HOURS.start());
    (first..=*SLOT_HOURS.end())
        .find(|hour| !store.is_slot_taken(date, *hour))
        .unwrap_or(*SLOT_HOURS.start())
}
