use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::time::{format_duration, to_hours_and_minutes, TimeSpan};

/// The hours of the day that have a slot.
pub const SLOT_HOURS: RangeInclusive<u32> = 9..=17;

pub fn is_slot_hour(hour: u32) -> bool {
    SLOT_HOURS.contains(&hour)
}

/// A single task, bound to one hourly slot of one day. Saved as an
/// entry of the task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub date: NaiveDate,
    pub hour: u32,
    pub text: String,
    pub estimated_time: TimeSpan,
    #[serde(default)]
    pub actual_time: TimeSpan,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// The fields a user provides when writing a task into a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFields {
    pub text: String,
    pub estimated_time: TimeSpan,
}

impl Task {
    pub fn new(date: NaiveDate, hour: u32, fields: TaskFields) -> Task {
        Task {
            id: task_id(date, hour),
            date,
            hour,
            text: fields.text,
            estimated_time: fields.estimated_time,
            actual_time: TimeSpan::default(),
            completed: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_at(&self, date: NaiveDate, hour: u32) -> bool {
        self.date == date && self.hour == hour
    }
}

/// The key of the slot a task lives in, e.g. "2024-03-01-10".
pub fn task_id(date: NaiveDate, hour: u32) -> String {
    format!("{}-{}", date.format("%Y-%m-%d"), hour)
}

/// How the day went compared to the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Under,
    Even,
    Over,
}

/// Distance between estimated and actual time. The sign is '-' when the
/// estimate was not exceeded, '+' otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Difference {
    pub sign: char,
    pub minutes: u32,
}

impl Difference {
    pub fn between(estimated_minutes: u32, actual_minutes: u32) -> Difference {
        let sign = if estimated_minutes >= actual_minutes { '-' } else { '+' };
        Difference {
            sign,
            minutes: if estimated_minutes >= actual_minutes {
                estimated_minutes - actual_minutes
            } else {
                actual_minutes - estimated_minutes
            },
        }
    }

    pub fn fmt_signed(&self) -> String {
        let (hours, minutes) = to_hours_and_minutes(self.minutes);
        format!("{}{}", self.sign, format_duration(hours, minutes))
    }
}

/// Aggregates for the tasks of one day. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub task_count: usize,
    pub estimated_minutes: u32,
    pub actual_minutes: u32,
    pub difference: Difference,
}

impl DaySummary {
    pub fn budget(&self) -> Budget {
        if self.estimated_minutes > self.actual_minutes {
            Budget::Under
        } else if self.estimated_minutes < self.actual_minutes {
            Budget::Over
        } else {
            Budget::Even
        }
    }

    pub fn fmt_estimated(&self) -> String {
        TimeSpan::from_minutes(self.estimated_minutes).fmt_short()
    }

    pub fn fmt_actual(&self) -> String {
        TimeSpan::from_minutes(self.actual_minutes).fmt_short()
    }

    pub fn fmt_difference(&self) -> String {
        self.difference.fmt_signed()
    }
}

/// Fold the tasks of `date` into a summary.
pub fn summarize(tasks: &[Task], date: NaiveDate) -> DaySummary {
    let mut task_count = 0;
    let mut estimated_minutes = 0u32;
    let mut actual_minutes = 0u32;
    for task in tasks.iter().filter(|task| task.date == date) {
        task_count += 1;
        estimated_minutes = estimated_minutes.saturating_add(task.estimated_time.total_minutes());
        actual_minutes = actual_minutes.saturating_add(task.actual_time.total_minutes());
    }

    DaySummary {
        date,
        task_count,
        estimated_minutes,
        actual_minutes,
        difference: Difference::between(estimated_minutes, actual_minutes),
    }
}
