use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::model::{Task, TaskFields};
use crate::storage::Storage;
use crate::time::TimeSpan;

/// Storage key holding the whole task list as JSON.
pub const TASKS_KEY: &str = "timeManagementTasks";

/// The list of every task of every day. Each mutation writes the whole
/// list back to storage before it becomes visible in memory, so a failed
/// write leaves the store unchanged.
pub struct TaskStore {
    storage: Storage,
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn open(storage: Storage) -> TaskStore {
        let mut store = TaskStore {
            storage,
            tasks: Vec::new(),
        };
        store.load_all();
        store
    }

    /// Re-read the task list from storage.
    pub fn load_all(&mut self) -> &[Task] {
        self.tasks = load_all(&self.storage);
        &self.tasks
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task_at(&self, date: NaiveDate, hour: u32) -> Option<&Task> {
        self.tasks.iter().find(|task| task.is_at(date, hour))
    }

    pub fn is_slot_taken(&self, date: NaiveDate, hour: u32) -> bool {
        self.task_at(date, hour).is_some()
    }

    /// Write a fresh task into the slot. A task already there is replaced
    /// whole: actual time, completion and creation time start over.
    pub fn upsert(&mut self, date: NaiveDate, hour: u32, fields: TaskFields) -> Result<&Task> {
        let mut tasks = self.tasks.clone();
        let index = match tasks.iter().position(|task| task.is_at(date, hour)) {
            Some(index) => {
                tasks[index] = Task::new(date, hour, fields);
                debug!(id = %tasks[index].id, "replaced task");
                index
            }
            None => {
                let task = Task::new(date, hour, fields);
                debug!(id = %task.id, "created task");
                tasks.push(task);
                tasks.len() - 1
            }
        };
        self.commit(tasks)?;
        Ok(&self.tasks[index])
    }

    /// Record the time actually spent. Does nothing if the slot is empty.
    pub fn set_actual_time(
        &mut self,
        date: NaiveDate,
        hour: u32,
        actual_time: TimeSpan,
    ) -> Result<Option<&Task>> {
        self.modify(date, hour, |task| task.actual_time = actual_time)
    }

    /// Flip the completion mark. Does nothing if the slot is empty.
    pub fn toggle_completed(&mut self, date: NaiveDate, hour: u32) -> Result<Option<&Task>> {
        self.modify(date, hour, |task| task.completed = !task.completed)
    }

    /// Remove the task in the slot, if any. Returns whether one was removed.
    pub fn delete(&mut self, date: NaiveDate, hour: u32) -> Result<bool> {
        let mut tasks = self.tasks.clone();
        let before = tasks.len();
        tasks.retain(|task| !task.is_at(date, hour));
        let removed = tasks.len() != before;
        if removed {
            debug!(date = %date, hour, "deleted task");
        } else {
            debug!(date = %date, hour, "no task to delete");
        }
        self.commit(tasks)?;
        Ok(removed)
    }

    /// Forget every task of every day.
    pub fn clear_all(&mut self) -> Result<()> {
        self.storage
            .remove(TASKS_KEY)
            .context("Failed to clear tasks.")?;
        self.tasks.clear();
        debug!("cleared all tasks");
        Ok(())
    }

    fn modify<F>(&mut self, date: NaiveDate, hour: u32, change: F) -> Result<Option<&Task>>
    where
        F: FnOnce(&mut Task),
    {
        let index = match self.tasks.iter().position(|task| task.is_at(date, hour)) {
            Some(index) => index,
            None => {
                debug!(date = %date, hour, "no task in slot, ignoring");
                return Ok(None);
            }
        };
        let mut tasks = self.tasks.clone();
        change(&mut tasks[index]);
        self.commit(tasks)?;
        Ok(Some(&self.tasks[index]))
    }

    fn commit(&mut self, tasks: Vec<Task>) -> Result<()> {
        let json = serde_json::to_string(&tasks).context("Failed to serialize tasks.")?;
        self.storage
            .set(TASKS_KEY, &json)
            .context("Failed to save tasks.")?;
        self.tasks = tasks;
        Ok(())
    }
}

/// Read the persisted task list. A missing or unreadable list is an empty one.
pub fn load_all(storage: &Storage) -> Vec<Task> {
    let json = match storage.get(TASKS_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!("could not read tasks, starting empty: {:#}", err);
            return Vec::new();
        }
    };
    match serde_json::from_str(&json) {
        Ok(tasks) => tasks,
        Err(err) => {
            warn!("stored tasks are corrupt, starting empty: {}", err);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fields(text: &str, hours: u32, minutes: u32) -> TaskFields {
        TaskFields {
            text: text.to_string(),
            estimated_time: TimeSpan::new(hours, minutes),
        }
    }

    fn create_test_store() -> TaskStore {
        TaskStore::open(Storage::in_memory().unwrap())
    }

    #[test]
    fn upsert_twice_keeps_one_task() {
        let mut store = create_test_store();
        let day = date(2024, 3, 1);

        store.upsert(day, 10, fields("first", 1, 0)).unwrap();
        store.upsert(day, 10, fields("second", 0, 45)).unwrap();

        assert_eq!(store.tasks().len(), 1);
        let task = store.task_at(day, 10).unwrap();
        assert_eq!(task.text, "second");
        assert_eq!(task.estimated_time, TimeSpan::new(0, 45));
        assert_eq!(task.id, "2024-03-01-10");
    }

    #[test]
    fn upsert_over_a_task_starts_fresh() {
        let mut store = create_test_store();
        let day = date(2024, 3, 1);
        store.upsert(day, 11, fields("draft", 1, 0)).unwrap();
        store.set_actual_time(day, 11, TimeSpan::new(0, 50)).unwrap();
        let created_at = store.toggle_completed(day, 11).unwrap().unwrap().created_at;

        store.upsert(day, 11, fields("final", 2, 0)).unwrap();
        assert_eq!(store.tasks().len(), 1);
        let task = store.task_at(day, 11).unwrap();
        assert_eq!(task.text, "final");
        assert_eq!(task.estimated_time, TimeSpan::new(2, 0));
        assert!(task.actual_time.is_zero());
        assert!(!task.completed);
        assert!(task.created_at >= created_at);
        assert_eq!(load_all(store.storage())[0].actual_time, TimeSpan::default());
    }

    #[test]
    fn same_hour_on_different_days_are_different_tasks() {
        let mut store = create_test_store();
        store.upsert(date(2024, 3, 1), 9, fields("a", 1, 0)).unwrap();
        store.upsert(date(2024, 3, 2), 9, fields("b", 1, 0)).unwrap();
        assert_eq!(store.tasks().len(), 2);
        assert_eq!(store.task_at(date(2024, 3, 2), 9).unwrap().text, "b");
    }

    #[test]
    fn missing_slot_operations_are_ignored() {
        let mut store = create_test_store();
        let day = date(2024, 3, 1);
        store.upsert(day, 9, fields("a", 1, 0)).unwrap();

        assert!(store
            .set_actual_time(day, 12, TimeSpan::new(1, 0))
            .unwrap()
            .is_none());
        assert!(store.toggle_completed(day, 12).unwrap().is_none());
        assert!(!store.delete(day, 12).unwrap());
        assert_eq!(store.tasks().len(), 1);
        assert!(!store.task_at(day, 9).unwrap().completed);
    }

    #[test]
    fn toggling_twice_restores_completion() {
        let mut store = create_test_store();
        let day = date(2024, 3, 1);
        store.upsert(day, 13, fields("a", 1, 0)).unwrap();
        assert!(store.toggle_completed(day, 13).unwrap().unwrap().completed);
        assert!(!store.toggle_completed(day, 13).unwrap().unwrap().completed);
    }

    #[test]
    fn delete_removes_only_that_slot() {
        let mut store = create_test_store();
        let day = date(2024, 3, 1);
        store.upsert(day, 9, fields("a", 1, 0)).unwrap();
        store.upsert(day, 10, fields("b", 1, 0)).unwrap();

        assert!(store.delete(day, 9).unwrap());
        assert!(store.task_at(day, 9).is_none());
        assert!(store.task_at(day, 10).is_some());
        assert_eq!(load_all(store.storage()).len(), 1);
    }

    #[test]
    fn clear_all_then_load_is_empty() {
        let mut store = create_test_store();
        store.upsert(date(2024, 3, 1), 9, fields("a", 1, 0)).unwrap();
        store.upsert(date(2024, 3, 5), 15, fields("b", 1, 0)).unwrap();

        store.clear_all().unwrap();
        assert!(store.tasks().is_empty());
        assert!(store.load_all().is_empty());
        assert_eq!(store.storage().get(TASKS_KEY).unwrap(), None);
    }

    #[test]
    fn corrupt_storage_loads_as_empty() {
        let storage = Storage::in_memory().unwrap();
        storage.set(TASKS_KEY, "{not json").unwrap();
        let mut store = TaskStore::open(storage);
        assert!(store.tasks().is_empty());

        store.upsert(date(2024, 3, 1), 9, fields("a", 1, 0)).unwrap();
        assert_eq!(store.load_all().len(), 1);
    }

    #[test]
    fn tasks_persist_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.sqlite");
        let day = date(2024, 3, 1);

        let mut store = TaskStore::open(Storage::open(&path).unwrap());
        store.upsert(day, 10, fields("Write report", 1, 30)).unwrap();
        store.set_actual_time(day, 10, TimeSpan::new(2, 0)).unwrap();
        drop(store);

        let store = TaskStore::open(Storage::open(&path).unwrap());
        let task = store.task_at(day, 10).unwrap();
        assert_eq!(task.text, "Write report");
        assert_eq!(task.actual_time, TimeSpan::new(2, 0));
    }

    #[test]
    fn reads_records_without_optional_fields() {
        let storage = Storage::in_memory().unwrap();
        storage
            .set(
                TASKS_KEY,
                r#"[{"id":"2024-03-01-9","date":"2024-03-01","hour":9,"text":"a",
                    "estimatedTime":{"hours":1,"minutes":0},
                    "createdAt":"2024-03-01T08:00:00.000Z"}]"#,
            )
            .unwrap();
        let store = TaskStore::open(storage);
        let task = store.task_at(date(2024, 3, 1), 9).unwrap();
        assert!(task.actual_time.is_zero());
        assert!(!task.completed);
    }
}
