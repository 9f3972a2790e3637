use thiserror::Error;

/// Requests the planner refuses before touching any task.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlannerError {
    #[error("Please enter a task and estimated time (at least 1 minute)")]
    MissingTaskOrEstimate,
    #[error("There is no slot at {0}:00, slots go from 9 to 17")]
    NoSuchSlot(u32),
    #[error("Not clearing tasks without confirmation, pass --yes to clear them all")]
    ClearNotConfirmed,
}
