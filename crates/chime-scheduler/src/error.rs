use thiserror::Error;

/// Errors surfaced by the scheduler's registration API.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A minute offset must stay inside the minute it shifts.
    #[error("minute offset out of range: {offset_ms} ms (must be below 60000)")]
    InvalidOffset { offset_ms: u128 },

    /// The engine task has exited; no registration can ever take effect again.
    #[error("scheduler engine is no longer running")]
    EngineStopped,
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
