//! Error taxonomy for the scheduler's public API.
//!
//! Configuration errors (bad quantum, priority, or event id) never change
//! scheduler state. Usage errors (calling before `init` / after `end`)
//! are reported only where the operation has a meaningful return value
//! ([`crate::fork`]); the no-op operations (`exec`, `wait`, `signal`,
//! `end`) instead ignore the call silently.

use std::io;

use crate::TaskId;

/// Everything that can go wrong calling into the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum SchedError {
    /// `init` was called a second time without an intervening `end`.
    #[error("scheduler is already initialized")]
    AlreadyInitialized,

    /// `fork` was called before `init` (or after `end`).
    #[error("scheduler is not initialized")]
    NotInitialized,

    /// `init`'s `quantum` was zero, or `event_count` exceeded [`crate::MAX_EVENTS`].
    #[error("invalid scheduler configuration: quantum={quantum}, event_count={event_count}")]
    InvalidConfig { quantum: u32, event_count: u32 },

    /// `fork`'s `priority` exceeded [`crate::MAX_PRIO`].
    #[error("invalid task priority {priority} (max is {})", crate::MAX_PRIO)]
    InvalidPriority { priority: u32 },

    /// `wait`/`signal`'s `event` was out of range for the configured `event_count`.
    #[error("invalid event id {event} (configured event_count is {event_count})")]
    InvalidEvent { event: u32, event_count: u32 },

    /// `wait` was called with no other runnable task to hand the run
    /// token to — the caller would block forever with nobody left to
    /// wake it.
    #[error("wait() called with no other runnable task; would deadlock the caller")]
    NoRunnableTask,

    /// The host OS refused to spawn a kernel thread for a forked task.
    #[error("failed to spawn kernel thread for task {task:?}: {source}")]
    Spawn {
        task: TaskId,
        #[source]
        source: io::Error,
    },
}
