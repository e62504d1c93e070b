//! `rrsched` — a cooperative, priority-preemptive round-robin scheduler
//! for user-space tasks realized on top of host kernel threads.
//!
//! Callers register *handlers* with [`fork`]; the scheduler decides which
//! one executes at any instant, enforces a quantum, preempts on priority,
//! and provides a `wait`/`signal` blocking primitive keyed by small
//! integer event ids. Exactly one logical task runs at a time, even
//! though every task is backed by its own `std::thread`.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//!
//! rrsched::init(1, 0).unwrap();
//!
//! let order = Arc::new(AtomicU32::new(0));
//! let o = Arc::clone(&order);
//! rrsched::fork(
//!     move |_priority| {
//!         o.fetch_add(1, Ordering::SeqCst);
//!     },
//!     rrsched::MAX_PRIO,
//! )
//! .unwrap();
//!
//! // The priority-5 child preempted main and already ran to completion.
//! assert_eq!(order.load(Ordering::SeqCst), 1);
//!
//! rrsched::end();
//! ```

mod blocking_queue;
pub mod config;
mod error;
mod gate;
mod ready_queue;
mod scheduler;
mod task;

pub use config::SchedulerConfig;
pub use error::SchedError;
pub use task::TaskId;

/// Highest valid task priority (inclusive). Priorities range `[0, MAX_PRIO]`.
pub const MAX_PRIO: u32 = 5;

/// Upper bound on `event_count` accepted by [`init`].
pub const MAX_EVENTS: u32 = 256;

/// Sentinel value documenting the original ABI's invalid-id return.
/// The idiomatic surface below reports failure through `Result` instead
/// of returning this value; it is exported only so callers translating
/// from that ABI have something to compare against.
pub const INVALID_ID: TaskId = TaskId::MAX;

/// Initialize the scheduler singleton.
///
/// `quantum` is the number of [`exec`] units a task may consume before a
/// round-robin quantum boundary; it must be at least 1. `event_count` is
/// the number of blocking events [`wait`]/[`signal`] will accept; it must
/// not exceed [`MAX_EVENTS`].
///
/// Fails with [`SchedError::AlreadyInitialized`] if called twice without
/// an intervening [`end`], or [`SchedError::InvalidConfig`] if the
/// arguments are out of range. No state changes on failure.
pub fn init(quantum: u32, event_count: u32) -> Result<(), SchedError> {
    scheduler::init(quantum, event_count)
}

/// Same as [`init`], but takes an already-validated [`SchedulerConfig`].
pub fn init_with(config: SchedulerConfig) -> Result<(), SchedError> {
    scheduler::init(config.quantum(), config.event_count())
}

/// Register a new task at the given priority, backed by its own kernel
/// thread. `handler` runs exactly once, receiving `priority` as its sole
/// argument.
///
/// If `priority` is strictly greater than the calling task's priority,
/// the new task preempts the caller before this function returns. If
/// `priority` is less than or equal to the caller's, the caller keeps
/// running until the next quantum boundary or suspension point.
///
/// Fails with [`SchedError::InvalidPriority`] if `priority > MAX_PRIO`,
/// or [`SchedError::NotInitialized`] if the scheduler has not been
/// [`init`]ialized.
pub fn fork<F>(handler: F, priority: u32) -> Result<TaskId, SchedError>
where
    F: FnOnce(u32) + Send + 'static,
{
    scheduler::fork(handler, priority)
}

/// Perform one unit of logical work and yield the preemption check
/// point. A no-op if the scheduler is not initialized.
pub fn exec() {
    scheduler::exec()
}

/// Block the calling task on `event` until a matching [`signal`]. The
/// calling task is moved to the blocking structure and the run token is
/// handed to the next ready task.
///
/// Fails with [`SchedError::InvalidEvent`] if `event >= event_count` as
/// configured by [`init`], or [`SchedError::NoRunnableTask`] if the
/// calling task is the only runnable one (waiting would leave nobody to
/// hand the run token to). A no-op returning `Ok(())` if the scheduler is
/// not initialized.
pub fn wait(event: u32) -> Result<(), SchedError> {
    scheduler::wait(event)
}

/// Wake every task blocked on `event`, in the order they called
/// [`wait`], moving them back to the ready structure at their original
/// priorities. Returns the number of tasks woken.
///
/// Fails with [`SchedError::InvalidEvent`] under the same condition as
/// [`wait`]. A no-op returning `Ok(0)` if the scheduler is not initialized.
pub fn signal(event: u32) -> Result<u32, SchedError> {
    scheduler::signal(event)
}

/// Tear down the scheduler: join every forked task's kernel thread and
/// free the ready/blocking structures. Idempotent — a no-op if the
/// scheduler is not initialized.
///
/// If a forked handler never returns (an infinite loop that never calls
/// [`exec`]/[`wait`]), or tasks remain blocked on an event nobody ever
/// [`signal`]s, `end` will block forever or leak those tasks — this crate
/// does not attempt to force-terminate a task from the outside.
pub fn end() {
    scheduler::end()
}
