//! Task records.
//!
//! A task is the scheduler's unit of logical execution: a priority, a
//! quantum counter, a boxed handler run exactly once, a handoff [`Gate`],
//! and (for every task except the initial caller) a kernel thread to join
//! on shutdown.

use std::thread::JoinHandle;

use crate::gate::Gate;
use std::sync::Arc;

/// Opaque task identifier, handed back by [`crate::fork`].
///
/// This stands in for the original ABI's kernel-thread id: callers treat
/// it as an opaque handle, not an OS thread id, since the scheduler may
/// outlive or predate the underlying `std::thread::Thread`.
pub type TaskId = u64;

/// A handler runs once, receiving its own task's priority.
pub type Handler = Box<dyn FnOnce(u32) + Send + 'static>;

pub(crate) struct Task {
    pub(crate) id: TaskId,
    pub(crate) priority: u32,
    pub(crate) remaining_quantum: u32,
    pub(crate) gate: Arc<Gate>,
    /// Taken by the entry shim the first time it runs the task; `None`
    /// afterward (and always `None` for the sentinel task installed by
    /// `init`, which runs on the caller's own thread instead of a shim).
    pub(crate) handler: Option<Handler>,
    /// `None` for the initial task: it is the caller of `init`/`end`, not
    /// a thread this crate spawned, so there is nothing to join.
    pub(crate) join_handle: Option<JoinHandle<()>>,
}

impl Task {
    pub(crate) fn new_sentinel(id: TaskId, quantum: u32, gate: Arc<Gate>) -> Self {
        Task {
            id,
            priority: 0,
            remaining_quantum: quantum,
            gate,
            handler: None,
            join_handle: None,
        }
    }

    pub(crate) fn new_forked(
        id: TaskId,
        priority: u32,
        quantum: u32,
        gate: Arc<Gate>,
        handler: Handler,
    ) -> Self {
        Task {
            id,
            priority,
            remaining_quantum: quantum,
            gate,
            handler: Some(handler),
            join_handle: None,
        }
    }
}
