//! The scheduler core: the global singleton, `reschedule`, and the entry
//! shim every forked task's kernel thread runs.
//!
//! All five public operations funnel through here. The shared state
//! (`Inner`) lives behind one global `Mutex`, acquired only for the
//! duration of a queue/arena mutation and always released before any
//! call that parks a thread ([`Gate::close`]) — holding it across a park
//! would stop every other task from ever making progress.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::thread;

use log::{debug, info, trace};

use crate::blocking_queue::BlockingQueue;
use crate::error::SchedError;
use crate::gate::Gate;
use crate::ready_queue::ReadyQueue;
use crate::task::{Handler, Task, TaskId};
use crate::MAX_EVENTS;

struct Inner {
    quantum: u32,
    event_count: u32,
    ready: ReadyQueue,
    blocked: BlockingQueue,
    tasks: HashMap<TaskId, Task>,
    running: TaskId,
    all_tasks: Vec<TaskId>,
    terminal_task: Option<TaskId>,
    next_id: TaskId,
}

static SCHEDULER: OnceLock<Mutex<Option<Inner>>> = OnceLock::new();

fn cell() -> &'static Mutex<Option<Inner>> {
    SCHEDULER.get_or_init(|| Mutex::new(None))
}

fn lock() -> MutexGuard<'static, Option<Inner>> {
    cell().lock().unwrap()
}

impl Inner {
    fn gate_of(&self, id: TaskId) -> Arc<Gate> {
        Arc::clone(&self.tasks[&id].gate)
    }

    fn alloc_id(&mut self) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

pub fn init(quantum: u32, event_count: u32) -> Result<(), SchedError> {
    let mut guard = lock();
    if guard.is_some() {
        return Err(SchedError::AlreadyInitialized);
    }
    if quantum < 1 || event_count > MAX_EVENTS {
        return Err(SchedError::InvalidConfig {
            quantum,
            event_count,
        });
    }

    let sentinel_gate = Arc::new(Gate::new(true));
    let sentinel_id: TaskId = 0;
    let mut tasks = HashMap::new();
    tasks.insert(
        sentinel_id,
        Task::new_sentinel(sentinel_id, quantum, sentinel_gate),
    );

    *guard = Some(Inner {
        quantum,
        event_count,
        ready: ReadyQueue::new(crate::MAX_PRIO),
        blocked: BlockingQueue::new(event_count),
        tasks,
        running: sentinel_id,
        all_tasks: Vec::new(),
        terminal_task: None,
        next_id: sentinel_id + 1,
    });

    info!(
        "scheduler initialized: quantum={quantum}, event_count={event_count}"
    );
    Ok(())
}

pub fn fork<F>(handler: F, priority: u32) -> Result<TaskId, SchedError>
where
    F: FnOnce(u32) + Send + 'static,
{
    if priority > crate::MAX_PRIO {
        return Err(SchedError::InvalidPriority { priority });
    }

    let mut guard = lock();
    let inner = guard.as_mut().ok_or(SchedError::NotInitialized)?;

    let id = inner.alloc_id();
    let gate = Arc::new(Gate::new(false));
    let boxed: Handler = Box::new(handler);
    inner
        .tasks
        .insert(id, Task::new_forked(id, priority, inner.quantum, Arc::clone(&gate), boxed));

    let spawned = thread::Builder::new().spawn(move || task_entry(id));
    let handle = match spawned {
        Ok(h) => h,
        Err(source) => {
            // Roll back the partial allocation: the task never ran.
            inner.tasks.remove(&id);
            return Err(SchedError::Spawn { task: id, source });
        }
    };
    inner.tasks.get_mut(&id).unwrap().join_handle = Some(handle);
    inner.ready.insert(id, priority);

    trace!("fork: task {id} spawned at priority {priority}");
    drop(guard);

    reschedule();
    Ok(id)
}

pub fn exec() {
    trace!("exec: voluntary yield point");
    reschedule();
}

pub fn wait(event: u32) -> Result<(), SchedError> {
    let mut guard = lock();
    let inner = match guard.as_mut() {
        Some(inner) => inner,
        None => return Ok(()),
    };
    if event >= inner.event_count {
        return Err(SchedError::InvalidEvent {
            event,
            event_count: inner.event_count,
        });
    }

    // Check for a candidate before mutating anything: waiting with
    // nobody left to hand the token to would deadlock the caller, and
    // the original's null-dereference here is not a fate this crate
    // inflicts on its callers.
    let cand = inner
        .ready
        .extract_highest()
        .ok_or(SchedError::NoRunnableTask)?;

    let waiter = inner.running;
    inner.blocked.enqueue_wait(waiter, event);
    inner.running = cand;

    let waiter_gate = inner.gate_of(waiter);
    let cand_gate = inner.gate_of(cand);
    drop(guard);

    trace!("wait: task {waiter} blocks on event {event}, handing off to task {cand}");
    cand_gate.open();
    waiter_gate.close();
    Ok(())
}

pub fn signal(event: u32) -> Result<u32, SchedError> {
    let mut guard = lock();
    let inner = match guard.as_mut() {
        Some(inner) => inner,
        None => return Ok(0),
    };
    if event >= inner.event_count {
        return Err(SchedError::InvalidEvent {
            event,
            event_count: inner.event_count,
        });
    }

    let woken = inner.blocked.drain(event);
    let count = woken.len() as u32;
    for task in &woken {
        let priority = inner.tasks[task].priority;
        inner.ready.insert(*task, priority);
    }
    drop(guard);

    debug!("signal: event {event} woke {count} task(s)");
    reschedule();
    Ok(count)
}

pub fn end() {
    let mut guard = lock();
    let inner = match guard.as_mut() {
        Some(inner) => inner,
        None => return,
    };

    let caller = inner.running;
    inner.terminal_task = Some(caller);

    let handoff = inner.ready.extract_highest();
    if let Some(cand) = handoff {
        inner.running = cand;
        let caller_gate = inner.gate_of(caller);
        let cand_gate = inner.gate_of(cand);
        drop(guard);

        trace!("end: caller task {caller} hands off to task {cand}, parking until drained");
        cand_gate.open();
        caller_gate.close();

        guard = lock();
    }

    // By the time we reach here, every task that was going to run has
    // run and recorded itself in `all_tasks` (or remains blocked/ready
    // forever — see the documented open question).
    let inner = guard.as_mut().expect("scheduler state vanished during end()");
    let finished: Vec<TaskId> = inner.all_tasks.drain(..).collect();
    let mut joined = 0usize;
    for id in finished {
        if let Some(mut task) = inner.tasks.remove(&id) {
            if let Some(handle) = task.join_handle.take() {
                let _ = handle.join();
                joined += 1;
            }
        }
    }
    inner.tasks.remove(&caller);

    info!("scheduler shutting down: joined {joined} task(s)");
    *guard = None;
}

/// Decide whether the currently running task keeps the token or hands it
/// to the highest-priority ready candidate. Invoked from `exec`, `fork`,
/// and `signal` — never from `wait`, which hands off unconditionally.
fn reschedule() {
    let mut guard = lock();
    let inner = match guard.as_mut() {
        Some(inner) => inner,
        None => return,
    };

    let running = inner.running;
    let (running_priority, quantum_exhausted) = {
        let task = inner.tasks.get_mut(&running).expect("running task missing from arena");
        task.remaining_quantum -= 1;
        let exhausted = task.remaining_quantum == 0;
        if exhausted {
            // Reset before any early return below: unlike the original's
            // unsigned counter, which wraps harmlessly at 0, `u32` panics
            // on the next decrement if this is skipped.
            task.remaining_quantum = inner.quantum;
        }
        (task.priority, exhausted)
    };

    let cand = match inner.ready.extract_highest() {
        Some(cand) => cand,
        None => return,
    };

    let cand_priority = inner.tasks[&cand].priority;
    let bias = u32::from(quantum_exhausted);

    if running_priority < cand_priority + bias {
        inner.ready.insert(running, running_priority);
        inner.running = cand;

        let running_gate = inner.gate_of(running);
        let cand_gate = inner.gate_of(cand);
        drop(guard);

        trace!("reschedule: task {running} preempted by task {cand}");
        cand_gate.open();
        running_gate.close();
    } else {
        inner.ready.push_front(cand, cand_priority);
        trace!("reschedule: task {running} retains the run token over candidate {cand}");
    }
}

/// Body of every forked task's kernel thread.
fn task_entry(id: TaskId) {
    let gate = {
        let guard = lock();
        guard.as_ref().expect("scheduler torn down before task started").gate_of(id)
    };
    gate.close();

    let handler = {
        let mut guard = lock();
        let inner = guard.as_mut().expect("scheduler torn down mid-run");
        inner
            .tasks
            .get_mut(&id)
            .expect("task missing from arena")
            .handler
            .take()
            .expect("handler already consumed")
    };
    let priority = {
        let guard = lock();
        guard.as_ref().unwrap().tasks[&id].priority
    };

    handler(priority);
    debug!("task {id}: handler returned");

    let mut guard = lock();
    let inner = guard.as_mut().expect("scheduler torn down before task finished");

    let cand = inner.ready.extract_highest();
    inner.all_tasks.push(id);

    let next_gate = match cand.or(inner.terminal_task) {
        Some(next) => {
            inner.running = next;
            Some(inner.gate_of(next))
        }
        None => {
            // Nothing ready and `end` has not recorded a terminal task:
            // every other live task is blocked waiting on an event
            // nobody will ever signal now. There is no safe task to
            // hand the run token to; this thread exits without opening
            // anyone else's gate, leaving the scheduler stuck until
            // something external breaks the deadlock.
            log::warn!(
                "task {id}: finished with no ready task and no terminal task recorded; \
                 scheduler has no one left to run"
            );
            None
        }
    };
    drop(guard);

    if let Some(gate) = next_gate {
        gate.open();
    }
}
