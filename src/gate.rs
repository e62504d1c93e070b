//! The handoff gate: the scheduler's sole concurrency primitive.
//!
//! Each task owns one [`Gate`]. At any instant, across every live task,
//! exactly one gate is open — that task's kernel thread is the one
//! permitted to run logical code. Everyone else is parked inside
//! `close()`.
//!
//! A C pthreads version of this idea usually has the outgoing thread
//! unlock the incoming thread's mutex and then re-lock its own — legal
//! under pthreads but relying on unlocking a mutex you don't hold.
//! `std::sync::Mutex` ties unlocking to the `MutexGuard`'s `Drop`, which
//! always runs on the locking thread, so that trick has no direct
//! translation here; a `Mutex<bool>` plus `Condvar` gets the same
//! single-owner handoff without it.

use std::sync::{Condvar, Mutex};

pub(crate) struct Gate {
    open: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    pub(crate) fn new(initially_open: bool) -> Self {
        Gate {
            open: Mutex::new(initially_open),
            cond: Condvar::new(),
        }
    }

    /// Park the calling thread until this gate is open, then consume the
    /// signal (reset to closed) and return. Safe to call repeatedly while
    /// still closed: each call just keeps waiting.
    pub(crate) fn close(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.cond.wait(open).unwrap();
        }
        *open = false;
    }

    /// Open the gate, waking its parked owner (if any).
    pub(crate) fn open(&self) {
        let mut open = self.open.lock().unwrap();
        *open = true;
        self.cond.notify_one();
    }
}
