//! Validated construction of the values `init` needs.
//!
//! The scheduler itself has no persisted configuration — persistence of
//! scheduler state across a process lifetime is out of scope — but a
//! real caller still benefits from building and validating a
//! `quantum`/`event_count` pair before handing it to [`crate::init`].
//! `SchedulerConfig` is that validate-then-act wrapper for the two knobs
//! `init` takes.

use crate::error::SchedError;
use crate::{MAX_EVENTS, MAX_PRIO};

/// A validated `(quantum, event_count)` pair ready to pass to [`crate::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
pub struct SchedulerConfig {
    quantum: u32,
    event_count: u32,
}

impl SchedulerConfig {
    /// Validate `quantum >= 1` and `event_count <= MAX_EVENTS`, matching
    /// the preconditions `init` itself enforces.
    pub fn new(quantum: u32, event_count: u32) -> Result<Self, SchedError> {
        if quantum < 1 || event_count > MAX_EVENTS {
            return Err(SchedError::InvalidConfig {
                quantum,
                event_count,
            });
        }
        Ok(SchedulerConfig {
            quantum,
            event_count,
        })
    }

    /// The default quantum and event count: one priority-5 task can run
    /// alone for one time step per level, with no blocking events.
    pub fn minimal() -> Self {
        SchedulerConfig {
            quantum: 1,
            event_count: 0,
        }
    }

    pub fn quantum(&self) -> u32 {
        self.quantum
    }

    pub fn event_count(&self) -> u32 {
        self.event_count
    }

    pub fn with_quantum(mut self, quantum: u32) -> Result<Self, SchedError> {
        if quantum < 1 {
            return Err(SchedError::InvalidConfig {
                quantum,
                event_count: self.event_count,
            });
        }
        self.quantum = quantum;
        Ok(self)
    }

    pub fn with_event_count(mut self, event_count: u32) -> Result<Self, SchedError> {
        if event_count > MAX_EVENTS {
            return Err(SchedError::InvalidConfig {
                quantum: self.quantum,
                event_count,
            });
        }
        self.event_count = event_count;
        Ok(self)
    }
}

/// Parse a `SchedulerConfig` out of a TOML document.
///
/// Expected shape:
///
/// ```toml
/// quantum = 2
/// event_count = 1
/// ```
#[cfg(feature = "config-file")]
pub fn from_toml_str(text: &str) -> Result<SchedulerConfig, SchedError> {
    #[derive(serde::Deserialize)]
    struct Raw {
        quantum: u32,
        event_count: u32,
    }
    let raw: Raw = toml::from_str(text).map_err(|_| SchedError::InvalidConfig {
        quantum: 0,
        event_count: 0,
    })?;
    SchedulerConfig::new(raw.quantum, raw.event_count)
}
