//! The ready structure: priority-indexed FIFO buckets.
//!
//! Bucketed FIFOs give O(`MAX_PRIO`) extraction with trivial locality and
//! explicit fairness. Tie-break is FIFO within a priority level. Tasks
//! are referenced by [`TaskId`] into an arena rather than linked in place
//! through embedded pointers.

use std::collections::VecDeque;

use crate::task::TaskId;

pub(crate) struct ReadyQueue {
    buckets: Vec<VecDeque<TaskId>>,
}

impl ReadyQueue {
    pub(crate) fn new(max_prio: u32) -> Self {
        ReadyQueue {
            buckets: (0..=max_prio).map(|_| VecDeque::new()).collect(),
        }
    }

    /// Append `task` to the tail of `ready[priority]`.
    pub(crate) fn insert(&mut self, task: TaskId, priority: u32) {
        self.buckets[priority as usize].push_back(task);
    }

    /// Prepend `task` to the front of `ready[priority]`. Used only for a
    /// candidate that lost a preemption contest: it remains the rightful
    /// head of its bucket.
    pub(crate) fn push_front(&mut self, task: TaskId, priority: u32) {
        self.buckets[priority as usize].push_front(task);
    }

    /// Pop and return the head of the highest non-empty bucket, scanning
    /// from `MAX_PRIO` down to `0`. `None` if every bucket is empty.
    pub(crate) fn extract_highest(&mut self) -> Option<TaskId> {
        for bucket in self.buckets.iter_mut().rev() {
            if let Some(task) = bucket.pop_front() {
                return Some(task);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_highest_priority_first() {
        let mut q = ReadyQueue::new(5);
        q.insert(1, 2);
        q.insert(2, 4);
        q.insert(3, 4);
        assert_eq!(q.extract_highest(), Some(2));
        assert_eq!(q.extract_highest(), Some(3));
        assert_eq!(q.extract_highest(), Some(1));
        assert_eq!(q.extract_highest(), None);
    }

    #[test]
    fn push_front_reorders_ahead_of_peers() {
        let mut q = ReadyQueue::new(5);
        q.insert(10, 1);
        q.insert(11, 1);
        q.push_front(99, 1);
        assert_eq!(q.extract_highest(), Some(99));
        assert_eq!(q.extract_highest(), Some(10));
        assert_eq!(q.extract_highest(), Some(11));
    }

    #[test]
    fn empty_queue_yields_none() {
        let mut q = ReadyQueue::new(5);
        assert_eq!(q.extract_highest(), None);
    }
}
