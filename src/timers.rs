// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Obsolescence Simulation Suite - Scheduled Tasks

use serde::Serialize;

/// Work the engine performs when a scheduled task comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Task {
    /// Clock driver increment.
    Tick,
    /// The delayed reward request failure.
    RewardFailure,
}

/// Cancellation token for a scheduled task. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct Pending {
    handle: TaskHandle,
    due_ms: u64,
    period_ms: Option<u64>,
    task: Task,
}

/// A task popped from the queue, with the logical instant it fired at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub handle: TaskHandle,
    pub at_ms: u64,
    pub task: Task,
}

/// Logical-time task queue. Nothing runs until the owner pops due tasks, so
/// cancelling a handle guarantees the task never fires.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_handle: u64,
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule_once(&mut self, delay_ms: u64, task: Task) -> TaskHandle {
        self.push(delay_ms, None, task)
    }

    /// Repeat every `period_ms`, first firing one period from now.
    pub fn schedule_every(&mut self, period_ms: u64, task: Task) -> TaskHandle {
        // A zero period would never let time move forward.
        let period_ms = period_ms.max(1);
        self.push(period_ms, Some(period_ms), task)
    }

    fn push(&mut self, delay_ms: u64, period_ms: Option<u64>, task: Task) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(Pending {
            handle,
            due_ms: self.now_ms.saturating_add(delay_ms),
            period_ms,
            task,
        });
        handle
    }

    /// Returns `true` if a pending task was removed.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub(crate) fn count_of(&self, task: Task) -> usize {
        self.pending.iter().filter(|p| p.task == task).count()
    }

    /// Pop the earliest task due at or before `until_ms`, moving the clock to
    /// its due instant. Ties go to the task scheduled first. Repeating tasks
    /// are re-armed one period later.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Fired> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= until_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.handle.0))
            .map(|(i, _)| i)?;

        let fired = {
            let p = &self.pending[idx];
            Fired { handle: p.handle, at_ms: p.due_ms, task: p.task }
        };
        self.now_ms = self.now_ms.max(fired.at_ms);

        match self.pending[idx].period_ms {
            Some(period) => self.pending[idx].due_ms = fired.at_ms.saturating_add(period),
            None => {
                self.pending.remove(idx);
            }
        }
        Some(fired)
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_once_fires_once() {
        let mut s = Scheduler::new();
        let h = s.schedule_once(2_000, Task::RewardFailure);
        assert!(s.pop_due(1_999).is_none());
        let fired = s.pop_due(2_000).unwrap();
        assert_eq!(fired.handle, h);
        assert_eq!(fired.at_ms, 2_000);
        assert_eq!(s.now_ms(), 2_000);
        assert!(s.pop_due(10_000).is_none());
    }

    #[test]
    fn test_repeating_rearms() {
        let mut s = Scheduler::new();
        s.schedule_every(100, Task::Tick);
        let mut count = 0;
        while s.pop_due(1_000).is_some() {
            count += 1;
        }
        assert_eq!(count, 10);
        assert_eq!(s.now_ms(), 1_000);
        assert_eq!(s.pending_count(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut s = Scheduler::new();
        let h = s.schedule_once(10, Task::RewardFailure);
        assert!(s.cancel(h));
        assert!(!s.cancel(h));
        assert!(s.pop_due(100).is_none());
    }

    #[test]
    fn test_ordering_by_due_then_schedule_order() {
        let mut s = Scheduler::new();
        let tick = s.schedule_every(100, Task::Tick);
        let reward = s.schedule_once(100, Task::RewardFailure);
        let early = s.schedule_once(50, Task::RewardFailure);
        assert_eq!(s.pop_due(100).map(|f| f.handle), Some(early));
        assert_eq!(s.pop_due(100).map(|f| f.handle), Some(tick));
        assert_eq!(s.pop_due(100).map(|f| f.handle), Some(reward));
        assert!(s.pop_due(100).is_none());
    }

    #[test]
    fn test_handles_not_reused_after_cancel_all() {
        let mut s = Scheduler::new();
        let a = s.schedule_once(1, Task::Tick);
        s.cancel_all();
        let b = s.schedule_once(1, Task::Tick);
        assert_ne!(a, b);
        assert!(!s.is_pending(a));
        assert!(s.is_pending(b));
    }
}
