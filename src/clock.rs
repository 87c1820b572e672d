// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Obsolescence Simulation Suite - Clock Driver

use crate::timers::{Scheduler, Task, TaskHandle};

/// Periodic tick source. Holds at most one live repeating task.
///
/// Increments are logical: every tick is `tick_ms` regardless of how late the
/// host delivers it.
#[derive(Debug, Clone)]
pub struct ClockDriver {
    tick_ms: u64,
    handle: Option<TaskHandle>,
}

impl ClockDriver {
    pub fn new(tick_ms: u64) -> Self {
        Self { tick_ms, handle: None }
    }

    pub fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    /// No-op if already running.
    pub fn start(&mut self, scheduler: &mut Scheduler) {
        if self.handle.is_some() {
            return;
        }
        self.handle = Some(scheduler.schedule_every(self.tick_ms, Task::Tick));
    }

    /// Cancel the pending tick. No partial tick is delivered.
    pub fn stop(&mut self, scheduler: &mut Scheduler) {
        if let Some(handle) = self.handle.take() {
            scheduler.cancel(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether `handle` is this driver's live tick.
    pub fn owns(&self, handle: TaskHandle) -> bool {
        self.handle == Some(handle)
    }

    /// Forget the handle without touching the scheduler. Used after the
    /// scheduler has already been cleared.
    pub(crate) fn detach(&mut self) {
        self.handle = None;
    }
}
