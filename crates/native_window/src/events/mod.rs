//! Deferred task queue for the window's owning thread
//!
//! Everything a window does runs on one thread. Work that must happen later
//! (watchdog deadlines, readback completions, page unload replies) is posted
//! here and executed when the host's loop pumps the runner.
//! Key principles:
//! - Tasks run in due-time order, ties broken by posting order
//! - A cancelled task never runs, even if it was due in the same pump
//! - Nothing is borrowed while a task runs, so tasks may post or cancel freely

use std::cell::{Cell, RefCell};
use std::time::Duration;

use crate::foundation::collections::{SlotMap, TaskId};
use crate::foundation::time::Clock;

struct PendingTask {
    due: Duration,
    sequence: u64,
    task: Box<dyn FnOnce()>,
}

/// Single-thread task runner with cancelable delayed tasks
pub struct TaskRunner {
    clock: Clock,
    tasks: RefCell<SlotMap<TaskId, PendingTask>>,
    next_sequence: Cell<u64>,
}

impl TaskRunner {
    /// Create a runner driven by the given clock
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            tasks: RefCell::new(SlotMap::with_key()),
            next_sequence: Cell::new(0),
        }
    }

    /// Runner on a manual clock, for deterministic tests
    pub fn manual() -> Self {
        Self::new(Clock::manual())
    }

    /// Current reading of the runner's clock
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Post a task to run on the next pump
    pub fn post_task(&self, task: impl FnOnce() + 'static) -> TaskId {
        self.post_delayed_task(Duration::ZERO, task)
    }

    /// Post a task to run once `delay` has elapsed
    pub fn post_delayed_task(&self, delay: Duration, task: impl FnOnce() + 'static) -> TaskId {
        let sequence = self.next_sequence.get();
        self.next_sequence.set(sequence + 1);

        self.tasks.borrow_mut().insert(PendingTask {
            due: self.clock.now() + delay,
            sequence,
            task: Box::new(task),
        })
    }

    /// Cancel a pending task
    ///
    /// Returns false if the task already ran or was cancelled before.
    pub fn cancel(&self, id: TaskId) -> bool {
        self.tasks.borrow_mut().remove(id).is_some()
    }

    /// Whether a task is still waiting to run
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.borrow().contains_key(id)
    }

    /// Number of tasks waiting to run
    pub fn pending_count(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Due time of the earliest pending task
    pub fn next_due(&self) -> Option<Duration> {
        self.tasks.borrow().values().map(|task| task.due).min()
    }

    /// Run every task whose due time has passed
    ///
    /// Tasks posted while pumping run in the same pump if they are already due.
    /// Returns the number of tasks executed.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop_due(self.clock.now()) {
            task();
            ran += 1;
        }
        ran
    }

    /// Advance a manual clock by `by`, running tasks as their time comes
    ///
    /// The clock is stepped to each task's due time before it runs, so tasks
    /// observe the time they were scheduled for. On a system clock this only
    /// runs what is already due.
    pub fn advance(&self, by: Duration) -> usize {
        if !self.clock.is_manual() {
            log::warn!("advance() called on a system clock; running due tasks only");
            return self.run_pending();
        }

        let target = self.clock.now() + by;
        let mut ran = 0;
        while let Some(due) = self.next_due().filter(|due| *due <= target) {
            self.clock.set(due);
            ran += self.run_pending();
        }
        self.clock.set(target);
        ran
    }

    fn pop_due(&self, now: Duration) -> Option<Box<dyn FnOnce()>> {
        let mut tasks = self.tasks.borrow_mut();
        let id = tasks
            .iter()
            .filter(|(_, task)| task.due <= now)
            .min_by_key(|(_, task)| (task.due, task.sequence))
            .map(|(id, _)| id)?;
        tasks.remove(id).map(|pending| pending.task)
    }
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new(Clock::system())
    }
}
