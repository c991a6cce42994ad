//! Renderer responsiveness watchdog
//!
//! One deferred check at a time. Each arm hands out a new generation; the
//! posted task only fires if its generation is still the armed one, so a
//! cancel or re-arm is effective immediately even if the old task was already
//! due in the same pump.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::events::TaskRunner;
use crate::foundation::collections::TaskId;

/// Delay before reporting a renderer that said it is unresponsive
pub const RENDERER_UNRESPONSIVE_DELAY: Duration = Duration::from_millis(50);

/// How long a closing page may take before it is reported unresponsive
pub const CLOSE_UNRESPONSIVE_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy)]
struct Armed {
    task: TaskId,
    generation: u64,
}

#[derive(Debug, Default)]
struct WatchdogState {
    armed: Cell<Option<Armed>>,
    generation: Cell<u64>,
}

/// Single-shot, cancelable unresponsiveness check
pub struct ResponsivenessWatchdog {
    runner: Rc<TaskRunner>,
    state: Rc<WatchdogState>,
}

impl ResponsivenessWatchdog {
    /// Create an idle watchdog posting its checks to `runner`
    pub fn new(runner: Rc<TaskRunner>) -> Self {
        Self {
            runner,
            state: Rc::new(WatchdogState::default()),
        }
    }

    /// Arm a check firing `on_timeout` after `delay`, replacing any pending one
    pub fn schedule(&self, delay: Duration, on_timeout: impl FnOnce() + 'static) {
        self.cancel();

        let generation = self.state.generation.get() + 1;
        self.state.generation.set(generation);

        let state = self.state.clone();
        let task = self.runner.post_delayed_task(delay, move || {
            match state.armed.get() {
                Some(armed) if armed.generation == generation => {
                    state.armed.set(None);
                    on_timeout();
                }
                _ => log::trace!("Stale watchdog check {} ignored", generation),
            }
        });
        self.state.armed.set(Some(Armed { task, generation }));
        log::debug!("Watchdog armed for {:?}", delay);
    }

    /// Arm a check only when none is pending; returns whether it armed
    pub fn schedule_if_idle(&self, delay: Duration, on_timeout: impl FnOnce() + 'static) -> bool {
        if self.is_armed() {
            return false;
        }
        self.schedule(delay, on_timeout);
        true
    }

    /// Disarm the pending check; returns whether one was pending
    pub fn cancel(&self) -> bool {
        match self.state.armed.take() {
            Some(armed) => {
                self.runner.cancel(armed.task);
                log::debug!("Watchdog cancelled");
                true
            }
            None => false,
        }
    }

    /// Whether a check is pending
    pub fn is_armed(&self) -> bool {
        self.state.armed.get().is_some()
    }
}

impl Drop for ResponsivenessWatchdog {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::time::millis;

    fn counter() -> (Rc<Cell<usize>>, impl Fn() -> Box<dyn FnOnce()>) {
        let fired = Rc::new(Cell::new(0));
        let sink = fired.clone();
        (fired, move || {
            let sink = sink.clone();
            Box::new(move || sink.set(sink.get() + 1))
        })
    }

    #[test]
    fn test_fires_once_after_deadline() {
        let runner = Rc::new(TaskRunner::manual());
        let watchdog = ResponsivenessWatchdog::new(runner.clone());
        let (fired, callback) = counter();

        watchdog.schedule(millis(100), callback());
        runner.advance(millis(99));
        assert_eq!(fired.get(), 0);

        runner.advance(millis(1));
        assert_eq!(fired.get(), 1);
        assert!(!watchdog.is_armed());

        runner.advance(millis(1000));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_acknowledged_before_deadline() {
        let runner = Rc::new(TaskRunner::manual());
        let watchdog = ResponsivenessWatchdog::new(runner.clone());
        let (fired, callback) = counter();

        watchdog.schedule(millis(100), callback());
        runner.advance(millis(50));
        assert!(watchdog.cancel());

        runner.advance(millis(150));
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn test_second_schedule_supersedes_first() {
        let runner = Rc::new(TaskRunner::manual());
        let watchdog = ResponsivenessWatchdog::new(runner.clone());
        let (fired, callback) = counter();

        watchdog.schedule(millis(100), callback());
        runner.advance(millis(30));
        watchdog.schedule(millis(100), callback());

        runner.advance(millis(80));
        assert_eq!(fired.get(), 0);
        runner.advance(millis(20));
        assert_eq!(fired.get(), 1);
        runner.advance(millis(500));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_schedule_if_idle_keeps_pending_check() {
        let runner = Rc::new(TaskRunner::manual());
        let watchdog = ResponsivenessWatchdog::new(runner.clone());
        let (fired, callback) = counter();

        assert!(watchdog.schedule_if_idle(millis(5000), callback()));
        assert!(!watchdog.schedule_if_idle(millis(50), callback()));

        runner.advance(millis(100));
        assert_eq!(fired.get(), 0);
        runner.advance(millis(4900));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_cancel_in_same_tick_as_deadline() {
        let runner = Rc::new(TaskRunner::manual());
        let watchdog = Rc::new(ResponsivenessWatchdog::new(runner.clone()));
        let (fired, callback) = counter();

        // A task due at the same instant, posted first, cancels the check
        {
            let watchdog = watchdog.clone();
            runner.post_delayed_task(millis(100), move || {
                watchdog.cancel();
            });
        }
        watchdog.schedule(millis(100), callback());

        runner.advance(millis(100));
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn test_rearm_after_firing() {
        let runner = Rc::new(TaskRunner::manual());
        let watchdog = ResponsivenessWatchdog::new(runner.clone());
        let (fired, callback) = counter();

        watchdog.schedule(millis(10), callback());
        runner.advance(millis(10));
        watchdog.schedule(millis(10), callback());
        runner.advance(millis(10));
        assert_eq!(fired.get(), 2);
    }
}
