//! Tracking of modal dialogs shown over a window
//!
//! Dialogs can nest (a prompt raised from inside a save dialog callback, two
//! message boxes queued by different callers), so attachment is counted
//! rather than flagged: the window only reports "no dialog" once every scope
//! has ended.

use std::cell::Cell;
use std::rc::Rc;

/// Shared count of dialogs currently attached to one window
#[derive(Debug, Clone, Default)]
pub struct DialogCounter(Rc<Cell<usize>>);

impl DialogCounter {
    /// Create a counter with no dialogs attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether at least one dialog is attached
    pub fn has_dialog(&self) -> bool {
        self.0.get() > 0
    }

    /// Number of dialogs currently attached
    pub fn count(&self) -> usize {
        self.0.get()
    }

    /// Enter a dialog scope; it ends when the guard is dropped
    pub fn enter(&self) -> DialogScope {
        self.0.set(self.0.get() + 1);
        DialogScope {
            counter: Some(self.clone()),
        }
    }
}

/// Marks a dialog as attached for as long as it lives
///
/// Dropping the scope on any exit path (early return, `?`, unwinding)
/// detaches the dialog again.
#[derive(Debug)]
#[must_use = "the dialog is detached as soon as the scope is dropped"]
pub struct DialogScope {
    counter: Option<DialogCounter>,
}

impl DialogScope {
    /// Scope that tracks nothing, for dialogs shown without a parent window
    pub const fn detached() -> Self {
        Self { counter: None }
    }
}

impl Drop for DialogScope {
    fn drop(&mut self) {
        if let Some(counter) = self.counter.take() {
            let current = counter.0.get();
            debug_assert!(current > 0, "dialog scope released more often than entered");
            counter.0.set(current.saturating_sub(1));
        }
    }
}
