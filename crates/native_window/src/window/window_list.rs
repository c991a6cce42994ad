//! Registry of the live windows owned by the current thread
//!
//! Windows join the list when they are created and leave it when their
//! native window reports closed. The list holds them weakly; dropping the
//! last handle of a window also takes it out.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::NativeWindow;

/// Listener for window list changes
#[allow(unused_variables)]
pub trait WindowListObserver {
    /// A window was created
    fn on_window_added(&self, window: &NativeWindow) {}

    /// A window closed and left the list
    fn on_window_removed(&self, window: &NativeWindow) {}

    /// A close request was vetoed by an observer or by the page
    fn on_window_close_cancelled(&self, window: &NativeWindow) {}

    /// The last window left the list
    fn on_window_all_closed(&self) {}
}

#[derive(Default)]
struct Registry {
    windows: Vec<Weak<NativeWindow>>,
    observers: Vec<Weak<dyn WindowListObserver>>,
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

/// Thread-local list of live windows
pub struct WindowList;

impl WindowList {
    /// Every live window, oldest first
    pub fn windows() -> Vec<Rc<NativeWindow>> {
        REGISTRY.with(|registry| {
            let mut registry = registry.borrow_mut();
            registry.windows.retain(|window| window.strong_count() > 0);
            registry.windows.iter().filter_map(Weak::upgrade).collect()
        })
    }

    /// Number of live windows
    pub fn len() -> usize {
        Self::windows().len()
    }

    /// Whether no window is live
    pub fn is_empty() -> bool {
        Self::len() == 0
    }

    /// Register a list observer; the list holds it weakly
    pub fn add_observer<O: WindowListObserver + 'static>(observer: &Rc<O>) {
        let observer = Rc::downgrade(observer);
        let observer: Weak<dyn WindowListObserver> = observer;
        REGISTRY.with(|registry| {
            let mut registry = registry.borrow_mut();
            if !registry.observers.iter().any(|known| Weak::ptr_eq(known, &observer)) {
                registry.observers.push(observer);
            }
        });
    }

    /// Unregister a list observer
    pub fn remove_observer<O: WindowListObserver + 'static>(observer: &Rc<O>) {
        let observer = Rc::downgrade(observer);
        let observer: Weak<dyn WindowListObserver> = observer;
        REGISTRY.with(|registry| {
            registry
                .borrow_mut()
                .observers
                .retain(|known| !Weak::ptr_eq(known, &observer));
        });
    }

    /// Ask every window to close gracefully
    pub fn close_all_windows() {
        for window in Self::windows() {
            window.close();
        }
    }

    pub(crate) fn add_window(window: &Rc<NativeWindow>) {
        REGISTRY.with(|registry| registry.borrow_mut().windows.push(Rc::downgrade(window)));
        log::debug!("Window added, {} live", Self::len());
        for observer in Self::observers() {
            observer.on_window_added(window);
        }
    }

    pub(crate) fn remove_window(window: &NativeWindow) {
        let removed = REGISTRY.with(|registry| {
            let mut registry = registry.borrow_mut();
            let position = registry
                .windows
                .iter()
                .position(|known| std::ptr::eq(known.as_ptr(), window));
            position.map(|index| registry.windows.remove(index)).is_some()
        });
        if !removed {
            return;
        }

        let observers = Self::observers();
        for observer in &observers {
            observer.on_window_removed(window);
        }
        if Self::is_empty() {
            log::info!("All windows closed");
            for observer in &observers {
                observer.on_window_all_closed();
            }
        }
    }

    pub(crate) fn window_close_cancelled(window: &NativeWindow) {
        log::debug!("Window close cancelled");
        for observer in Self::observers() {
            observer.on_window_close_cancelled(window);
        }
    }

    fn observers() -> Vec<Rc<dyn WindowListObserver>> {
        REGISTRY.with(|registry| {
            let mut registry = registry.borrow_mut();
            registry.observers.retain(|observer| observer.strong_count() > 0);
            registry.observers.iter().filter_map(Weak::upgrade).collect()
        })
    }
}
