//! Window lifecycle observers and the list that fans events out to them
//!
//! The list never owns an observer: it keeps a weak reference plus the
//! registration handle returned to the registrant. Each notification round
//! runs over a registration-ordered snapshot taken when the round starts, so
//! observers may add or remove observers (themselves included) from inside a
//! callback without anyone being skipped or called twice in that round.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::foundation::collections::{ObserverId, SlotMap};

/// Listener for window lifecycle events
///
/// Every method has an empty default, so observers implement only what they
/// care about. Callbacks run synchronously on the window's owning thread after
/// the window has already updated its own state.
#[allow(unused_variables)]
pub trait NativeWindowObserver {
    /// The page title changed; set `prevent_default` to keep the window title
    fn on_page_title_updated(&self, prevent_default: &mut bool, title: &str) {}

    /// The page asked for a popup window
    fn will_create_popup_window(&self, frame_name: &str, target_url: &str, partition_id: &str) {}

    /// The page is about to navigate; set `prevent_default` to stop it
    fn will_navigate(&self, prevent_default: &mut bool, url: &str) {}

    /// The window is about to close; set `prevent_default` to cancel
    fn will_close_window(&self, prevent_default: &mut bool) {}

    /// The window was closed
    fn on_window_closed(&self) {}

    /// The window lost focus
    fn on_window_blur(&self) {}

    /// The window gained focus
    fn on_window_focus(&self) {}

    /// The window was maximized
    fn on_window_maximize(&self) {}

    /// The window left the maximized state
    fn on_window_unmaximize(&self) {}

    /// The window was minimized
    fn on_window_minimize(&self) {}

    /// The window was restored from minimized
    fn on_window_restore(&self) {}

    /// The window entered fullscreen
    fn on_window_enter_full_screen(&self) {}

    /// The window left fullscreen
    fn on_window_leave_full_screen(&self) {}

    /// The hosted page stopped responding
    fn on_renderer_unresponsive(&self) {}
}

struct Registration {
    sequence: u64,
    observer: Weak<dyn NativeWindowObserver>,
}

/// Ordered, non-owning multicast list of window observers
#[derive(Default)]
pub struct ObserverList {
    registrations: RefCell<SlotMap<ObserverId, Registration>>,
    next_sequence: Cell<u64>,
}

impl ObserverList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer`; adding an already-registered observer returns its
    /// existing handle
    pub fn add<O: NativeWindowObserver + 'static>(&self, observer: &Rc<O>) -> ObserverId {
        let weak = Rc::downgrade(observer);
        let weak: Weak<dyn NativeWindowObserver> = weak;
        self.add_weak(weak)
    }

    /// Register an observer already held as a trait object
    pub fn add_weak(&self, observer: Weak<dyn NativeWindowObserver>) -> ObserverId {
        let mut registrations = self.registrations.borrow_mut();
        if let Some((id, _)) = registrations
            .iter()
            .find(|(_, registration)| Weak::ptr_eq(&registration.observer, &observer))
        {
            return id;
        }

        let sequence = self.next_sequence.get();
        self.next_sequence.set(sequence + 1);
        registrations.insert(Registration { sequence, observer })
    }

    /// Unregister by handle; returns false for unknown handles
    pub fn remove(&self, id: ObserverId) -> bool {
        self.registrations.borrow_mut().remove(id).is_some()
    }

    /// Whether `id` is still registered
    pub fn contains(&self, id: ObserverId) -> bool {
        self.registrations.borrow().contains_key(id)
    }

    /// Number of registrations, live or not
    pub fn len(&self) -> usize {
        self.registrations.borrow().len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.registrations.borrow().is_empty()
    }

    /// Call `f` once for every observer registered when the round starts
    ///
    /// Observers whose owners already dropped them are skipped and pruned.
    pub fn for_each(&self, mut f: impl FnMut(&dyn NativeWindowObserver)) {
        for observer in self.snapshot() {
            f(observer.as_ref());
        }
    }

    fn snapshot(&self) -> Vec<Rc<dyn NativeWindowObserver>> {
        let mut registrations = self.registrations.borrow_mut();
        registrations.retain(|_, registration| registration.observer.strong_count() > 0);

        let mut ordered: Vec<&Registration> = registrations.values().collect();
        ordered.sort_by_key(|registration| registration.sequence);
        ordered
            .into_iter()
            .filter_map(|registration| registration.observer.upgrade())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl NativeWindowObserver for Counting {
        fn on_window_focus(&self) {
            self.log.borrow_mut().push(self.name);
        }
    }

    fn counting(name: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) -> Rc<Counting> {
        Rc::new(Counting {
            name,
            log: log.clone(),
        })
    }

    #[test]
    fn test_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let list = ObserverList::new();
        let a = counting("a", &log);
        let b = counting("b", &log);
        let c = counting("c", &log);
        let id_a = list.add(&a);
        list.add(&b);
        list.add(&c);

        // Reusing a freed slot must not move the new observer ahead
        list.remove(id_a);
        list.add(&a);

        list.for_each(|observer| observer.on_window_focus());
        assert_eq!(*log.borrow(), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_duplicate_add_returns_same_handle() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let list = ObserverList::new();
        let a = counting("a", &log);
        assert_eq!(list.add(&a), list.add(&a));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_dropped_observer_is_skipped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let list = ObserverList::new();
        let a = counting("a", &log);
        let b = counting("b", &log);
        list.add(&a);
        list.add(&b);
        drop(a);

        list.for_each(|observer| observer.on_window_focus());
        assert_eq!(*log.borrow(), vec!["b"]);
        assert_eq!(list.len(), 1);
    }

    struct RemovesOther {
        list: Rc<ObserverList>,
        victim: Cell<Option<ObserverId>>,
        calls: Cell<usize>,
    }

    impl NativeWindowObserver for RemovesOther {
        fn on_window_focus(&self) {
            self.calls.set(self.calls.get() + 1);
            if let Some(id) = self.victim.take() {
                self.list.remove(id);
            }
        }
    }

    #[test]
    fn test_removal_during_round() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let list = Rc::new(ObserverList::new());
        let remover = Rc::new(RemovesOther {
            list: list.clone(),
            victim: Cell::new(None),
            calls: Cell::new(0),
        });
        let victim = counting("victim", &log);
        let survivor = counting("survivor", &log);

        list.add(&remover);
        let victim_id = list.add(&victim);
        list.add(&survivor);
        remover.victim.set(Some(victim_id));

        // Round one runs over the snapshot taken before the removal
        list.for_each(|observer| observer.on_window_focus());
        assert_eq!(*log.borrow(), vec!["victim", "survivor"]);

        // Round two no longer sees the removed observer
        log.borrow_mut().clear();
        list.for_each(|observer| observer.on_window_focus());
        assert_eq!(*log.borrow(), vec!["survivor"]);
        assert_eq!(remover.calls.get(), 2);
    }
}
