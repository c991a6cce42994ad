//! Graceful close, vetoes and teardown ordering

use std::rc::Rc;

use crate::content::ContentDelegate;
use crate::foundation::time::millis;
use crate::window::{WindowList, CLOSE_UNRESPONSIVE_TIMEOUT};

use super::{headless, EventLog, Fixture, ListLog};

#[test]
fn test_graceful_close_without_unload_handler() {
    let fixture = Fixture::new();
    let window = fixture.window();
    let page = fixture.page();
    let log = Rc::new(EventLog::default());
    window.add_observer(&log);

    window.close();
    assert!(!window.is_closed());
    assert!(window.is_unresponsive_check_pending());

    fixture.drain();
    assert!(window.is_closed());
    assert!(page.is_destroyed());
    assert!(window.web_contents().is_none());
    assert!(!window.is_unresponsive_check_pending());
    assert!(!window.is_visible());
    assert_eq!(log.events(), vec!["will-close", "closed"]);
    assert!(WindowList::is_empty());
}

#[test]
fn test_close_button_runs_same_protocol() {
    let fixture = Fixture::new();
    let window = fixture.window();
    let log = Rc::new(EventLog::default());
    window.add_observer(&log);

    headless(&window).simulate_close_button();
    fixture.drain();

    assert!(window.is_closed());
    assert_eq!(log.count("will-close"), 1);
    assert_eq!(log.count("closed"), 1);
}

#[test]
fn test_observer_vetoes_close() {
    let fixture = Fixture::new();
    let list = Rc::new(ListLog::default());
    WindowList::add_observer(&list);
    let window = fixture.window();
    let page = fixture.page();
    let log = Rc::new(EventLog::default());
    log.veto_close.set(true);
    window.add_observer(&log);

    window.close();
    fixture.drain();

    assert!(!window.is_closed());
    assert!(!page.is_destroyed());
    assert!(!window.is_unresponsive_check_pending());
    assert_eq!(list.close_cancelled.get(), 1);
    assert_eq!(log.events(), vec!["will-close"]);

    // Lifting the veto lets the next attempt through
    log.veto_close.set(false);
    window.close();
    fixture.drain();
    assert!(window.is_closed());
}

#[test]
fn test_page_cancels_unload() {
    let fixture = Fixture::new();
    let list = Rc::new(ListLog::default());
    WindowList::add_observer(&list);
    let window = fixture.window();
    let page = fixture.page();
    page.set_before_unload_handler(true, false);

    window.close();
    fixture.drain();

    assert!(!window.is_closed());
    assert!(!page.is_destroyed());
    assert!(!window.is_unresponsive_check_pending());
    assert_eq!(list.close_cancelled.get(), 1);

    // The pending close timeout was cancelled with the close
    let log = Rc::new(EventLog::default());
    window.add_observer(&log);
    fixture.runner.advance(CLOSE_UNRESPONSIVE_TIMEOUT * 2);
    assert_eq!(log.count("unresponsive"), 0);
}

#[test]
fn test_page_allows_unload() {
    let fixture = Fixture::new();
    let window = fixture.window();
    let page = fixture.page();
    page.set_before_unload_handler(true, true);

    window.close();
    fixture.drain();

    assert!(window.is_closed());
    assert!(page.is_destroyed());
    assert!(!window.is_unresponsive_check_pending());
}

#[test]
fn test_hung_page_reported_at_close_timeout() {
    let fixture = Fixture::new();
    let window = fixture.window();
    let page = fixture.page();
    page.set_hung(true);
    let log = Rc::new(EventLog::default());
    window.add_observer(&log);

    window.close();
    fixture.runner.advance(CLOSE_UNRESPONSIVE_TIMEOUT - millis(1));
    assert_eq!(log.count("unresponsive"), 0);

    fixture.runner.advance(millis(1));
    assert_eq!(log.count("unresponsive"), 1);
    assert!(!window.is_closed());
    assert!(!window.is_unresponsive_check_pending());

    // The user may still force the window shut
    window.close_immediately();
    assert!(window.is_closed());
}

#[test]
fn test_page_closing_itself_skips_observers() {
    let fixture = Fixture::new();
    let window = fixture.window();
    let page = fixture.page();
    let log = Rc::new(EventLog::default());
    window.add_observer(&log);

    page.simulate_script_close();
    fixture.drain();

    assert!(window.is_closed());
    assert!(page.is_destroyed());
    assert_eq!(log.count("will-close"), 0);
    assert_eq!(log.count("closed"), 1);
}

#[test]
fn test_close_immediately_keeps_page_until_drop() {
    let fixture = Fixture::new();
    let window = fixture.window();
    let page = fixture.page();

    window.close_immediately();
    assert!(window.is_closed());
    assert!(!page.is_destroyed());

    drop(window);
    assert!(page.is_destroyed());
}

#[test]
fn test_close_all_windows() {
    let fixture = Fixture::new();
    let list = Rc::new(ListLog::default());
    WindowList::add_observer(&list);
    let first = fixture.window();
    let second = fixture.window();
    assert_eq!(WindowList::len(), 2);

    WindowList::close_all_windows();
    fixture.drain();

    assert!(first.is_closed());
    assert!(second.is_closed());
    assert!(WindowList::is_empty());
    assert_eq!(list.removed.get(), 2);
    assert_eq!(list.all_closed.get(), 1);
    assert!(fixture.contents.created().iter().all(|page| page.is_destroyed()));
}

#[test]
fn test_teardown_order_and_idempotence() {
    let fixture = Fixture::new();
    let window = fixture.window();
    let page = fixture.page();
    window.open_devtools(true);
    let devtools = fixture.page();
    assert!(!Rc::ptr_eq(&page, &devtools));

    let manager = window.javascript_dialog_manager().unwrap();
    assert_eq!(Rc::strong_count(&manager), 2);

    window.teardown();
    assert!(devtools.is_destroyed());
    assert!(page.is_destroyed());
    assert!(window.devtools_web_contents().is_none());
    assert_eq!(Rc::strong_count(&manager), 1);
    assert!(window.javascript_dialog_manager().is_none());

    window.teardown();
    drop(window);
    assert!(page.is_destroyed());
}
