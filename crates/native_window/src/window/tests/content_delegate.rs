//! Engine callbacks handled by the window, and page capture

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::config::{WebPreferencesConfig, WindowOptions};
use crate::content::{
    Bitmap, ContentDelegate, DraggableRegion, FileChooserParams, WebContents, WebPreferences,
};
use crate::foundation::geometry::{Point, Rect, Size};

use super::{headless, EventLog, Fixture};

#[test]
fn test_title_update_applies_unless_prevented() {
    let fixture = Fixture::new();
    let window = fixture.window();
    let page = fixture.page();
    let log = Rc::new(EventLog::default());
    window.add_observer(&log);

    page.simulate_title_change("Inbox (3)");
    assert_eq!(window.title(), "Inbox (3)");

    log.prevent_title.set(true);
    page.simulate_title_change("Inbox (4)");
    assert_eq!(window.title(), "Inbox (3)");
    assert_eq!(log.events(), vec!["title:Inbox (3)", "title:Inbox (4)"]);
}

#[test]
fn test_popups_are_left_to_observers() {
    let fixture = Fixture::new();
    let window = fixture.window();
    let page = fixture.page();
    let log = Rc::new(EventLog::default());
    window.add_observer(&log);

    assert!(!page.simulate_popup("help", "https://example.com/help"));
    assert_eq!(log.events(), vec!["popup:help:https://example.com/help"]);
    assert_eq!(fixture.contents.created().len(), 1);
}

#[test]
fn test_navigation_can_be_prevented() {
    let fixture = Fixture::new();
    let window = fixture.window();
    let page = fixture.page();
    let log = Rc::new(EventLog::default());
    window.add_observer(&log);

    assert!(page.simulate_navigation("https://example.com/a"));
    assert_eq!(page.url(), "https://example.com/a");

    log.prevent_navigation.set(true);
    assert!(!page.simulate_navigation("https://example.com/b"));
    assert_eq!(page.url(), "https://example.com/a");
    assert_eq!(log.count("navigate:https://example.com/b"), 1);
}

#[test]
fn test_transparent_window_clears_page_background() {
    let fixture = Fixture::new();
    let _opaque = fixture.window();
    let opaque_page = fixture.page();
    let _transparent = fixture.window_with(&WindowOptions {
        transparent: Some(true),
        ..WindowOptions::default()
    });
    let transparent_page = fixture.page();

    opaque_page.simulate_render_view_created();
    transparent_page.simulate_render_view_created();

    assert!(opaque_page.is_background_opaque());
    assert!(!transparent_page.is_background_opaque());
}

#[test]
fn test_mouse_lock_granted() {
    let fixture = Fixture::new();
    let _window = fixture.window();
    let page = fixture.page();
    assert_eq!(page.mouse_lock_response(), None);

    page.simulate_mouse_lock_request();
    assert_eq!(page.mouse_lock_response(), Some(true));
}

#[test]
fn test_draggable_regions_forwarded() {
    let fixture = Fixture::new();
    let window = fixture.window_with(&WindowOptions {
        frame: Some(false),
        ..WindowOptions::default()
    });
    let page = fixture.page();
    let regions = [
        DraggableRegion {
            draggable: true,
            bounds: Rect::new(0, 0, 800, 32),
        },
        DraggableRegion {
            draggable: false,
            bounds: Rect::new(760, 0, 40, 32),
        },
    ];

    page.simulate_draggable_regions(&regions);
    assert_eq!(headless(&window).draggable_regions(), regions.to_vec());
}

#[test]
fn test_page_focus_and_geometry_requests() {
    let fixture = Fixture::new();
    let window = fixture.window();

    window.activate_contents();
    assert!(window.is_web_view_focused());
    window.deactivate_contents();
    assert!(!window.is_web_view_focused());

    window.move_contents(Rect::new(5, 6, 300, 200));
    assert_eq!(window.position(), Point::new(5, 6));
    assert_eq!(window.size(), Size::new(300, 200));

    assert!(!window.can_overscroll_content());
    assert!(!window.is_popup_or_panel());
}

#[test]
fn test_renderer_switches() {
    let fixture = Fixture::new();
    let plugins = std::env::temp_dir().join("plugins");
    let options = WindowOptions {
        preload: Some(PathBuf::from("relative/preload.js")),
        node_integration: Some(false),
        zoom_factor: Some(1.5),
        web_preferences: WebPreferencesConfig {
            overlay_scrollbars: Some(true),
            shared_worker: Some(false),
            extra_plugin_dirs: vec![plugins.clone()],
            ..WebPreferencesConfig::default()
        },
        ..WindowOptions::default()
    };
    let window = fixture.window_with(&options);
    assert!(window.preload_script().is_none());

    let mut switches = vec![String::from("--type=renderer")];
    window.append_renderer_switches(&mut switches);
    assert_eq!(
        switches,
        vec![
            String::from("--type=renderer"),
            String::from("--node-integration=false"),
            String::from("--zoom-factor=1.5"),
            String::from("--overlay-scrollbars"),
            format!("--extra-plugin-dirs={}", plugins.display()),
        ]
    );
}

#[test]
fn test_default_window_adds_no_switches() {
    let fixture = Fixture::new();
    let preload = std::env::temp_dir().join("preload.js");
    let window = fixture.window_with(&WindowOptions {
        preload: Some(preload.clone()),
        ..WindowOptions::default()
    });

    assert_eq!(window.preload_script(), Some(preload.as_path()));
    assert_eq!(window.renderer_switches(), vec![format!("--preload={}", preload.display())]);
}

#[test]
fn test_web_preferences_overridden() {
    let fixture = Fixture::new();
    let window = fixture.window_with(&WindowOptions {
        web_preferences: WebPreferencesConfig {
            javascript: Some(false),
            plugins: Some(false),
            ..WebPreferencesConfig::default()
        },
        ..WindowOptions::default()
    });

    let mut prefs = WebPreferences::default();
    window.override_web_preferences("https://example.com", &mut prefs);
    assert!(!prefs.javascript_enabled);
    assert!(!prefs.plugins_enabled);
    assert!(prefs.images_enabled);
}

#[test]
fn test_file_chooser_runs_as_modal_dialog() {
    let fixture = Fixture::new();
    let window = fixture.window();
    let chosen = vec![PathBuf::from("/tmp/a.txt"), PathBuf::from("/tmp/b.txt")];
    fixture.presenter.queue_open_paths(chosen.clone());

    let seen = Rc::new(RefCell::new(None));
    {
        let seen = seen.clone();
        let weak = Rc::downgrade(&window);
        fixture.presenter.on_show(move || {
            *seen.borrow_mut() = weak.upgrade().map(|window| window.has_modal_dialog());
        });
    }

    assert_eq!(window.run_file_chooser(&FileChooserParams::default()), chosen);
    assert_eq!(*seen.borrow(), Some(true));
    assert!(!window.has_modal_dialog());
    assert!(window.run_file_chooser(&FileChooserParams::default()).is_empty());
}

#[test]
fn test_dialog_manager_created_once() {
    let fixture = Fixture::new();
    let window = fixture.window();

    let first = window.javascript_dialog_manager().unwrap();
    let second = window.javascript_dialog_manager().unwrap();
    assert!(Rc::ptr_eq(&first, &second));
}

fn collect_captures() -> (Rc<RefCell<Vec<Bitmap>>>, impl Fn() -> Box<dyn FnOnce(Bitmap)>) {
    let captures: Rc<RefCell<Vec<Bitmap>>> = Rc::default();
    let sink = captures.clone();
    let make = move || -> Box<dyn FnOnce(Bitmap)> {
        let sink = sink.clone();
        Box::new(move |bitmap| sink.borrow_mut().push(bitmap))
    };
    (captures, make)
}

#[test]
fn test_capture_whole_page() {
    let fixture = Fixture::new();
    let window = fixture.window();
    let (captures, callback) = collect_captures();

    window.capture_page(Rect::default(), callback());
    assert!(captures.borrow().is_empty());

    fixture.drain();
    let captures = captures.borrow();
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].dimensions(), (800, 600));
}

#[test]
fn test_capture_scales_on_high_density_display() {
    let fixture = Fixture::new();
    let window = fixture.window();
    fixture.page().set_device_scale_factor(2.0);
    let (captures, callback) = collect_captures();

    window.capture_page(Rect::default(), callback());
    window.capture_page(Rect::new(10, 10, 101, 51), callback());
    fixture.drain();

    let sizes: Vec<_> = captures.borrow().iter().map(Bitmap::dimensions).collect();
    assert_eq!(sizes, vec![(1600, 1200), (202, 102)]);
}

#[test]
fn test_capture_failures_yield_empty_bitmaps() {
    let fixture = Fixture::new();
    let window = fixture.window();
    let page = fixture.page();
    let (captures, callback) = collect_captures();

    page.set_readback_fails(true);
    window.capture_page(Rect::default(), callback());
    page.set_readback_fails(false);
    page.set_view_bounds(None);
    window.capture_page(Rect::default(), callback());
    fixture.drain();

    window.destroy_web_contents();
    window.capture_page(Rect::default(), callback());
    fixture.drain();

    let sizes: Vec<_> = captures.borrow().iter().map(Bitmap::dimensions).collect();
    assert_eq!(sizes, vec![(0, 0), (0, 0), (0, 0)]);
}

#[test]
fn test_print_and_web_view_focus() {
    let fixture = Fixture::new();
    let window = fixture.window();
    let page = fixture.page();

    window.print(true, false);
    window.focus_on_web_view();
    assert!(window.is_web_view_focused());
    window.blur_web_view();
    assert!(!window.is_web_view_focused());
    window.show_definition_for_selection();

    window.close_immediately();
    window.print(false, true);
    assert_eq!(page.print_requests(), vec![(true, false)]);
}

#[test]
fn test_page_events_ignored_after_close() {
    let fixture = Fixture::new();
    let window = fixture.window();
    let page = fixture.page();
    let log = Rc::new(EventLog::default());
    window.add_observer(&log);
    window.set_title("Before");

    window.close_immediately();
    log.clear();

    page.simulate_title_change("After");
    assert!(!page.simulate_navigation("https://example.com/late"));
    assert!(!page.simulate_popup("late", "https://example.com/popup"));

    assert!(log.events().is_empty());
    assert_eq!(window.title(), "Before");
    assert_ne!(page.url(), "https://example.com/late");
}
