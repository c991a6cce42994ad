//! Controller-level scenarios driven through the headless backends

mod close_protocol;
mod content_delegate;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::WindowOptions;
use crate::content::{HeadlessContentFactory, HeadlessWebContents, ScriptedDialogPresenter};
use crate::events::TaskRunner;
use crate::foundation::logging;

use super::{HeadlessPlatform, HeadlessWindow, NativeWindow, NativeWindowObserver, WindowListObserver, WindowServices};

/// Headless collaborators shared by one test's windows
struct Fixture {
    runner: Rc<TaskRunner>,
    platform: Rc<HeadlessPlatform>,
    contents: Rc<HeadlessContentFactory>,
    presenter: Rc<ScriptedDialogPresenter>,
}

impl Fixture {
    fn new() -> Self {
        logging::try_init();
        let runner = Rc::new(TaskRunner::manual());
        Self {
            platform: Rc::new(HeadlessPlatform::new()),
            contents: Rc::new(HeadlessContentFactory::new(runner.clone(), 1)),
            presenter: Rc::new(ScriptedDialogPresenter::new()),
            runner,
        }
    }

    fn services(&self) -> WindowServices {
        WindowServices {
            task_runner: self.runner.clone(),
            platform: self.platform.clone(),
            contents: self.contents.clone(),
            dialogs: self.presenter.clone(),
        }
    }

    fn window(&self) -> Rc<NativeWindow> {
        self.window_with(&WindowOptions::default())
    }

    fn window_with(&self, options: &WindowOptions) -> Rc<NativeWindow> {
        NativeWindow::create(options, &self.services()).unwrap()
    }

    /// Run queued tasks until none is due
    fn drain(&self) {
        while self.runner.run_pending() > 0 {}
    }

    /// Page created most recently (a window's page, or an inspector)
    fn page(&self) -> Rc<HeadlessWebContents> {
        self.contents.last_created().unwrap()
    }
}

fn headless(window: &NativeWindow) -> &HeadlessWindow {
    window
        .platform_window()
        .and_then(|platform| platform.as_any().downcast_ref::<HeadlessWindow>())
        .unwrap()
}

/// Observer recording every event by name, with switchable vetoes
#[derive(Default)]
struct EventLog {
    events: RefCell<Vec<String>>,
    veto_close: Cell<bool>,
    prevent_navigation: Cell<bool>,
    prevent_title: Cell<bool>,
}

impl EventLog {
    fn push(&self, event: impl Into<String>) {
        self.events.borrow_mut().push(event.into());
    }

    fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    fn count(&self, event: &str) -> usize {
        self.events.borrow().iter().filter(|e| *e == event).count()
    }

    fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl NativeWindowObserver for EventLog {
    fn on_page_title_updated(&self, prevent_default: &mut bool, title: &str) {
        self.push(format!("title:{title}"));
        if self.prevent_title.get() {
            *prevent_default = true;
        }
    }

    fn will_create_popup_window(&self, frame_name: &str, target_url: &str, _partition_id: &str) {
        self.push(format!("popup:{frame_name}:{target_url}"));
    }

    fn will_navigate(&self, prevent_default: &mut bool, url: &str) {
        self.push(format!("navigate:{url}"));
        if self.prevent_navigation.get() {
            *prevent_default = true;
        }
    }

    fn will_close_window(&self, prevent_default: &mut bool) {
        self.push("will-close");
        if self.veto_close.get() {
            *prevent_default = true;
        }
    }

    fn on_window_closed(&self) {
        self.push("closed");
    }

    fn on_window_blur(&self) {
        self.push("blur");
    }

    fn on_window_focus(&self) {
        self.push("focus");
    }

    fn on_window_maximize(&self) {
        self.push("maximize");
    }

    fn on_window_unmaximize(&self) {
        self.push("unmaximize");
    }

    fn on_window_minimize(&self) {
        self.push("minimize");
    }

    fn on_window_restore(&self) {
        self.push("restore");
    }

    fn on_window_enter_full_screen(&self) {
        self.push("enter-full-screen");
    }

    fn on_window_leave_full_screen(&self) {
        self.push("leave-full-screen");
    }

    fn on_renderer_unresponsive(&self) {
        self.push("unresponsive");
    }
}

/// Window list observer counting each callback
#[derive(Default)]
struct ListLog {
    added: Cell<usize>,
    removed: Cell<usize>,
    close_cancelled: Cell<usize>,
    all_closed: Cell<usize>,
}

impl WindowListObserver for ListLog {
    fn on_window_added(&self, _window: &NativeWindow) {
        self.added.set(self.added.get() + 1);
    }

    fn on_window_removed(&self, _window: &NativeWindow) {
        self.removed.set(self.removed.get() + 1);
    }

    fn on_window_close_cancelled(&self, _window: &NativeWindow) {
        self.close_cancelled.set(self.close_cancelled.get() + 1);
    }

    fn on_window_all_closed(&self) {
        self.all_closed.set(self.all_closed.get() + 1);
    }
}
