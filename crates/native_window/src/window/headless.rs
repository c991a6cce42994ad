//! In-memory platform backend
//!
//! `HeadlessWindow` tracks every attribute a real window would have and
//! reports its transitions through the sink the way an OS would, so the
//! controller can be driven without a display server.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use raw_window_handle::RawWindowHandle;

use crate::config::WindowOptions;
use crate::content::{Bitmap, DraggableRegion};
use crate::error::{WindowError, WindowResult};
use crate::foundation::geometry::{Point, Rect, Size};

use super::backend::{LifecycleObserverSink, MenuModel, PlatformWindow, PlatformWindowFactory};
use super::native_window::DEFAULT_SIZE;

/// Screen a headless window is placed on
pub const SCREEN_SIZE: Size = Size::new(1920, 1080);

/// Height of the simulated title bar of framed windows
pub const TITLE_BAR_HEIGHT: u32 = 30;

/// Platform window that only exists in memory
pub struct HeadlessWindow {
    sink: Weak<dyn LifecycleObserverSink>,
    has_frame: bool,
    bounds: Cell<Rect>,
    minimum_size: Cell<Size>,
    maximum_size: Cell<Size>,
    title: RefCell<String>,
    visible: Cell<bool>,
    focused: Cell<bool>,
    maximized: Cell<bool>,
    minimized: Cell<bool>,
    fullscreen: Cell<bool>,
    resizable: Cell<bool>,
    always_on_top: Cell<bool>,
    kiosk: Cell<bool>,
    flashing: Cell<bool>,
    skip_taskbar: Cell<bool>,
    all_workspaces: Cell<bool>,
    progress: Cell<f64>,
    overlay: RefCell<Option<String>>,
    icon_size: Cell<Option<(u32, u32)>>,
    represented_filename: RefCell<String>,
    document_edited: Cell<bool>,
    menu: RefCell<Option<Rc<dyn MenuModel>>>,
    menu_bar_auto_hide: Cell<bool>,
    menu_bar_visible: Cell<bool>,
    draggable_regions: RefCell<Vec<DraggableRegion>>,
}

impl HeadlessWindow {
    /// Create a hidden window reporting to `sink`
    pub fn new(sink: Weak<dyn LifecycleObserverSink>, options: &WindowOptions) -> Self {
        let size = Size::new(
            options.width.unwrap_or(DEFAULT_SIZE.width),
            options.height.unwrap_or(DEFAULT_SIZE.height),
        );
        Self {
            sink,
            has_frame: options.has_frame(),
            bounds: Cell::new(Rect::from_size(size)),
            minimum_size: Cell::new(Size::default()),
            maximum_size: Cell::new(Size::default()),
            title: RefCell::new(String::new()),
            visible: Cell::new(false),
            focused: Cell::new(false),
            maximized: Cell::new(false),
            minimized: Cell::new(false),
            fullscreen: Cell::new(false),
            resizable: Cell::new(true),
            always_on_top: Cell::new(false),
            kiosk: Cell::new(false),
            flashing: Cell::new(false),
            skip_taskbar: Cell::new(false),
            all_workspaces: Cell::new(false),
            progress: Cell::new(-1.0),
            overlay: RefCell::new(None),
            icon_size: Cell::new(None),
            represented_filename: RefCell::new(String::new()),
            document_edited: Cell::new(false),
            menu: RefCell::new(None),
            menu_bar_auto_hide: Cell::new(false),
            menu_bar_visible: Cell::new(true),
            draggable_regions: RefCell::new(Vec::new()),
        }
    }

    fn sink(&self) -> Option<Rc<dyn LifecycleObserverSink>> {
        self.sink.upgrade()
    }

    fn title_bar(&self) -> u32 {
        if self.has_frame {
            TITLE_BAR_HEIGHT
        } else {
            0
        }
    }

    fn clamp(&self, size: Size) -> Size {
        let min = self.minimum_size.get();
        let max = self.maximum_size.get();
        let mut width = size.width.max(min.width);
        let mut height = size.height.max(min.height);
        if max.width > 0 {
            width = width.min(max.width);
        }
        if max.height > 0 {
            height = height.min(max.height);
        }
        Size::new(width, height)
    }

    /// Simulate the user clicking the close button
    pub fn simulate_close_button(&self) {
        if let Some(sink) = self.sink() {
            sink.close_web_contents();
        }
    }

    /// Whether the taskbar entry is flashing
    pub fn is_flashing(&self) -> bool {
        self.flashing.get()
    }

    /// Whether the window is hidden from the taskbar
    pub fn skips_taskbar(&self) -> bool {
        self.skip_taskbar.get()
    }

    /// Current taskbar progress
    pub fn progress(&self) -> f64 {
        self.progress.get()
    }

    /// Description of the current overlay icon
    pub fn overlay_description(&self) -> Option<String> {
        self.overlay.borrow().clone()
    }

    /// Dimensions of the window icon
    pub fn icon_size(&self) -> Option<(u32, u32)> {
        self.icon_size.get()
    }

    /// Regions last reported by the page
    pub fn draggable_regions(&self) -> Vec<DraggableRegion> {
        self.draggable_regions.borrow().clone()
    }

    /// Labels of the attached menu
    pub fn menu_labels(&self) -> Vec<String> {
        let menu = self.menu.borrow().clone();
        menu.map(|menu| (0..menu.item_count()).filter_map(|i| menu.label_at(i)).collect())
            .unwrap_or_default()
    }
}

impl PlatformWindow for HeadlessWindow {
    fn close(&self) {
        if let Some(sink) = self.sink() {
            sink.close_web_contents();
        }
    }

    fn close_immediately(&self) {
        self.visible.set(false);
        self.focused.set(false);
        if let Some(sink) = self.sink() {
            sink.notify_window_closed();
        }
    }

    fn focus(&self, focus: bool) {
        if self.focused.replace(focus) == focus {
            return;
        }
        if let Some(sink) = self.sink() {
            if focus {
                sink.notify_window_focus();
            } else {
                sink.notify_window_blur();
            }
        }
    }

    fn is_focused(&self) -> bool {
        self.focused.get()
    }

    fn show(&self) {
        self.visible.set(true);
        self.focus(true);
    }

    fn show_inactive(&self) {
        self.visible.set(true);
    }

    fn hide(&self) {
        self.visible.set(false);
        self.focus(false);
    }

    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn maximize(&self) {
        if self.maximized.replace(true) {
            return;
        }
        if let Some(sink) = self.sink() {
            sink.notify_window_maximize();
        }
    }

    fn unmaximize(&self) {
        if !self.maximized.replace(false) {
            return;
        }
        if let Some(sink) = self.sink() {
            sink.notify_window_unmaximize();
        }
    }

    fn is_maximized(&self) -> bool {
        self.maximized.get()
    }

    fn minimize(&self) {
        if self.minimized.replace(true) {
            return;
        }
        if let Some(sink) = self.sink() {
            sink.notify_window_minimize();
        }
    }

    fn restore(&self) {
        if !self.minimized.replace(false) {
            return;
        }
        if let Some(sink) = self.sink() {
            sink.notify_window_restore();
        }
    }

    fn is_minimized(&self) -> bool {
        self.minimized.get()
    }

    fn set_full_screen(&self, fullscreen: bool) {
        if self.fullscreen.replace(fullscreen) == fullscreen {
            return;
        }
        if let Some(sink) = self.sink() {
            if fullscreen {
                sink.notify_window_enter_full_screen();
            } else {
                sink.notify_window_leave_full_screen();
            }
        }
    }

    fn is_full_screen(&self) -> bool {
        self.fullscreen.get()
    }

    fn set_size(&self, size: Size) {
        let size = self.clamp(size);
        let bounds = self.bounds.get();
        self.bounds.set(Rect::from_origin_size(bounds.origin(), size));
    }

    fn size(&self) -> Size {
        self.bounds.get().size()
    }

    fn set_content_size(&self, size: Size) {
        self.set_size(Size::new(size.width, size.height + self.title_bar()));
    }

    fn content_size(&self) -> Size {
        let size = self.size();
        Size::new(size.width, size.height.saturating_sub(self.title_bar()))
    }

    fn set_minimum_size(&self, size: Size) {
        self.minimum_size.set(size);
        self.set_size(self.size());
    }

    fn minimum_size(&self) -> Size {
        self.minimum_size.get()
    }

    fn set_maximum_size(&self, size: Size) {
        self.maximum_size.set(size);
        self.set_size(self.size());
    }

    fn maximum_size(&self) -> Size {
        self.maximum_size.get()
    }

    fn set_resizable(&self, resizable: bool) {
        self.resizable.set(resizable);
    }

    fn is_resizable(&self) -> bool {
        self.resizable.get()
    }

    fn set_always_on_top(&self, always_on_top: bool) {
        self.always_on_top.set(always_on_top);
    }

    fn is_always_on_top(&self) -> bool {
        self.always_on_top.get()
    }

    #[allow(clippy::cast_possible_wrap)]
    fn center(&self) {
        let size = self.size();
        let x = SCREEN_SIZE.width.saturating_sub(size.width) / 2;
        let y = SCREEN_SIZE.height.saturating_sub(size.height) / 2;
        self.set_position(Point::new(x as i32, y as i32));
    }

    fn set_position(&self, position: Point) {
        let bounds = self.bounds.get();
        self.bounds.set(Rect::from_origin_size(position, bounds.size()));
    }

    fn position(&self) -> Point {
        self.bounds.get().origin()
    }

    fn set_title(&self, title: &str) {
        *self.title.borrow_mut() = title.to_owned();
    }

    fn title(&self) -> String {
        self.title.borrow().clone()
    }

    fn flash_frame(&self, flash: bool) {
        self.flashing.set(flash);
    }

    fn set_skip_taskbar(&self, skip: bool) {
        self.skip_taskbar.set(skip);
    }

    fn set_kiosk(&self, kiosk: bool) {
        self.kiosk.set(kiosk);
        self.set_full_screen(kiosk);
    }

    fn is_kiosk(&self) -> bool {
        self.kiosk.get()
    }

    fn set_progress_bar(&self, progress: f64) {
        self.progress.set(progress);
    }

    fn set_overlay_icon(&self, overlay: Option<&Bitmap>, description: &str) {
        *self.overlay.borrow_mut() = overlay.map(|_| description.to_owned());
    }

    fn set_visible_on_all_workspaces(&self, visible: bool) {
        self.all_workspaces.set(visible);
    }

    fn is_visible_on_all_workspaces(&self) -> bool {
        self.all_workspaces.get()
    }

    fn set_icon(&self, icon: &Bitmap) {
        self.icon_size.set(Some(icon.dimensions()));
    }

    fn update_draggable_regions(&self, regions: &[DraggableRegion]) {
        *self.draggable_regions.borrow_mut() = regions.to_vec();
    }

    fn native_window(&self) -> Option<RawWindowHandle> {
        None
    }

    fn set_represented_filename(&self, filename: &str) {
        *self.represented_filename.borrow_mut() = filename.to_owned();
    }

    fn represented_filename(&self) -> String {
        self.represented_filename.borrow().clone()
    }

    fn set_document_edited(&self, edited: bool) {
        self.document_edited.set(edited);
    }

    fn is_document_edited(&self) -> bool {
        self.document_edited.get()
    }

    fn set_menu(&self, menu: Option<Rc<dyn MenuModel>>) {
        *self.menu.borrow_mut() = menu;
    }

    fn set_auto_hide_menu_bar(&self, auto_hide: bool) {
        self.menu_bar_auto_hide.set(auto_hide);
        if auto_hide {
            self.menu_bar_visible.set(false);
        }
    }

    fn is_menu_bar_auto_hide(&self) -> bool {
        self.menu_bar_auto_hide.get()
    }

    fn set_menu_bar_visibility(&self, visible: bool) {
        self.menu_bar_visible.set(visible);
    }

    fn is_menu_bar_visible(&self) -> bool {
        self.menu_bar_visible.get()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Factory of headless windows
#[derive(Default)]
pub struct HeadlessPlatform {
    created: Cell<usize>,
    fail_next: Cell<bool>,
}

impl HeadlessPlatform {
    /// Create a factory
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of windows created so far
    pub fn created_count(&self) -> usize {
        self.created.get()
    }

    /// Make the next creation fail
    pub fn fail_next_creation(&self) {
        self.fail_next.set(true);
    }
}

impl PlatformWindowFactory for HeadlessPlatform {
    fn create(
        &self,
        sink: Weak<dyn LifecycleObserverSink>,
        options: &WindowOptions,
    ) -> WindowResult<Box<dyn PlatformWindow>> {
        if self.fail_next.replace(false) {
            return Err(WindowError::PlatformCreation(String::from(
                "headless display unavailable",
            )));
        }
        self.created.set(self.created.get() + 1);
        Ok(Box::new(HeadlessWindow::new(sink, options)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        events: RefCell<Vec<&'static str>>,
    }

    impl LifecycleObserverSink for RecordingSink {
        fn close_web_contents(&self) {
            self.events.borrow_mut().push("close");
        }
        fn notify_window_closed(&self) {
            self.events.borrow_mut().push("closed");
        }
        fn notify_window_blur(&self) {
            self.events.borrow_mut().push("blur");
        }
        fn notify_window_focus(&self) {
            self.events.borrow_mut().push("focus");
        }
        fn notify_window_maximize(&self) {
            self.events.borrow_mut().push("maximize");
        }
        fn notify_window_unmaximize(&self) {
            self.events.borrow_mut().push("unmaximize");
        }
        fn notify_window_minimize(&self) {
            self.events.borrow_mut().push("minimize");
        }
        fn notify_window_restore(&self) {
            self.events.borrow_mut().push("restore");
        }
        fn notify_window_enter_full_screen(&self) {
            self.events.borrow_mut().push("enter-full-screen");
        }
        fn notify_window_leave_full_screen(&self) {
            self.events.borrow_mut().push("leave-full-screen");
        }
    }

    fn window(options: &WindowOptions) -> (Rc<RecordingSink>, HeadlessWindow) {
        let sink = Rc::new(RecordingSink::default());
        let weak: Weak<dyn LifecycleObserverSink> = Rc::downgrade(&sink) as Weak<dyn LifecycleObserverSink>;
        (sink, HeadlessWindow::new(weak, options))
    }

    #[test]
    fn test_transitions_reported_once() {
        let (sink, window) = window(&WindowOptions::default());
        window.maximize();
        window.maximize();
        window.unmaximize();
        window.set_kiosk(true);
        window.show();
        window.hide();

        assert_eq!(
            *sink.events.borrow(),
            vec!["maximize", "unmaximize", "enter-full-screen", "focus", "blur"]
        );
        assert!(window.is_kiosk());
        assert!(window.is_full_screen());
    }

    #[test]
    fn test_content_size_excludes_title_bar() {
        let (_sink, framed) = window(&WindowOptions::default());
        framed.set_content_size(Size::new(400, 300));
        assert_eq!(framed.size(), Size::new(400, 300 + TITLE_BAR_HEIGHT));
        assert_eq!(framed.content_size(), Size::new(400, 300));

        let frameless = WindowOptions {
            frame: Some(false),
            ..WindowOptions::default()
        };
        let (_sink, frameless) = window(&frameless);
        frameless.set_content_size(Size::new(400, 300));
        assert_eq!(frameless.size(), Size::new(400, 300));
    }

    #[test]
    fn test_size_respects_bounds() {
        let (_sink, window) = window(&WindowOptions::default());
        window.set_minimum_size(Size::new(200, 100));
        window.set_maximum_size(Size::new(1000, 0));
        window.set_size(Size::new(50, 5000));
        assert_eq!(window.size(), Size::new(200, 5000));
        window.set_size(Size::new(4000, 50));
        assert_eq!(window.size(), Size::new(1000, 100));
    }

    #[test]
    fn test_center_on_screen() {
        let (_sink, window) = window(&WindowOptions::default().with_size(800, 600));
        window.center();
        assert_eq!(window.position(), Point::new(560, 240));
    }

    #[test]
    fn test_close_button_starts_graceful_close() {
        let (sink, window) = window(&WindowOptions::default());
        window.simulate_close_button();
        window.close_immediately();
        assert_eq!(*sink.events.borrow(), vec!["close", "closed"]);
    }
}
