//! The window controller
//!
//! `NativeWindow` is the single owning handle of one on-screen window. It
//! keeps the few attributes it is authoritative for (closed state, options
//! fixed at creation, attached dialogs) and delegates everything visual to
//! its `PlatformWindow`. It plugs into its collaborators through three small
//! interfaces: `LifecycleObserverSink` for the platform backend,
//! `ContentDelegate` for the hosted page and `InspectorDelegate` for the
//! inspector front end. All of them hold the window weakly.
//!
//! Once the window is closed, every state-changing call is ignored and no
//! further observer notification is sent.

use std::cell::{Cell, OnceCell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};
use std::time::Duration;

use raw_window_handle::RawWindowHandle;
use serde_json::{json, Value};

use crate::config::{WebPreferencesConfig, WindowOptions};
use crate::content::{
    Bitmap, ContentDelegate, ContentId, DialogPresenter, DraggableRegion, FileChooserParams,
    HeadlessContentFactory, InspectableWebContents, InspectorDelegate, JavaScriptDialogManager,
    ScriptedDialogPresenter, WebContents, WebContentsFactory, WebPreferences,
};
use crate::error::{WindowError, WindowResult};
use crate::events::TaskRunner;
use crate::foundation::collections::ObserverId;
use crate::foundation::geometry::{Point, Rect, Size};

use super::backend::{LifecycleObserverSink, MenuModel, PlatformWindow, PlatformWindowFactory};
use super::capture::PageCapture;
use super::devtools_files::{suggested_path, DevToolsFileBridge};
use super::dialog::{DialogCounter, DialogScope};
use super::headless::HeadlessPlatform;
use super::observer::{NativeWindowObserver, ObserverList};
use super::state::WindowState;
use super::watchdog::{ResponsivenessWatchdog, CLOSE_UNRESPONSIVE_TIMEOUT, RENDERER_UNRESPONSIVE_DELAY};
use super::window_list::WindowList;

/// Size used when the options name only one dimension
pub const DEFAULT_SIZE: Size = Size::new(800, 600);

/// Collaborators a window is built from
#[derive(Clone)]
pub struct WindowServices {
    /// Owning thread's task runner
    pub task_runner: Rc<TaskRunner>,
    /// Creates the native window
    pub platform: Rc<dyn PlatformWindowFactory>,
    /// Creates hosted and inspector surfaces
    pub contents: Rc<dyn WebContentsFactory>,
    /// Shows modal dialogs
    pub dialogs: Rc<dyn DialogPresenter>,
}

impl WindowServices {
    /// Fully in-memory services on `task_runner`
    pub fn headless(task_runner: Rc<TaskRunner>) -> Self {
        Self {
            platform: Rc::new(HeadlessPlatform::new()),
            contents: Rc::new(HeadlessContentFactory::new(task_runner.clone(), 1)),
            dialogs: Rc::new(ScriptedDialogPresenter::new()),
            task_runner,
        }
    }
}

/// A native window hosting one web surface
pub struct NativeWindow {
    weak_self: Weak<NativeWindow>,
    platform: OnceCell<Box<dyn PlatformWindow>>,
    inspectable: InspectableWebContents,
    presenter: Rc<dyn DialogPresenter>,
    dialog_manager: RefCell<Option<Rc<JavaScriptDialogManager>>>,
    dialogs: DialogCounter,
    observers: ObserverList,
    watchdog: ResponsivenessWatchdog,
    capture: PageCapture,
    devtools_files: DevToolsFileBridge,
    is_closed: Cell<bool>,
    torn_down: Cell<bool>,

    has_frame: bool,
    transparent: bool,
    enable_larger_than_screen: bool,
    node_integration: bool,
    zoom_factor: f64,
    preload: Option<PathBuf>,
    web_preferences: WebPreferencesConfig,
    icon: Option<Bitmap>,
}

impl NativeWindow {
    /// Create a window around a freshly created hosted surface
    pub fn create(options: &WindowOptions, services: &WindowServices) -> WindowResult<Rc<Self>> {
        let contents = services.contents.create_web_contents()?;
        Self::create_with_contents(contents, options, services)
    }

    /// Create a window around `contents`, taking ownership of it
    pub fn create_with_contents(
        contents: Rc<dyn WebContents>,
        options: &WindowOptions,
        services: &WindowServices,
    ) -> WindowResult<Rc<Self>> {
        let zoom_factor = options.zoom();
        if !zoom_factor.is_finite() || zoom_factor <= 0.0 {
            contents.destroy();
            return Err(WindowError::InvalidOption {
                key: "zoom-factor",
                reason: format!("{zoom_factor} is not a positive finite factor"),
            });
        }

        let icon = options.icon.as_deref().and_then(|path| match load_icon(path) {
            Ok(icon) => Some(icon),
            Err(e) => {
                log::warn!("Failed to load window icon {}: {}", path.display(), e);
                None
            }
        });
        let preload = options.preload.clone().filter(|path| {
            if !path.is_absolute() {
                log::warn!("Ignoring preload script {}: path must be absolute", path.display());
            }
            path.is_absolute()
        });

        let window = Rc::new_cyclic(|weak_self| Self {
            weak_self: weak_self.clone(),
            platform: OnceCell::new(),
            inspectable: InspectableWebContents::new(contents.clone(), services.contents.clone()),
            presenter: services.dialogs.clone(),
            dialog_manager: RefCell::new(None),
            dialogs: DialogCounter::new(),
            observers: ObserverList::new(),
            watchdog: ResponsivenessWatchdog::new(services.task_runner.clone()),
            capture: PageCapture::new(services.task_runner.clone()),
            devtools_files: DevToolsFileBridge::new(),
            is_closed: Cell::new(false),
            torn_down: Cell::new(false),
            has_frame: options.has_frame(),
            transparent: options.is_transparent(),
            enable_larger_than_screen: options.larger_than_screen(),
            node_integration: options.node_integration_enabled(),
            zoom_factor,
            preload,
            web_preferences: options.web_preferences.clone(),
            icon,
        });

        let sink: Weak<dyn LifecycleObserverSink> = window.weak_self.clone();
        let platform = services.platform.create(sink, options)?;
        if window.platform.set(platform).is_err() {
            log::error!("Platform window attached twice");
        }

        let content_delegate: Weak<dyn ContentDelegate> = window.weak_self.clone();
        contents.set_delegate(Some(content_delegate));
        let inspector_delegate: Weak<dyn InspectorDelegate> = window.weak_self.clone();
        window.inspectable.set_delegate(inspector_delegate);

        WindowList::add_window(&window);
        window.init_from_options(options);
        log::info!("Created window for {:?}", contents.id());
        Ok(window)
    }

    /// Resolve the live window hosting the surface identified by `id`
    pub fn from_identity(id: ContentId) -> Option<Rc<Self>> {
        WindowList::windows().into_iter().find(|window| {
            window
                .web_contents()
                .is_some_and(|contents| contents.id() == id)
        })
    }

    /// Apply the initial geometry and state keys of `options`
    pub fn init_from_options(&self, options: &WindowOptions) {
        if options.width.is_some() || options.height.is_some() {
            let size = Size::new(
                options.width.unwrap_or(DEFAULT_SIZE.width),
                options.height.unwrap_or(DEFAULT_SIZE.height),
            );
            if options.use_content_size.unwrap_or(false) {
                self.set_content_size(size);
            } else {
                self.set_size(size);
            }
        }
        if options.min_width.is_some() || options.min_height.is_some() {
            self.set_minimum_size(Size::new(
                options.min_width.unwrap_or(0),
                options.min_height.unwrap_or(0),
            ));
        }
        if options.max_width.is_some() || options.max_height.is_some() {
            self.set_maximum_size(Size::new(
                options.max_width.unwrap_or(0),
                options.max_height.unwrap_or(0),
            ));
        }

        match (options.x, options.y) {
            (Some(x), Some(y)) => self.set_position(Point::new(x, y)),
            _ if options.center.unwrap_or(false) => self.center(),
            _ => {}
        }

        if let Some(resizable) = options.resizable {
            self.set_resizable(resizable);
        }
        if let Some(always_on_top) = options.always_on_top {
            self.set_always_on_top(always_on_top);
        }
        if options.fullscreen == Some(true) {
            self.set_full_screen(true);
        }
        if let Some(skip) = options.skip_taskbar {
            self.set_skip_taskbar(skip);
        }
        if options.kiosk == Some(true) {
            self.set_kiosk(true);
        }
        if let Some(auto_hide) = options.auto_hide_menu_bar {
            self.set_auto_hide_menu_bar(auto_hide);
        }
        if let Some(title) = &options.title {
            self.set_title(title);
        }
        if let (Some(icon), Some(platform)) = (&self.icon, self.live_platform()) {
            platform.set_icon(icon);
        }

        if options.should_show() {
            self.show();
        }
    }

    fn platform(&self) -> Option<&dyn PlatformWindow> {
        self.platform.get().map(|platform| &**platform)
    }

    /// Platform window, unless the window is closed
    fn live_platform(&self) -> Option<&dyn PlatformWindow> {
        if self.is_closed.get() {
            log::trace!("Ignoring call on closed window");
            return None;
        }
        self.platform()
    }

    /// The platform backend, for backend-specific access via `as_any`
    pub fn platform_window(&self) -> Option<&dyn PlatformWindow> {
        self.platform()
    }

    /// The hosted surface, until it is destroyed
    pub fn web_contents(&self) -> Option<Rc<dyn WebContents>> {
        self.inspectable.web_contents()
    }

    /// The inspector surface, while it is open
    pub fn devtools_web_contents(&self) -> Option<Rc<dyn WebContents>> {
        self.inspectable.devtools_web_contents()
    }

    /// Owner of the hosted and inspector surfaces
    pub fn inspectable_web_contents(&self) -> &InspectableWebContents {
        &self.inspectable
    }

    /// Paths the inspector saved files to
    pub fn devtools_files(&self) -> &DevToolsFileBridge {
        &self.devtools_files
    }

    /// Whether the window has a standard frame
    pub fn has_frame(&self) -> bool {
        self.has_frame
    }

    /// Whether the window background is transparent
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Whether the window may grow larger than the screen
    pub fn enable_larger_than_screen(&self) -> bool {
        self.enable_larger_than_screen
    }

    /// Whether the page gets node integration
    pub fn node_integration_enabled(&self) -> bool {
        self.node_integration
    }

    /// Default page zoom factor
    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    /// Script loaded before the page's own scripts
    pub fn preload_script(&self) -> Option<&Path> {
        self.preload.as_deref()
    }

    /// The `web-preferences` options the window was created with
    pub fn web_preferences(&self) -> &WebPreferencesConfig {
        &self.web_preferences
    }

    /// Decoded window icon
    pub fn icon(&self) -> Option<&Bitmap> {
        self.icon.as_ref()
    }

    /// Whether the window has closed; never reverts to false
    pub fn is_closed(&self) -> bool {
        self.is_closed.get()
    }

    // Observers

    /// Register a lifecycle observer; the window holds it weakly
    pub fn add_observer<O: NativeWindowObserver + 'static>(&self, observer: &Rc<O>) -> ObserverId {
        self.observers.add(observer)
    }

    /// Unregister a lifecycle observer
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    // Control surface

    /// Close gracefully, letting the page run its unload handlers
    pub fn close(&self) {
        if let Some(platform) = self.live_platform() {
            log::debug!("Close requested");
            platform.close();
        }
    }

    /// Close without consulting the page
    pub fn close_immediately(&self) {
        if let Some(platform) = self.live_platform() {
            log::debug!("Closing immediately");
            platform.close_immediately();
        }
    }

    /// Move and resize in one step
    pub fn move_to(&self, bounds: Rect) {
        if let Some(platform) = self.live_platform() {
            platform.move_to(bounds);
        }
    }

    /// Focus (`true`) or blur (`false`) the window
    pub fn focus(&self, focus: bool) {
        if let Some(platform) = self.live_platform() {
            platform.focus(focus);
        }
    }

    /// Whether the window has input focus
    pub fn is_focused(&self) -> bool {
        self.platform().is_some_and(|platform| platform.is_focused())
    }

    /// Show and activate
    pub fn show(&self) {
        if let Some(platform) = self.live_platform() {
            platform.show();
        }
    }

    /// Show without activating
    pub fn show_inactive(&self) {
        if let Some(platform) = self.live_platform() {
            platform.show_inactive();
        }
    }

    /// Hide
    pub fn hide(&self) {
        if let Some(platform) = self.live_platform() {
            platform.hide();
        }
    }

    /// Whether the window is shown
    pub fn is_visible(&self) -> bool {
        self.platform().is_some_and(|platform| platform.is_visible())
    }

    /// Maximize
    pub fn maximize(&self) {
        if let Some(platform) = self.live_platform() {
            platform.maximize();
        }
    }

    /// Leave the maximized state
    pub fn unmaximize(&self) {
        if let Some(platform) = self.live_platform() {
            platform.unmaximize();
        }
    }

    /// Whether the window is maximized
    pub fn is_maximized(&self) -> bool {
        self.platform().is_some_and(|platform| platform.is_maximized())
    }

    /// Minimize
    pub fn minimize(&self) {
        if let Some(platform) = self.live_platform() {
            platform.minimize();
        }
    }

    /// Restore from minimized
    pub fn restore(&self) {
        if let Some(platform) = self.live_platform() {
            platform.restore();
        }
    }

    /// Whether the window is minimized
    pub fn is_minimized(&self) -> bool {
        self.platform().is_some_and(|platform| platform.is_minimized())
    }

    /// Enter or leave fullscreen
    pub fn set_full_screen(&self, fullscreen: bool) {
        if let Some(platform) = self.live_platform() {
            platform.set_full_screen(fullscreen);
        }
    }

    /// Whether the window is fullscreen
    pub fn is_full_screen(&self) -> bool {
        self.platform().is_some_and(|platform| platform.is_full_screen())
    }

    /// Resize the outer frame
    pub fn set_size(&self, size: Size) {
        if let Some(platform) = self.live_platform() {
            platform.set_size(size);
        }
    }

    /// Outer frame size
    pub fn size(&self) -> Size {
        self.platform().map(|platform| platform.size()).unwrap_or_default()
    }

    /// Resize so the content area has `size`
    pub fn set_content_size(&self, size: Size) {
        if let Some(platform) = self.live_platform() {
            platform.set_content_size(size);
        }
    }

    /// Content area size
    pub fn content_size(&self) -> Size {
        self.platform().map(|platform| platform.content_size()).unwrap_or_default()
    }

    /// Lower size bound
    pub fn set_minimum_size(&self, size: Size) {
        if let Some(platform) = self.live_platform() {
            platform.set_minimum_size(size);
        }
    }

    /// Lower size bound
    pub fn minimum_size(&self) -> Size {
        self.platform().map(|platform| platform.minimum_size()).unwrap_or_default()
    }

    /// Upper size bound; zero means unbounded
    pub fn set_maximum_size(&self, size: Size) {
        if let Some(platform) = self.live_platform() {
            platform.set_maximum_size(size);
        }
    }

    /// Upper size bound
    pub fn maximum_size(&self) -> Size {
        self.platform().map(|platform| platform.maximum_size()).unwrap_or_default()
    }

    /// Allow or forbid user resizing
    pub fn set_resizable(&self, resizable: bool) {
        if let Some(platform) = self.live_platform() {
            platform.set_resizable(resizable);
        }
    }

    /// Whether the user can resize the window
    pub fn is_resizable(&self) -> bool {
        self.platform().is_some_and(|platform| platform.is_resizable())
    }

    /// Keep above other windows
    pub fn set_always_on_top(&self, always_on_top: bool) {
        if let Some(platform) = self.live_platform() {
            platform.set_always_on_top(always_on_top);
        }
    }

    /// Whether the window stays above other windows
    pub fn is_always_on_top(&self) -> bool {
        self.platform().is_some_and(|platform| platform.is_always_on_top())
    }

    /// Center on the current screen
    pub fn center(&self) {
        if let Some(platform) = self.live_platform() {
            platform.center();
        }
    }

    /// Move the top-left corner
    pub fn set_position(&self, position: Point) {
        if let Some(platform) = self.live_platform() {
            platform.set_position(position);
        }
    }

    /// Top-left corner
    pub fn position(&self) -> Point {
        self.platform().map(|platform| platform.position()).unwrap_or_default()
    }

    /// Title bar text
    pub fn set_title(&self, title: &str) {
        if let Some(platform) = self.live_platform() {
            platform.set_title(title);
        }
    }

    /// Title bar text
    pub fn title(&self) -> String {
        self.platform().map(|platform| platform.title()).unwrap_or_default()
    }

    /// Start or stop drawing the user's attention
    pub fn flash_frame(&self, flash: bool) {
        if let Some(platform) = self.live_platform() {
            platform.flash_frame(flash);
        }
    }

    /// Hide from or show in the taskbar
    pub fn set_skip_taskbar(&self, skip: bool) {
        if let Some(platform) = self.live_platform() {
            platform.set_skip_taskbar(skip);
        }
    }

    /// Enter or leave kiosk mode
    pub fn set_kiosk(&self, kiosk: bool) {
        if let Some(platform) = self.live_platform() {
            platform.set_kiosk(kiosk);
        }
    }

    /// Whether the window is in kiosk mode
    pub fn is_kiosk(&self) -> bool {
        self.platform().is_some_and(|platform| platform.is_kiosk())
    }

    /// Taskbar progress; negative removes the indicator
    pub fn set_progress_bar(&self, progress: f64) {
        if let Some(platform) = self.live_platform() {
            platform.set_progress_bar(progress);
        }
    }

    /// Taskbar badge icon; `None` removes it
    pub fn set_overlay_icon(&self, overlay: Option<&Bitmap>, description: &str) {
        if let Some(platform) = self.live_platform() {
            platform.set_overlay_icon(overlay, description);
        }
    }

    /// Show on every virtual desktop
    pub fn set_visible_on_all_workspaces(&self, visible: bool) {
        if let Some(platform) = self.live_platform() {
            platform.set_visible_on_all_workspaces(visible);
        }
    }

    /// Whether the window shows on every virtual desktop
    pub fn is_visible_on_all_workspaces(&self) -> bool {
        self.platform()
            .is_some_and(|platform| platform.is_visible_on_all_workspaces())
    }

    /// File the window represents
    pub fn set_represented_filename(&self, filename: &str) {
        if let Some(platform) = self.live_platform() {
            platform.set_represented_filename(filename);
        }
    }

    /// File the window represents
    pub fn represented_filename(&self) -> String {
        self.platform()
            .map(|platform| platform.represented_filename())
            .unwrap_or_default()
    }

    /// Mark the document as edited
    pub fn set_document_edited(&self, edited: bool) {
        if let Some(platform) = self.live_platform() {
            platform.set_document_edited(edited);
        }
    }

    /// Whether the document is marked edited
    pub fn is_document_edited(&self) -> bool {
        self.platform().is_some_and(|platform| platform.is_document_edited())
    }

    /// Attach a menu; `None` removes it
    pub fn set_menu(&self, menu: Option<Rc<dyn MenuModel>>) {
        if let Some(platform) = self.live_platform() {
            platform.set_menu(menu);
        }
    }

    /// Hide the menu bar until Alt is pressed
    pub fn set_auto_hide_menu_bar(&self, auto_hide: bool) {
        if let Some(platform) = self.live_platform() {
            platform.set_auto_hide_menu_bar(auto_hide);
        }
    }

    /// Whether the menu bar hides automatically
    pub fn is_menu_bar_auto_hide(&self) -> bool {
        self.platform().is_some_and(|platform| platform.is_menu_bar_auto_hide())
    }

    /// Show or hide the menu bar
    pub fn set_menu_bar_visibility(&self, visible: bool) {
        if let Some(platform) = self.live_platform() {
            platform.set_menu_bar_visibility(visible);
        }
    }

    /// Whether the menu bar is shown
    pub fn is_menu_bar_visible(&self) -> bool {
        self.platform().is_some_and(|platform| platform.is_menu_bar_visible())
    }

    /// Native handle, when the backend has one
    pub fn native_window(&self) -> Option<RawWindowHandle> {
        self.platform().and_then(|platform| platform.native_window())
    }

    /// Every platform-owned state bit at once
    pub fn state_flags(&self) -> WindowState {
        let Some(platform) = self.platform() else {
            return WindowState::empty();
        };

        let mut state = WindowState::empty();
        state.set(WindowState::FOCUSED, platform.is_focused());
        state.set(WindowState::VISIBLE, platform.is_visible());
        state.set(WindowState::MAXIMIZED, platform.is_maximized());
        state.set(WindowState::MINIMIZED, platform.is_minimized());
        state.set(WindowState::FULLSCREEN, platform.is_full_screen());
        state.set(WindowState::RESIZABLE, platform.is_resizable());
        state.set(WindowState::ALWAYS_ON_TOP, platform.is_always_on_top());
        state.set(WindowState::KIOSK, platform.is_kiosk());
        state.set(WindowState::ALL_WORKSPACES, platform.is_visible_on_all_workspaces());
        state
    }

    // Hosted surface

    /// Give the page keyboard focus
    pub fn focus_on_web_view(&self) {
        if self.is_closed.get() {
            return;
        }
        if let Some(contents) = self.web_contents() {
            contents.focus();
        }
    }

    /// Take keyboard focus away from the page
    pub fn blur_web_view(&self) {
        if self.is_closed.get() {
            return;
        }
        if let Some(contents) = self.web_contents() {
            contents.blur();
        }
    }

    /// Whether the page has keyboard focus
    pub fn is_web_view_focused(&self) -> bool {
        self.web_contents().is_some_and(|contents| contents.has_focus())
    }

    /// Capture `rect` of the page (empty for the whole page)
    ///
    /// Returns immediately; `callback` later receives the bitmap, which is
    /// empty when the readback failed.
    pub fn capture_page(&self, rect: Rect, callback: impl FnOnce(Bitmap) + 'static) {
        let contents = self.web_contents();
        self.capture.capture(contents.as_ref(), rect, Box::new(callback));
    }

    /// Print the page
    pub fn print(&self, silent: bool, print_background: bool) {
        if self.is_closed.get() {
            return;
        }
        if let Some(contents) = self.web_contents() {
            contents.print(silent, print_background);
        }
    }

    /// Show the dictionary popup for the page's selection
    pub fn show_definition_for_selection(&self) {
        if self.is_closed.get() {
            return;
        }
        if let Some(contents) = self.web_contents() {
            contents.show_definition_for_selection();
        }
    }

    // Dev tools

    /// Open the inspector, docked into the window when `can_dock` is set
    pub fn open_devtools(&self, can_dock: bool) {
        if self.is_closed.get() {
            return;
        }
        self.inspectable.set_can_dock(can_dock);
        if let Err(e) = self.inspectable.show_devtools() {
            log::warn!("Failed to open dev tools: {}", e);
        }
    }

    /// Close the inspector
    pub fn close_devtools(&self) {
        if self.is_closed.get() {
            return;
        }
        self.inspectable.close_devtools();
    }

    /// Whether the inspector is open
    pub fn is_devtools_opened(&self) -> bool {
        self.inspectable.is_devtools_view_showing()
    }

    /// Open the inspector on the element at `(x, y)`
    pub fn inspect_element(&self, x: i32, y: i32) {
        if self.is_closed.get() {
            return;
        }
        if let Err(e) = self.inspectable.inspect_element(x, y) {
            log::warn!("Failed to inspect element: {}", e);
        }
    }

    /// Evaluate `function_name(args...)` in the inspector front end
    pub fn call_devtools_function(&self, function_name: &str, args: &[Value]) {
        self.inspectable.call_function(function_name, args);
    }

    /// Handle a JSON message from the inspector front end
    pub fn dispatch_devtools_message(&self, message: &str) -> bool {
        self.inspectable.dispatch_frontend_message(message)
    }

    // Dialogs

    /// Whether a modal dialog is attached to the window
    pub fn has_modal_dialog(&self) -> bool {
        self.dialogs.has_dialog()
    }

    /// Mark a dialog as attached until the scope is dropped
    pub fn dialog_scope(&self) -> DialogScope {
        self.dialogs.enter()
    }

    // Close protocol

    /// Run the graceful close protocol
    ///
    /// Observers may veto; otherwise the page gets to run its unload
    /// handlers, and a page that does not finish within the close timeout is
    /// reported unresponsive.
    pub fn close_web_contents(&self) {
        if self.is_closed.get() {
            return;
        }

        let mut prevent_default = false;
        self.observers
            .for_each(|observer| observer.will_close_window(&mut prevent_default));
        if prevent_default {
            WindowList::window_close_cancelled(self);
            return;
        }

        let Some(contents) = self.web_contents() else {
            self.close_immediately();
            return;
        };

        self.arm_unresponsive_check(CLOSE_UNRESPONSIVE_TIMEOUT, true);
        if contents.need_to_fire_before_unload() {
            contents.dispatch_before_unload();
        } else {
            contents.close_page();
        }
    }

    /// Destroy the inspector surface, then the hosted surface
    pub fn destroy_web_contents(&self) {
        self.inspectable.destroy();
    }

    /// Two-phase dispose: surfaces first, then the dialog manager
    ///
    /// Runs from `Drop` as well; calling it again does nothing.
    pub fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }
        self.watchdog.cancel();

        // The inspector surface may still reach the dialog manager while it
        // is torn down, so the manager goes last.
        self.destroy_web_contents();
        let manager = self.dialog_manager.borrow_mut().take();
        drop(manager);
        log::debug!("Window torn down");
    }

    // Watchdog

    /// Report the window unresponsive after `delay` unless the page answers
    /// first; replaces any pending check
    pub fn schedule_unresponsive_event(&self, delay: Duration) {
        if self.is_closed.get() {
            return;
        }
        self.arm_unresponsive_check(delay, false);
    }

    fn arm_unresponsive_check(&self, delay: Duration, only_if_idle: bool) {
        let window = self.weak_self.clone();
        let on_timeout = move || {
            if let Some(window) = window.upgrade() {
                window.notify_window_unresponsive();
            }
        };
        if only_if_idle {
            self.watchdog.schedule_if_idle(delay, on_timeout);
        } else {
            self.watchdog.schedule(delay, on_timeout);
        }
    }

    /// Whether an unresponsiveness check is pending
    pub fn is_unresponsive_check_pending(&self) -> bool {
        self.watchdog.is_armed()
    }

    // Notifications

    /// The native window is gone; runs at most once
    pub fn notify_window_closed(&self) {
        if self.is_closed.replace(true) {
            return;
        }
        self.watchdog.cancel();
        log::info!("Window closed");

        WindowList::remove_window(self);
        self.observers.for_each(|observer| observer.on_window_closed());
    }

    /// The window lost focus
    pub fn notify_window_blur(&self) {
        self.notify(|observer| observer.on_window_blur());
    }

    /// The window gained focus
    pub fn notify_window_focus(&self) {
        self.notify(|observer| observer.on_window_focus());
    }

    /// The window was maximized
    pub fn notify_window_maximize(&self) {
        self.notify(|observer| observer.on_window_maximize());
    }

    /// The window left the maximized state
    pub fn notify_window_unmaximize(&self) {
        self.notify(|observer| observer.on_window_unmaximize());
    }

    /// The window was minimized
    pub fn notify_window_minimize(&self) {
        self.notify(|observer| observer.on_window_minimize());
    }

    /// The window was restored from minimized
    pub fn notify_window_restore(&self) {
        self.notify(|observer| observer.on_window_restore());
    }

    /// The window entered fullscreen
    pub fn notify_window_enter_full_screen(&self) {
        self.notify(|observer| observer.on_window_enter_full_screen());
    }

    /// The window left fullscreen
    pub fn notify_window_leave_full_screen(&self) {
        self.notify(|observer| observer.on_window_leave_full_screen());
    }

    /// The page is not responding
    ///
    /// Silent while a modal dialog is attached, since the page is blocked on
    /// the dialog rather than hung.
    pub fn notify_window_unresponsive(&self) {
        self.watchdog.cancel();
        if self.is_closed.get() || self.has_modal_dialog() {
            log::debug!("Unresponsive event suppressed");
            return;
        }
        log::warn!("Window is not responding");
        self.observers
            .for_each(|observer| observer.on_renderer_unresponsive());
    }

    fn notify(&self, event: impl FnMut(&dyn NativeWindowObserver)) {
        if self.is_closed.get() {
            return;
        }
        self.observers.for_each(event);
    }

    // Renderer configuration

    /// Command-line switches for the page's renderer process
    pub fn renderer_switches(&self) -> Vec<String> {
        let mut switches = Vec::new();
        if let Some(preload) = &self.preload {
            switches.push(format!("--preload={}", preload.display()));
        }
        if !self.node_integration {
            switches.push(String::from("--node-integration=false"));
        }
        if (self.zoom_factor - 1.0).abs() > f64::EPSILON {
            switches.push(format!("--zoom-factor={}", self.zoom_factor));
        }
        for (name, enabled) in self.web_preferences.feature_switches() {
            if enabled {
                switches.push(format!("--{name}"));
            }
        }

        let plugin_dirs = &self.web_preferences.extra_plugin_dirs;
        if !plugin_dirs.is_empty() {
            match std::env::join_paths(plugin_dirs) {
                Ok(joined) => {
                    switches.push(format!("--extra-plugin-dirs={}", joined.to_string_lossy()));
                }
                Err(e) => log::warn!("Ignoring extra plugin dirs: {}", e),
            }
        }
        switches
    }
}

impl Drop for NativeWindow {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn load_icon(path: &Path) -> WindowResult<Bitmap> {
    let icon = image::open(path)?.to_rgba8();
    log::debug!(
        "Loaded window icon {}x{} from {}",
        icon.width(),
        icon.height(),
        path.display()
    );
    Ok(icon)
}

impl LifecycleObserverSink for NativeWindow {
    fn close_web_contents(&self) {
        Self::close_web_contents(self);
    }

    fn notify_window_closed(&self) {
        Self::notify_window_closed(self);
    }

    fn notify_window_blur(&self) {
        Self::notify_window_blur(self);
    }

    fn notify_window_focus(&self) {
        Self::notify_window_focus(self);
    }

    fn notify_window_maximize(&self) {
        Self::notify_window_maximize(self);
    }

    fn notify_window_unmaximize(&self) {
        Self::notify_window_unmaximize(self);
    }

    fn notify_window_minimize(&self) {
        Self::notify_window_minimize(self);
    }

    fn notify_window_restore(&self) {
        Self::notify_window_restore(self);
    }

    fn notify_window_enter_full_screen(&self) {
        Self::notify_window_enter_full_screen(self);
    }

    fn notify_window_leave_full_screen(&self) {
        Self::notify_window_leave_full_screen(self);
    }
}

impl ContentDelegate for NativeWindow {
    fn should_create_web_contents(&self, frame_name: &str, target_url: &str, partition_id: &str) -> bool {
        if self.is_closed.get() {
            return false;
        }
        self.observers.for_each(|observer| {
            observer.will_create_popup_window(frame_name, target_url, partition_id);
        });
        false
    }

    fn open_url_from_tab(&self, url: &str) -> bool {
        if self.is_closed.get() {
            return false;
        }
        let mut prevent_default = false;
        self.observers
            .for_each(|observer| observer.will_navigate(&mut prevent_default, url));
        if prevent_default {
            log::debug!("Navigation to {} prevented", url);
            return false;
        }

        match self.web_contents() {
            Some(contents) => {
                contents.load_url(url);
                true
            }
            None => false,
        }
    }

    fn javascript_dialog_manager(&self) -> Option<Rc<JavaScriptDialogManager>> {
        if self.torn_down.get() {
            return None;
        }
        let manager = self
            .dialog_manager
            .borrow_mut()
            .get_or_insert_with(|| {
                Rc::new(JavaScriptDialogManager::new(
                    self.presenter.clone(),
                    self.dialogs.clone(),
                ))
            })
            .clone();
        Some(manager)
    }

    fn before_unload_fired(&self, proceed: bool) -> bool {
        if !proceed {
            log::debug!("Page cancelled unload");
            WindowList::window_close_cancelled(self);
            self.watchdog.cancel();
        }
        proceed
    }

    fn run_file_chooser(&self, params: &FileChooserParams) -> Vec<PathBuf> {
        let _scope = self.dialog_scope();
        self.presenter.show_open_dialog(params)
    }

    fn request_to_lock_mouse(&self, _user_gesture: bool, _last_unlocked_by_target: bool) {
        if let Some(contents) = self.web_contents() {
            contents.got_response_to_lock_mouse_request(true);
        }
    }

    fn can_overscroll_content(&self) -> bool {
        false
    }

    fn activate_contents(&self) {
        self.focus_on_web_view();
    }

    fn deactivate_contents(&self) {
        self.blur_web_view();
    }

    fn move_contents(&self, bounds: Rect) {
        self.set_position(bounds.origin());
        self.set_size(bounds.size());
    }

    fn close_contents(&self) {
        log::debug!("Page finished unloading");
        self.destroy_web_contents();
        self.close_immediately();
        self.watchdog.cancel();
    }

    fn is_popup_or_panel(&self) -> bool {
        false
    }

    fn renderer_unresponsive(&self) {
        // A pending close timeout keeps precedence over this shorter check
        self.arm_unresponsive_check(RENDERER_UNRESPONSIVE_DELAY, true);
    }

    fn renderer_responsive(&self) {
        self.watchdog.cancel();
    }

    fn render_view_created(&self) {
        if !self.transparent {
            return;
        }
        if let Some(contents) = self.web_contents() {
            contents.set_background_opaque(false);
        }
    }

    fn draggable_regions_updated(&self, regions: &[DraggableRegion]) {
        if let Some(platform) = self.live_platform() {
            platform.update_draggable_regions(regions);
        }
    }

    fn title_updated(&self, title: &str) {
        if self.is_closed.get() {
            return;
        }
        let mut prevent_default = false;
        self.observers
            .for_each(|observer| observer.on_page_title_updated(&mut prevent_default, title));
        if !prevent_default {
            self.set_title(title);
        }
    }

    fn append_renderer_switches(&self, switches: &mut Vec<String>) {
        switches.extend(self.renderer_switches());
    }

    fn override_web_preferences(&self, url: &str, prefs: &mut WebPreferences) {
        log::trace!("Applying web preferences for {}", url);
        prefs.apply(&self.web_preferences);
    }
}

impl InspectorDelegate for NativeWindow {
    fn devtools_save_to_file(&self, url: &str, content: &str, save_as: bool) {
        if self.is_closed.get() {
            return;
        }

        let path = match self.devtools_files.known_path(url, save_as) {
            Some(path) => path,
            None => {
                let chosen = {
                    let _scope = self.dialog_scope();
                    self.presenter.show_save_dialog("Save File", &suggested_path(url))
                };
                let Some(path) = chosen else {
                    self.call_devtools_function("InspectorFrontendAPI.canceledSaveURL", &[json!(url)]);
                    return;
                };
                path
            }
        };

        match self.devtools_files.save(url, &path, content) {
            Ok(()) => self.call_devtools_function("InspectorFrontendAPI.savedURL", &[json!(url)]),
            Err(e) => {
                log::warn!("Failed to save {} to {}: {}", url, path.display(), e);
                self.call_devtools_function("InspectorFrontendAPI.canceledSaveURL", &[json!(url)]);
            }
        }
    }

    fn devtools_append_to_file(&self, url: &str, content: &str) {
        if self.is_closed.get() {
            return;
        }

        match self.devtools_files.append(url, content) {
            Ok(Some(_)) => {
                self.call_devtools_function("InspectorFrontendAPI.appendedToURL", &[json!(url)]);
            }
            Ok(None) => {}
            Err(e) => log::warn!("Failed to append to {}: {}", url, e),
        }
    }
}
