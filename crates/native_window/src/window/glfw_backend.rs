//! On-screen backend using GLFW
//!
//! GLFW reports focus, iconify, maximize and close through its event queue;
//! `GlfwWindow::pump_events` drains that queue and forwards each event to the
//! controller. GLFW has no notion of taskbars or workspaces, so those
//! attributes are only remembered.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Weak;

use raw_window_handle::RawWindowHandle;

use crate::config::WindowOptions;
use crate::content::{Bitmap, DraggableRegion};
use crate::error::{WindowError, WindowResult};
use crate::foundation::geometry::{Point, Rect, Size};

use super::backend::{LifecycleObserverSink, PlatformWindow, PlatformWindowFactory};
use super::native_window::DEFAULT_SIZE;

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn to_u32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// GLFW window wrapper reporting to the controller
pub struct GlfwWindow {
    sink: Weak<dyn LifecycleObserverSink>,
    glfw: RefCell<glfw::Glfw>,
    window: RefCell<glfw::PWindow>,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    title: RefCell<String>,
    minimum_size: Cell<Size>,
    maximum_size: Cell<Size>,
    fullscreen: Cell<bool>,
    windowed_bounds: Cell<Rect>,
    kiosk: Cell<bool>,
    skip_taskbar: Cell<bool>,
    all_workspaces: Cell<bool>,
    progress: Cell<f64>,
    draggable_regions: RefCell<Vec<DraggableRegion>>,
}

impl GlfwWindow {
    /// Create a hidden window
    pub fn new(
        mut glfw: glfw::Glfw,
        sink: Weak<dyn LifecycleObserverSink>,
        options: &WindowOptions,
    ) -> WindowResult<Self> {
        let width = options.width.unwrap_or(DEFAULT_SIZE.width);
        let height = options.height.unwrap_or(DEFAULT_SIZE.height);
        let title = options.title.clone().unwrap_or_default();

        // The page is composited by the engine, not through a GL context
        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Visible(false));
        glfw.window_hint(glfw::WindowHint::Decorated(options.has_frame()));
        glfw.window_hint(glfw::WindowHint::TransparentFramebuffer(options.is_transparent()));
        glfw.window_hint(glfw::WindowHint::Resizable(options.resizable.unwrap_or(true)));

        let (mut window, events) = glfw
            .create_window(width, height, &title, glfw::WindowMode::Windowed)
            .ok_or_else(|| WindowError::PlatformCreation(String::from("GLFW window creation failed")))?;

        window.set_focus_polling(true);
        window.set_iconify_polling(true);
        window.set_maximize_polling(true);
        window.set_close_polling(true);

        Ok(Self {
            sink,
            glfw: RefCell::new(glfw),
            window: RefCell::new(window),
            events,
            title: RefCell::new(title),
            minimum_size: Cell::new(Size::default()),
            maximum_size: Cell::new(Size::default()),
            fullscreen: Cell::new(false),
            windowed_bounds: Cell::new(Rect::new(0, 0, width, height)),
            kiosk: Cell::new(false),
            skip_taskbar: Cell::new(false),
            all_workspaces: Cell::new(false),
            progress: Cell::new(-1.0),
            draggable_regions: RefCell::new(Vec::new()),
        })
    }

    /// Poll GLFW and forward window events to the controller
    pub fn pump_events(&self) {
        self.glfw.borrow_mut().poll_events();
        let events: Vec<glfw::WindowEvent> = glfw::flush_messages(&self.events)
            .map(|(_, event)| event)
            .collect();

        let Some(sink) = self.sink.upgrade() else {
            return;
        };
        for event in events {
            match event {
                glfw::WindowEvent::Focus(true) => sink.notify_window_focus(),
                glfw::WindowEvent::Focus(false) => sink.notify_window_blur(),
                glfw::WindowEvent::Iconify(true) => sink.notify_window_minimize(),
                glfw::WindowEvent::Iconify(false) => sink.notify_window_restore(),
                glfw::WindowEvent::Maximize(true) => sink.notify_window_maximize(),
                glfw::WindowEvent::Maximize(false) => sink.notify_window_unmaximize(),
                glfw::WindowEvent::Close => {
                    // The controller decides whether the window really closes
                    self.window.borrow_mut().set_should_close(false);
                    sink.close_web_contents();
                }
                _ => {}
            }
        }
    }

    /// Regions last reported by the page
    pub fn draggable_regions(&self) -> Vec<DraggableRegion> {
        self.draggable_regions.borrow().clone()
    }

    fn apply_size_limits(&self) {
        let min = self.minimum_size.get();
        let max = self.maximum_size.get();
        let limit = |value: u32| (value > 0).then_some(value);
        self.window
            .borrow_mut()
            .set_size_limits(limit(min.width), limit(min.height), limit(max.width), limit(max.height));
    }
}

impl PlatformWindow for GlfwWindow {
    fn close(&self) {
        if let Some(sink) = self.sink.upgrade() {
            sink.close_web_contents();
        }
    }

    fn close_immediately(&self) {
        self.window.borrow_mut().hide();
        if let Some(sink) = self.sink.upgrade() {
            sink.notify_window_closed();
        }
    }

    fn focus(&self, focus: bool) {
        if focus {
            self.window.borrow_mut().focus();
        } else {
            log::debug!("GLFW cannot blur a window; ignoring");
        }
    }

    fn is_focused(&self) -> bool {
        self.window.borrow().is_focused()
    }

    fn show(&self) {
        let mut window = self.window.borrow_mut();
        window.show();
        window.focus();
    }

    fn show_inactive(&self) {
        self.window.borrow_mut().show();
    }

    fn hide(&self) {
        self.window.borrow_mut().hide();
    }

    fn is_visible(&self) -> bool {
        self.window.borrow().is_visible()
    }

    fn maximize(&self) {
        self.window.borrow_mut().maximize();
    }

    fn unmaximize(&self) {
        self.window.borrow_mut().restore();
    }

    fn is_maximized(&self) -> bool {
        self.window.borrow().is_maximized()
    }

    fn minimize(&self) {
        self.window.borrow_mut().iconify();
    }

    fn restore(&self) {
        self.window.borrow_mut().restore();
    }

    fn is_minimized(&self) -> bool {
        self.window.borrow().is_iconified()
    }

    fn set_full_screen(&self, fullscreen: bool) {
        if self.fullscreen.replace(fullscreen) == fullscreen {
            return;
        }

        if fullscreen {
            self.windowed_bounds
                .set(Rect::from_origin_size(self.position(), self.size()));
            let mut glfw = self.glfw.borrow_mut();
            let mut window = self.window.borrow_mut();
            glfw.with_primary_monitor(|_, monitor| {
                let Some(monitor) = monitor else {
                    log::warn!("No primary monitor for fullscreen");
                    return;
                };
                let Some(mode) = monitor.get_video_mode() else {
                    return;
                };
                window.set_monitor(
                    glfw::WindowMode::FullScreen(monitor),
                    0,
                    0,
                    mode.width,
                    mode.height,
                    Some(mode.refresh_rate),
                );
            });
        } else {
            let bounds = self.windowed_bounds.get();
            self.window.borrow_mut().set_monitor(
                glfw::WindowMode::Windowed,
                bounds.x,
                bounds.y,
                bounds.width,
                bounds.height,
                None,
            );
        }

        if let Some(sink) = self.sink.upgrade() {
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
        self.window
            .borrow_mut()
            .set_size(to_i32(size.width), to_i32(size.height));
    }

    fn size(&self) -> Size {
        let (width, height) = self.window.borrow().get_size();
        Size::new(to_u32(width), to_u32(height))
    }

    fn set_content_size(&self, size: Size) {
        // GLFW sizes are already content sizes
        self.set_size(size);
    }

    fn content_size(&self) -> Size {
        self.size()
    }

    fn set_minimum_size(&self, size: Size) {
        self.minimum_size.set(size);
        self.apply_size_limits();
    }

    fn minimum_size(&self) -> Size {
        self.minimum_size.get()
    }

    fn set_maximum_size(&self, size: Size) {
        self.maximum_size.set(size);
        self.apply_size_limits();
    }

    fn maximum_size(&self) -> Size {
        self.maximum_size.get()
    }

    fn set_resizable(&self, resizable: bool) {
        self.window.borrow_mut().set_resizable(resizable);
    }

    fn is_resizable(&self) -> bool {
        self.window.borrow().is_resizable()
    }

    fn set_always_on_top(&self, always_on_top: bool) {
        self.window.borrow_mut().set_floating(always_on_top);
    }

    fn is_always_on_top(&self) -> bool {
        self.window.borrow().is_floating()
    }

    fn center(&self) {
        let size = self.size();
        let position = self.glfw.borrow_mut().with_primary_monitor(|_, monitor| {
            let mode = monitor.and_then(|monitor| monitor.get_video_mode())?;
            Some(Point::new(
                to_i32(mode.width.saturating_sub(size.width) / 2),
                to_i32(mode.height.saturating_sub(size.height) / 2),
            ))
        });
        if let Some(position) = position {
            self.set_position(position);
        }
    }

    fn set_position(&self, position: Point) {
        self.window.borrow_mut().set_pos(position.x, position.y);
    }

    fn position(&self) -> Point {
        let (x, y) = self.window.borrow().get_pos();
        Point::new(x, y)
    }

    fn set_title(&self, title: &str) {
        self.window.borrow_mut().set_title(title);
        *self.title.borrow_mut() = title.to_owned();
    }

    fn title(&self) -> String {
        self.title.borrow().clone()
    }

    fn flash_frame(&self, flash: bool) {
        if flash {
            self.window.borrow_mut().request_attention();
        }
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

    fn set_overlay_icon(&self, _overlay: Option<&Bitmap>, description: &str) {
        log::debug!("GLFW has no overlay icons; ignoring '{}'", description);
    }

    fn set_visible_on_all_workspaces(&self, visible: bool) {
        self.all_workspaces.set(visible);
    }

    fn is_visible_on_all_workspaces(&self) -> bool {
        self.all_workspaces.get()
    }

    fn set_icon(&self, icon: &Bitmap) {
        let pixels = icon
            .pixels()
            .map(|pixel| u32::from_le_bytes(pixel.0))
            .collect();
        self.window.borrow_mut().set_icon_from_pixels(vec![glfw::PixelImage {
            width: icon.width(),
            height: icon.height(),
            pixels,
        }]);
    }

    fn update_draggable_regions(&self, regions: &[DraggableRegion]) {
        *self.draggable_regions.borrow_mut() = regions.to_vec();
    }

    fn native_window(&self) -> Option<RawWindowHandle> {
        None
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Factory of GLFW windows
pub struct GlfwPlatform {
    glfw: glfw::Glfw,
}

impl GlfwPlatform {
    /// Initialize GLFW
    pub fn new() -> WindowResult<Self> {
        let glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| WindowError::PlatformCreation(format!("GLFW initialization failed: {:?}", e)))?;
        Ok(Self { glfw })
    }
}

impl PlatformWindowFactory for GlfwPlatform {
    fn create(
        &self,
        sink: Weak<dyn LifecycleObserverSink>,
        options: &WindowOptions,
    ) -> WindowResult<Box<dyn PlatformWindow>> {
        let window = GlfwWindow::new(self.glfw.clone(), sink, options)?;
        log::info!("Created GLFW window");
        Ok(Box::new(window))
    }
}

/// Downcast a controller's backend to the GLFW window, if it is one
pub fn glfw_window(platform: &dyn PlatformWindow) -> Option<&GlfwWindow> {
    platform.as_any().downcast_ref::<GlfwWindow>()
}
