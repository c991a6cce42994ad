//! Backend-agnostic platform window contract
//!
//! This module defines the traits a per-platform window implementation plugs
//! into. The controller (`NativeWindow`) owns exactly one `PlatformWindow`
//! and never talks to the operating system directly.
//!
//! # Contract
//! - **Fire and forget**: setters may complete asynchronously, so a query
//!   right after a setter can still report the previous state
//! - **Idempotent**: setting the current value again is harmless
//! - **Report back**: every OS-level transition (close, focus, maximize,
//!   minimize, fullscreen) is reported through the `LifecycleObserverSink`
//!   handed to the factory, after the backend's own state has changed
//!
//! All methods take `&self`. Backends keep their state in cells because a
//! sink notification can re-enter the controller, which may call straight
//! back into the backend.

use std::any::Any;
use std::rc::{Rc, Weak};

use raw_window_handle::RawWindowHandle;

use crate::config::WindowOptions;
use crate::content::{Bitmap, DraggableRegion};
use crate::error::WindowResult;
use crate::foundation::geometry::{Point, Rect, Size};

/// Platform-independent menu attached to a window
///
/// Building native menu widgets belongs to the platform backend; the window
/// only passes the model along.
pub trait MenuModel {
    /// Number of top-level items
    fn item_count(&self) -> usize;

    /// Label of the item at `index`
    fn label_at(&self, index: usize) -> Option<String>;
}

impl MenuModel for Vec<String> {
    fn item_count(&self) -> usize {
        self.len()
    }

    fn label_at(&self, index: usize) -> Option<String> {
        self.get(index).cloned()
    }
}

/// Receiver of OS-level window events
///
/// Implemented by the controller; backends hold it weakly.
pub trait LifecycleObserverSink {
    /// The user asked to close the window (close button, Alt+F4, ...)
    ///
    /// Starts the graceful close protocol instead of closing right away.
    fn close_web_contents(&self);

    /// The native window is gone
    fn notify_window_closed(&self);

    /// The window lost focus
    fn notify_window_blur(&self);

    /// The window gained focus
    fn notify_window_focus(&self);

    /// The window was maximized
    fn notify_window_maximize(&self);

    /// The window left the maximized state
    fn notify_window_unmaximize(&self);

    /// The window was minimized
    fn notify_window_minimize(&self);

    /// The window was restored from minimized
    fn notify_window_restore(&self);

    /// The window entered fullscreen
    fn notify_window_enter_full_screen(&self);

    /// The window left fullscreen
    fn notify_window_leave_full_screen(&self);
}

/// Per-platform window implementation
///
/// Only the controller calls these. Defaults are provided for features that
/// only some platforms have (represented file, document-edited badge, menu
/// bar handling); other platforms ignore them.
#[allow(unused_variables)]
pub trait PlatformWindow {
    /// Start closing; the backend reports through
    /// `LifecycleObserverSink::close_web_contents`
    fn close(&self);

    /// Destroy the native window now; the backend reports through
    /// `LifecycleObserverSink::notify_window_closed`
    fn close_immediately(&self);

    /// Move and resize in one step
    fn move_to(&self, bounds: Rect) {
        self.set_position(bounds.origin());
        self.set_size(bounds.size());
    }

    /// Focus (`true`) or blur (`false`) the window
    fn focus(&self, focus: bool);

    /// Whether the window has input focus
    fn is_focused(&self) -> bool;

    /// Show and activate
    fn show(&self);

    /// Show without activating
    fn show_inactive(&self);

    /// Hide
    fn hide(&self);

    /// Whether the window is shown
    fn is_visible(&self) -> bool;

    /// Maximize
    fn maximize(&self);

    /// Leave the maximized state
    fn unmaximize(&self);

    /// Whether the window is maximized
    fn is_maximized(&self) -> bool;

    /// Minimize
    fn minimize(&self);

    /// Restore from minimized
    fn restore(&self);

    /// Whether the window is minimized
    fn is_minimized(&self) -> bool;

    /// Enter or leave fullscreen
    fn set_full_screen(&self, fullscreen: bool);

    /// Whether the window is fullscreen
    fn is_full_screen(&self) -> bool;

    /// Resize the outer frame
    fn set_size(&self, size: Size);

    /// Outer frame size
    fn size(&self) -> Size;

    /// Resize so the content area has `size`
    fn set_content_size(&self, size: Size);

    /// Content area size
    fn content_size(&self) -> Size;

    /// Lower size bound
    fn set_minimum_size(&self, size: Size);

    /// Lower size bound
    fn minimum_size(&self) -> Size;

    /// Upper size bound; zero means unbounded
    fn set_maximum_size(&self, size: Size);

    /// Upper size bound
    fn maximum_size(&self) -> Size;

    /// Allow or forbid user resizing
    fn set_resizable(&self, resizable: bool);

    /// Whether the user can resize the window
    fn is_resizable(&self) -> bool;

    /// Keep above other windows
    fn set_always_on_top(&self, always_on_top: bool);

    /// Whether the window stays above other windows
    fn is_always_on_top(&self) -> bool;

    /// Center on the current screen
    fn center(&self);

    /// Move the top-left corner
    fn set_position(&self, position: Point);

    /// Top-left corner
    fn position(&self) -> Point;

    /// Title bar text
    fn set_title(&self, title: &str);

    /// Title bar text
    fn title(&self) -> String;

    /// Start or stop drawing the user's attention
    fn flash_frame(&self, flash: bool);

    /// Hide from or show in the taskbar
    fn set_skip_taskbar(&self, skip: bool);

    /// Enter or leave kiosk mode
    fn set_kiosk(&self, kiosk: bool);

    /// Whether the window is in kiosk mode
    fn is_kiosk(&self) -> bool;

    /// Taskbar progress; negative removes the indicator
    fn set_progress_bar(&self, progress: f64);

    /// Taskbar badge icon; `None` removes it
    fn set_overlay_icon(&self, overlay: Option<&Bitmap>, description: &str);

    /// Show on every virtual desktop
    fn set_visible_on_all_workspaces(&self, visible: bool);

    /// Whether the window shows on every virtual desktop
    fn is_visible_on_all_workspaces(&self) -> bool;

    /// Window icon
    fn set_icon(&self, icon: &Bitmap);

    /// Regions of a frameless window that drag it
    fn update_draggable_regions(&self, regions: &[DraggableRegion]);

    /// Native handle, when the backend has one
    fn native_window(&self) -> Option<RawWindowHandle>;

    /// File the window represents (title bar proxy icon)
    fn set_represented_filename(&self, filename: &str) {}

    /// File the window represents
    fn represented_filename(&self) -> String {
        String::new()
    }

    /// Mark the document as edited
    fn set_document_edited(&self, edited: bool) {}

    /// Whether the document is marked edited
    fn is_document_edited(&self) -> bool {
        false
    }

    /// Attach a menu; `None` removes it
    fn set_menu(&self, menu: Option<Rc<dyn MenuModel>>) {}

    /// Hide the menu bar until Alt is pressed
    fn set_auto_hide_menu_bar(&self, auto_hide: bool) {}

    /// Whether the menu bar hides automatically
    fn is_menu_bar_auto_hide(&self) -> bool {
        false
    }

    /// Show or hide the menu bar
    fn set_menu_bar_visibility(&self, visible: bool) {}

    /// Whether the menu bar is shown
    fn is_menu_bar_visible(&self) -> bool {
        true
    }

    /// Access to the concrete type for downcasting
    ///
    /// Lets embedders reach backend-specific functionality without the
    /// controller exposing backend types.
    fn as_any(&self) -> &dyn Any;
}

/// Constructor of platform windows
pub trait PlatformWindowFactory {
    /// Create the native window described by `options`, reporting its events
    /// to `sink`
    fn create(
        &self,
        sink: Weak<dyn LifecycleObserverSink>,
        options: &WindowOptions,
    ) -> WindowResult<Box<dyn PlatformWindow>>;
}
