//! # Native Window
//!
//! A platform-independent window controller hosting an embedded web surface.
//!
//! ## Features
//!
//! - **Window State Machine**: Focus, visibility, maximize, minimize, fullscreen and kiosk
//! - **Lifecycle Observers**: Weakly held listeners, safe to add or remove mid-notification
//! - **Graceful Close**: Observer vetoes, page unload handlers and a close timeout
//! - **Responsiveness Watchdog**: Cancelable unresponsive-renderer reporting
//! - **Page Capture**: Serialized asynchronous readback into RGBA bitmaps
//! - **Developer Tools**: Inspector surface with file save/append bridging
//! - **Backends**: In-memory headless backend, GLFW behind `glfw-backend`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use native_window::prelude::*;
//!
//! struct TitleLogger;
//!
//! impl NativeWindowObserver for TitleLogger {
//!     fn on_page_title_updated(&self, _prevent_default: &mut bool, title: &str) {
//!         log::info!("Title is now {}", title);
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = Rc::new(TaskRunner::new(Clock::system()));
//!     let services = WindowServices::headless(runner.clone());
//!
//!     let options = WindowOptions::default().with_size(1024, 768).with_title("Demo");
//!     let window = NativeWindow::create(&options, &services)?;
//!     let observer = Rc::new(TitleLogger);
//!     window.add_observer(&observer);
//!
//!     window.close();
//!     while !window.is_closed() {
//!         runner.run_pending();
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod content;
pub mod error;
pub mod events;
pub mod foundation;
pub mod window;

pub use error::{WindowError, WindowResult};
pub use window::{NativeWindow, NativeWindowObserver, WindowList, WindowServices};

/// Common imports for window users
pub mod prelude {
    pub use crate::{
        config::{Config, WebPreferencesConfig, WindowOptions},
        content::{Bitmap, ContentId, WebContents},
        error::{WindowError, WindowResult},
        events::TaskRunner,
        foundation::{
            geometry::{Point, Rect, Size},
            time::Clock,
        },
        window::{
            NativeWindow, NativeWindowObserver, PlatformWindow, WindowList, WindowListObserver,
            WindowServices, WindowState,
        },
    };
}
