//! Window controller subsystem
//!
//! The controller sits between application code and a per-platform backend:
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │     Application Code            │
//! └─────────────┬───────────────────┘
//!               │ Uses
//!        ┌──────▼───────┐   observers    ┌──────────────────────┐
//!        │ NativeWindow │ ─────────────► │ NativeWindowObserver │
//!        └──┬────────┬──┘                └──────────────────────┘
//!           │        │ owns
//!           │   ┌────▼──────────────────┐
//!           │   │ InspectableWebContents│ ← hosted page + inspector
//!           │   └───────────────────────┘
//!           │ owns
//!   ┌───────▼────────┐
//!   │ PlatformWindow │ ← headless, GLFW, ...
//!   └────────────────┘
//! ```
//!
//! # Module Organization
//!
//! - **`native_window`**: the controller and its construction
//! - **`backend`**: the contract platform backends implement
//! - **`observer`**: lifecycle observers and their notification list
//! - **`watchdog`**: the cancelable unresponsiveness check
//! - **`capture`**: serialized asynchronous page capture
//! - **`dialog`**: counting guard for attached modal dialogs
//! - **`devtools_files`**: url to path bookkeeping for inspector saves
//! - **`window_list`**: the thread's live windows
//! - **`headless`** / **`glfw_backend`**: backend implementations

pub mod backend;
pub mod capture;
pub mod devtools_files;
pub mod dialog;
#[cfg(feature = "glfw-backend")]
pub mod glfw_backend;
pub mod headless;
pub mod native_window;
pub mod observer;
pub mod state;
pub mod watchdog;
pub mod window_list;

#[cfg(test)]
mod tests;

pub use backend::{LifecycleObserverSink, MenuModel, PlatformWindow, PlatformWindowFactory};
pub use capture::{capture_geometry, CaptureCallback};
pub use devtools_files::DevToolsFileBridge;
pub use dialog::{DialogCounter, DialogScope};
#[cfg(feature = "glfw-backend")]
pub use glfw_backend::{GlfwPlatform, GlfwWindow};
pub use headless::{HeadlessPlatform, HeadlessWindow};
pub use native_window::{NativeWindow, WindowServices};
pub use observer::NativeWindowObserver;
pub use state::WindowState;
pub use watchdog::{CLOSE_UNRESPONSIVE_TIMEOUT, RENDERER_UNRESPONSIVE_DELAY};
pub use window_list::{WindowList, WindowListObserver};
