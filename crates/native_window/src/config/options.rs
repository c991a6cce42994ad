//! Options recognised when a window is created

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::Config;

/// Key-value option set consumed at window construction
///
/// Every key is optional and unknown keys are ignored, so option files
/// written for newer versions still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WindowOptions {
    /// Whether the window has a standard frame (default true)
    pub frame: Option<bool>,
    /// Whether the window background is transparent
    pub transparent: Option<bool>,
    /// Whether the window may be resized larger than the screen
    pub enable_larger_than_screen: Option<bool>,
    /// Path of the window icon image
    pub icon: Option<PathBuf>,
    /// Whether the hosted page gets node integration (default true)
    pub node_integration: Option<bool>,
    /// Absolute path of a script to load before the page's scripts
    pub preload: Option<PathBuf>,
    /// Default page zoom factor (default 1.0)
    pub zoom_factor: Option<f64>,
    /// Preferences forwarded to the rendering engine
    pub web_preferences: WebPreferencesConfig,

    /// Initial window width
    pub width: Option<u32>,
    /// Initial window height
    pub height: Option<u32>,
    /// Initial left edge; used together with `y`
    pub x: Option<i32>,
    /// Initial top edge; used together with `x`
    pub y: Option<i32>,
    /// Center the window when no position is given
    pub center: Option<bool>,
    /// Treat width/height as the content size instead of the frame size
    pub use_content_size: Option<bool>,
    /// Minimum window width
    pub min_width: Option<u32>,
    /// Minimum window height
    pub min_height: Option<u32>,
    /// Maximum window width
    pub max_width: Option<u32>,
    /// Maximum window height
    pub max_height: Option<u32>,
    /// Whether the user can resize the window (default true)
    pub resizable: Option<bool>,
    /// Keep the window above other windows
    pub always_on_top: Option<bool>,
    /// Start in fullscreen mode
    pub fullscreen: Option<bool>,
    /// Hide the window from the taskbar
    pub skip_taskbar: Option<bool>,
    /// Start in kiosk mode
    pub kiosk: Option<bool>,
    /// Hide the menu bar until Alt is pressed
    pub auto_hide_menu_bar: Option<bool>,
    /// Initial window title
    pub title: Option<String>,
    /// Show the window once created (default true)
    pub show: Option<bool>,
}

impl Config for WindowOptions {}

impl WindowOptions {
    /// Whether the window has a standard frame
    pub fn has_frame(&self) -> bool {
        self.frame.unwrap_or(true)
    }

    /// Whether the window background is transparent
    pub fn is_transparent(&self) -> bool {
        self.transparent.unwrap_or(false)
    }

    /// Whether the window may grow larger than the screen
    pub fn larger_than_screen(&self) -> bool {
        self.enable_larger_than_screen.unwrap_or(false)
    }

    /// Whether node integration is enabled for the page
    pub fn node_integration_enabled(&self) -> bool {
        self.node_integration.unwrap_or(true)
    }

    /// Page zoom factor
    pub fn zoom(&self) -> f64 {
        self.zoom_factor.unwrap_or(1.0)
    }

    /// Whether to show the window after creation
    pub fn should_show(&self) -> bool {
        self.show.unwrap_or(true)
    }

    /// Set the initial size (builder pattern)
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the initial title (builder pattern)
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set whether the window is shown on creation (builder pattern)
    pub fn with_show(mut self, show: bool) -> Self {
        self.show = Some(show);
        self
    }
}

/// The nested `web-preferences` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WebPreferencesConfig {
    /// Enable JavaScript
    pub javascript: Option<bool>,
    /// Enforce same-origin policy
    pub web_security: Option<bool>,
    /// Load images
    pub images: Option<bool>,
    /// Enable Java
    pub java: Option<bool>,
    /// Allow resizing text areas
    pub text_areas_are_resizable: Option<bool>,
    /// Enable WebGL
    pub webgl: Option<bool>,
    /// Enable Web Audio
    pub webaudio: Option<bool>,
    /// Enable plugins
    pub plugins: Option<bool>,
    /// Extra directories searched for plugins
    pub extra_plugin_dirs: Vec<PathBuf>,
    /// Enable experimental web platform features
    pub experimental_features: Option<bool>,
    /// Enable experimental canvas features
    pub experimental_canvas_features: Option<bool>,
    /// Enable subpixel font scaling
    pub subpixel_font_scaling: Option<bool>,
    /// Use overlay scrollbars
    pub overlay_scrollbars: Option<bool>,
    /// Use overlay controls for fullscreen video
    pub overlay_fullscreen_video: Option<bool>,
    /// Enable shared workers
    pub shared_worker: Option<bool>,
    /// Use DirectWrite font rendering
    pub direct_write: Option<bool>,
}

impl WebPreferencesConfig {
    /// Renderer feature switches and whether each is enabled
    pub fn feature_switches(&self) -> [(&'static str, bool); 7] {
        [
            ("experimental-features", self.experimental_features.unwrap_or(false)),
            (
                "experimental-canvas-features",
                self.experimental_canvas_features.unwrap_or(false),
            ),
            ("subpixel-font-scaling", self.subpixel_font_scaling.unwrap_or(false)),
            ("overlay-scrollbars", self.overlay_scrollbars.unwrap_or(false)),
            ("overlay-fullscreen-video", self.overlay_fullscreen_video.unwrap_or(false)),
            ("shared-worker", self.shared_worker.unwrap_or(false)),
            ("direct-write", self.direct_write.unwrap_or(false)),
        ]
    }
}
