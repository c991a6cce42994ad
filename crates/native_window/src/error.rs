//! Errors raised while constructing windows
//!
//! Once a window exists its operations do not fail: calls on a closed window
//! are ignored, failed captures yield an empty bitmap and dev-tools file
//! failures are reported to the inspector instead.

use thiserror::Error;

use crate::config::ConfigError;

/// Window construction errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// The platform could not create the native window
    #[error("Platform window creation failed: {0}")]
    PlatformCreation(String),

    /// The rendering engine could not create the hosted surface
    #[error("Web contents creation failed: {0}")]
    ContentCreation(String),

    /// An option carried a value the window cannot use
    #[error("Invalid window option `{key}`: {reason}")]
    InvalidOption {
        /// Option key as written in the option set
        key: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Decoding an icon or bitmap failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem access failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Option file could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for window construction
pub type WindowResult<T> = Result<T, WindowError>;
