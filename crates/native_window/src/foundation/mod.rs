//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Geometry types (points, sizes, rectangles)
//! - Handle-keyed collections
//! - Clocks for the owning thread's task runner
//! - Logging utilities

pub mod collections;
pub mod geometry;
pub mod logging;
pub mod time;
