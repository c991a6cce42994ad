//! Snapshot of the platform-owned window state

use bitflags::bitflags;

bitflags! {
    /// Volatile window state, queried from the platform on demand
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowState: u16 {
        /// Has input focus
        const FOCUSED = 1 << 0;
        /// Shown on screen
        const VISIBLE = 1 << 1;
        /// Maximized
        const MAXIMIZED = 1 << 2;
        /// Minimized
        const MINIMIZED = 1 << 3;
        /// Fullscreen
        const FULLSCREEN = 1 << 4;
        /// User-resizable
        const RESIZABLE = 1 << 5;
        /// Kept above other windows
        const ALWAYS_ON_TOP = 1 << 6;
        /// Kiosk mode
        const KIOSK = 1 << 7;
        /// Shown on every virtual desktop
        const ALL_WORKSPACES = 1 << 8;
    }
}
