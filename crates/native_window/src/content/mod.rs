//! Boundary with the embedded rendering engine
//!
//! The window never renders anything itself. It owns a hosted surface
//! (`WebContents`) supplied by the engine and receives the engine's callbacks
//! through `ContentDelegate`. Both traits describe the contract only; the
//! `headless` module ships an in-memory engine used by tests and the demo.

use std::path::PathBuf;
use std::rc::{Rc, Weak};

use image::RgbaImage;

use crate::error::WindowResult;
use crate::foundation::geometry::{Rect, Size};

pub mod dialogs;
pub mod headless;
pub mod inspector;
pub mod preferences;

pub use dialogs::{
    DialogPresenter, JavaScriptDialogKind, JavaScriptDialogManager, JavaScriptDialogResponse,
    ScriptedDialogPresenter,
};
pub use headless::{HeadlessContentFactory, HeadlessWebContents};
pub use inspector::{FrontendRequest, InspectableWebContents, InspectorDelegate};
pub use preferences::WebPreferences;

/// Pixels read back from a rendered surface
///
/// A zero-sized bitmap means the readback failed.
pub type Bitmap = RgbaImage;

/// A bitmap with no pixels, reported when capture fails
pub fn empty_bitmap() -> Bitmap {
    RgbaImage::new(0, 0)
}

/// Identity of a hosted surface inside the rendering engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentId {
    /// Renderer process id
    pub process_id: i32,
    /// Routing id of the view inside that process
    pub routing_id: i32,
}

impl ContentId {
    /// Create a new identity
    pub const fn new(process_id: i32, routing_id: i32) -> Self {
        Self {
            process_id,
            routing_id,
        }
    }
}

/// Outcome of a readback request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadbackResponse {
    /// Pixels were copied
    Success,
    /// The surface had nothing to copy
    SurfaceUnavailable,
    /// The copy request itself failed
    OutputRequestFailure,
}

/// Completion callback for `WebContents::copy_from_backing_store`
pub type ReadbackCallback = Box<dyn FnOnce(Bitmap, ReadbackResponse)>;

/// A region of the page that drags the window when frameless
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraggableRegion {
    /// Whether the region drags (true) or is excluded from dragging (false)
    pub draggable: bool,
    /// Region bounds in page coordinates
    pub bounds: Rect,
}

/// Kind of file chooser the page asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileChooserMode {
    /// Pick one existing file
    #[default]
    Open,
    /// Pick several existing files
    OpenMultiple,
    /// Pick a folder to upload
    UploadFolder,
    /// Pick a destination path
    Save,
}

/// Parameters of a page-initiated file chooser
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChooserParams {
    /// Chooser kind
    pub mode: FileChooserMode,
    /// Dialog title
    pub title: String,
    /// Suggested file name
    pub default_file_name: PathBuf,
    /// Accepted MIME types or extensions
    pub accept_types: Vec<String>,
}

/// A hosted, renderable surface owned by a window
///
/// All calls happen on the window's owning thread. Implementations must not
/// call back into their delegate while holding internal borrows.
pub trait WebContents {
    /// Identity used by `NativeWindow::from_identity`
    fn id(&self) -> ContentId;

    /// Install (or clear) the delegate receiving engine callbacks
    fn set_delegate(&self, delegate: Option<Weak<dyn ContentDelegate>>);

    /// Navigate to `url`
    fn load_url(&self, url: &str);

    /// Currently loaded url
    fn url(&self) -> String;

    /// Whether the page registered an unload confirmation handler
    fn need_to_fire_before_unload(&self) -> bool;

    /// Run the page's before-unload handler; the answer arrives through
    /// `ContentDelegate::before_unload_fired`
    fn dispatch_before_unload(&self);

    /// Close the page, running unload handlers; completion arrives through
    /// `ContentDelegate::close_contents`
    fn close_page(&self);

    /// Tear the surface down immediately
    fn destroy(&self);

    /// Give the page keyboard focus
    fn focus(&self);

    /// Take keyboard focus away from the page
    fn blur(&self);

    /// Whether the page has keyboard focus
    fn has_focus(&self) -> bool;

    /// Bounds of the rendered view, or `None` when no view exists yet
    fn view_bounds(&self) -> Option<Rect>;

    /// Device pixels per view pixel of the display showing the view
    fn device_scale_factor(&self) -> f32;

    /// Copy `source` into a bitmap of `bitmap_size`; `done` runs later on the
    /// owning thread
    fn copy_from_backing_store(&self, source: Rect, bitmap_size: Size, done: ReadbackCallback);

    /// Make the page background opaque or transparent
    fn set_background_opaque(&self, opaque: bool);

    /// Answer a pointer-lock request
    fn got_response_to_lock_mouse_request(&self, allowed: bool);

    /// Print the page
    fn print(&self, silent: bool, print_background: bool);

    /// Show the dictionary popup for the current selection
    fn show_definition_for_selection(&self);

    /// Reveal the element at the given page coordinates in the inspector
    fn inspect_element(&self, x: i32, y: i32);

    /// Evaluate a script in the page
    fn execute_javascript(&self, script: &str);
}

/// Engine-side constructor of hosted surfaces
pub trait WebContentsFactory {
    /// Create a fresh hosted surface for a new window
    fn create_web_contents(&self) -> WindowResult<Rc<dyn WebContents>>;

    /// Create the inspector surface for the surface identified by `inspected`
    fn create_devtools_contents(&self, inspected: ContentId) -> WindowResult<Rc<dyn WebContents>>;
}

/// Callbacks from the engine to the window hosting a surface
///
/// Defaults mirror what an engine does with no embedder involvement.
#[allow(unused_variables)]
pub trait ContentDelegate {
    /// The page wants to open a popup; return false to stop the engine from
    /// creating it itself
    fn should_create_web_contents(&self, frame_name: &str, target_url: &str, partition_id: &str) -> bool {
        true
    }

    /// The page asked to navigate; returns whether the navigation went ahead
    fn open_url_from_tab(&self, url: &str) -> bool {
        false
    }

    /// Manager presenting alert/confirm/prompt dialogs for the page
    fn javascript_dialog_manager(&self) -> Option<Rc<JavaScriptDialogManager>> {
        None
    }

    /// The page answered its before-unload handler; returns whether unload
    /// should proceed
    fn before_unload_fired(&self, proceed: bool) -> bool {
        proceed
    }

    /// The page opened a file chooser; returns the chosen paths
    fn run_file_chooser(&self, params: &FileChooserParams) -> Vec<PathBuf> {
        Vec::new()
    }

    /// The page requested pointer lock
    fn request_to_lock_mouse(&self, user_gesture: bool, last_unlocked_by_target: bool) {}

    /// Whether overscroll gestures may scroll past the content
    fn can_overscroll_content(&self) -> bool {
        true
    }

    /// The page wants to be focused
    fn activate_contents(&self) {}

    /// The page gave up focus
    fn deactivate_contents(&self) {}

    /// The page asked to move/resize its window
    fn move_contents(&self, bounds: Rect) {}

    /// The page finished unloading and can be closed
    fn close_contents(&self) {}

    /// Whether the surface is shown as a popup or panel
    fn is_popup_or_panel(&self) -> bool {
        false
    }

    /// The renderer stopped answering input
    fn renderer_unresponsive(&self) {}

    /// The renderer answers input again
    fn renderer_responsive(&self) {}

    /// A render view was created for the surface
    fn render_view_created(&self) {}

    /// The page changed its draggable regions
    fn draggable_regions_updated(&self, regions: &[DraggableRegion]) {}

    /// The page title changed
    fn title_updated(&self, title: &str) {}

    /// A renderer process is starting; add command-line switches for it
    fn append_renderer_switches(&self, switches: &mut Vec<String>) {}

    /// Adjust engine preferences before `url` is rendered
    fn override_web_preferences(&self, url: &str, prefs: &mut WebPreferences) {}
}
