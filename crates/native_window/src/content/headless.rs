//! In-memory rendering engine stand-in
//!
//! `HeadlessWebContents` behaves like a page that renders a solid color: it
//! answers unload and readback requests asynchronously through the owning
//! thread's `TaskRunner`, and exposes `simulate_*` hooks so callers can play
//! the engine's side of the conversation (hangs, title changes, popups).

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use image::{Rgba, RgbaImage};

use crate::content::{
    empty_bitmap, ContentDelegate, ContentId, DraggableRegion, ReadbackCallback, ReadbackResponse,
    WebContents, WebContentsFactory,
};
use crate::error::{WindowError, WindowResult};
use crate::events::TaskRunner;
use crate::foundation::geometry::{Rect, Size};

/// Default view bounds of a headless page
pub const DEFAULT_VIEW_BOUNDS: Rect = Rect::new(0, 0, 800, 600);

/// Headless hosted surface
pub struct HeadlessWebContents {
    id: ContentId,
    runner: Rc<TaskRunner>,
    weak_self: Weak<Self>,
    delegate: RefCell<Option<Weak<dyn ContentDelegate>>>,
    url: RefCell<String>,
    focused: Cell<bool>,
    view_bounds: Cell<Option<Rect>>,
    scale_factor: Cell<f32>,
    before_unload_handler: Cell<bool>,
    unload_verdict: Cell<bool>,
    hung: Cell<bool>,
    destroyed: Cell<bool>,
    background_opaque: Cell<bool>,
    fill_color: Cell<[u8; 4]>,
    readback_fails: Cell<bool>,
    mouse_lock: Cell<Option<bool>>,
    print_requests: RefCell<Vec<(bool, bool)>>,
    inspected_points: RefCell<Vec<(i32, i32)>>,
    scripts: RefCell<Vec<String>>,
}

impl HeadlessWebContents {
    /// Create a page posting its asynchronous replies to `runner`
    pub fn new(id: ContentId, runner: Rc<TaskRunner>) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            id,
            runner,
            weak_self: weak_self.clone(),
            delegate: RefCell::new(None),
            url: RefCell::new(String::from("about:blank")),
            focused: Cell::new(false),
            view_bounds: Cell::new(Some(DEFAULT_VIEW_BOUNDS)),
            scale_factor: Cell::new(1.0),
            before_unload_handler: Cell::new(false),
            unload_verdict: Cell::new(true),
            hung: Cell::new(false),
            destroyed: Cell::new(false),
            background_opaque: Cell::new(true),
            fill_color: Cell::new([255, 255, 255, 255]),
            readback_fails: Cell::new(false),
            mouse_lock: Cell::new(None),
            print_requests: RefCell::new(Vec::new()),
            inspected_points: RefCell::new(Vec::new()),
            scripts: RefCell::new(Vec::new()),
        })
    }

    fn delegate(&self) -> Option<Rc<dyn ContentDelegate>> {
        self.delegate.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Post `task` with a strong reference to this page, skipping it if the
    /// page is gone by then
    fn post(&self, task: impl FnOnce(&Self) + 'static) {
        let weak = self.weak_self.clone();
        self.runner.post_task(move || {
            if let Some(contents) = weak.upgrade() {
                if !contents.destroyed.get() {
                    task(&contents);
                }
            }
        });
    }

    /// Register (or remove) a before-unload handler answering `proceed`
    pub fn set_before_unload_handler(&self, installed: bool, proceed: bool) {
        self.before_unload_handler.set(installed);
        self.unload_verdict.set(proceed);
    }

    /// Stop (or resume) answering unload requests, like a busy renderer
    pub fn set_hung(&self, hung: bool) {
        self.hung.set(hung);
    }

    /// Change the rendered view bounds; `None` removes the view
    pub fn set_view_bounds(&self, bounds: Option<Rect>) {
        self.view_bounds.set(bounds);
    }

    /// Change the display scale factor
    pub fn set_device_scale_factor(&self, scale: f32) {
        self.scale_factor.set(scale);
    }

    /// Color every readback is filled with
    pub fn set_fill_color(&self, color: [u8; 4]) {
        self.fill_color.set(color);
    }

    /// Make subsequent readbacks fail
    pub fn set_readback_fails(&self, fails: bool) {
        self.readback_fails.set(fails);
    }

    /// Whether `destroy` has run
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// Whether the page background is opaque
    pub fn is_background_opaque(&self) -> bool {
        self.background_opaque.get()
    }

    /// Last pointer-lock answer
    pub fn mouse_lock_response(&self) -> Option<bool> {
        self.mouse_lock.get()
    }

    /// `(silent, print_background)` of every print request
    pub fn print_requests(&self) -> Vec<(bool, bool)> {
        self.print_requests.borrow().clone()
    }

    /// Points passed to `inspect_element`
    pub fn inspected_points(&self) -> Vec<(i32, i32)> {
        self.inspected_points.borrow().clone()
    }

    /// Scripts evaluated in this page
    pub fn executed_scripts(&self) -> Vec<String> {
        self.scripts.borrow().clone()
    }

    /// The renderer stopped answering input
    pub fn simulate_unresponsive(&self) {
        if let Some(delegate) = self.delegate() {
            delegate.renderer_unresponsive();
        }
    }

    /// The renderer answers input again
    pub fn simulate_responsive(&self) {
        if let Some(delegate) = self.delegate() {
            delegate.renderer_responsive();
        }
    }

    /// The page changed its title
    pub fn simulate_title_change(&self, title: &str) {
        if let Some(delegate) = self.delegate() {
            delegate.title_updated(title);
        }
    }

    /// The page called `window.open`; returns whether the engine may create it
    pub fn simulate_popup(&self, frame_name: &str, target_url: &str) -> bool {
        self.delegate()
            .map_or(true, |delegate| delegate.should_create_web_contents(frame_name, target_url, ""))
    }

    /// The page asked to navigate; returns whether it did
    pub fn simulate_navigation(&self, url: &str) -> bool {
        self.delegate()
            .is_some_and(|delegate| delegate.open_url_from_tab(url))
    }

    /// The page updated its draggable regions
    pub fn simulate_draggable_regions(&self, regions: &[DraggableRegion]) {
        if let Some(delegate) = self.delegate() {
            delegate.draggable_regions_updated(regions);
        }
    }

    /// The engine created a render view for the page
    pub fn simulate_render_view_created(&self) {
        if let Some(delegate) = self.delegate() {
            delegate.render_view_created();
        }
    }

    /// The page requested pointer lock
    pub fn simulate_mouse_lock_request(&self) {
        if let Some(delegate) = self.delegate() {
            delegate.request_to_lock_mouse(true, false);
        }
    }

    /// The page called `window.close()`
    pub fn simulate_script_close(&self) {
        self.close_page();
    }
}

impl WebContents for HeadlessWebContents {
    fn id(&self) -> ContentId {
        self.id
    }

    fn set_delegate(&self, delegate: Option<Weak<dyn ContentDelegate>>) {
        *self.delegate.borrow_mut() = delegate;
    }

    fn load_url(&self, url: &str) {
        *self.url.borrow_mut() = url.to_owned();
    }

    fn url(&self) -> String {
        self.url.borrow().clone()
    }

    fn need_to_fire_before_unload(&self) -> bool {
        self.before_unload_handler.get()
    }

    fn dispatch_before_unload(&self) {
        if self.hung.get() {
            return;
        }
        let proceed = self.unload_verdict.get();
        self.post(move |contents| {
            let Some(delegate) = contents.delegate() else {
                return;
            };
            if delegate.before_unload_fired(proceed) {
                contents.close_page();
            }
        });
    }

    fn close_page(&self) {
        if self.hung.get() {
            return;
        }
        self.post(|contents| {
            if let Some(delegate) = contents.delegate() {
                delegate.close_contents();
            }
        });
    }

    fn destroy(&self) {
        self.destroyed.set(true);
        *self.delegate.borrow_mut() = None;
    }

    fn focus(&self) {
        self.focused.set(true);
    }

    fn blur(&self) {
        self.focused.set(false);
    }

    fn has_focus(&self) -> bool {
        self.focused.get()
    }

    fn view_bounds(&self) -> Option<Rect> {
        if self.destroyed.get() {
            return None;
        }
        self.view_bounds.get()
    }

    fn device_scale_factor(&self) -> f32 {
        self.scale_factor.get()
    }

    fn copy_from_backing_store(&self, _source: Rect, bitmap_size: Size, done: ReadbackCallback) {
        let fails = self.readback_fails.get() || bitmap_size.is_empty();
        let color = self.fill_color.get();
        self.runner.post_task(move || {
            if fails {
                done(empty_bitmap(), ReadbackResponse::OutputRequestFailure);
            } else {
                let bitmap = RgbaImage::from_pixel(bitmap_size.width, bitmap_size.height, Rgba(color));
                done(bitmap, ReadbackResponse::Success);
            }
        });
    }

    fn set_background_opaque(&self, opaque: bool) {
        self.background_opaque.set(opaque);
    }

    fn got_response_to_lock_mouse_request(&self, allowed: bool) {
        self.mouse_lock.set(Some(allowed));
    }

    fn print(&self, silent: bool, print_background: bool) {
        self.print_requests.borrow_mut().push((silent, print_background));
    }

    fn show_definition_for_selection(&self) {
        log::debug!("No dictionary available for headless page {:?}", self.id);
    }

    fn inspect_element(&self, x: i32, y: i32) {
        self.inspected_points.borrow_mut().push((x, y));
    }

    fn execute_javascript(&self, script: &str) {
        self.scripts.borrow_mut().push(script.to_owned());
    }
}

/// Factory handing out headless pages from one fake renderer process
pub struct HeadlessContentFactory {
    runner: Rc<TaskRunner>,
    process_id: i32,
    next_routing_id: Cell<i32>,
    created: RefCell<Vec<Rc<HeadlessWebContents>>>,
    fail_next: Cell<bool>,
}

impl HeadlessContentFactory {
    /// Create a factory whose pages live in `process_id`
    pub fn new(runner: Rc<TaskRunner>, process_id: i32) -> Self {
        Self {
            runner,
            process_id,
            next_routing_id: Cell::new(1),
            created: RefCell::new(Vec::new()),
            fail_next: Cell::new(false),
        }
    }

    /// Create a page without handing it to a window
    pub fn create_headless(&self) -> Rc<HeadlessWebContents> {
        let routing_id = self.next_routing_id.get();
        self.next_routing_id.set(routing_id + 1);

        let contents = HeadlessWebContents::new(
            ContentId::new(self.process_id, routing_id),
            self.runner.clone(),
        );
        self.created.borrow_mut().push(contents.clone());
        contents
    }

    /// Every page created so far, oldest first
    pub fn created(&self) -> Vec<Rc<HeadlessWebContents>> {
        self.created.borrow().clone()
    }

    /// Most recently created page
    pub fn last_created(&self) -> Option<Rc<HeadlessWebContents>> {
        self.created.borrow().last().cloned()
    }

    /// Make the next creation fail
    pub fn fail_next_creation(&self) {
        self.fail_next.set(true);
    }

    fn check_failure(&self) -> WindowResult<()> {
        if self.fail_next.replace(false) {
            return Err(WindowError::ContentCreation(String::from(
                "headless renderer refused to start",
            )));
        }
        Ok(())
    }
}

impl WebContentsFactory for HeadlessContentFactory {
    fn create_web_contents(&self) -> WindowResult<Rc<dyn WebContents>> {
        self.check_failure()?;
        let contents: Rc<dyn WebContents> = self.create_headless();
        Ok(contents)
    }

    fn create_devtools_contents(&self, inspected: ContentId) -> WindowResult<Rc<dyn WebContents>> {
        self.check_failure()?;
        let devtools = self.create_headless();
        devtools.load_url(&format!(
            "chrome-devtools://devtools/devtools.html?inspected={}:{}",
            inspected.process_id, inspected.routing_id
        ));
        let devtools: Rc<dyn WebContents> = devtools;
        Ok(devtools)
    }
}
