//! Asynchronous page capture
//!
//! Requests are serialized: one readback is in flight at a time and later
//! requests wait in a queue. Every request's callback runs exactly once on
//! the owning thread, with an empty bitmap when nothing could be read back.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::content::{empty_bitmap, Bitmap, ReadbackResponse, WebContents};
use crate::events::TaskRunner;
use crate::foundation::geometry::{Rect, Size};

/// Completion callback of a page capture
pub type CaptureCallback = Box<dyn FnOnce(Bitmap)>;

struct CaptureRequest {
    surface: Option<Weak<dyn WebContents>>,
    rect: Rect,
    callback: CaptureCallback,
}

#[derive(Default)]
struct CaptureState {
    queue: RefCell<VecDeque<CaptureRequest>>,
    in_flight: Cell<bool>,
}

/// Readback region and bitmap size for a capture of `rect`
///
/// An empty `rect` captures the whole view. On high-density displays the
/// bitmap is the region scaled by `scale`, rounded up to whole pixels.
pub fn capture_geometry(rect: Rect, view_size: Size, scale: f32) -> (Rect, Size) {
    let source = if rect.is_empty() {
        Rect::from_size(view_size)
    } else {
        rect
    };

    let bitmap_size = if scale > 1.0 {
        source.size().scale_ceil(scale)
    } else {
        source.size()
    };
    (source, bitmap_size)
}

/// Queue of page captures for one window
pub struct PageCapture {
    runner: Rc<TaskRunner>,
    state: Rc<CaptureState>,
}

impl PageCapture {
    /// Create an idle capture queue completing on `runner`
    pub fn new(runner: Rc<TaskRunner>) -> Self {
        Self {
            runner,
            state: Rc::new(CaptureState::default()),
        }
    }

    /// Capture `rect` of `surface` and hand the bitmap to `callback`
    ///
    /// Returns immediately. With no surface the callback receives an empty
    /// bitmap.
    pub fn capture(&self, surface: Option<&Rc<dyn WebContents>>, rect: Rect, callback: CaptureCallback) {
        self.state.queue.borrow_mut().push_back(CaptureRequest {
            surface: surface.map(Rc::downgrade),
            rect,
            callback,
        });
        start_next(&self.runner, &self.state);
    }

    /// Whether a readback is outstanding
    pub fn is_in_flight(&self) -> bool {
        self.state.in_flight.get()
    }

    /// Requests waiting behind the one in flight
    pub fn queued(&self) -> usize {
        self.state.queue.borrow().len()
    }
}

fn start_next(runner: &Rc<TaskRunner>, state: &Rc<CaptureState>) {
    if state.in_flight.get() {
        return;
    }
    let request = state.queue.borrow_mut().pop_front();
    let Some(request) = request else {
        return;
    };
    state.in_flight.set(true);

    let surface = request.surface.as_ref().and_then(Weak::upgrade);
    let target = surface.and_then(|surface| {
        let bounds = surface.view_bounds()?;
        Some((surface, bounds))
    });

    let callback = request.callback;
    let Some((surface, bounds)) = target else {
        log::warn!("No view to capture, reporting an empty bitmap");
        let (runner_next, state_next) = (runner.clone(), state.clone());
        runner.post_task(move || finish(&runner_next, &state_next, callback, empty_bitmap()));
        return;
    };

    let (source, bitmap_size) =
        capture_geometry(request.rect, bounds.size(), surface.device_scale_factor());
    log::debug!(
        "Capturing {:?} of {:?} into {}x{}",
        source,
        surface.id(),
        bitmap_size.width,
        bitmap_size.height
    );

    let (runner_next, state_next) = (runner.clone(), state.clone());
    surface.copy_from_backing_store(
        source,
        bitmap_size,
        Box::new(move |bitmap, response| {
            let bitmap = if response == ReadbackResponse::Success {
                bitmap
            } else {
                log::warn!("Page readback failed: {:?}", response);
                empty_bitmap()
            };
            finish(&runner_next, &state_next, callback, bitmap);
        }),
    );
}

fn finish(runner: &Rc<TaskRunner>, state: &Rc<CaptureState>, callback: CaptureCallback, bitmap: Bitmap) {
    state.in_flight.set(false);
    log::debug!("Capture finished ({}x{})", bitmap.width(), bitmap.height());
    callback(bitmap);
    start_next(runner, state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentId, HeadlessWebContents};

    fn surface(runner: &Rc<TaskRunner>) -> (Rc<HeadlessWebContents>, Rc<dyn WebContents>) {
        let headless = HeadlessWebContents::new(ContentId::new(1, 1), runner.clone());
        let surface: Rc<dyn WebContents> = headless.clone();
        (headless, surface)
    }

    fn recorder() -> (Rc<RefCell<Vec<(u32, u32)>>>, impl Fn() -> CaptureCallback) {
        let results = Rc::new(RefCell::new(Vec::new()));
        let sink = results.clone();
        (results, move || {
            let sink = sink.clone();
            Box::new(move |bitmap: Bitmap| sink.borrow_mut().push(bitmap.dimensions()))
        })
    }

    #[test]
    fn test_geometry_whole_view_for_empty_rect() {
        let (source, bitmap) = capture_geometry(Rect::default(), Size::new(800, 600), 1.0);
        assert_eq!(source, Rect::new(0, 0, 800, 600));
        assert_eq!(bitmap, Size::new(800, 600));
    }

    #[test]
    fn test_geometry_scales_up_on_high_density() {
        let (source, bitmap) = capture_geometry(Rect::new(10, 20, 101, 51), Size::new(800, 600), 1.5);
        assert_eq!(source, Rect::new(10, 20, 101, 51));
        assert_eq!(bitmap, Size::new(152, 77));

        // Scales at or below 1 never shrink the bitmap
        let (_, bitmap) = capture_geometry(Rect::new(0, 0, 40, 30), Size::new(800, 600), 0.5);
        assert_eq!(bitmap, Size::new(40, 30));
    }

    #[test]
    fn test_empty_rect_captures_whole_page_once() {
        let runner = Rc::new(TaskRunner::manual());
        let (_headless, surface) = surface(&runner);
        let capture = PageCapture::new(runner.clone());
        let (results, callback) = recorder();

        capture.capture(Some(&surface), Rect::default(), callback());
        assert!(results.borrow().is_empty());

        runner.run_pending();
        runner.run_pending();
        assert_eq!(*results.borrow(), vec![(800, 600)]);
        assert!(!capture.is_in_flight());
    }

    #[test]
    fn test_requests_are_serialized() {
        let runner = Rc::new(TaskRunner::manual());
        let (_headless, surface) = surface(&runner);
        let capture = PageCapture::new(runner.clone());
        let (results, callback) = recorder();

        capture.capture(Some(&surface), Rect::new(0, 0, 10, 10), callback());
        capture.capture(Some(&surface), Rect::new(0, 0, 20, 20), callback());
        assert!(capture.is_in_flight());
        assert_eq!(capture.queued(), 1);

        runner.run_pending();
        assert_eq!(*results.borrow(), vec![(10, 10), (20, 20)]);
    }

    #[test]
    fn test_failures_yield_empty_bitmaps() {
        let runner = Rc::new(TaskRunner::manual());
        let (headless, surface) = surface(&runner);
        let capture = PageCapture::new(runner.clone());
        let (results, callback) = recorder();

        headless.set_readback_fails(true);
        capture.capture(Some(&surface), Rect::default(), callback());
        capture.capture(None, Rect::default(), callback());
        headless.set_view_bounds(None);
        capture.capture(Some(&surface), Rect::default(), callback());

        runner.run_pending();
        assert_eq!(*results.borrow(), vec![(0, 0), (0, 0), (0, 0)]);
    }
}
