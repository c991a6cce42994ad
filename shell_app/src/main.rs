//! Demo shell hosting one window
//!
//! Loads window options from an optional `.toml`/`.ron` file, opens the
//! window, captures the page into `capture.png` and then closes the window
//! through the graceful close protocol. Built with `--features glfw-backend`
//! the window is shown on screen and stays open until the user closes it.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use native_window::config::{Config, WindowOptions};
use native_window::content::{HeadlessContentFactory, ScriptedDialogPresenter};
use native_window::events::TaskRunner;
use native_window::foundation::geometry::Rect;
use native_window::foundation::{logging, time::Clock};
use native_window::window::{NativeWindow, NativeWindowObserver, WindowList, WindowServices};

const IDLE_SLEEP: Duration = Duration::from_millis(10);

/// Logs every lifecycle event of the demo window
struct EventLogger;

impl NativeWindowObserver for EventLogger {
    fn on_page_title_updated(&self, _prevent_default: &mut bool, title: &str) {
        log::info!("Page title: {}", title);
    }

    fn will_close_window(&self, _prevent_default: &mut bool) {
        log::info!("Window closing");
    }

    fn on_window_closed(&self) {
        log::info!("Window closed");
    }

    fn on_window_focus(&self) {
        log::info!("Window focused");
    }

    fn on_window_blur(&self) {
        log::info!("Window blurred");
    }

    fn on_window_maximize(&self) {
        log::info!("Window maximized");
    }

    fn on_window_minimize(&self) {
        log::info!("Window minimized");
    }

    fn on_window_restore(&self) {
        log::info!("Window restored");
    }

    fn on_renderer_unresponsive(&self) {
        log::warn!("Page is not responding");
    }
}

fn load_options(path: Option<&Path>) -> Result<WindowOptions, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            log::info!("Loading window options from {}", path.display());
            Ok(WindowOptions::load_from_file(path)?)
        }
        None => Ok(WindowOptions::default()
            .with_size(1024, 768)
            .with_title("Native Window Shell")),
    }
}

fn services(
    runner: &Rc<TaskRunner>,
    contents: Rc<HeadlessContentFactory>,
) -> Result<WindowServices, Box<dyn std::error::Error>> {
    #[cfg(feature = "glfw-backend")]
    let platform: Rc<dyn native_window::window::PlatformWindowFactory> =
        Rc::new(native_window::window::GlfwPlatform::new()?);
    #[cfg(not(feature = "glfw-backend"))]
    let platform: Rc<dyn native_window::window::PlatformWindowFactory> =
        Rc::new(native_window::window::HeadlessPlatform::new());

    Ok(WindowServices {
        task_runner: runner.clone(),
        platform,
        contents,
        dialogs: Rc::new(ScriptedDialogPresenter::new()),
    })
}

#[cfg(feature = "glfw-backend")]
fn pump_platform(window: &NativeWindow) {
    if let Some(glfw) = window
        .platform_window()
        .and_then(native_window::window::glfw_backend::glfw_window)
    {
        glfw.pump_events();
    }
}

#[cfg(not(feature = "glfw-backend"))]
fn pump_platform(_window: &NativeWindow) {}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default_filter("info");

    let options_path = std::env::args().nth(1).map(PathBuf::from);
    let options = load_options(options_path.as_deref())?;

    let runner = Rc::new(TaskRunner::new(Clock::system()));
    let contents = Rc::new(HeadlessContentFactory::new(runner.clone(), 1));
    let window = NativeWindow::create(&options, &services(&runner, contents.clone())?)?;
    let logger = Rc::new(EventLogger);
    window.add_observer(&logger);

    if let Some(page) = contents.last_created() {
        page.set_fill_color([32, 96, 160, 255]);
        page.simulate_title_change("Shell Demo");
    }

    let output = options_path
        .as_deref()
        .and_then(Path::parent)
        .map_or_else(|| PathBuf::from("capture.png"), |dir| dir.join("capture.png"));
    window.capture_page(Rect::default(), move |bitmap| {
        if bitmap.width() == 0 {
            log::warn!("Capture produced no pixels");
            return;
        }
        match bitmap.save_with_format(&output, image::ImageFormat::Png) {
            Ok(()) => log::info!(
                "Saved {}x{} capture to {}",
                bitmap.width(),
                bitmap.height(),
                output.display()
            ),
            Err(e) => log::error!("Failed to save capture: {}", e),
        }
    });

    // Headless windows close as soon as the capture is queued; on screen the
    // user closes the window
    if cfg!(not(feature = "glfw-backend")) {
        window.close();
    }

    while !WindowList::is_empty() {
        pump_platform(&window);
        if runner.run_pending() == 0 {
            std::thread::sleep(IDLE_SLEEP);
        }
    }
    // Let the capture finish if the window closed first
    runner.run_pending();

    log::info!("Shell exiting");
    Ok(())
}
