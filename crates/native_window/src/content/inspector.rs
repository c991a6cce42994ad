//! Hosted surface plus its optional developer-tools inspector
//!
//! `InspectableWebContents` owns both surfaces. The inspector front end talks
//! to the embedder with small JSON messages; the ones the window services
//! (saving and appending files) are decoded into `FrontendRequest` and routed
//! to an `InspectorDelegate`.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::Deserialize;
use serde_json::Value;

use crate::content::{WebContents, WebContentsFactory};
use crate::error::WindowResult;

/// Receives file requests made by the inspector front end
pub trait InspectorDelegate {
    /// Save `content` for `url`, prompting for a path when `save_as` is set
    /// or no path is known yet
    fn devtools_save_to_file(&self, url: &str, content: &str, save_as: bool);

    /// Append `content` to the file previously saved for `url`
    fn devtools_append_to_file(&self, url: &str, content: &str);
}

/// Embedder message as sent by the inspector front end
#[derive(Debug, Deserialize)]
struct FrontendMessage {
    #[serde(default)]
    id: u64,
    method: String,
    #[serde(default)]
    params: Vec<Value>,
}

/// A front-end request the window knows how to service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontendRequest {
    /// `save(url, content, saveAs)`
    Save {
        /// Logical identifier of the saved resource
        url: String,
        /// Text to write
        content: String,
        /// Always prompt for a path
        save_as: bool,
    },
    /// `append(url, content)`
    Append {
        /// Logical identifier of a previously saved resource
        url: String,
        /// Text to append
        content: String,
    },
}

impl FrontendRequest {
    /// Decode a front-end message
    ///
    /// Returns `None` for malformed messages and for methods the window does
    /// not handle.
    pub fn parse(message: &str) -> Option<Self> {
        let message: FrontendMessage = match serde_json::from_str(message) {
            Ok(message) => message,
            Err(e) => {
                log::warn!("Malformed inspector message: {}", e);
                return None;
            }
        };

        let string_param = |index: usize| message.params.get(index).and_then(Value::as_str);
        match message.method.as_str() {
            "save" => Some(Self::Save {
                url: string_param(0)?.to_owned(),
                content: string_param(1)?.to_owned(),
                save_as: message.params.get(2).and_then(Value::as_bool).unwrap_or(false),
            }),
            "append" => Some(Self::Append {
                url: string_param(0)?.to_owned(),
                content: string_param(1)?.to_owned(),
            }),
            other => {
                log::debug!("Ignoring inspector message {} ({})", message.id, other);
                None
            }
        }
    }
}

/// Owner of a window's hosted surface and its inspector surface
pub struct InspectableWebContents {
    web_contents: RefCell<Option<Rc<dyn WebContents>>>,
    devtools: RefCell<Option<Rc<dyn WebContents>>>,
    factory: Rc<dyn WebContentsFactory>,
    delegate: RefCell<Option<Weak<dyn InspectorDelegate>>>,
    can_dock: Cell<bool>,
}

impl InspectableWebContents {
    /// Take ownership of `web_contents`; inspectors are created through `factory`
    pub fn new(web_contents: Rc<dyn WebContents>, factory: Rc<dyn WebContentsFactory>) -> Self {
        Self {
            web_contents: RefCell::new(Some(web_contents)),
            devtools: RefCell::new(None),
            factory,
            delegate: RefCell::new(None),
            can_dock: Cell::new(true),
        }
    }

    /// The hosted surface, until `destroy` runs
    pub fn web_contents(&self) -> Option<Rc<dyn WebContents>> {
        self.web_contents.borrow().clone()
    }

    /// The inspector surface, while it is open
    pub fn devtools_web_contents(&self) -> Option<Rc<dyn WebContents>> {
        self.devtools.borrow().clone()
    }

    /// Route front-end file requests to `delegate`
    pub fn set_delegate(&self, delegate: Weak<dyn InspectorDelegate>) {
        *self.delegate.borrow_mut() = Some(delegate);
    }

    /// Whether the inspector may dock into the window
    pub fn set_can_dock(&self, can_dock: bool) {
        self.can_dock.set(can_dock);
    }

    /// Whether the inspector may dock into the window
    pub fn can_dock(&self) -> bool {
        self.can_dock.get()
    }

    /// Open the inspector, or focus it when already open
    pub fn show_devtools(&self) -> WindowResult<()> {
        if let Some(devtools) = self.devtools_web_contents() {
            devtools.focus();
            return Ok(());
        }
        let Some(inspected) = self.web_contents() else {
            return Ok(());
        };

        let devtools = self.factory.create_devtools_contents(inspected.id())?;
        log::debug!(
            "Opened inspector for {:?} (docked: {})",
            inspected.id(),
            self.can_dock.get()
        );
        *self.devtools.borrow_mut() = Some(devtools);
        Ok(())
    }

    /// Close the inspector if it is open
    pub fn close_devtools(&self) {
        let devtools = self.devtools.borrow_mut().take();
        if let Some(devtools) = devtools {
            log::debug!("Closing inspector {:?}", devtools.id());
            devtools.destroy();
        }
    }

    /// Whether the inspector is open
    pub fn is_devtools_view_showing(&self) -> bool {
        self.devtools.borrow().is_some()
    }

    /// Open the inspector and reveal the element at `(x, y)`
    pub fn inspect_element(&self, x: i32, y: i32) -> WindowResult<()> {
        self.show_devtools()?;
        if let Some(web_contents) = self.web_contents() {
            web_contents.inspect_element(x, y);
        }
        Ok(())
    }

    /// Handle a message from the inspector front end
    ///
    /// Returns whether the message was a request the window services.
    pub fn dispatch_frontend_message(&self, message: &str) -> bool {
        let Some(request) = FrontendRequest::parse(message) else {
            return false;
        };
        let delegate = self.delegate.borrow().as_ref().and_then(Weak::upgrade);
        let Some(delegate) = delegate else {
            return false;
        };

        match request {
            FrontendRequest::Save {
                url,
                content,
                save_as,
            } => delegate.devtools_save_to_file(&url, &content, save_as),
            FrontendRequest::Append { url, content } => {
                delegate.devtools_append_to_file(&url, &content);
            }
        }
        true
    }

    /// Call `function_name(args...)` inside the inspector front end
    pub fn call_function(&self, function_name: &str, args: &[Value]) {
        let Some(devtools) = self.devtools_web_contents() else {
            log::debug!("No inspector open for {}", function_name);
            return;
        };
        devtools.execute_javascript(&frontend_call(function_name, args));
    }

    /// Destroy the inspector surface, then the hosted surface
    pub fn destroy(&self) {
        self.close_devtools();
        let web_contents = self.web_contents.borrow_mut().take();
        if let Some(web_contents) = web_contents {
            log::debug!("Destroying web contents {:?}", web_contents.id());
            web_contents.set_delegate(None);
            web_contents.destroy();
        }
    }
}

/// Script evaluating `function_name` with JSON-encoded arguments
fn frontend_call(function_name: &str, args: &[Value]) -> String {
    let args: Vec<String> = args.iter().map(Value::to_string).collect();
    format!("{}({})", function_name, args.join(", "))
}
