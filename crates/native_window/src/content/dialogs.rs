//! Presenting modal dialogs on behalf of a window and its page

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::content::FileChooserParams;
use crate::window::dialog::DialogCounter;

/// Kind of script-initiated dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JavaScriptDialogKind {
    /// `alert()`
    Alert,
    /// `confirm()`
    Confirm,
    /// `prompt()`
    Prompt,
}

/// User's answer to a dialog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JavaScriptDialogResponse {
    /// Whether the user accepted (OK) rather than cancelled
    pub accepted: bool,
    /// Text typed into a prompt
    pub user_input: String,
}

/// Shows modal dialogs; the presentation itself belongs to the embedder
///
/// Calls block the owning thread until the user answers, the way native
/// modal dialogs run a nested loop.
pub trait DialogPresenter {
    /// Ask for a destination path; `None` means cancelled
    fn show_save_dialog(&self, title: &str, default_path: &Path) -> Option<PathBuf>;

    /// Ask for files to open
    fn show_open_dialog(&self, params: &FileChooserParams) -> Vec<PathBuf>;

    /// Show an alert/confirm/prompt box
    fn show_message_box(
        &self,
        kind: JavaScriptDialogKind,
        message: &str,
        default_prompt: &str,
    ) -> JavaScriptDialogResponse;
}

/// Runs the page's script dialogs over its window
pub struct JavaScriptDialogManager {
    presenter: Rc<dyn DialogPresenter>,
    dialogs: DialogCounter,
}

impl JavaScriptDialogManager {
    /// Create a manager presenting through `presenter`, attaching its dialogs
    /// to the window owning `dialogs`
    pub fn new(presenter: Rc<dyn DialogPresenter>, dialogs: DialogCounter) -> Self {
        Self { presenter, dialogs }
    }

    /// Show a script dialog and return the user's answer
    pub fn run_javascript_dialog(
        &self,
        origin_url: &str,
        kind: JavaScriptDialogKind,
        message: &str,
        default_prompt: &str,
    ) -> JavaScriptDialogResponse {
        log::debug!("Showing {:?} dialog for {}", kind, origin_url);
        let _scope = self.dialogs.enter();
        let mut response = self.presenter.show_message_box(kind, message, default_prompt);
        if kind != JavaScriptDialogKind::Prompt {
            response.user_input.clear();
        }
        if kind == JavaScriptDialogKind::Alert {
            response.accepted = true;
        }
        response
    }

    /// Ask whether the user really wants to leave the page
    pub fn run_before_unload_dialog(&self, message: &str, is_reload: bool) -> bool {
        let prompt = if is_reload {
            "Reload this page?"
        } else {
            "Leave this page?"
        };
        let _scope = self.dialogs.enter();
        self.presenter
            .show_message_box(JavaScriptDialogKind::Confirm, &format!("{prompt}\n\n{message}"), "")
            .accepted
    }
}

/// Presenter answering from queued replies, for headless runs and tests
///
/// Each kind of dialog pops its next queued answer; with nothing queued the
/// dialog counts as cancelled.
#[derive(Default)]
pub struct ScriptedDialogPresenter {
    save_paths: RefCell<VecDeque<Option<PathBuf>>>,
    open_paths: RefCell<VecDeque<Vec<PathBuf>>>,
    message_replies: RefCell<VecDeque<JavaScriptDialogResponse>>,
    shown: Cell<usize>,
    observer: RefCell<Option<Box<dyn Fn()>>>,
}

impl ScriptedDialogPresenter {
    /// Create a presenter with no queued answers
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer to the next save dialog
    pub fn queue_save_path(&self, path: Option<PathBuf>) {
        self.save_paths.borrow_mut().push_back(path);
    }

    /// Queue the answer to the next open dialog
    pub fn queue_open_paths(&self, paths: Vec<PathBuf>) {
        self.open_paths.borrow_mut().push_back(paths);
    }

    /// Queue the answer to the next message box
    pub fn queue_message_reply(&self, reply: JavaScriptDialogResponse) {
        self.message_replies.borrow_mut().push_back(reply);
    }

    /// Number of dialogs shown so far
    pub fn shown_count(&self) -> usize {
        self.shown.get()
    }

    /// Run `callback` while each dialog is on screen
    pub fn on_show(&self, callback: impl Fn() + 'static) {
        *self.observer.borrow_mut() = Some(Box::new(callback));
    }

    fn showing(&self) {
        self.shown.set(self.shown.get() + 1);
        if let Some(callback) = self.observer.borrow().as_ref() {
            callback();
        }
    }
}

impl DialogPresenter for ScriptedDialogPresenter {
    fn show_save_dialog(&self, _title: &str, _default_path: &Path) -> Option<PathBuf> {
        self.showing();
        self.save_paths.borrow_mut().pop_front().flatten()
    }

    fn show_open_dialog(&self, _params: &FileChooserParams) -> Vec<PathBuf> {
        self.showing();
        self.open_paths.borrow_mut().pop_front().unwrap_or_default()
    }

    fn show_message_box(
        &self,
        _kind: JavaScriptDialogKind,
        _message: &str,
        _default_prompt: &str,
    ) -> JavaScriptDialogResponse {
        self.showing();
        self.message_replies.borrow_mut().pop_front().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialog_attached_while_presented() {
        let presenter = Rc::new(ScriptedDialogPresenter::new());
        let counter = DialogCounter::new();
        let seen = Rc::new(Cell::new(0));
        {
            let counter = counter.clone();
            let seen = seen.clone();
            presenter.on_show(move || seen.set(counter.count()));
        }
        presenter.queue_message_reply(JavaScriptDialogResponse {
            accepted: true,
            user_input: "typed".into(),
        });

        let manager = JavaScriptDialogManager::new(presenter.clone(), counter.clone());
        let response =
            manager.run_javascript_dialog("file:///index.html", JavaScriptDialogKind::Prompt, "name?", "");

        assert_eq!(seen.get(), 1);
        assert!(!counter.has_dialog());
        assert_eq!(response.user_input, "typed");
    }

    #[test]
    fn test_alert_always_accepted_without_input() {
        let presenter = Rc::new(ScriptedDialogPresenter::new());
        let manager = JavaScriptDialogManager::new(presenter.clone(), DialogCounter::new());

        let response = manager.run_javascript_dialog("about:blank", JavaScriptDialogKind::Alert, "hi", "");
        assert!(response.accepted);
        assert!(response.user_input.is_empty());
        assert_eq!(presenter.shown_count(), 1);
    }

    #[test]
    fn test_before_unload_cancelled_without_reply() {
        let presenter = Rc::new(ScriptedDialogPresenter::new());
        let manager = JavaScriptDialogManager::new(presenter, DialogCounter::new());
        assert!(!manager.run_before_unload_dialog("unsaved changes", false));
    }
}
