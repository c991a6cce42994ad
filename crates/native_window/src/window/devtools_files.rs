//! Files written on behalf of the inspector
//!
//! The inspector identifies saved resources by its own logical urls. The
//! bridge remembers which path each url was saved to so later appends land
//! in the same file. Entries live as long as the window.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Url to path map for inspector saves
#[derive(Debug, Default)]
pub struct DevToolsFileBridge {
    saved_files: RefCell<HashMap<String, PathBuf>>,
}

impl DevToolsFileBridge {
    /// Create a bridge with no saved files
    pub fn new() -> Self {
        Self::default()
    }

    /// Path previously recorded for `url`
    pub fn path_for(&self, url: &str) -> Option<PathBuf> {
        self.saved_files.borrow().get(url).cloned()
    }

    /// Path to reuse for a save of `url`, or `None` when the user has to be
    /// asked
    pub fn known_path(&self, url: &str, save_as: bool) -> Option<PathBuf> {
        if save_as {
            return None;
        }
        self.path_for(url)
    }

    /// Record `path` for `url` and write `content` there, replacing the file
    pub fn save(&self, url: &str, path: &Path, content: &str) -> io::Result<()> {
        self.saved_files
            .borrow_mut()
            .insert(url.to_owned(), path.to_path_buf());
        std::fs::write(path, content)?;
        log::info!("Saved {} to {}", url, path.display());
        Ok(())
    }

    /// Append `content` to the file recorded for `url`
    ///
    /// Returns `Ok(None)` without touching the filesystem when `url` was
    /// never saved.
    pub fn append(&self, url: &str, content: &str) -> io::Result<Option<PathBuf>> {
        let Some(path) = self.path_for(url) else {
            log::debug!("Append to unsaved {} ignored", url);
            return Ok(None);
        };

        let mut file = OpenOptions::new().append(true).open(&path)?;
        file.write_all(content.as_bytes())?;
        log::debug!("Appended {} bytes to {}", content.len(), path.display());
        Ok(Some(path))
    }

    /// Number of recorded urls
    pub fn len(&self) -> usize {
        self.saved_files.borrow().len()
    }

    /// Whether nothing was saved yet
    pub fn is_empty(&self) -> bool {
        self.saved_files.borrow().is_empty()
    }

    /// Forget every recorded path
    pub fn clear(&self) {
        self.saved_files.borrow_mut().clear();
    }
}

/// Default path offered when saving `url`: its last path segment
pub fn suggested_path(url: &str) -> PathBuf {
    let trimmed = url.split(['?', '#']).next().unwrap_or(url);
    let name = trimmed
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("untitled");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        let bridge = DevToolsFileBridge::new();

        bridge.save("a", &path, "hello").unwrap();
        assert_eq!(bridge.append("a", " world").unwrap(), Some(path.clone()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello world");
    }

    #[test]
    fn test_append_to_unknown_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = DevToolsFileBridge::new();

        assert_eq!(bridge.append("unknown-id", "data").unwrap(), None);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(bridge.is_empty());
    }

    #[test]
    fn test_save_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let bridge = DevToolsFileBridge::new();

        bridge.save("log", &path, "first").unwrap();
        bridge.save("log", &path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert_eq!(bridge.len(), 1);
    }

    #[test]
    fn test_known_path_honours_save_as() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.js");
        let bridge = DevToolsFileBridge::new();

        assert_eq!(bridge.known_path("x", false), None);
        bridge.save("x", &path, "").unwrap();
        assert_eq!(bridge.known_path("x", false), Some(path));
        assert_eq!(bridge.known_path("x", true), None);
    }

    #[test]
    fn test_append_after_file_removed_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        let bridge = DevToolsFileBridge::new();

        bridge.save("gone", &path, "x").unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(bridge.append("gone", "y").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_suggested_path() {
        assert_eq!(suggested_path("http://host/dir/app.js?v=2"), PathBuf::from("app.js"));
        assert_eq!(suggested_path("http://host/dir/"), PathBuf::from("dir"));
        assert_eq!(suggested_path("snippet"), PathBuf::from("snippet"));
        assert_eq!(suggested_path(""), PathBuf::from("untitled"));
    }
}
