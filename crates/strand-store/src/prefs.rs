//! Preference Store
//!
//! Durable key-value storage for user preferences (volume, muted, subtitle
//! language). In-memory by default; optionally file-backed with one
//! `key\tvalue` pair per line.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Storage key for the volume preference
pub const VOLUME_PREF_KEY: &str = "media-chrome-pref-volume";
/// Storage key for the muted preference
pub const MUTED_PREF_KEY: &str = "media-chrome-pref-muted";
/// Storage key for the preferred subtitle language
pub const SUBTITLES_LANG_PREF_KEY: &str = "media-chrome-pref-subtitles-lang";

/// Preference backend
#[derive(Debug, Default)]
pub struct PreferenceStore {
    data: RefCell<HashMap<String, String>>,
    path: Option<PathBuf>,
}

impl PreferenceStore {
    /// In-memory store
    pub fn memory() -> Self {
        Self {
            data: RefCell::new(HashMap::new()),
            path: None,
        }
    }

    /// File-backed store; loads existing data if present
    pub fn persistent(path: PathBuf) -> Self {
        let store = Self {
            data: RefCell::new(HashMap::new()),
            path: Some(path.clone()),
        };

        if path.exists() {
            if let Ok(contents) = fs::read_to_string(&path) {
                let mut data = store.data.borrow_mut();
                for line in contents.lines() {
                    if let Some((key, value)) = line.split_once('\t') {
                        data.insert(key.to_string(), value.to_string());
                    }
                }
            }
        }

        store
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.data.borrow().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: &str) {
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.persist();
    }

    pub fn remove(&self, key: &str) {
        self.data.borrow_mut().remove(key);
        self.persist();
    }

    fn persist(&self) {
        if let Some(path) = &self.path {
            let contents: String = self
                .data
                .borrow()
                .iter()
                .map(|(k, v)| format!("{}\t{}", k, v))
                .collect::<Vec<_>>()
                .join("\n");
            if let Err(err) = fs::write(path, contents) {
                tracing::warn!("failed to persist preferences: {err}");
            }
        }
    }
}
