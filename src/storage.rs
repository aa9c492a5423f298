//! Key/value persistence port.
//!
//! Features receive a store at construction instead of reaching for
//! `window.localStorage` themselves. The browser adapter wraps
//! `web_sys::Storage`; [`MemoryStore`] backs tests and browsers with storage
//! disabled (private mode, blocked cookies).

use std::cell::RefCell;
use std::collections::HashMap;

use web_sys::Storage;

/// Minimal per-key persistence used by theme and profile picture.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// `window.localStorage` adapter. Write failures (quota, security) are logged and dropped.
pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Returns `None` when the browser refuses access to local storage.
    pub fn from_window(win: &web_sys::Window) -> Option<Self> {
        win.local_storage().ok().flatten().map(Self::new)
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set_item(key, value) {
            log::warn!("localStorage write for '{}' failed: {:?}", key, e);
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_overwrites_single_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("theme"), None);
        store.set("theme", "light");
        store.set("theme", "dark");
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn rc_store_shares_entries() {
        let store = std::rc::Rc::new(MemoryStore::new());
        let other = store.clone();
        other.set("profilePicture", "data:image/png;base64,AA==");
        assert!(store.get("profilePicture").is_some());
    }
}
