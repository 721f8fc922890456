//! In-memory [`ParamStore`] implementation.
//!
//! The production storage engine lives behind the same trait; this
//! implementation backs the binary's default wiring and the test suite.
//! A std `Mutex` is enough: every store access happens from the single
//! control thread or short-lived init code.

use std::collections::HashMap;
use std::sync::Mutex;

use super::params::ParamStore;

/// Mutex-guarded map store.
#[derive(Default)]
pub struct MemParams {
    inner: Mutex<HashMap<String, String>>,
}

impl MemParams {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParamStore for MemParams {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_remove_roundtrip() {
        let store = MemParams::new();
        assert!(store.get("Version").is_none());
        store.put("Version", "0.1.0");
        assert_eq!(store.get("Version").as_deref(), Some("0.1.0"));
        store.remove("Version");
        assert!(store.get("Version").is_none());
    }

    #[test]
    fn bool_helpers() {
        let store = MemParams::new();
        assert!(!store.get_bool("DoShutdown"));
        store.put_bool("DoShutdown", true);
        assert!(store.get_bool("DoShutdown"));
    }
}
