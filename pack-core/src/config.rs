//! # Pack Configuration
//!
//! A string key/value store in the style of Feathers' `app.set()` /
//! `app.get()`.
//!
//! ```rust
//! use pack_core::PackApp;
//! let app = PackApp::new();
//!
//! app.set("http.port", "1337");
//! assert_eq!(app.get("http.port"), Some("1337".to_string()));
//! ```

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct PackConfig {
    values: HashMap<String, String>,
}

impl PackConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }
}
