//! Per-visitor session storage.
//!
//! Pinned and comparison lists live in the visitor's session behind a plain
//! get/set contract. No locking beyond the backend's own; concurrent tabs
//! editing the same list race with last-writer-wins semantics.

use std::collections::HashMap;
use std::sync::Mutex;

pub trait SessionStore: Send + Sync {
  fn get(&self, visitor: &str, key: &str) -> Option<String>;
  fn set(&self, visitor: &str, key: &str, value: String);
}

/// Process-local session store for the preview CLI and the tests.
#[derive(Default)]
pub struct MemorySession {
  values: Mutex<HashMap<(String, String), String>>,
}

impl SessionStore for MemorySession {
  fn get(&self, visitor: &str, key: &str) -> Option<String> {
    let values = self.values.lock().ok()?;
    values.get(&(visitor.to_string(), key.to_string())).cloned()
  }

  fn set(&self, visitor: &str, key: &str, value: String) {
    if let Ok(mut values) = self.values.lock() {
      values.insert((visitor.to_string(), key.to_string()), value);
    }
  }
}
