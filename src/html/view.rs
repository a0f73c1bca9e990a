//! Per-request output accumulation shared across the client tree.

use serde_json::Value;
use std::collections::HashMap;

/// Output accumulation for one render pass.
///
/// Passed by reference through the client tree, never process-wide. Later
/// children may read values written by earlier ones, which is why
/// rendering stays strictly sequential.
#[derive(Debug, Default)]
pub struct View {
  errors: Vec<String>,
  values: HashMap<String, Value>,
}

impl View {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a translated error line. The list is append-only and scoped to
  /// this request/response cycle.
  pub fn add_error(&mut self, message: impl Into<String>) {
    self.errors.push(message.into());
  }

  pub fn errors(&self) -> &[String] {
    &self.errors
  }

  pub fn set(&mut self, key: &str, value: Value) {
    self.values.insert(key.to_string(), value);
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.values.get(key)
  }
}
