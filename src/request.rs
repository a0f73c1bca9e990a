//! Inbound request parameters and per-visitor state.
//!
//! The hosting web server hands over a flat multi-value parameter map plus
//! the session id, the authenticated customer (if any) and a fresh
//! anti-forgery token. Nothing here fails: malformed values are dropped or
//! fall back to defaults downstream.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Request {
  params: BTreeMap<String, Vec<String>>,
  session_id: String,
  customer: Option<String>,
  csrf_token: String,
}

impl Request {
  pub fn new(session_id: impl Into<String>, csrf_token: impl Into<String>) -> Self {
    Self {
      params: BTreeMap::new(),
      session_id: session_id.into(),
      customer: None,
      csrf_token: csrf_token.into(),
    }
  }

  pub fn with_param(mut self, name: &str, value: &str) -> Self {
    self.add_param(name, value);
    self
  }

  pub fn with_customer(mut self, customer: impl Into<String>) -> Self {
    self.customer = Some(customer.into());
    self
  }

  pub fn add_param(&mut self, name: &str, value: &str) {
    self
      .params
      .entry(name.to_string())
      .or_default()
      .push(value.to_string());
  }

  pub fn set_customer(&mut self, customer: impl Into<String>) {
    self.customer = Some(customer.into());
  }

  /// First value of a parameter, if present.
  pub fn param(&self, name: &str) -> Option<&str> {
    self.params.get(name).and_then(|v| v.first()).map(String::as_str)
  }

  /// All values of a parameter, in submission order.
  pub fn values(&self, name: &str) -> &[String] {
    self.params.get(name).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Numeric id list: repeated values and comma-separated entries are
  /// merged, duplicates and non-numeric entries silently dropped.
  pub fn id_list(&self, name: &str) -> Vec<u64> {
    let mut ids = Vec::new();
    for value in self.values(name) {
      for part in value.split(',') {
        if let Ok(id) = part.trim().parse::<u64>() {
          if !ids.contains(&id) {
            ids.push(id);
          }
        }
      }
    }
    ids
  }

  pub fn param_names(&self) -> impl Iterator<Item = &str> {
    self.params.keys().map(String::as_str)
  }

  pub fn session_id(&self) -> &str {
    &self.session_id
  }

  pub fn customer(&self) -> Option<&str> {
    self.customer.as_deref()
  }

  pub fn csrf_token(&self) -> &str {
    &self.csrf_token
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_param_returns_first_value() {
    let req = Request::new("s", "t")
      .with_param("f_sort", "name")
      .with_param("f_sort", "price");

    assert_eq!(req.param("f_sort"), Some("name"));
    assert_eq!(req.values("f_sort"), ["name", "price"]);
  }

  #[test]
  fn test_id_list_merges_and_dedupes() {
    let req = Request::new("s", "t")
      .with_param("f_catid", "1,2, 3")
      .with_param("f_catid", "2")
      .with_param("f_catid", "4");

    assert_eq!(req.id_list("f_catid"), vec![1, 2, 3, 4]);
  }

  #[test]
  fn test_id_list_drops_junk() {
    let req = Request::new("s", "t").with_param("wat_id", "7,abc,-3,8");

    assert_eq!(req.id_list("wat_id"), vec![7, 8]);
  }

  #[test]
  fn test_missing_param_is_empty() {
    let req = Request::new("s", "t");

    assert_eq!(req.param("l_page"), None);
    assert!(req.values("l_page").is_empty());
    assert!(req.id_list("l_page").is_empty());
  }
}
