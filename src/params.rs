//! Listing parameter resolution.
//!
//! Turns the raw `f_*`/`l_*` request parameters into a [`ListQuery`] with
//! the clamp invariants applied: the page number always lands in
//! `[1, pages]` and the page size in `[1,100]`. Malformed input falls back
//! to the configured defaults instead of erroring.

use crate::config::{CatalogLevels, CatalogListsConfig};
use crate::request::Request;

/// Fully resolved listing query handed to the catalog controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
  pub category_ids: Vec<u64>,
  pub supplier_ids: Vec<u64>,
  /// Products must carry every one of these attributes
  pub attr_all: Vec<u64>,
  /// Products must carry at least one of these attributes
  pub attr_any: Vec<u64>,
  /// Single-select attribute options, one match suffices
  pub attr_one: Vec<u64>,
  pub text: Option<String>,
  /// Upper price bound in minor units
  pub max_price: Option<i64>,
  /// Sort code, leading `-` for descending (e.g. "-price")
  pub sort: Option<String>,
  /// Layout variant requested via `l_type` (e.g. "grid")
  pub list_type: Option<String>,
  pub page: u32,
  pub size: u32,
  pub stock_only: bool,
  pub levels: CatalogLevels,
}

impl ListQuery {
  pub fn from_request(req: &Request, cfg: &CatalogListsConfig) -> Self {
    Self {
      category_ids: req.id_list("f_catid"),
      supplier_ids: req.id_list("f_supid"),
      attr_all: req.id_list("f_attrid"),
      attr_any: req.id_list("f_optid"),
      attr_one: req.id_list("f_oneid"),
      text: req
        .param("f_search")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from),
      max_price: req.param("f_price").and_then(|v| v.trim().parse().ok()),
      sort: req.param("f_sort").map(String::from),
      list_type: req.param("l_type").map(String::from),
      page: clamp_page(req.param("l_page"), cfg.pages),
      size: clamp_size(req.param("l_size"), cfg.size),
      stock_only: matches!(req.param("f_stock"), Some("1") | Some("true")),
      levels: cfg.levels,
    }
  }
}

/// Clamp a raw page parameter into `[1, max_pages]`.
pub fn clamp_page(raw: Option<&str>, max_pages: u32) -> u32 {
  let page = raw.and_then(|v| v.trim().parse::<i64>().ok()).unwrap_or(1);
  page.clamp(1, i64::from(max_pages.max(1))) as u32
}

/// A raw size parameter within `[1,100]` wins, anything else falls back to
/// the configured default (itself kept within `[1,100]`).
pub fn clamp_size(raw: Option<&str>, default_size: u32) -> u32 {
  match raw.and_then(|v| v.trim().parse::<i64>().ok()) {
    Some(v) if (1..=100).contains(&v) => v as u32,
    _ => default_size.clamp(1, 100),
  }
}
