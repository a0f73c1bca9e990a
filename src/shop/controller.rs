//! Domain controller contracts and in-memory implementations.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::CatalogLevels;
use crate::params::ListQuery;

use super::error::ShopError;
use super::types::{ListResult, Product, WatchItem};

/// Filter/sort/slice contract of the catalog frontend controller.
///
/// Implementations receive the fully resolved query and return one ordered
/// result page plus the total match count. Failures surface as one of the
/// recognized [`ShopError`] tiers.
pub trait ProductController: Send + Sync {
  fn list(&self, query: &ListQuery) -> Result<ListResult, ShopError>;

  /// Look up products by id, preserving the given order. Unknown ids are
  /// skipped without error.
  fn find(&self, ids: &[u64]) -> Result<Vec<Product>, ShopError>;
}

/// Persistence contract for per-customer watch lists.
pub trait WatchRepository: Send + Sync {
  fn fetch(&self, customer: &str) -> Result<Vec<WatchItem>, ShopError>;

  /// Replace the customer's list in one batch; atomicity is the underlying
  /// store's concern.
  fn store(&self, customer: &str, items: Vec<WatchItem>) -> Result<(), ShopError>;
}

/// A product plus the category/supplier/attribute associations the catalog
/// controller filters on.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
  pub product: Product,
  pub category_ids: Vec<u64>,
  pub supplier_ids: Vec<u64>,
  pub attribute_ids: Vec<u64>,
}

/// In-memory catalog used by the preview CLI and the tests.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
  entries: Vec<CatalogEntry>,
  /// category id -> direct child category ids
  children: HashMap<u64, Vec<u64>>,
}

impl InMemoryCatalog {
  pub fn new(entries: Vec<CatalogEntry>) -> Self {
    Self {
      entries,
      children: HashMap::new(),
    }
  }

  pub fn with_category_children(mut self, parent: u64, children: Vec<u64>) -> Self {
    self.children.insert(parent, children);
    self
  }

  /// A small demo catalog: two top-level categories, one with a child.
  pub fn with_demo_data() -> Self {
    let entries = vec![
      demo_entry(1, "tshirt-basic", "Basic T-Shirt", 1995, true, &[10], &[100], &[1]),
      demo_entry(2, "tshirt-print", "Printed T-Shirt", 2495, true, &[11], &[100], &[1, 2]),
      demo_entry(3, "hoodie-zip", "Zip Hoodie", 5990, false, &[11], &[101], &[2]),
      demo_entry(4, "cap-canvas", "Canvas Cap", 1490, true, &[20], &[101], &[3]),
      demo_entry(5, "scarf-wool", "Wool Scarf", 3450, true, &[20], &[100], &[3]),
    ];

    Self::new(entries).with_category_children(10, vec![11])
  }

  /// Expand the requested category ids according to the configured tree
  /// depth.
  fn expand_categories(&self, ids: &[u64], levels: CatalogLevels) -> Vec<u64> {
    let mut out = ids.to_vec();

    match levels {
      CatalogLevels::SelfOnly => {}
      CatalogLevels::Children => {
        for id in ids {
          if let Some(children) = self.children.get(id) {
            for &child in children {
              if !out.contains(&child) {
                out.push(child);
              }
            }
          }
        }
      }
      CatalogLevels::Subtree => {
        let mut stack = ids.to_vec();
        while let Some(id) = stack.pop() {
          if let Some(children) = self.children.get(&id) {
            for &child in children {
              if !out.contains(&child) {
                out.push(child);
                stack.push(child);
              }
            }
          }
        }
      }
    }

    out
  }
}

fn demo_entry(
  id: u64,
  code: &str,
  label: &str,
  price: i64,
  in_stock: bool,
  categories: &[u64],
  suppliers: &[u64],
  attributes: &[u64],
) -> CatalogEntry {
  CatalogEntry {
    product: Product {
      id,
      code: code.to_string(),
      label: label.to_string(),
      price,
      currency: "EUR".to_string(),
      in_stock,
    },
    category_ids: categories.to_vec(),
    supplier_ids: suppliers.to_vec(),
    attribute_ids: attributes.to_vec(),
  }
}

impl ProductController for InMemoryCatalog {
  fn list(&self, query: &ListQuery) -> Result<ListResult, ShopError> {
    let categories = self.expand_categories(&query.category_ids, query.levels);

    let mut matches: Vec<&CatalogEntry> = self
      .entries
      .iter()
      .filter(|e| {
        (categories.is_empty() || e.category_ids.iter().any(|c| categories.contains(c)))
          && (query.supplier_ids.is_empty()
            || e.supplier_ids.iter().any(|s| query.supplier_ids.contains(s)))
          && query.attr_all.iter().all(|a| e.attribute_ids.contains(a))
          && (query.attr_any.is_empty()
            || query.attr_any.iter().any(|a| e.attribute_ids.contains(a)))
          && (query.attr_one.is_empty()
            || query.attr_one.iter().any(|a| e.attribute_ids.contains(a)))
          && query.text.as_deref().map_or(true, |t| {
            let needle = t.to_lowercase();
            e.product.label.to_lowercase().contains(&needle)
              || e.product.code.to_lowercase().contains(&needle)
          })
          && query.max_price.map_or(true, |p| e.product.price <= p)
          && (!query.stock_only || e.product.in_stock)
      })
      .collect();

    match query.sort.as_deref() {
      Some("name") => matches.sort_by(|a, b| a.product.label.cmp(&b.product.label)),
      Some("-name") => matches.sort_by(|a, b| b.product.label.cmp(&a.product.label)),
      Some("price") => matches.sort_by(|a, b| a.product.price.cmp(&b.product.price)),
      Some("-price") => matches.sort_by(|a, b| b.product.price.cmp(&a.product.price)),
      Some("code") => matches.sort_by(|a, b| a.product.code.cmp(&b.product.code)),
      _ => {} // relevance = insertion order
    }

    let total = matches.len() as u64;
    let offset = (query.page as usize - 1).saturating_mul(query.size as usize);
    let items = matches
      .into_iter()
      .skip(offset)
      .take(query.size as usize)
      .map(|e| e.product.clone())
      .collect();

    Ok(ListResult { items, total })
  }

  fn find(&self, ids: &[u64]) -> Result<Vec<Product>, ShopError> {
    Ok(
      ids
        .iter()
        .filter_map(|id| {
          self
            .entries
            .iter()
            .find(|e| e.product.id == *id)
            .map(|e| e.product.clone())
        })
        .collect(),
    )
  }
}

/// In-memory watch list store keyed by customer id.
#[derive(Debug, Default)]
pub struct InMemoryWatch {
  lists: Mutex<HashMap<String, Vec<WatchItem>>>,
}

impl WatchRepository for InMemoryWatch {
  fn fetch(&self, customer: &str) -> Result<Vec<WatchItem>, ShopError> {
    let lists = self
      .lists
      .lock()
      .map_err(|e| ShopError::store(format!("Watch list lock poisoned: {}", e)))?;

    Ok(lists.get(customer).cloned().unwrap_or_default())
  }

  fn store(&self, customer: &str, items: Vec<WatchItem>) -> Result<(), ShopError> {
    let mut lists = self
      .lists
      .lock()
      .map_err(|e| ShopError::store(format!("Watch list lock poisoned: {}", e)))?;

    lists.insert(customer.to_string(), items);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn query() -> ListQuery {
    ListQuery {
      page: 1,
      size: 48,
      ..ListQuery::default()
    }
  }

  #[test]
  fn test_list_unfiltered_returns_all() {
    let catalog = InMemoryCatalog::with_demo_data();
    let result = catalog.list(&query()).unwrap();

    assert_eq!(result.total, 5);
    assert_eq!(result.items.len(), 5);
  }

  #[test]
  fn test_list_category_subtree_includes_children() {
    let catalog = InMemoryCatalog::with_demo_data();
    let q = ListQuery {
      category_ids: vec![10],
      levels: CatalogLevels::Subtree,
      ..query()
    };

    // Category 10 plus its child 11
    let result = catalog.list(&q).unwrap();
    assert_eq!(result.total, 3);
  }

  #[test]
  fn test_list_category_self_only() {
    let catalog = InMemoryCatalog::with_demo_data();
    let q = ListQuery {
      category_ids: vec![10],
      levels: CatalogLevels::SelfOnly,
      ..query()
    };

    let result = catalog.list(&q).unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].code, "tshirt-basic");
  }

  #[test]
  fn test_list_text_search_matches_label_and_code() {
    let catalog = InMemoryCatalog::with_demo_data();
    let q = ListQuery {
      text: Some("shirt".to_string()),
      ..query()
    };

    let result = catalog.list(&q).unwrap();
    assert_eq!(result.total, 2);
  }

  #[test]
  fn test_list_price_and_stock_filters() {
    let catalog = InMemoryCatalog::with_demo_data();
    let q = ListQuery {
      max_price: Some(2000),
      stock_only: true,
      ..query()
    };

    let result = catalog.list(&q).unwrap();
    let codes: Vec<&str> = result.items.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, vec!["tshirt-basic", "cap-canvas"]);
  }

  #[test]
  fn test_list_sort_price_descending() {
    let catalog = InMemoryCatalog::with_demo_data();
    let q = ListQuery {
      sort: Some("-price".to_string()),
      ..query()
    };

    let result = catalog.list(&q).unwrap();
    let prices: Vec<i64> = result.items.iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![5990, 3450, 2495, 1995, 1490]);
  }

  #[test]
  fn test_list_paging_slices_but_keeps_total() {
    let catalog = InMemoryCatalog::with_demo_data();
    let q = ListQuery {
      page: 2,
      size: 2,
      ..query()
    };

    let result = catalog.list(&q).unwrap();
    assert_eq!(result.total, 5);
    assert_eq!(result.items.len(), 2);
    assert_eq!(result.items[0].id, 3);
  }

  #[test]
  fn test_find_preserves_order_and_skips_unknown() {
    let catalog = InMemoryCatalog::with_demo_data();
    let products = catalog.find(&[4, 99, 1]).unwrap();

    let ids: Vec<u64> = products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![4, 1]);
  }

  #[test]
  fn test_watch_roundtrip() {
    let watch = InMemoryWatch::default();
    assert!(watch.fetch("alice").unwrap().is_empty());

    let item = WatchItem {
      product_id: 1,
      expires: chrono::Utc::now(),
      settings: Default::default(),
    };
    watch.store("alice", vec![item.clone()]).unwrap();

    assert_eq!(watch.fetch("alice").unwrap(), vec![item]);
    assert!(watch.fetch("bob").unwrap().is_empty());
  }
}
