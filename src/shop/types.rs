//! Item types exchanged with the domain controllers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog product as the presentation layer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id: u64,
  pub code: String,
  pub label: String,
  /// Unit price in minor units (cents)
  pub price: i64,
  pub currency: String,
  pub in_stock: bool,
}

/// One result page plus the total match count.
///
/// Pagination bounds are always derived from `total`, never stored here.
#[derive(Debug, Clone, Default)]
pub struct ListResult {
  pub items: Vec<Product>,
  pub total: u64,
}

/// Per-association settings stored with a watched product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchSettings {
  /// Notify when the price drops below this threshold (minor units)
  pub price: i64,
  pub currency: String,
  /// Notify when the product comes back in stock
  pub stock: bool,
}

impl Default for WatchSettings {
  fn default() -> Self {
    Self {
      price: 0,
      currency: "EUR".to_string(),
      stock: false,
    }
  }
}

/// A watch list association tied to one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchItem {
  pub product_id: u64,
  pub expires: DateTime<Utc>,
  pub settings: WatchSettings,
}
