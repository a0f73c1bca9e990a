//! Store contract for rendered HTML fragments.

use chrono::{DateTime, Utc};
use color_eyre::Result;

/// Key/value backend holding rendered fragments.
///
/// Entries are written once and never mutated in place; they disappear
/// through expiry or tag invalidation. Implementations must tolerate
/// concurrent access, last writer wins.
pub trait CacheStore: Send + Sync {
  /// Fetch a cached fragment. Expired entries count as a miss.
  fn get(&self, key: &str) -> Result<Option<String>>;

  /// Store a fragment with its invalidation tags and optional expiry.
  fn set(
    &self,
    key: &str,
    html: &str,
    tags: &[&str],
    expires: Option<DateTime<Utc>>,
  ) -> Result<()>;

  /// Drop every entry associated with any of the given tags.
  fn invalidate_tags(&self, tags: &[&str]) -> Result<()>;
}
