//! Cache store backends: no-op, in-memory and SQLite.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::Mutex;

use super::traits::CacheStore;

/// Store implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStore;

impl CacheStore for NoopStore {
  fn get(&self, _key: &str) -> Result<Option<String>> {
    Ok(None) // Always miss
  }

  fn set(
    &self,
    _key: &str,
    _html: &str,
    _tags: &[&str],
    _expires: Option<DateTime<Utc>>,
  ) -> Result<()> {
    Ok(()) // Discard
  }

  fn invalidate_tags(&self, _tags: &[&str]) -> Result<()> {
    Ok(())
  }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
  html: String,
  tags: Vec<String>,
  expires: Option<DateTime<Utc>>,
}

/// Process-local store for single-instance deployments and tests.
#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl CacheStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<String>> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let expired = match entries.get(key) {
      Some(entry) => match entry.expires {
        Some(expires) if expires <= Utc::now() => true,
        _ => return Ok(Some(entry.html.clone())),
      },
      None => return Ok(None),
    };

    if expired {
      entries.remove(key);
    }

    Ok(None)
  }

  fn set(
    &self,
    key: &str,
    html: &str,
    tags: &[&str],
    expires: Option<DateTime<Utc>>,
  ) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    entries.insert(
      key.to_string(),
      MemoryEntry {
        html: html.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        expires,
      },
    );

    Ok(())
  }

  fn invalidate_tags(&self, tags: &[&str]) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    entries.retain(|_, entry| !entry.tags.iter().any(|t| tags.contains(&t.as_str())));

    Ok(())
  }
}

/// SQLite-based store shared between renders of one instance.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open the store at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// Open an ephemeral store, mainly for tests.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;

    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;

    Ok(store)
  }

  /// Get the default database path.
  fn default_path() -> Result<std::path::PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("shopfront").join("cache.db"))
  }

  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for fragment tables.
const CACHE_SCHEMA: &str = r#"
-- Rendered HTML fragments
CREATE TABLE IF NOT EXISTS fragment_cache (
    cache_key TEXT PRIMARY KEY,
    html TEXT NOT NULL,
    expires TEXT,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Fragment to invalidation tag mapping
CREATE TABLE IF NOT EXISTS fragment_tags (
    cache_key TEXT NOT NULL,
    tag TEXT NOT NULL,
    PRIMARY KEY (cache_key, tag)
);

CREATE INDEX IF NOT EXISTS idx_fragment_tags_tag ON fragment_tags(tag);
"#;

impl CacheStore for SqliteStore {
  fn get(&self, key: &str) -> Result<Option<String>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(String, Option<String>)> = conn
      .query_row(
        "SELECT html, expires FROM fragment_cache WHERE cache_key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .ok();

    let (html, expires) = match row {
      Some(r) => r,
      None => return Ok(None),
    };

    if let Some(expires_str) = expires {
      let expires = DateTime::parse_from_rfc3339(&expires_str)
        .map_err(|e| eyre!("Failed to parse expiry '{}': {}", expires_str, e))?;
      if expires.with_timezone(&Utc) <= Utc::now() {
        conn
          .execute(
            "DELETE FROM fragment_cache WHERE cache_key = ?",
            params![key],
          )
          .map_err(|e| eyre!("Failed to drop expired fragment: {}", e))?;
        conn
          .execute("DELETE FROM fragment_tags WHERE cache_key = ?", params![key])
          .map_err(|e| eyre!("Failed to drop expired fragment tags: {}", e))?;
        return Ok(None);
      }
    }

    Ok(Some(html))
  }

  fn set(
    &self,
    key: &str,
    html: &str,
    tags: &[&str],
    expires: Option<DateTime<Utc>>,
  ) -> Result<()> {
    let mut conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    // Scoped transaction: an error on any statement rolls back on drop
    // instead of leaving the shared connection mid-transaction
    let tx = conn
      .transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;

    tx
      .execute(
        "INSERT OR REPLACE INTO fragment_cache (cache_key, html, expires, cached_at)
         VALUES (?, ?, ?, datetime('now'))",
        params![key, html, expires.map(|e| e.to_rfc3339())],
      )
      .map_err(|e| eyre!("Failed to store fragment: {}", e))?;

    tx
      .execute("DELETE FROM fragment_tags WHERE cache_key = ?", params![key])
      .map_err(|e| eyre!("Failed to clear old fragment tags: {}", e))?;

    for tag in tags {
      tx
        .execute(
          "INSERT OR REPLACE INTO fragment_tags (cache_key, tag) VALUES (?, ?)",
          params![key, tag],
        )
        .map_err(|e| eyre!("Failed to store fragment tag: {}", e))?;
    }

    tx
      .commit()
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;

    Ok(())
  }

  fn invalidate_tags(&self, tags: &[&str]) -> Result<()> {
    if tags.is_empty() {
      return Ok(());
    }

    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let placeholders = vec!["?"; tags.len()].join(", ");

    conn
      .execute(
        &format!(
          "DELETE FROM fragment_cache WHERE cache_key IN
           (SELECT cache_key FROM fragment_tags WHERE tag IN ({}))",
          placeholders
        ),
        rusqlite::params_from_iter(tags.iter().copied()),
      )
      .map_err(|e| eyre!("Failed to invalidate fragments: {}", e))?;

    conn
      .execute(
        &format!("DELETE FROM fragment_tags WHERE tag IN ({})", placeholders),
        rusqlite::params_from_iter(tags.iter().copied()),
      )
      .map_err(|e| eyre!("Failed to invalidate fragment tags: {}", e))?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  fn stores() -> Vec<Box<dyn CacheStore>> {
    vec![
      Box::new(MemoryStore::default()),
      Box::new(SqliteStore::open_in_memory().unwrap()),
    ]
  }

  #[test]
  fn test_roundtrip_returns_exact_html() {
    for store in stores() {
      store
        .set("k1", "<p>hello</p>", &["product"], None)
        .unwrap();

      assert_eq!(store.get("k1").unwrap().as_deref(), Some("<p>hello</p>"));
      assert_eq!(store.get("other").unwrap(), None);
    }
  }

  #[test]
  fn test_expired_entry_is_a_miss() {
    for store in stores() {
      let past = Utc::now() - Duration::seconds(1);
      store.set("k1", "<p>old</p>", &[], Some(past)).unwrap();

      assert_eq!(store.get("k1").unwrap(), None);
    }
  }

  #[test]
  fn test_future_expiry_still_served() {
    for store in stores() {
      let future = Utc::now() + Duration::hours(1);
      store.set("k1", "<p>fresh</p>", &[], Some(future)).unwrap();

      assert_eq!(store.get("k1").unwrap().as_deref(), Some("<p>fresh</p>"));
    }
  }

  #[test]
  fn test_invalidate_tags_drops_only_tagged_entries() {
    for store in stores() {
      store.set("a", "A", &["product", "catalog"], None).unwrap();
      store.set("b", "B", &["catalog"], None).unwrap();
      store.set("c", "C", &["supplier"], None).unwrap();

      store.invalidate_tags(&["product", "catalog"]).unwrap();

      assert_eq!(store.get("a").unwrap(), None);
      assert_eq!(store.get("b").unwrap(), None);
      assert_eq!(store.get("c").unwrap().as_deref(), Some("C"));
    }
  }

  #[test]
  fn test_failed_set_does_not_wedge_the_connection() {
    let store = SqliteStore::open_in_memory().unwrap();

    // Break the tag table so set() fails mid-transaction
    store
      .conn
      .lock()
      .unwrap()
      .execute("DROP TABLE fragment_tags", [])
      .unwrap();
    assert!(store.set("k", "v", &["product"], None).is_err());

    // After restoring the schema, the next set must succeed; a dangling
    // transaction would fail it
    store.conn.lock().unwrap().execute_batch(CACHE_SCHEMA).unwrap();
    store.set("k", "v", &["product"], None).unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
  }

  #[test]
  fn test_set_overwrites_previous_value() {
    for store in stores() {
      store.set("k", "v1", &["product"], None).unwrap();
      store.set("k", "v2", &["catalog"], None).unwrap();

      assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));

      // Tags were replaced along with the value
      store.invalidate_tags(&["product"]).unwrap();
      assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
    }
  }
}
