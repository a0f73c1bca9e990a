//! Fragment cache orchestration: key derivation, bypass rule and the
//! post-hit rewrite hook.

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::debug;

use crate::request::Request;
use crate::shop::error::ShopError;

use super::traits::CacheStore;

/// Sits between the HTML clients and the cache store.
///
/// Whether a render may be cached at all depends on the request: a visitor
/// that actively filters or searches produces long-tail parameter
/// combinations, and those renders skip the cache entirely. Store failures
/// are never fatal; they are logged and treated as misses.
#[derive(Clone)]
pub struct FragmentCache {
  store: Arc<dyn CacheStore>,
  enabled: bool,
  /// Listing parameters a cached render may vary by
  allow_params: Vec<String>,
}

impl FragmentCache {
  pub fn new(store: Arc<dyn CacheStore>, enabled: bool, allow_params: Vec<String>) -> Self {
    Self {
      store,
      enabled,
      allow_params,
    }
  }

  pub fn allow_params(&self) -> &[String] {
    &self.allow_params
  }

  /// Whether this request may be served from or written to the cache.
  ///
  /// Any `f_`/`l_` prefixed parameter outside the allow-list disqualifies
  /// the whole render, regardless of cache contents.
  pub fn is_cacheable(&self, req: &Request) -> bool {
    if !self.enabled {
      return false;
    }

    req.param_names().all(|name| {
      !(name.starts_with("f_") || name.starts_with("l_"))
        || self.allow_params.iter().any(|a| a == name)
    })
  }

  /// Derive the cache key for a fragment: a digest of the discriminator,
  /// the values of the relevant parameters present in the request and the
  /// config fingerprint.
  ///
  /// Every component is length-prefixed before hashing, so a value that
  /// happens to contain a delimiter cannot collide with a different
  /// parameter combination.
  pub fn cache_key(
    &self,
    discriminator: &str,
    param_names: &[String],
    req: &Request,
    fingerprint: &str,
  ) -> String {
    // SHA256 for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hash_component(&mut hasher, discriminator);
    for name in param_names {
      let values = req.values(name);
      if values.is_empty() {
        continue;
      }
      hash_component(&mut hasher, name);
      hasher.update((values.len() as u64).to_be_bytes());
      for value in values {
        hash_component(&mut hasher, value);
      }
    }
    hash_component(&mut hasher, fingerprint);

    hex::encode(hasher.finalize())
  }

  /// Look up a fragment; store failures count as a miss.
  pub fn lookup(&self, key: &str) -> Option<String> {
    match self.store.get(key) {
      Ok(hit) => hit,
      Err(e) => {
        debug!(error = %e, "cache lookup failed, rendering");
        None
      }
    }
  }

  /// Store a fragment; failures are logged and swallowed.
  pub fn store_fragment(&self, key: &str, html: &str, tags: &[&str], expire_seconds: Option<i64>) {
    let expires = expire_seconds.map(|s| Utc::now() + Duration::seconds(s));
    if let Err(e) = self.store.set(key, html, tags, expires) {
      debug!(error = %e, "cache store failed");
    }
  }

  /// Drop every fragment tagged with any of the given domains.
  pub fn invalidate(&self, tags: &[&str]) {
    if let Err(e) = self.store.invalidate_tags(tags) {
      debug!(error = %e, "cache invalidation failed");
    }
  }

  /// Serve a fragment from cache or render and store it.
  ///
  /// On a hit the `rewrite` hook runs first so request-bound content (the
  /// CSRF token) can be re-injected into the cached HTML.
  #[allow(clippy::too_many_arguments)]
  pub fn cached<F, G>(
    &self,
    discriminator: &str,
    fingerprint: &str,
    req: &Request,
    tags: &[&str],
    expire_seconds: Option<i64>,
    render: F,
    rewrite: G,
  ) -> Result<String, ShopError>
  where
    F: FnOnce() -> Result<String, ShopError>,
    G: FnOnce(String) -> String,
  {
    if !self.is_cacheable(req) {
      return render();
    }

    let key = self.cache_key(discriminator, &self.allow_params, req, fingerprint);

    if let Some(html) = self.lookup(&key) {
      return Ok(rewrite(html));
    }

    let html = render()?;
    self.store_fragment(&key, &html, tags, expire_seconds);

    Ok(html)
  }
}

fn hash_component(hasher: &mut Sha256, component: &str) {
  hasher.update((component.len() as u64).to_be_bytes());
  hasher.update(component.as_bytes());
}

/// Replace the content between `<!-- region:NAME -->` markers.
///
/// Fragments that embed per-request content mark it with a named region so
/// a cached copy can be patched textually. HTML without the region comes
/// back untouched.
pub fn replace_region(html: &str, name: &str, content: &str) -> String {
  let open = format!("<!-- region:{} -->", name);
  let close = format!("<!-- /region:{} -->", name);

  let start = match html.find(&open) {
    Some(pos) => pos + open.len(),
    None => return html.to_string(),
  };
  let end = match html[start..].find(&close) {
    Some(pos) => start + pos,
    None => return html.to_string(),
  };

  format!("{}{}{}", &html[..start], content, &html[end..])
}
