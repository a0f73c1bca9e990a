//! Page assembly: builds the client tree once at startup and runs one
//! render pass per request.

use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;

use crate::cache::{CacheStore, FragmentCache};
use crate::config::Config;
use crate::html::client::{record_error, HtmlClient};
use crate::html::clients::{AccountWatchClient, CatalogListClient, CatalogSessionClient};
use crate::html::escape_html;
use crate::html::view::View;
use crate::i18n::Translator;
use crate::request::Request;
use crate::session::SessionStore;
use crate::shop::controller::{ProductController, WatchRepository};

/// Rendered output of one page: a body region and an optional `<head>`
/// region (empty when the page contributes nothing).
#[derive(Debug)]
pub struct PageOutput {
  pub body: String,
  pub header: String,
}

pub struct Storefront {
  i18n: Arc<Translator>,
  cache: FragmentCache,
  catalog_list: CatalogListClient,
  account_watch: AccountWatchClient,
  catalog_session: CatalogSessionClient,
}

impl Storefront {
  pub fn new(
    config: &Config,
    catalog: Arc<dyn ProductController>,
    watch: Arc<dyn WatchRepository>,
    session: Arc<dyn SessionStore>,
    store: Arc<dyn CacheStore>,
  ) -> Result<Self> {
    let i18n = Arc::new(Translator::new(&config.locale).with_messages(&config.messages));
    let cache = FragmentCache::new(store, config.cache.enabled, config.cache.allow_params.clone());

    Ok(Self {
      catalog_list: CatalogListClient::new(
        &config.catalog.lists,
        cache.clone(),
        catalog.clone(),
        i18n.clone(),
      )?,
      account_watch: AccountWatchClient::new(
        &config.account.watch,
        watch,
        catalog.clone(),
        i18n.clone(),
      ),
      catalog_session: CatalogSessionClient::new(
        &config.catalog.session.pinned,
        session,
        catalog,
        i18n.clone(),
      ),
      i18n,
      cache,
    })
  }

  /// Render one page: init (POST-style actions), then the head and body
  /// regions, strictly sequential.
  ///
  /// Errors never abort the pass; they surface as translated lines in an
  /// error block above the degraded body.
  pub fn render_page(&self, name: &str, uid: &str, req: &Request) -> Result<PageOutput> {
    let client: &dyn HtmlClient = match name {
      "catalog/lists" => &self.catalog_list,
      "account/watch" => &self.account_watch,
      "catalog/session" => &self.catalog_session,
      other => return Err(eyre!("Unknown page: {}", other)),
    };

    let mut view = View::new();

    if let Err(e) = client.init(req, &mut view) {
      record_error(e, client.name(), &self.i18n, &mut view);
    }

    let header = match client.header(uid, req, &mut view) {
      Ok(part) => part.unwrap_or_default(),
      Err(e) => {
        record_error(e, client.name(), &self.i18n, &mut view);
        String::new()
      }
    };

    let body = match client.body(uid, req, &mut view) {
      Ok(part) => part,
      Err(e) => {
        record_error(e, client.name(), &self.i18n, &mut view);
        String::new()
      }
    };

    Ok(PageOutput {
      body: wrap_errors(&body, view.errors()),
      header,
    })
  }

  /// Drop cached fragments for the given domains, e.g. after a product
  /// import changed catalog entities.
  pub fn invalidate_cache(&self, tags: &[&str]) {
    self.cache.invalidate(tags);
  }
}

fn wrap_errors(body: &str, errors: &[String]) -> String {
  if errors.is_empty() {
    return body.to_string();
  }

  let mut html = String::from("<ul class=\"error-list\">\n");
  for message in errors {
    html.push_str(&format!(
      "<li class=\"error-item\">{}</li>\n",
      escape_html(message)
    ));
  }
  html.push_str("</ul>\n");
  html.push_str(body);
  html
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::MemoryStore;
  use crate::params::ListQuery;
  use crate::session::MemorySession;
  use crate::shop::controller::{InMemoryCatalog, InMemoryWatch};
  use crate::shop::error::ShopError;
  use crate::shop::types::{ListResult, Product};

  struct FailingCatalog;

  impl ProductController for FailingCatalog {
    fn list(&self, _query: &ListQuery) -> Result<ListResult, ShopError> {
      Err(ShopError::frontend("Product search is unavailable"))
    }

    fn find(&self, _ids: &[u64]) -> Result<Vec<Product>, ShopError> {
      Ok(Vec::new())
    }
  }

  fn storefront(catalog: Arc<dyn ProductController>) -> Storefront {
    Storefront::new(
      &Config::default(),
      catalog,
      Arc::new(InMemoryWatch::default()),
      Arc::new(MemorySession::default()),
      Arc::new(MemoryStore::default()),
    )
    .unwrap()
  }

  #[test]
  fn test_render_catalog_lists_page() {
    let shop = storefront(Arc::new(InMemoryCatalog::with_demo_data()));
    let req = Request::new("visitor", "tok");

    let page = shop.render_page("catalog/lists", "1", &req).unwrap();

    assert!(page.header.contains("<title>"));
    assert!(page.body.contains("catalog-list"));
    assert!(page.body.contains("Basic T-Shirt"));
    assert!(!page.body.contains("error-list"));
  }

  #[test]
  fn test_controller_failure_degrades_gracefully() {
    let shop = storefront(Arc::new(FailingCatalog));
    let req = Request::new("visitor", "tok");

    let page = shop.render_page("catalog/lists", "1", &req).unwrap();

    // The page shell still answers; the region is replaced by an error line
    assert!(page.body.contains("error-list"));
    assert!(page.body.contains("Product search is unavailable"));
  }

  #[test]
  fn test_watch_error_is_shown_not_fatal() {
    let shop = storefront(Arc::new(InMemoryCatalog::with_demo_data()));
    // Anonymous visitor posting a watch action
    let req = Request::new("visitor", "tok")
      .with_param("wat_action", "add")
      .with_param("wat_id", "1");

    let page = shop.render_page("account/watch", "1", &req).unwrap();

    assert!(page.body.contains("log in"));
    assert!(page.body.contains("error-list"));
  }

  #[test]
  fn test_unknown_page_is_an_error() {
    let shop = storefront(Arc::new(InMemoryCatalog::with_demo_data()));
    let result = shop.render_page("basket/full", "1", &Request::default());

    assert!(result.is_err());
  }

  #[test]
  fn test_invalidate_cache_forces_rerender() {
    let shop = storefront(Arc::new(InMemoryCatalog::with_demo_data()));
    let req = Request::new("visitor", "tok-a");

    let first = shop.render_page("catalog/lists", "1", &req).unwrap();

    // Cached render, fresh token patched in
    let req = Request::new("visitor", "tok-b");
    let second = shop.render_page("catalog/lists", "1", &req).unwrap();
    assert!(second.body.contains("tok-b"));
    assert_eq!(
      first.body.replace("tok-a", ""),
      second.body.replace("tok-b", "")
    );

    // After invalidation the page renders from scratch without error
    shop.invalidate_cache(&["product"]);
    let req = Request::new("visitor", "tok-c");
    let third = shop.render_page("catalog/lists", "1", &req).unwrap();
    assert!(third.body.contains("Basic T-Shirt"));
  }
}
