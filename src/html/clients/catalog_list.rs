//! Catalog list page: paged product listing with fragment caching.

use std::sync::Arc;

use crate::cache::{replace_region, FragmentCache};
use crate::config::{fingerprint, CatalogListsConfig};
use crate::html::client::{compose_body, compose_header, HtmlClient};
use crate::html::pagination::Pagination;
use crate::html::view::View;
use crate::html::{csrf_input, escape_attr, escape_html, format_price};
use crate::i18n::Translator;
use crate::params::ListQuery;
use crate::request::Request;
use crate::shop::controller::ProductController;
use crate::shop::error::ShopError;
use crate::shop::types::Product;

/// View slots shared between the list parent and its subparts.
pub(crate) const ITEMS_KEY: &str = "catalog.list.items";
pub(crate) const PAGINATION_KEY: &str = "catalog.list.pagination";

/// Parent client for the catalog listing.
///
/// Resolves the listing query, fetches one result page from the catalog
/// controller, stashes items and pagination bounds on the view and renders
/// its subparts inside the list shell. Body and header fragments go
/// through the fragment cache, tagged with the configured domains.
pub struct CatalogListClient {
  cfg: CatalogListsConfig,
  /// Digest of `cfg`, part of every cache key
  fingerprint: String,
  cache: FragmentCache,
  catalog: Arc<dyn ProductController>,
  i18n: Arc<Translator>,
  children: Vec<Box<dyn HtmlClient>>,
}

impl CatalogListClient {
  pub fn new(
    cfg: &CatalogListsConfig,
    cache: FragmentCache,
    catalog: Arc<dyn ProductController>,
    i18n: Arc<Translator>,
  ) -> Result<Self, ShopError> {
    Ok(Self {
      cfg: cfg.clone(),
      fingerprint: fingerprint(cfg),
      cache,
      catalog,
      i18n,
      children: subparts(&cfg.subparts)?,
    })
  }

  /// Fetch the result page once per request; header and body share it
  /// through the view.
  fn ensure_data(&self, req: &Request, view: &mut View) -> Result<(), ShopError> {
    if view.get(ITEMS_KEY).is_some() {
      return Ok(());
    }

    let query = ListQuery::from_request(req, &self.cfg);
    let result = self.catalog.list(&query)?;
    let pagination = Pagination::new(result.total, query.size, query.page);

    view.set(
      ITEMS_KEY,
      serde_json::to_value(&result.items).map_err(ShopError::internal)?,
    );
    view.set(
      PAGINATION_KEY,
      serde_json::to_value(pagination).map_err(ShopError::internal)?,
    );

    Ok(())
  }

  fn pagination(&self, view: &View) -> Result<Pagination, ShopError> {
    let value = view
      .get(PAGINATION_KEY)
      .cloned()
      .ok_or_else(|| ShopError::client("Catalog list data missing from view"))?;

    serde_json::from_value(value).map_err(ShopError::internal)
  }

  fn wrap_body(&self, inner: &str, req: &Request, view: &View) -> Result<String, ShopError> {
    let pagination = self.pagination(view)?;

    Ok(format!(
      "<section class=\"catalog-list\">\n\
       <form method=\"POST\" action=\"\">\n\
       <!-- region:csrf -->{csrf}<!-- /region:csrf -->\n\
       {nav}{inner}</form>\n\
       </section>\n",
      csrf = csrf_input(req.csrf_token()),
      nav = render_pagination(&pagination),
      inner = inner,
    ))
  }
}

impl HtmlClient for CatalogListClient {
  fn name(&self) -> &'static str {
    "catalog/lists"
  }

  fn body(&self, uid: &str, req: &Request, view: &mut View) -> Result<String, ShopError> {
    let discriminator = format!("catalog/lists/body/{}", uid);
    let tags: Vec<&str> = self.cfg.domains.iter().map(String::as_str).collect();

    self.cache.cached(
      &discriminator,
      &self.fingerprint,
      req,
      &tags,
      self.cfg.cache_seconds,
      || {
        self.ensure_data(req, view)?;
        let inner = compose_body(&self.children, uid, req, view, &self.i18n);
        self.wrap_body(&inner, req, view)
      },
      |html| self.modify_body(html, req),
    )
  }

  fn header(
    &self,
    uid: &str,
    req: &Request,
    view: &mut View,
  ) -> Result<Option<String>, ShopError> {
    let discriminator = format!("catalog/lists/header/{}", uid);
    let tags: Vec<&str> = self.cfg.domains.iter().map(String::as_str).collect();

    let html = self.cache.cached(
      &discriminator,
      &self.fingerprint,
      req,
      &tags,
      self.cfg.cache_seconds,
      || {
        self.ensure_data(req, view)?;
        let mut html = render_header(&self.pagination(view)?);
        html.push_str(&compose_header(&self.children, uid, req, view, &self.i18n));
        Ok(html)
      },
      |html| html,
    )?;

    Ok(Some(html))
  }

  fn modify_body(&self, html: String, req: &Request) -> String {
    replace_region(&html, "csrf", &csrf_input(req.csrf_token()))
  }
}

/// Resolve the configured subpart names once at startup; unknown names
/// fail fast instead of being looked up per request.
fn subparts(names: &[String]) -> Result<Vec<Box<dyn HtmlClient>>, ShopError> {
  let mut children: Vec<Box<dyn HtmlClient>> = Vec::new();
  for name in names {
    match name.as_str() {
      "promo" => children.push(Box::new(CatalogListPromoClient)),
      "items" => children.push(Box::new(CatalogListItemsClient)),
      other => {
        return Err(ShopError::client(format!(
          "Unknown catalog list subpart: {}",
          other
        )))
      }
    }
  }
  Ok(children)
}

fn render_pagination(p: &Pagination) -> String {
  format!(
    "<nav class=\"pagination\">\
     <a class=\"first\" href=\"?l_page={first}\">|&lt;</a> \
     <a class=\"prev\" href=\"?l_page={prev}\">&lt;</a> \
     <span class=\"current\">{current} / {last}</span> \
     <a class=\"next\" href=\"?l_page={next}\">&gt;</a> \
     <a class=\"last\" href=\"?l_page={last}\">&gt;|</a>\
     </nav>\n",
    first = p.first,
    prev = p.prev,
    current = p.current,
    next = p.next,
    last = p.last,
  )
}

fn render_header(p: &Pagination) -> String {
  let mut html = format!("<title>Products, page {} of {}</title>\n", p.current, p.last);
  if p.current > p.first {
    html.push_str(&format!("<link rel=\"prev\" href=\"?l_page={}\">\n", p.prev));
  }
  if p.current < p.last {
    html.push_str(&format!("<link rel=\"next\" href=\"?l_page={}\">\n", p.next));
  }
  html
}

fn list_items(view: &View) -> Result<Vec<Product>, ShopError> {
  let value = view
    .get(ITEMS_KEY)
    .cloned()
    .ok_or_else(|| ShopError::client("Catalog list data missing from view"))?;

  serde_json::from_value(value).map_err(ShopError::internal)
}

fn render_product(product: &Product) -> String {
  let stock = if product.in_stock {
    "in-stock"
  } else {
    "out-of-stock"
  };

  format!(
    "<li class=\"product {stock}\" data-id=\"{id}\">\
     <h3>{label}</h3>\
     <code>{code}</code>\
     <span class=\"price\">{price}</span>\
     </li>\n",
    stock = stock,
    id = product.id,
    label = escape_html(&product.label),
    code = escape_html(&product.code),
    price = escape_attr(&format_price(product.price, &product.currency)),
  )
}

/// Subpart rendering the product rows stashed on the view by the parent.
struct CatalogListItemsClient;

impl HtmlClient for CatalogListItemsClient {
  fn name(&self) -> &'static str {
    "items"
  }

  fn body(&self, _uid: &str, _req: &Request, view: &mut View) -> Result<String, ShopError> {
    let items = list_items(view)?;
    if items.is_empty() {
      return Ok("<p class=\"list-empty\">No products found</p>\n".to_string());
    }

    let mut html = String::from("<ul class=\"list-items\">\n");
    for product in &items {
      html.push_str(&render_product(product));
    }
    html.push_str("</ul>\n");

    Ok(html)
  }
}

/// How many products the promo strip shows at most.
const PROMO_SIZE: usize = 4;

/// Optional subpart highlighting the first products above the grid.
struct CatalogListPromoClient;

impl HtmlClient for CatalogListPromoClient {
  fn name(&self) -> &'static str {
    "promo"
  }

  fn body(&self, _uid: &str, _req: &Request, view: &mut View) -> Result<String, ShopError> {
    let items = list_items(view)?;
    if items.is_empty() {
      return Ok(String::new());
    }

    let mut html = String::from("<div class=\"list-promo\">\n");
    for product in items.iter().take(PROMO_SIZE) {
      html.push_str(&render_product(product));
    }
    html.push_str("</div>\n");

    Ok(html)
  }
}
