//! Pinned products: a small per-visitor list kept in the session.

use std::sync::Arc;

use crate::config::PinnedConfig;
use crate::html::client::HtmlClient;
use crate::html::view::View;
use crate::html::{escape_html, format_price};
use crate::i18n::Translator;
use crate::request::Request;
use crate::session::SessionStore;
use crate::shop::controller::ProductController;
use crate::shop::error::ShopError;

/// Session key holding the pinned product ids as a JSON array.
const PINNED_KEY: &str = "catalog/session/pinned";

/// Renders the visitor's pinned products and applies `pin_action`
/// add/delete requests.
///
/// The list lives in the session store; concurrent tabs race with
/// last-writer-wins semantics, which is accepted here.
pub struct CatalogSessionClient {
  cfg: PinnedConfig,
  session: Arc<dyn SessionStore>,
  catalog: Arc<dyn ProductController>,
  i18n: Arc<Translator>,
}

impl CatalogSessionClient {
  pub fn new(
    cfg: &PinnedConfig,
    session: Arc<dyn SessionStore>,
    catalog: Arc<dyn ProductController>,
    i18n: Arc<Translator>,
  ) -> Self {
    Self {
      cfg: cfg.clone(),
      session,
      catalog,
      i18n,
    }
  }

  fn pinned(&self, req: &Request) -> Vec<u64> {
    self
      .session
      .get(req.session_id(), PINNED_KEY)
      .and_then(|json| serde_json::from_str(&json).ok())
      .unwrap_or_default()
  }

  fn store_pinned(&self, req: &Request, pinned: &[u64]) -> Result<(), ShopError> {
    let json = serde_json::to_string(pinned).map_err(ShopError::internal)?;
    self.session.set(req.session_id(), PINNED_KEY, json);
    Ok(())
  }
}

impl HtmlClient for CatalogSessionClient {
  fn name(&self) -> &'static str {
    "catalog/session"
  }

  fn init(&self, req: &Request, _view: &mut View) -> Result<(), ShopError> {
    let action = match req.param("pin_action") {
      Some(a) => a,
      None => return Ok(()),
    };

    let ids = req.id_list("pin_id");
    let mut pinned = self.pinned(req);

    match action {
      "add" => {
        let new: Vec<u64> = ids
          .iter()
          .copied()
          .filter(|id| !pinned.contains(id))
          .collect();

        if pinned.len() + new.len() > self.cfg.maxitems as usize {
          let max = self.cfg.maxitems.to_string();
          return Err(ShopError::client(self.i18n.translate_with(
            "Only %1$d products can be pinned",
            &[max.as_str()],
          )));
        }
        pinned.extend(new);
      }
      // Absent ids are silently ignored
      "delete" => pinned.retain(|id| !ids.contains(id)),
      _ => return Ok(()),
    }

    self.store_pinned(req, &pinned)
  }

  fn body(&self, _uid: &str, req: &Request, _view: &mut View) -> Result<String, ShopError> {
    let pinned = self.pinned(req);
    if pinned.is_empty() {
      return Ok("<aside class=\"catalog-session\"></aside>\n".to_string());
    }

    let products = self.catalog.find(&pinned)?;

    let mut html = String::from("<aside class=\"catalog-session\">\n<ul class=\"pinned-items\">\n");
    for product in &products {
      html.push_str(&format!(
        "<li class=\"pinned\" data-id=\"{id}\">{label} <span class=\"price\">{price}</span></li>\n",
        id = product.id,
        label = escape_html(&product.label),
        price = format_price(product.price, &product.currency),
      ));
    }
    html.push_str("</ul>\n</aside>\n");

    Ok(html)
  }
}
