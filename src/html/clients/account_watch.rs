//! Account watch list: renders the customer's watched products and applies
//! the add/edit/delete actions posted via `wat_*` parameters.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::config::AccountWatchConfig;
use crate::html::client::HtmlClient;
use crate::html::view::View;
use crate::html::{csrf_input, escape_html, format_price};
use crate::i18n::Translator;
use crate::request::Request;
use crate::shop::controller::{ProductController, WatchRepository};
use crate::shop::error::ShopError;
use crate::shop::types::{WatchItem, WatchSettings};

/// Expiry for a watched product: now plus `timeframe + 1` days, truncated
/// to the day boundary so notifications line up with the daily job.
pub(crate) fn watch_expiry(now: DateTime<Utc>, timeframe_days: i64) -> DateTime<Utc> {
  let expires = now + Duration::seconds((timeframe_days + 1) * 86_400);
  expires.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Watch list client tied to the authenticated customer.
///
/// Account pages are never fragment-cached: their content is
/// per-customer by definition.
pub struct AccountWatchClient {
  cfg: AccountWatchConfig,
  watch: Arc<dyn WatchRepository>,
  catalog: Arc<dyn ProductController>,
  i18n: Arc<Translator>,
}

impl AccountWatchClient {
  pub fn new(
    cfg: &AccountWatchConfig,
    watch: Arc<dyn WatchRepository>,
    catalog: Arc<dyn ProductController>,
    i18n: Arc<Translator>,
  ) -> Self {
    Self {
      cfg: cfg.clone(),
      watch,
      catalog,
      i18n,
    }
  }

  fn add(&self, items: &mut Vec<WatchItem>, ids: &[u64], req: &Request) -> Result<(), ShopError> {
    let new: Vec<u64> = ids
      .iter()
      .copied()
      .filter(|id| !items.iter().any(|it| it.product_id == *id))
      .collect();

    if items.len() + new.len() > self.cfg.maxitems as usize {
      let max = self.cfg.maxitems.to_string();
      return Err(ShopError::client(self.i18n.translate_with(
        "You can only watch up to %1$d products",
        &[max.as_str()],
      )));
    }

    let timeframe = self.timeframe(req);
    for product_id in new {
      items.push(WatchItem {
        product_id,
        expires: watch_expiry(Utc::now(), timeframe),
        settings: WatchSettings::default(),
      });
    }

    Ok(())
  }

  fn edit(&self, items: &mut [WatchItem], ids: &[u64], req: &Request) {
    let timeframe = self.timeframe(req);
    let settings = WatchSettings {
      price: req
        .param("wat_price")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0),
      currency: req
        .param("wat_currency")
        .unwrap_or("EUR")
        .to_string(),
      stock: matches!(req.param("wat_stock"), Some("1") | Some("true")),
    };

    for item in items.iter_mut().filter(|it| ids.contains(&it.product_id)) {
      item.expires = watch_expiry(Utc::now(), timeframe);
      item.settings = settings.clone();
    }
  }

  /// A requested timeframe within ten years wins, anything else falls
  /// back to the configured default so the expiry arithmetic stays sound.
  fn timeframe(&self, req: &Request) -> i64 {
    match req.param("wat_timeframe").and_then(|v| v.trim().parse::<i64>().ok()) {
      Some(days) if (0..=3650).contains(&days) => days,
      _ => self.cfg.timeframe,
    }
  }

  fn customer<'a>(&self, req: &'a Request) -> Result<&'a str, ShopError> {
    req
      .customer()
      .ok_or_else(|| ShopError::client(self.i18n.translate("Please log in to manage your watch list")))
  }
}

impl HtmlClient for AccountWatchClient {
  fn name(&self) -> &'static str {
    "account/watch"
  }

  /// Apply the posted watch action, one batch store at the end. An error
  /// before the store leaves the list untouched.
  fn init(&self, req: &Request, _view: &mut View) -> Result<(), ShopError> {
    let action = match req.param("wat_action") {
      Some(a) => a,
      None => return Ok(()),
    };

    let customer = self.customer(req)?;
    let ids = req.id_list("wat_id");
    let mut items = self.watch.fetch(customer)?;

    match action {
      "add" => self.add(&mut items, &ids, req)?,
      "edit" => self.edit(&mut items, &ids, req),
      // Absent ids are silently ignored
      "delete" => items.retain(|it| !ids.contains(&it.product_id)),
      _ => return Ok(()),
    }

    self.watch.store(customer, items)
  }

  fn body(&self, _uid: &str, req: &Request, _view: &mut View) -> Result<String, ShopError> {
    let customer = match req.customer() {
      Some(c) => c,
      None => {
        return Ok(format!(
          "<section class=\"account-watch\"><p class=\"login-required\">{}</p></section>\n",
          escape_html(&self.i18n.translate("Please log in to manage your watch list")),
        ))
      }
    };

    let items = self.watch.fetch(customer)?;
    let ids: Vec<u64> = items.iter().map(|it| it.product_id).collect();
    let products = self.catalog.find(&ids)?;

    let mut html = String::from("<section class=\"account-watch\">\n<form method=\"POST\" action=\"\">\n");
    html.push_str(&csrf_input(req.csrf_token()));
    html.push('\n');

    if items.is_empty() {
      html.push_str("<p class=\"watch-empty\">No watched products</p>\n");
    } else {
      html.push_str("<ul class=\"watch-items\">\n");
      for item in &items {
        let label = products
          .iter()
          .find(|p| p.id == item.product_id)
          .map(|p| p.label.as_str())
          .unwrap_or("(unavailable)");

        html.push_str(&format!(
          "<li class=\"watch-item\" data-id=\"{id}\">\
           <h3>{label}</h3>\
           <span class=\"expires\">{expires}</span>\
           <span class=\"threshold\">{threshold}</span>\
           </li>\n",
          id = item.product_id,
          label = escape_html(label),
          expires = item.expires.format("%Y-%m-%d"),
          threshold = format_price(item.settings.price, &item.settings.currency),
        ));
      }
      html.push_str("</ul>\n");
    }

    html.push_str("</form>\n</section>\n");
    Ok(html)
  }
}
