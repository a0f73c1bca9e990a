//! The `HtmlClient` capability and the composition helpers shared by every
//! page region.

use tracing::error;

use crate::i18n::Translator;
use crate::request::Request;
use crate::shop::error::ShopError;

use super::view::View;

/// A renderable unit responsible for one portion of a composed page.
///
/// Clients form a tree: each parent renders its configured children in
/// order and concatenates their output into its own. `uid` distinguishes
/// multiple instances of the same client on one page and flows unchanged
/// through the tree.
pub trait HtmlClient: Send + Sync {
  /// Stable name, as used in `subparts` configuration lists.
  fn name(&self) -> &'static str;

  /// Apply request mutations (POST-style actions) before anything renders.
  fn init(&self, _req: &Request, _view: &mut View) -> Result<(), ShopError> {
    Ok(())
  }

  /// Render the body region.
  fn body(&self, uid: &str, req: &Request, view: &mut View) -> Result<String, ShopError>;

  /// Render the `<head>` contribution, if any.
  fn header(
    &self,
    _uid: &str,
    _req: &Request,
    _view: &mut View,
  ) -> Result<Option<String>, ShopError> {
    Ok(None)
  }

  /// Re-inject request-bound content into cached body HTML.
  fn modify_body(&self, html: String, _req: &Request) -> String {
    html
  }
}

/// Translate an error and append it to the view.
///
/// Client, frontend and store errors surface their own message; anything
/// unclassified shows the generic line and is logged for the operator.
pub fn record_error(err: ShopError, client: &str, i18n: &Translator, view: &mut View) {
  match err {
    ShopError::Client(msg) | ShopError::Frontend(msg) | ShopError::Store(msg) => {
      view.add_error(i18n.translate(&msg));
    }
    ShopError::Internal(msg) => {
      error!(client, error = %msg, "unclassified error during render");
      view.add_error(i18n.translate("A non-recoverable error occurred"));
    }
  }
}

/// Render every child in configured order and concatenate the results.
///
/// A failing child contributes an error line instead of its region; its
/// siblings and the enclosing page still render.
pub fn compose_body(
  children: &[Box<dyn HtmlClient>],
  uid: &str,
  req: &Request,
  view: &mut View,
  i18n: &Translator,
) -> String {
  let mut html = String::new();
  for child in children {
    match child.body(uid, req, view) {
      Ok(part) => html.push_str(&part),
      Err(e) => record_error(e, child.name(), i18n, view),
    }
  }
  html
}

/// Concatenate the children's `<head>` contributions in order.
pub fn compose_header(
  children: &[Box<dyn HtmlClient>],
  uid: &str,
  req: &Request,
  view: &mut View,
  i18n: &Translator,
) -> String {
  let mut html = String::new();
  for child in children {
    match child.header(uid, req, view) {
      Ok(Some(part)) => html.push_str(&part),
      Ok(None) => {}
      Err(e) => record_error(e, child.name(), i18n, view),
    }
  }
  html
}

#[cfg(test)]
mod tests {
  use super::*;

  struct FixedClient {
    name: &'static str,
    html: &'static str,
  }

  impl HtmlClient for FixedClient {
    fn name(&self) -> &'static str {
      self.name
    }

    fn body(&self, _uid: &str, _req: &Request, _view: &mut View) -> Result<String, ShopError> {
      Ok(self.html.to_string())
    }

    fn header(
      &self,
      _uid: &str,
      _req: &Request,
      _view: &mut View,
    ) -> Result<Option<String>, ShopError> {
      Ok(Some(self.html.to_string()))
    }
  }

  struct FailingClient {
    err: ShopError,
  }

  impl HtmlClient for FailingClient {
    fn name(&self) -> &'static str {
      "failing"
    }

    fn body(&self, _uid: &str, _req: &Request, _view: &mut View) -> Result<String, ShopError> {
      Err(self.err.clone())
    }

    fn header(
      &self,
      _uid: &str,
      _req: &Request,
      _view: &mut View,
    ) -> Result<Option<String>, ShopError> {
      Err(self.err.clone())
    }
  }

  #[test]
  fn test_compose_body_keeps_configured_order() {
    let children: Vec<Box<dyn HtmlClient>> = vec![
      Box::new(FixedClient { name: "a", html: "<a>" }),
      Box::new(FixedClient { name: "b", html: "<b>" }),
    ];
    let mut view = View::new();

    let html = compose_body(&children, "1", &Request::default(), &mut view, &Translator::default());
    assert_eq!(html, "<a><b>");
    assert!(view.errors().is_empty());
  }

  #[test]
  fn test_failing_child_does_not_blank_siblings() {
    let children: Vec<Box<dyn HtmlClient>> = vec![
      Box::new(FixedClient { name: "a", html: "<a>" }),
      Box::new(FailingClient {
        err: ShopError::frontend("Search is unavailable"),
      }),
      Box::new(FixedClient { name: "b", html: "<b>" }),
    ];
    let mut view = View::new();

    let html = compose_body(&children, "1", &Request::default(), &mut view, &Translator::default());
    assert_eq!(html, "<a><b>");
    assert_eq!(view.errors(), ["Search is unavailable"]);
  }

  #[test]
  fn test_compose_header_concatenates_and_records_failures() {
    let children: Vec<Box<dyn HtmlClient>> = vec![
      Box::new(FixedClient { name: "a", html: "<meta a>" }),
      Box::new(FailingClient {
        err: ShopError::frontend("Search is unavailable"),
      }),
      Box::new(FixedClient { name: "b", html: "<meta b>" }),
    ];
    let mut view = View::new();

    let html = compose_header(&children, "1", &Request::default(), &mut view, &Translator::default());
    assert_eq!(html, "<meta a><meta b>");
    assert_eq!(view.errors(), ["Search is unavailable"]);
  }

  #[test]
  fn test_internal_error_shows_generic_message() {
    let children: Vec<Box<dyn HtmlClient>> = vec![Box::new(FailingClient {
      err: ShopError::internal("lock poisoned"),
    })];
    let mut view = View::new();

    compose_body(&children, "1", &Request::default(), &mut view, &Translator::default());
    assert_eq!(view.errors(), ["A non-recoverable error occurred"]);
  }
}
