//! Error taxonomy shared by all HTML clients.

use thiserror::Error;

/// Errors surfaced by data gathering and rendering steps.
///
/// The variants form the four catch tiers, most specific first. The first
/// three carry a message fit for the visitor (after translation); an
/// `Internal` message is only logged and replaced with a generic line.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShopError {
  /// Presentation-layer failure (client configuration, template assembly)
  #[error("{0}")]
  Client(String),
  /// Domain-controller failure (filter/search/paging layer)
  #[error("{0}")]
  Frontend(String),
  /// Persistence-layer failure reported through a controller
  #[error("{0}")]
  Store(String),
  /// Anything unclassified; never shown verbatim to the visitor
  #[error("internal error: {0}")]
  Internal(String),
}

impl ShopError {
  pub fn client(msg: impl Into<String>) -> Self {
    Self::Client(msg.into())
  }

  pub fn frontend(msg: impl Into<String>) -> Self {
    Self::Frontend(msg.into())
  }

  pub fn store(msg: impl Into<String>) -> Self {
    Self::Store(msg.into())
  }

  pub fn internal(err: impl std::fmt::Display) -> Self {
    Self::Internal(err.to_string())
  }
}
