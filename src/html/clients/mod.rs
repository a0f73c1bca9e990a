//! The page clients.

mod account_watch;
mod catalog_list;
mod catalog_session;

pub use account_watch::AccountWatchClient;
pub use catalog_list::CatalogListClient;
pub use catalog_session::CatalogSessionClient;
