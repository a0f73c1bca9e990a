//! Fragment caching for rendered HTML.
//!
//! This module provides a template-agnostic fragment cache that:
//! - Keys entries by a digest of request parameters plus a config fingerprint
//! - Associates entries with domain tags for bulk invalidation
//! - Skips caching entirely when the visitor is actively filtering
//! - Re-injects request-bound content (the CSRF token) into cached HTML

mod layer;
mod storage;
mod traits;

pub use layer::{replace_region, FragmentCache};
pub use storage::{MemoryStore, NoopStore, SqliteStore};
pub use traits::CacheStore;
