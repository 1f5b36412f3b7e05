//! In-memory entity storage
//!
//! Every entity kind (home pages, communities, posts, comment sets, persons)
//! gets its own [`KeyedCache`] instance with its own reader-writer lock. There
//! is no cache-wide lock and no store ever calls into another while holding
//! its lock.
//!
//! ## Module Structure
//!
//! - `keyed`: the generic lock-guarded map
//! - `keys`: composite keys for paged and sorted views
//! - `freshness`: TTL checks against `fetched_at` timestamps

mod freshness;
mod keyed;
mod keys;

pub use freshness::{is_expired, is_expired_at};
pub use keyed::KeyedCache;
pub use keys::{CommentsKey, PageKey};
