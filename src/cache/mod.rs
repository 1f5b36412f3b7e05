//! Read-through cache for the upstream forum
//!
//! Each public operation looks in the store for its entity kind, returns the
//! stored value while it is fresh, and otherwise fetches, normalizes, stores
//! and re-reads it.
//!
//! ## Concurrency
//!
//! Every store has its own lock and no lock is held across an upstream call.
//! Concurrent callers that find the same key stale each fetch it
//! independently; the writes are idempotent upserts, so the only cost is the
//! redundant upstream traffic. Requests are not coalesced.
//!
//! ## Module Structure
//!
//! - `normalize`: raw record to cached entity conversion
//! - `listings`: home and community pages
//! - `communities`, `posts`, `comments`, `persons`: per-kind operations

mod comments;
mod communities;
mod listings;
pub mod normalize;
mod persons;
mod posts;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::CacheConfig;
use crate::error::CacheResult;
use crate::models::{Community, Page, Person, Post, PostComments, SortType};
use crate::render::TextRenderer;
use crate::store::{CommentsKey, KeyedCache, PageKey};
use crate::upstream::ForumApi;

use normalize::{ImageClassifier, Normalizer};

pub use normalize::{creator_display_name, creator_url};

/// Entry counts per store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub home_pages: usize,
    pub communities: usize,
    pub community_pages: usize,
    pub posts: usize,
    pub comment_sets: usize,
    pub persons: usize,
    /// Records skipped because they failed to normalize during a listing fetch.
    pub skipped_records: usize,
}

pub struct Cache {
    api: Arc<dyn ForumApi>,
    normalizer: Normalizer,
    config: CacheConfig,

    /// Home feed pages keyed by `page:sort`.
    home: KeyedCache<PageKey, Page>,
    /// Communities keyed by name, each holding its own page store.
    communities: KeyedCache<String, Community>,
    posts: KeyedCache<i64, Post>,
    /// Comment trees keyed by `post_id:sort`.
    comments: KeyedCache<CommentsKey, PostComments>,
    /// Persons keyed by account name.
    persons: KeyedCache<String, Person>,

    skipped_records: AtomicUsize,
}

impl Cache {
    /// Empty cache; nothing is fetched until the first request.
    pub fn new(
        api: Arc<dyn ForumApi>,
        renderer: Arc<dyn TextRenderer>,
        config: CacheConfig,
    ) -> Self {
        let images = ImageClassifier::new(config.image_prefixes.iter().cloned());

        Self {
            api,
            normalizer: Normalizer::new(renderer, images),
            config,
            home: KeyedCache::new(),
            communities: KeyedCache::new(),
            posts: KeyedCache::new(),
            comments: KeyedCache::new(),
            persons: KeyedCache::new(),
            skipped_records: AtomicUsize::new(0),
        }
    }

    /// Cache warmed with the community set and the first home page.
    pub async fn initialize(
        api: Arc<dyn ForumApi>,
        renderer: Arc<dyn TextRenderer>,
        config: CacheConfig,
    ) -> CacheResult<Self> {
        let cache = Self::new(api, renderer, config);
        cache.fetch_communities().await?;
        cache.fetch_home(PageKey::new(1, SortType::Active)).await?;

        log::info!(
            "cache initialized: {} communities, {} posts",
            cache.communities.len(),
            cache.posts.len()
        );
        Ok(cache)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Stored post, without any freshness check or fetch.
    pub fn cached_post(&self, id: i64) -> Option<Post> {
        self.posts.get(&id)
    }

    /// Stored posts for a page, in page order, skipping any not in the store.
    pub fn posts_for(&self, page: &Page) -> Vec<Post> {
        page.post_ids
            .iter()
            .filter_map(|id| self.posts.get(id))
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        let communities = self.communities.values();

        CacheStats {
            home_pages: self.home.len(),
            communities: communities.len(),
            community_pages: communities.iter().map(Community::cached_pages).sum(),
            posts: self.posts.len(),
            comment_sets: self.comments.len(),
            persons: self.persons.len(),
            skipped_records: self.skipped_records.load(Ordering::Relaxed),
        }
    }

    fn record_skip(&self) {
        self.skipped_records.fetch_add(1, Ordering::Relaxed);
    }
}
