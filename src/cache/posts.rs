use chrono::Utc;

use super::Cache;
use crate::error::{CacheError, CacheResult, EntityKind};
use crate::models::{CommentSortType, Post};
use crate::store::{CommentsKey, is_expired};
use crate::upstream::PostView;

impl Cache {
    /// A single post.
    ///
    /// A stored post is returned until it outlives the post TTL. Refetching a
    /// post also refreshes its comment sets: the default order plus every
    /// order already stored for it.
    pub async fn post(&self, id: i64) -> CacheResult<Post> {
        if let Some(post) = self.posts.get(&id) {
            if !is_expired(post.fetched_at, self.config.post_ttl) {
                log::debug!("post {} served from cache", id);
                return Ok(post);
            }
        }

        self.fetch_post(id).await?;
        self.refresh_comments(id).await;

        self.posts
            .get(&id)
            .ok_or_else(|| CacheError::not_found(EntityKind::Post, id))
    }

    async fn fetch_post(&self, id: i64) -> CacheResult<()> {
        log::info!("fetching post: {}", id);

        let view = self.api.get_post(id).await?;
        self.store_post(&view)?;
        Ok(())
    }

    /// Normalize and store one post, returning its ID.
    pub(super) fn store_post(&self, view: &PostView) -> CacheResult<i64> {
        let post = self.normalizer.post(view, Utc::now())?;
        let id = post.id;
        self.posts.set(id, post);
        Ok(id)
    }

    /// Refetch the comment sets of a freshly fetched post.
    ///
    /// Failures are logged; the post itself is already stored.
    async fn refresh_comments(&self, post_id: i64) {
        let sorts = CommentSortType::ALL.into_iter().filter(|&sort| {
            sort == CommentSortType::default()
                || self.comments.contains(&CommentsKey::new(post_id, sort))
        });

        for sort in sorts {
            if let Err(err) = self.fetch_comments(post_id, sort).await {
                log::warn!(
                    "failed refreshing comments for post {} ({}): {}",
                    post_id,
                    sort,
                    err
                );
            }
        }
    }
}
