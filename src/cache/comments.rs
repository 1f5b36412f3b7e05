use chrono::Utc;

use super::Cache;
use crate::error::{CacheError, CacheResult, EntityKind};
use crate::models::{CommentSortType, Paging, PostComments};
use crate::store::CommentsKey;
use crate::threading::{CommentOrder, build_comment_tree, sort_comments};

impl Cache {
    /// Threaded comments of a post under one order.
    ///
    /// Comment sets never expire on their own. They are replaced when the
    /// post is refetched through [`Cache::post`], so call that first.
    pub async fn comments(&self, post_id: i64, sort: CommentSortType) -> CacheResult<PostComments> {
        let key = CommentsKey::new(post_id, sort);
        if let Some(comments) = self.comments.get(&key) {
            log::debug!("comments {} served from cache", key);
            return Ok(comments);
        }

        self.fetch_comments(post_id, sort).await?;

        self.comments
            .get(&key)
            .ok_or_else(|| CacheError::not_found(EntityKind::Comments, key))
    }

    /// Fetch every page of comments for a post and store them as a tree.
    pub(super) async fn fetch_comments(
        &self,
        post_id: i64,
        sort: CommentSortType,
    ) -> CacheResult<()> {
        let key = CommentsKey::new(post_id, sort);
        log::info!("fetching comments for post: {}", key);

        let fetched_at = Utc::now();
        let mut flat = Vec::new();
        let mut paging = Paging::new(1, self.config.page_size);

        loop {
            let views = self.api.list_comments(post_id, paging, sort).await?;

            for view in &views {
                match self.normalizer.comment(view) {
                    Ok(comment) => flat.push(comment),
                    Err(err) => {
                        log::error!("failed to add comment {}: {}", view.comment.id, err);
                        self.record_skip();
                    }
                }
            }

            if views.len() < paging.limit as usize {
                break;
            }
            paging = paging.next();
        }

        let forest = build_comment_tree(flat);
        if !forest.dropped.is_empty() {
            log::warn!(
                "dropped {} comments without a parent for post {} after {} passes: {:?}",
                forest.dropped.len(),
                post_id,
                forest.passes,
                forest.dropped
            );
        }

        let mut roots = forest.roots;
        if let Some(order) = CommentOrder::for_sort(sort) {
            sort_comments(&mut roots, order);
        }

        self.comments.set(
            key,
            PostComments {
                fetched_at,
                comments: roots,
            },
        );
        Ok(())
    }
}
