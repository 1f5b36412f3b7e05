//! Recursive re-ordering of comment trees.
//!
//! Every level is sorted with the same key using a stable sort, so equal keys
//! keep their incoming order and the output is deterministic.

use std::cmp::Reverse;

use crate::models::{Comment, CommentSortType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentOrder {
    /// Highest upvote count first.
    MostUpvoted,
    Newest,
    Oldest,
}

impl CommentOrder {
    /// Local order matching an upstream comment sort.
    ///
    /// `Hot` has no local equivalent and keeps whatever order the upstream
    /// produced.
    pub fn for_sort(sort: CommentSortType) -> Option<Self> {
        match sort {
            CommentSortType::Hot => None,
            CommentSortType::Top => Some(CommentOrder::MostUpvoted),
            CommentSortType::New => Some(CommentOrder::Newest),
            CommentSortType::Old => Some(CommentOrder::Oldest),
        }
    }
}

pub fn sort_comments(comments: &mut [Comment], order: CommentOrder) {
    match order {
        CommentOrder::MostUpvoted => comments.sort_by_key(|c| Reverse(c.upvotes)),
        CommentOrder::Newest => comments.sort_by_key(|c| Reverse(c.published_at)),
        CommentOrder::Oldest => comments.sort_by_key(|c| c.published_at),
    }

    for comment in comments.iter_mut() {
        sort_comments(&mut comment.children, order);
    }
}
