//! Comment threading
//!
//! Rebuilds reply trees from the flat comment lists the upstream delivers and
//! re-orders them.
//!
//! ## Module Structure
//!
//! - `comment_tree`: multi-pass tree reconstruction from ancestry paths
//! - `comment_sort`: recursive, stable re-ordering of a comment forest

pub mod comment_sort;
pub mod comment_tree;

pub use comment_sort::{CommentOrder, sort_comments};
pub use comment_tree::{CommentForest, MAX_PASSES, ROOT_ID, build_comment_tree, parent_id};
