//! Composite keys for paged and sorted views
//!
//! Keys are typed structs rather than formatted strings, so two different
//! `(number, sort)` pairs can never hash to the same entry. `Display`
//! renders the familiar `2:Hot` form for logs.

use std::fmt;

use crate::models::{CommentSortType, SortType};

/// Key for one page of a listing: `page:sort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub page: u32,
    pub sort: SortType,
}

impl PageKey {
    pub fn new(page: u32, sort: SortType) -> Self {
        Self { page, sort }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.page, self.sort)
    }
}

/// Key for the comment set of a post under one order: `post_id:sort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommentsKey {
    pub post_id: i64,
    pub sort: CommentSortType,
}

impl CommentsKey {
    pub fn new(post_id: i64, sort: CommentSortType) -> Self {
        Self { post_id, sort }
    }
}

impl fmt::Display for CommentsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.post_id, self.sort)
    }
}
