use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::store::{KeyedCache, PageKey};

/// Upper bound the upstream accepts for `limit` on any listing.
pub const MAX_PAGE_SIZE: u32 = 50;

// ===== Sorting =====

/// Post listing orders understood by the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortType {
    #[default]
    Active,
    Hot,
    New,
    Old,
    TopDay,
    TopWeek,
    TopMonth,
    TopYear,
    TopAll,
    MostComments,
    NewComments,
}

impl SortType {
    pub const ALL: [SortType; 11] = [
        SortType::Active,
        SortType::Hot,
        SortType::New,
        SortType::Old,
        SortType::TopDay,
        SortType::TopWeek,
        SortType::TopMonth,
        SortType::TopYear,
        SortType::TopAll,
        SortType::MostComments,
        SortType::NewComments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortType::Active => "Active",
            SortType::Hot => "Hot",
            SortType::New => "New",
            SortType::Old => "Old",
            SortType::TopDay => "TopDay",
            SortType::TopWeek => "TopWeek",
            SortType::TopMonth => "TopMonth",
            SortType::TopYear => "TopYear",
            SortType::TopAll => "TopAll",
            SortType::MostComments => "MostComments",
            SortType::NewComments => "NewComments",
        }
    }
}

impl fmt::Display for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.is_empty() {
            return Ok(SortType::default());
        }
        SortType::ALL
            .into_iter()
            .find(|sort| sort.as_str().eq_ignore_ascii_case(wanted))
            .ok_or(())
    }
}

/// Comment orders understood by the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CommentSortType {
    #[default]
    Hot,
    Top,
    New,
    Old,
}

impl CommentSortType {
    pub const ALL: [CommentSortType; 4] = [
        CommentSortType::Hot,
        CommentSortType::Top,
        CommentSortType::New,
        CommentSortType::Old,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommentSortType::Hot => "Hot",
            CommentSortType::Top => "Top",
            CommentSortType::New => "New",
            CommentSortType::Old => "Old",
        }
    }
}

impl fmt::Display for CommentSortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentSortType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.is_empty() {
            return Ok(CommentSortType::default());
        }
        CommentSortType::ALL
            .into_iter()
            .find(|sort| sort.as_str().eq_ignore_ascii_case(wanted))
            .ok_or(())
    }
}

/// Paging parameters forwarded to every listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    /// One-based page index.
    pub page: u32,
    /// Items per page, clamped between 1 and [`MAX_PAGE_SIZE`].
    pub limit: u32,
}

impl Paging {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self::new(1, MAX_PAGE_SIZE)
    }
}

// ===== Cached Entities =====

/// One page of a listing (home feed or a community feed).
///
/// Replaced wholesale on every refresh, never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub post_ids: Vec<i64>,
    pub fetched_at: DateTime<Utc>,
}

/// Community metadata plus the community's own page store.
///
/// Cloning a `Community` shares the page store, so pages written through one
/// clone are visible through every other.
#[derive(Debug, Clone)]
pub struct Community {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub description: String,
    pub fetched_at: DateTime<Utc>,
    pub(crate) pages: Arc<KeyedCache<PageKey, Page>>,
}

impl Community {
    /// Cached page for this community, if any.
    pub fn page(&self, page: u32, sort: SortType) -> Option<Page> {
        self.pages.get(&PageKey::new(page, sort))
    }

    /// Number of pages currently cached for this community.
    pub fn cached_pages(&self) -> usize {
        self.pages.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: i64,
    pub name: String,
    /// External link. Always `None` when `image_url` is set.
    pub url: Option<String>,
    /// Rendered body markup.
    pub body: String,
    pub community_id: i64,
    pub published_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub featured_local: bool,
    pub featured_community: bool,

    pub creator_display_name: String,
    pub creator_id: i64,
    pub creator_url: String,
    pub community_name: String,
    pub image_url: Option<String>,
    pub upvotes: i64,
    pub comment_count: i64,
    pub fetched_at: DateTime<Utc>,
}

/// A node in a comment tree.
///
/// `children` is only ever filled in by the tree builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub id: i64,
    /// Rendered content markup.
    pub content: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Dot separated ancestor chain, e.g. `0.12.57`.
    pub path: String,

    pub creator_display_name: String,
    pub creator_url: String,
    pub upvotes: i64,
    pub children: Vec<Comment>,
}

impl Comment {
    /// Total number of comments in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Comment::subtree_len).sum::<usize>()
    }
}

/// Threaded comments for one `(post, sort)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostComments {
    pub fetched_at: DateTime<Utc>,
    pub comments: Vec<Comment>,
}

impl PostComments {
    /// Number of comments across every tree.
    pub fn len(&self) -> usize {
        self.comments.iter().map(Comment::subtree_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    /// Identity URL on the person's home server.
    pub actor_id: String,
    pub name: String,
    pub display_name: String,
    /// Rendered bio markup.
    pub bio: String,
    pub local: bool,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,

    pub comment_count: i64,
    pub post_count: i64,
    pub post_ids: Vec<i64>,
    pub fetched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_types_parse_case_insensitively() {
        assert_eq!("hot".parse::<SortType>(), Ok(SortType::Hot));
        assert_eq!("TOPWEEK".parse::<SortType>(), Ok(SortType::TopWeek));
        assert_eq!("".parse::<SortType>(), Ok(SortType::Active));
        assert!("best".parse::<SortType>().is_err());

        assert_eq!("old".parse::<CommentSortType>(), Ok(CommentSortType::Old));
        assert_eq!(" ".parse::<CommentSortType>(), Ok(CommentSortType::Hot));
    }

    #[test]
    fn sort_names_are_never_numeric() {
        for sort in SortType::ALL {
            assert!(sort.to_string().parse::<i64>().is_err());
        }
        for sort in CommentSortType::ALL {
            assert!(sort.to_string().parse::<i64>().is_err());
        }
    }

    #[test]
    fn paging_is_clamped() {
        let paging = Paging::new(0, 500);
        assert_eq!(paging.page, 1);
        assert_eq!(paging.limit, MAX_PAGE_SIZE);
        assert_eq!(Paging::new(3, 0).limit, 1);
        assert_eq!(paging.next().page, 2);
    }
}
