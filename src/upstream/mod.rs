//! Upstream forum API boundary: the fetch trait, raw records, and the HTTP
//! client that implements it.

pub mod client;
pub mod config;
pub mod error;
pub mod views;

use async_trait::async_trait;

use crate::models::{CommentSortType, Paging, SortType};

pub use client::HttpForumApi;
pub use config::UpstreamConfig;
pub use error::FetchError;
pub use views::{
    CommentAggregates, CommentRecord, CommentView, CommunityRecord, CommunityView, PersonAggregates,
    PersonDetails, PersonRecord, PersonView, PostAggregates, PostRecord, PostView,
};

/// Read access to the remote forum.
///
/// Every listing is restricted to the local instance. Implementations own
/// transport concerns (timeouts, retries); callers forward failures as-is.
#[async_trait]
pub trait ForumApi: Send + Sync {
    async fn list_communities(&self, paging: Paging) -> Result<Vec<CommunityView>, FetchError>;

    /// Posts for the home feed (`community_id = None`) or one community.
    async fn list_posts(
        &self,
        community_id: Option<i64>,
        paging: Paging,
        sort: SortType,
    ) -> Result<Vec<PostView>, FetchError>;

    async fn get_post(&self, id: i64) -> Result<PostView, FetchError>;

    async fn list_comments(
        &self,
        post_id: i64,
        paging: Paging,
        sort: CommentSortType,
    ) -> Result<Vec<CommentView>, FetchError>;

    async fn get_person(&self, name: &str) -> Result<PersonDetails, FetchError>;
}
