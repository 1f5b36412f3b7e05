use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::config::UpstreamConfig;
use super::error::FetchError;
use super::views::{CommentView, CommunityView, PersonDetails, PostView};
use super::ForumApi;
use crate::models::{CommentSortType, Paging, SortType};

/// `reqwest` implementation of [`ForumApi`] against the `/api/v3` endpoints.
#[derive(Clone)]
pub struct HttpForumApi {
    http: reqwest::Client,
    config: UpstreamConfig,
}

impl HttpForumApi {
    pub fn new(config: UpstreamConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Http)?;

        Ok(Self {
            http: client,
            config,
        })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/v3/{}",
            self.config.base_url.trim_end_matches('/'),
            path
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let response = self
            .http
            .get(self.endpoint(path))
            .query(query)
            .send()
            .await
            .map_err(FetchError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::status(status, body));
        }

        let body = response.bytes().await.map_err(FetchError::Http)?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn paging_query(paging: Paging) -> [(&'static str, String); 2] {
    [
        ("page", paging.page.to_string()),
        ("limit", paging.limit.to_string()),
    ]
}

#[async_trait]
impl ForumApi for HttpForumApi {
    async fn list_communities(&self, paging: Paging) -> Result<Vec<CommunityView>, FetchError> {
        let mut query = vec![("type_", "Local".to_string())];
        query.extend(paging_query(paging));

        let response: CommunityListResponse = self.get_json("community/list", &query).await?;
        Ok(response.communities)
    }

    async fn list_posts(
        &self,
        community_id: Option<i64>,
        paging: Paging,
        sort: SortType,
    ) -> Result<Vec<PostView>, FetchError> {
        let mut query = vec![
            ("type_", "Local".to_string()),
            ("sort", sort.to_string()),
        ];
        query.extend(paging_query(paging));
        if let Some(id) = community_id {
            query.push(("community_id", id.to_string()));
        }

        let response: PostListResponse = self.get_json("post/list", &query).await?;
        Ok(response.posts)
    }

    async fn get_post(&self, id: i64) -> Result<PostView, FetchError> {
        let response: PostResponse = self
            .get_json("post", &[("id", id.to_string())])
            .await?;
        Ok(response.post_view)
    }

    async fn list_comments(
        &self,
        post_id: i64,
        paging: Paging,
        sort: CommentSortType,
    ) -> Result<Vec<CommentView>, FetchError> {
        let mut query = vec![
            ("post_id", post_id.to_string()),
            ("sort", sort.to_string()),
            ("type_", "All".to_string()),
        ];
        query.extend(paging_query(paging));

        let response: CommentListResponse = self.get_json("comment/list", &query).await?;
        Ok(response.comments)
    }

    async fn get_person(&self, name: &str) -> Result<PersonDetails, FetchError> {
        let query = [
            ("username", name.to_string()),
            ("sort", SortType::New.to_string()),
        ];
        self.get_json("user", &query).await
    }
}

#[derive(Debug, Deserialize)]
struct CommunityListResponse {
    communities: Vec<CommunityView>,
}

#[derive(Debug, Deserialize)]
struct PostListResponse {
    posts: Vec<PostView>,
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    post_view: PostView,
}

#[derive(Debug, Deserialize)]
struct CommentListResponse {
    comments: Vec<CommentView>,
}
