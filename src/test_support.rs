//! In-memory doubles for the upstream API and the text renderer.
//!
//! `ScriptedForum` serves whatever records a test loads into it, counts every
//! call per operation and keeps a call log so tests can assert on fetch order.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Barrier;

use crate::models::{CommentSortType, Paging, SortType};
use crate::render::{RenderError, TextRenderer};
use crate::upstream::{
    CommentAggregates, CommentRecord, CommentView, CommunityRecord, CommunityView, FetchError,
    ForumApi, PersonAggregates, PersonDetails, PersonRecord, PersonView, PostAggregates,
    PostRecord, PostView,
};

/// Renderer that wraps text in `<p>` and fails on a marker substring.
pub struct ScriptedRenderer {
    fail_marker: Option<String>,
}

impl ScriptedRenderer {
    pub fn new() -> Self {
        Self { fail_marker: None }
    }

    /// Fail every render whose input contains `marker`.
    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
        }
    }
}

impl Default for ScriptedRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRenderer for ScriptedRenderer {
    fn render(&self, raw: &str) -> Result<String, RenderError> {
        if let Some(marker) = &self.fail_marker {
            if raw.contains(marker.as_str()) {
                return Err(RenderError::Render(format!("refusing to render '{raw}'")));
            }
        }
        Ok(format!("<p>{raw}</p>"))
    }
}

/// Per-operation call counters.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub list_communities: AtomicUsize,
    pub list_posts: AtomicUsize,
    pub get_post: AtomicUsize,
    pub list_comments: AtomicUsize,
    pub get_person: AtomicUsize,
}

impl CallCounts {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct Script {
    communities: Vec<CommunityView>,
    /// Listings keyed by community ID, `None` for the home feed.
    listings: HashMap<Option<i64>, Vec<PostView>>,
    posts: HashMap<i64, PostView>,
    comments: HashMap<i64, Vec<CommentView>>,
    persons: HashMap<String, PersonDetails>,
}

/// Scripted [`ForumApi`] backed by in-memory records.
#[derive(Default)]
pub struct ScriptedForum {
    script: Mutex<Script>,
    pub calls: CallCounts,
    log: Mutex<Vec<String>>,
    unavailable: AtomicBool,
    listing_barrier: Mutex<Option<Arc<Barrier>>>,
    communities_fail_from: Mutex<Option<u32>>,
}

impl ScriptedForum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_community(&self, id: i64, name: &str) {
        self.script.lock().communities.push(community_view(id, name));
    }

    /// Set the listing for the home feed (`None`) or a community.
    pub fn set_listing(&self, community_id: Option<i64>, posts: Vec<PostView>) {
        self.script.lock().listings.insert(community_id, posts);
    }

    pub fn set_post(&self, post: PostView) {
        self.script.lock().posts.insert(post.post.id, post);
    }

    pub fn set_comments(&self, post_id: i64, comments: Vec<CommentView>) {
        self.script.lock().comments.insert(post_id, comments);
    }

    pub fn set_person(&self, details: PersonDetails) {
        self.script
            .lock()
            .persons
            .insert(details.person_view.person.name.clone(), details);
    }

    /// Make every call fail with `503 Service Unavailable` (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Fail `list_communities` for `page` and every later page (`None` clears it).
    pub fn fail_communities_from_page(&self, page: Option<u32>) {
        *self.communities_fail_from.lock() = page;
    }

    /// Hold every `list_posts` call until `parties` calls are waiting.
    pub fn hold_listings_for(&self, parties: usize) {
        *self.listing_barrier.lock() = Some(Arc::new(Barrier::new(parties)));
    }

    /// Calls in the order they were made, e.g. `list_posts:Some(7):2:Hot`.
    pub fn call_log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    fn record(&self, counter: &AtomicUsize, entry: String) -> Result<(), FetchError> {
        counter.fetch_add(1, Ordering::SeqCst);
        self.log.lock().push(entry);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(FetchError::status(
                StatusCode::SERVICE_UNAVAILABLE,
                "scripted outage".to_string(),
            ));
        }
        Ok(())
    }
}

fn page_of<T: Clone>(items: &[T], paging: Paging) -> Vec<T> {
    let start = (paging.page as usize - 1) * paging.limit as usize;
    items
        .iter()
        .skip(start)
        .take(paging.limit as usize)
        .cloned()
        .collect()
}

fn not_found(what: String) -> FetchError {
    FetchError::status(StatusCode::NOT_FOUND, what)
}

#[async_trait]
impl ForumApi for ScriptedForum {
    async fn list_communities(&self, paging: Paging) -> Result<Vec<CommunityView>, FetchError> {
        self.record(
            &self.calls.list_communities,
            format!("list_communities:{}", paging.page),
        )?;
        let failing = *self.communities_fail_from.lock();
        if failing.is_some_and(|from| paging.page >= from) {
            return Err(FetchError::Unavailable(format!(
                "community page {} down",
                paging.page
            )));
        }
        Ok(page_of(&self.script.lock().communities, paging))
    }

    async fn list_posts(
        &self,
        community_id: Option<i64>,
        paging: Paging,
        sort: SortType,
    ) -> Result<Vec<PostView>, FetchError> {
        let barrier = self.listing_barrier.lock().clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }

        self.record(
            &self.calls.list_posts,
            format!("list_posts:{:?}:{}:{}", community_id, paging.page, sort),
        )?;
        let script = self.script.lock();
        let posts = script
            .listings
            .get(&community_id)
            .map(|posts| page_of(posts, paging))
            .unwrap_or_default();
        Ok(posts)
    }

    async fn get_post(&self, id: i64) -> Result<PostView, FetchError> {
        self.record(&self.calls.get_post, format!("get_post:{id}"))?;
        self.script
            .lock()
            .posts
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(format!("post {id}")))
    }

    async fn list_comments(
        &self,
        post_id: i64,
        paging: Paging,
        sort: CommentSortType,
    ) -> Result<Vec<CommentView>, FetchError> {
        self.record(
            &self.calls.list_comments,
            format!("list_comments:{}:{}:{}", post_id, paging.page, sort),
        )?;
        let script = self.script.lock();
        let comments = script
            .comments
            .get(&post_id)
            .map(|comments| page_of(comments, paging))
            .unwrap_or_default();
        Ok(comments)
    }

    async fn get_person(&self, name: &str) -> Result<PersonDetails, FetchError> {
        self.record(&self.calls.get_person, format!("get_person:{name}"))?;
        self.script
            .lock()
            .persons
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(format!("person {name}")))
    }
}

// ===== Record builders =====

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

pub fn person_record(id: i64, name: &str) -> PersonRecord {
    PersonRecord {
        id,
        name: name.to_string(),
        display_name: None,
        actor_id: format!("https://hexbear.net/u/{name}"),
        local: true,
        bio: Some(format!("bio of {name}")),
        published: epoch(),
        updated: None,
    }
}

pub fn community_view(id: i64, name: &str) -> CommunityView {
    CommunityView {
        community: CommunityRecord {
            id,
            name: name.to_string(),
            title: format!("The {name} community"),
            description: Some(format!("All about {name}")),
        },
    }
}

/// Post `id` in community `(community_id, community_name)`, created by user 1.
pub fn post_view(id: i64, community_id: i64, community_name: &str, body: &str) -> PostView {
    PostView {
        post: PostRecord {
            id,
            name: format!("Post {id}"),
            url: None,
            body: Some(body.to_string()),
            community_id,
            creator_id: 1,
            published: epoch() + Duration::minutes(id),
            updated: None,
            featured_local: false,
            featured_community: false,
        },
        creator: person_record(1, "alice"),
        community: CommunityRecord {
            id: community_id,
            name: community_name.to_string(),
            title: community_name.to_string(),
            description: None,
        },
        counts: PostAggregates {
            upvotes: id,
            comments: 0,
        },
        creator_is_admin: false,
        creator_is_moderator: false,
    }
}

/// Comment `id` on `post_id` at `path`, written by `creator_id`.
pub fn comment_view(id: i64, post_id: i64, path: &str, creator_id: i64, upvotes: i64) -> CommentView {
    CommentView {
        comment: CommentRecord {
            id,
            creator_id,
            post_id,
            content: format!("comment {id}"),
            path: path.to_string(),
            published: epoch() + Duration::minutes(id),
            updated: None,
        },
        creator: person_record(creator_id, &format!("user{creator_id}")),
        post: post_view(post_id, 1, "general", "").post,
        counts: CommentAggregates { upvotes },
        creator_is_admin: false,
        creator_is_moderator: false,
    }
}

pub fn person_details(id: i64, name: &str, posts: Vec<PostView>) -> PersonDetails {
    PersonDetails {
        person_view: PersonView {
            person: person_record(id, name),
            counts: PersonAggregates {
                post_count: posts.len() as i64,
                comment_count: 0,
            },
            is_admin: false,
        },
        posts,
    }
}
