use super::*;
use crate::config::DEFAULT_IMAGE_PREFIX;
use crate::error::CacheError;
use crate::models::CommentSortType;
use crate::test_support::{CallCounts, ScriptedForum, ScriptedRenderer, comment_view, post_view};
use chrono::{Duration, Utc};

fn config() -> CacheConfig {
    CacheConfig {
        post_ttl: Duration::minutes(20),
        page_ttl: Duration::minutes(15),
        person_ttl: Duration::minutes(40),
        page_size: 50,
        image_prefixes: vec![DEFAULT_IMAGE_PREFIX.to_string()],
    }
}

fn cache_with(forum: &Arc<ScriptedForum>) -> Cache {
    let api: Arc<dyn ForumApi> = forum.clone();
    Cache::new(api, Arc::new(ScriptedRenderer::new()), config())
}

/// Store `view` as if it had been fetched `age` ago.
fn seed_post(cache: &Cache, view: &crate::upstream::PostView, age: Duration) {
    let post = cache
        .normalizer
        .post(view, Utc::now() - age)
        .expect("seed post normalizes");
    cache.posts.set(post.id, post);
}

#[tokio::test]
async fn stale_post_is_refetched_once() {
    let forum = Arc::new(ScriptedForum::new());
    let mut fresh = post_view(42, 7, "theory", "updated body");
    fresh.counts.upvotes = 99;
    forum.set_post(fresh);

    let cache = cache_with(&forum);
    seed_post(&cache, &post_view(42, 7, "theory", "old body"), Duration::minutes(30));
    let before = Utc::now();

    let post = cache.post(42).await.unwrap();

    assert_eq!(CallCounts::get(&forum.calls.get_post), 1);
    assert!(post.fetched_at >= before);
    assert_eq!(post.upvotes, 99);
    assert_eq!(post.body, "<p>updated body</p>");
}

#[tokio::test]
async fn fresh_post_is_served_without_fetching() {
    let forum = Arc::new(ScriptedForum::new());
    let cache = cache_with(&forum);
    seed_post(&cache, &post_view(42, 7, "theory", "body"), Duration::minutes(5));

    let post = cache.post(42).await.unwrap();

    assert_eq!(post.id, 42);
    assert_eq!(CallCounts::get(&forum.calls.get_post), 0);
    assert_eq!(CallCounts::get(&forum.calls.list_comments), 0);
}

#[tokio::test]
async fn refetched_post_refreshes_stored_comment_orders() {
    let forum = Arc::new(ScriptedForum::new());
    forum.set_post(post_view(42, 7, "theory", "body"));
    forum.set_comments(42, vec![comment_view(1, 42, "0.1", 2, 3)]);

    let cache = cache_with(&forum);
    seed_post(&cache, &post_view(42, 7, "theory", "body"), Duration::minutes(30));
    cache.comments.set(
        CommentsKey::new(42, CommentSortType::Top),
        PostComments {
            fetched_at: Utc::now() - Duration::hours(2),
            comments: Vec::new(),
        },
    );

    cache.post(42).await.unwrap();

    let log = forum.call_log();
    assert!(log.contains(&"list_comments:42:1:Hot".to_string()));
    assert!(log.contains(&"list_comments:42:1:Top".to_string()));
    assert!(!log.iter().any(|call| call.ends_with(":New") || call.ends_with(":Old")));

    let top = cache.comments(42, CommentSortType::Top).await.unwrap();
    assert_eq!(top.len(), 1);
}

#[tokio::test]
async fn failed_refresh_keeps_stale_post() {
    let forum = Arc::new(ScriptedForum::new());
    forum.set_unavailable(true);

    let cache = cache_with(&forum);
    let seeded_at = Utc::now() - Duration::minutes(30);
    seed_post(&cache, &post_view(42, 7, "theory", "body"), Duration::minutes(30));

    let err = cache.post(42).await.unwrap_err();

    assert!(matches!(err, CacheError::Transport(_)));
    let stored = cache.cached_post(42).expect("stale post stays stored");
    assert!(stored.fetched_at <= seeded_at + Duration::seconds(1));
}

#[tokio::test]
async fn stale_home_page_failure_is_an_error() {
    let forum = Arc::new(ScriptedForum::new());
    let cache = cache_with(&forum);
    let key = PageKey::new(1, SortType::Active);
    cache.home.set(
        key,
        Page {
            post_ids: vec![1, 2],
            fetched_at: Utc::now() - Duration::hours(1),
        },
    );
    forum.set_unavailable(true);

    let err = cache.home(1, SortType::Active).await.unwrap_err();

    assert!(matches!(err, CacheError::Transport(_)));
    assert_eq!(cache.home.get(&key).map(|page| page.post_ids), Some(vec![1, 2]));
}

#[tokio::test]
async fn comment_sets_ignore_age() {
    let forum = Arc::new(ScriptedForum::new());
    let cache = cache_with(&forum);
    cache.comments.set(
        CommentsKey::new(42, CommentSortType::Hot),
        PostComments {
            fetched_at: Utc::now() - Duration::days(30),
            comments: Vec::new(),
        },
    );

    let comments = cache.comments(42, CommentSortType::Hot).await.unwrap();

    assert!(comments.is_empty());
    assert_eq!(CallCounts::get(&forum.calls.list_comments), 0);
}
