use chrono::Duration;
use hex_cache::config::DEFAULT_IMAGE_PREFIX;
use hex_cache::test_support::{
    CallCounts, ScriptedForum, ScriptedRenderer, person_details, post_view,
};
use hex_cache::{Cache, CacheConfig, CacheError, ForumApi, SortType, TextRenderer};
use std::sync::Arc;

fn config(page_size: u32) -> CacheConfig {
    CacheConfig {
        post_ttl: Duration::minutes(15),
        page_ttl: Duration::minutes(15),
        person_ttl: Duration::minutes(40),
        page_size,
        image_prefixes: vec![DEFAULT_IMAGE_PREFIX.to_string()],
    }
}

fn build(forum: &Arc<ScriptedForum>, renderer: impl TextRenderer + 'static, page_size: u32) -> Cache {
    let api: Arc<dyn ForumApi> = forum.clone();
    Cache::new(api, Arc::new(renderer), config(page_size))
}

#[tokio::test]
async fn unknown_community_is_resolved_before_listing() {
    let forum = Arc::new(ScriptedForum::new());
    forum.add_community(7, "theory");
    forum.set_listing(
        Some(7),
        (1..=4).map(|id| post_view(id, 7, "theory", "body")).collect(),
    );
    let cache = build(&forum, ScriptedRenderer::new(), 2);

    let page = cache.community_posts("theory", 2, SortType::Hot).await.unwrap();

    assert_eq!(
        forum.call_log(),
        vec![
            "list_communities:1".to_string(),
            "list_posts:Some(7):2:Hot".to_string(),
        ]
    );
    assert_eq!(page.post_ids, vec![3, 4]);

    let community = cache.community("theory").await.unwrap();
    assert_eq!(community.page(2, SortType::Hot), Some(page));
    assert!(community.page(1, SortType::Hot).is_none());
}

#[tokio::test]
async fn unknown_community_after_refresh_is_not_found() {
    let forum = Arc::new(ScriptedForum::new());
    forum.add_community(7, "theory");
    let cache = build(&forum, ScriptedRenderer::new(), 50);

    let err = cache
        .community_posts("nowhere", 1, SortType::Hot)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(CallCounts::get(&forum.calls.list_communities), 1);
    assert_eq!(CallCounts::get(&forum.calls.list_posts), 0);
}

#[tokio::test]
async fn community_refresh_failure_surfaces_transport_error() {
    let forum = Arc::new(ScriptedForum::new());
    forum.set_unavailable(true);
    let cache = build(&forum, ScriptedRenderer::new(), 50);

    let err = cache.community("theory").await.unwrap_err();

    assert!(matches!(err, CacheError::Transport(_)));
}

#[tokio::test]
async fn listing_skips_posts_that_fail_to_render() {
    let forum = Arc::new(ScriptedForum::new());
    let posts = (1..=50)
        .map(|id| {
            let body = if id == 17 { "BROKEN" } else { "fine" };
            post_view(id, 7, "theory", body)
        })
        .collect();
    forum.set_listing(None, posts);
    let cache = build(&forum, ScriptedRenderer::failing_on("BROKEN"), 50);

    let page = cache.home(1, SortType::Hot).await.unwrap();

    assert_eq!(page.post_ids.len(), 49);
    assert!(!page.post_ids.contains(&17));
    assert!(cache.cached_post(17).is_none());
    assert!(cache.cached_post(18).is_some());
    assert_eq!(cache.stats().skipped_records, 1);
}

#[tokio::test]
async fn fresh_home_page_is_served_from_the_store() {
    let forum = Arc::new(ScriptedForum::new());
    forum.set_listing(
        None,
        vec![post_view(3, 7, "theory", "a"), post_view(1, 8, "news", "b")],
    );
    let cache = build(&forum, ScriptedRenderer::new(), 50);

    let first = cache.home(1, SortType::Active).await.unwrap();
    let second = cache.home(1, SortType::Active).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(CallCounts::get(&forum.calls.list_posts), 1);

    let names: Vec<String> = cache
        .posts_for(&first)
        .into_iter()
        .map(|post| post.community_name)
        .collect();
    assert_eq!(names, vec!["theory".to_string(), "news".to_string()]);

    // Another sort is another page
    cache.home(1, SortType::New).await.unwrap();
    assert_eq!(CallCounts::get(&forum.calls.list_posts), 2);
}

#[tokio::test]
async fn hosted_images_are_split_from_links() {
    let forum = Arc::new(ScriptedForum::new());
    let mut image = post_view(1, 7, "theory", "");
    image.post.url = Some(format!("{DEFAULT_IMAGE_PREFIX}abc.png"));
    let mut link = post_view(2, 7, "theory", "");
    link.post.url = Some("https://example.com/article".to_string());
    forum.set_listing(None, vec![image, link]);
    let cache = build(&forum, ScriptedRenderer::new(), 50);

    cache.home(1, SortType::Active).await.unwrap();

    let image = cache.cached_post(1).unwrap();
    assert_eq!(image.url, None);
    assert_eq!(image.image_url.as_deref(), Some("https://hexbear.net/pictrs/image/abc.png"));
    let link = cache.cached_post(2).unwrap();
    assert_eq!(link.url.as_deref(), Some("https://example.com/article"));
    assert_eq!(link.image_url, None);
}

#[tokio::test]
async fn concurrent_stale_reads_each_fetch() {
    let forum = Arc::new(ScriptedForum::new());
    forum.set_listing(None, vec![post_view(1, 7, "theory", "body")]);
    forum.hold_listings_for(3);
    let cache = build(&forum, ScriptedRenderer::new(), 50);

    let (a, b, c) = tokio::join!(
        cache.home(1, SortType::Hot),
        cache.home(1, SortType::Hot),
        cache.home(1, SortType::Hot),
    );

    assert_eq!(CallCounts::get(&forum.calls.list_posts), 3);
    for page in [a, b, c] {
        assert_eq!(page.unwrap().post_ids, vec![1]);
    }
    assert_eq!(cache.stats().home_pages, 1);
    assert_eq!(cache.stats().posts, 1);
}

#[tokio::test]
async fn person_lookup_stores_their_posts() {
    let forum = Arc::new(ScriptedForum::new());
    forum.set_person(person_details(
        4,
        "bob",
        vec![post_view(5, 7, "theory", "x"), post_view(6, 7, "theory", "y")],
    ));
    let cache = build(&forum, ScriptedRenderer::new(), 50);

    let person = cache.person("bob").await.unwrap();

    assert_eq!(person.post_ids, vec![5, 6]);
    assert_eq!(person.url, "/u/bob");
    assert_eq!(person.bio, "<p>bio of bob</p>");
    assert!(cache.cached_post(5).is_some());
    assert!(cache.cached_post(6).is_some());

    cache.person("bob").await.unwrap();
    assert_eq!(CallCounts::get(&forum.calls.get_person), 1);
}

#[tokio::test]
async fn person_with_unrenderable_bio_fails() {
    let forum = Arc::new(ScriptedForum::new());
    let mut details = person_details(4, "bob", Vec::new());
    details.person_view.person.bio = Some("BROKEN".to_string());
    forum.set_person(details);
    let cache = build(&forum, ScriptedRenderer::failing_on("BROKEN"), 50);

    let err = cache.person("bob").await.unwrap_err();

    assert!(matches!(err, CacheError::Normalization { .. }));
    assert_eq!(cache.stats().persons, 0);
}

#[tokio::test]
async fn missing_post_reports_transport_error() {
    let forum = Arc::new(ScriptedForum::new());
    let cache = build(&forum, ScriptedRenderer::new(), 50);

    let err = cache.post(404).await.unwrap_err();

    match err {
        CacheError::Transport(fetch) => {
            assert_eq!(fetch.status_code(), Some(reqwest::StatusCode::NOT_FOUND));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn communities_are_listed_by_name_and_fetched_once() {
    let forum = Arc::new(ScriptedForum::new());
    forum.add_community(2, "zines");
    forum.add_community(1, "art");
    forum.add_community(3, "memes");
    let cache = build(&forum, ScriptedRenderer::new(), 2);

    let names: Vec<String> = cache
        .communities()
        .await
        .unwrap()
        .into_iter()
        .map(|community| community.name)
        .collect();
    assert_eq!(names, vec!["art", "memes", "zines"]);

    cache.communities().await.unwrap();
    // Two pages of two for the first call, nothing for the second
    assert_eq!(CallCounts::get(&forum.calls.list_communities), 2);
}

#[tokio::test]
async fn community_refresh_keeps_cached_pages() {
    let forum = Arc::new(ScriptedForum::new());
    forum.add_community(7, "theory");
    forum.set_listing(Some(7), vec![post_view(1, 7, "theory", "body")]);
    let cache = build(&forum, ScriptedRenderer::new(), 50);

    cache.community_posts("theory", 1, SortType::Hot).await.unwrap();
    // An unknown name refreshes the whole set
    assert!(cache.community("elsewhere").await.unwrap_err().is_not_found());

    let theory = cache.community("theory").await.unwrap();
    assert_eq!(theory.cached_pages(), 1);
    assert_eq!(CallCounts::get(&forum.calls.list_communities), 2);
}

#[tokio::test]
async fn initialize_warms_communities_and_first_home_page() {
    let forum = Arc::new(ScriptedForum::new());
    forum.add_community(7, "theory");
    forum.set_listing(None, vec![post_view(1, 7, "theory", "body")]);
    let api: Arc<dyn ForumApi> = forum.clone();

    let cache = Cache::initialize(api, Arc::new(ScriptedRenderer::new()), config(50))
        .await
        .unwrap();

    assert_eq!(
        forum.call_log(),
        vec![
            "list_communities:1".to_string(),
            "list_posts:None:1:Active".to_string(),
        ]
    );
    let stats = cache.stats();
    assert_eq!(stats.communities, 1);
    assert_eq!(stats.home_pages, 1);
    assert_eq!(stats.posts, 1);

    cache.home(1, SortType::Active).await.unwrap();
    assert_eq!(CallCounts::get(&forum.calls.list_posts), 1);
}

#[tokio::test]
async fn partial_community_refresh_stores_nothing() {
    let forum = Arc::new(ScriptedForum::new());
    forum.add_community(1, "art");
    forum.add_community(2, "theory");
    forum.add_community(3, "zines");
    forum.fail_communities_from_page(Some(2));
    let cache = build(&forum, ScriptedRenderer::new(), 2);

    let err = cache.communities().await.unwrap_err();
    assert!(matches!(err, CacheError::Transport(_)));
    assert_eq!(cache.stats().communities, 0);

    // A name from the first page is not served from a half-finished refresh
    let err = cache.community("theory").await.unwrap_err();
    assert!(matches!(err, CacheError::Transport(_)));

    forum.fail_communities_from_page(None);
    let names: Vec<String> = cache
        .communities()
        .await
        .unwrap()
        .into_iter()
        .map(|community| community.name)
        .collect();
    assert_eq!(names, vec!["art", "theory", "zines"]);
    // 2 failed refreshes of 2 calls each, then 2 successful pages
    assert_eq!(CallCounts::get(&forum.calls.list_communities), 6);
}

#[tokio::test]
async fn community_refresh_after_failure_keeps_cached_pages() {
    let forum = Arc::new(ScriptedForum::new());
    forum.add_community(7, "theory");
    forum.set_listing(Some(7), vec![post_view(1, 7, "theory", "body")]);
    let cache = build(&forum, ScriptedRenderer::new(), 1);

    cache.community_posts("theory", 1, SortType::Hot).await.unwrap();
    forum.add_community(8, "zines");
    forum.fail_communities_from_page(Some(2));
    assert!(cache.community("elsewhere").await.is_err());

    let theory = cache.community("theory").await.unwrap();
    assert_eq!(theory.cached_pages(), 1);
    assert_eq!(cache.stats().communities, 1);
}
