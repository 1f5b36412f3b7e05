//! Conversion of raw upstream records into cached entities
//!
//! Rendering the body text is the only step that can fail. Everything else is
//! derived display data: creator names with role markers, creator links, and
//! the split between external links and site-hosted images.

use chrono::{DateTime, Utc};
use reqwest::Url;
use std::sync::Arc;

use crate::error::{CacheError, CacheResult, EntityKind};
use crate::models::{Comment, Person, Post};
use crate::render::TextRenderer;
use crate::upstream::{CommentView, PersonRecord, PersonView, PostView};

/// Display name for a person, followed by role markers.
///
/// Local users show their display name (falling back to the account name),
/// remote users show `name@host`. `[A]` marks admins, `[M]` moderators and
/// `[OP]` the author of the post being viewed. Pass `false` for roles that
/// make no sense in the calling context.
pub fn creator_display_name(person: &PersonRecord, admin: bool, moderator: bool, op: bool) -> String {
    let mut name = if person.local {
        match person.display_name.as_deref() {
            Some(display) if !display.trim().is_empty() => display.to_string(),
            _ => person.name.clone(),
        }
    } else {
        match actor_host(&person.actor_id) {
            Some(host) => format!("{}@{}", person.name, host),
            None => person.name.clone(),
        }
    };

    if admin {
        name.push_str(" [A]");
    }
    if moderator {
        name.push_str(" [M]");
    }
    if op {
        name.push_str(" [OP]");
    }
    name
}

/// Link to a person's profile: local route for local users, actor URL otherwise.
pub fn creator_url(person: &PersonRecord) -> String {
    match Url::parse(&person.actor_id) {
        Ok(url) if !person.local => url.to_string(),
        _ => format!("/u/{}", person.name),
    }
}

fn actor_host(actor_id: &str) -> Option<String> {
    Url::parse(actor_id)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}

/// Recognises links that point at the site's own image host.
#[derive(Debug, Clone, Default)]
pub struct ImageClassifier {
    prefixes: Vec<String>,
}

impl ImageClassifier {
    pub fn new(prefixes: impl IntoIterator<Item = String>) -> Self {
        Self {
            prefixes: prefixes
                .into_iter()
                .filter(|prefix| !prefix.is_empty())
                .collect(),
        }
    }

    pub fn is_hosted_image(&self, url: &str) -> bool {
        self.prefixes.iter().any(|prefix| url.starts_with(prefix))
    }

    /// Split a post link into `(url, image_url)`; at most one is `Some`.
    pub fn classify(&self, url: Option<&str>) -> (Option<String>, Option<String>) {
        match url.map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) if self.is_hosted_image(url) => (None, Some(url.to_string())),
            Some(url) => (Some(url.to_string()), None),
            None => (None, None),
        }
    }
}

/// Renders and derives display fields for every record kind.
#[derive(Clone)]
pub(crate) struct Normalizer {
    renderer: Arc<dyn TextRenderer>,
    images: ImageClassifier,
}

impl Normalizer {
    pub(crate) fn new(renderer: Arc<dyn TextRenderer>, images: ImageClassifier) -> Self {
        Self { renderer, images }
    }

    fn render(&self, kind: EntityKind, id: impl ToString, raw: &str) -> CacheResult<String> {
        self.renderer
            .render(raw)
            .map_err(|err| CacheError::normalization(kind, id, err))
    }

    pub(crate) fn post(&self, view: &PostView, fetched_at: DateTime<Utc>) -> CacheResult<Post> {
        let record = &view.post;
        let body = self.render(
            EntityKind::Post,
            record.id,
            record.body.as_deref().unwrap_or_default(),
        )?;
        let (url, image_url) = self.images.classify(record.url.as_deref());

        Ok(Post {
            id: record.id,
            name: record.name.clone(),
            url,
            body,
            community_id: record.community_id,
            published_at: record.published,
            updated_at: record.updated,
            featured_local: record.featured_local,
            featured_community: record.featured_community,

            // Everyone knows who posted the post they are looking at
            creator_display_name: creator_display_name(
                &view.creator,
                view.creator_is_admin,
                view.creator_is_moderator,
                false,
            ),
            creator_id: view.creator.id,
            creator_url: creator_url(&view.creator),
            community_name: view.community.name.clone(),
            image_url,
            upvotes: view.counts.upvotes,
            comment_count: view.counts.comments,
            fetched_at,
        })
    }

    pub(crate) fn comment(&self, view: &CommentView) -> CacheResult<Comment> {
        let record = &view.comment;
        let content = self.render(EntityKind::Comments, record.id, &record.content)?;

        Ok(Comment {
            id: record.id,
            content,
            published_at: record.published,
            updated_at: record.updated,
            path: record.path.clone(),

            creator_display_name: creator_display_name(
                &view.creator,
                view.creator_is_admin,
                view.creator_is_moderator,
                record.creator_id == view.post.creator_id,
            ),
            creator_url: creator_url(&view.creator),
            upvotes: view.counts.upvotes,
            children: Vec::new(),
        })
    }

    pub(crate) fn person(
        &self,
        view: &PersonView,
        post_ids: Vec<i64>,
        fetched_at: DateTime<Utc>,
    ) -> CacheResult<Person> {
        let record = &view.person;
        let bio = self.render(
            EntityKind::Person,
            &record.name,
            record.bio.as_deref().unwrap_or_default(),
        )?;

        Ok(Person {
            actor_id: record.actor_id.clone(),
            name: record.name.clone(),
            // Moderation and OP have no meaning on a profile
            display_name: creator_display_name(record, view.is_admin, false, false),
            bio,
            local: record.local,
            url: creator_url(record),
            published_at: record.published,
            updated_at: record.updated,

            comment_count: view.counts.comment_count,
            post_count: view.counts.post_count,
            post_ids,
            fetched_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, display: Option<&str>, actor_id: &str, local: bool) -> PersonRecord {
        PersonRecord {
            id: 1,
            name: name.to_string(),
            display_name: display.map(str::to_string),
            actor_id: actor_id.to_string(),
            local,
            bio: None,
            published: Utc::now(),
            updated: None,
        }
    }

    #[test]
    fn local_names_prefer_display_name() {
        let alice = person("alice", Some("Alice"), "https://hexbear.net/u/alice", true);
        assert_eq!(creator_display_name(&alice, false, false, false), "Alice");

        let bob = person("bob", Some("  "), "https://hexbear.net/u/bob", true);
        assert_eq!(creator_display_name(&bob, false, false, false), "bob");
    }

    #[test]
    fn remote_names_carry_host() {
        let carol = person("carol", Some("Carol"), "https://lemmy.example/u/carol", false);
        assert_eq!(
            creator_display_name(&carol, false, false, false),
            "carol@lemmy.example"
        );

        let broken = person("dave", None, "not a url", false);
        assert_eq!(creator_display_name(&broken, false, false, false), "dave");
    }

    #[test]
    fn role_markers_in_order() {
        let alice = person("alice", None, "https://hexbear.net/u/alice", true);
        assert_eq!(
            creator_display_name(&alice, true, true, true),
            "alice [A] [M] [OP]"
        );
        assert_eq!(creator_display_name(&alice, false, true, false), "alice [M]");
    }

    #[test]
    fn creator_urls() {
        let local = person("alice", None, "https://hexbear.net/u/alice", true);
        assert_eq!(creator_url(&local), "/u/alice");

        let remote = person("carol", None, "https://lemmy.example/u/carol", false);
        assert_eq!(creator_url(&remote), "https://lemmy.example/u/carol");

        let broken = person("dave", None, "::", false);
        assert_eq!(creator_url(&broken), "/u/dave");
    }

    #[test]
    fn hosted_images_are_promoted() {
        let images = ImageClassifier::new(vec![
            "https://hexbear.net/pictrs/image/".to_string(),
            "https://img.example/".to_string(),
        ]);

        assert_eq!(
            images.classify(Some("https://hexbear.net/pictrs/image/abc.png")),
            (None, Some("https://hexbear.net/pictrs/image/abc.png".to_string()))
        );
        assert_eq!(
            images.classify(Some("https://img.example/x.jpg")),
            (None, Some("https://img.example/x.jpg".to_string()))
        );
        assert_eq!(
            images.classify(Some("https://news.example/story")),
            (Some("https://news.example/story".to_string()), None)
        );
        assert_eq!(images.classify(Some("  ")), (None, None));
        assert_eq!(images.classify(None), (None, None));
    }

    #[test]
    fn empty_prefixes_never_match() {
        let images = ImageClassifier::new(vec![String::new()]);
        assert!(!images.is_hosted_image("https://anything.example/"));
    }
}
