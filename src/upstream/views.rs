//! Raw records as delivered by the upstream `/api/v3` endpoints
//!
//! Only the fields the cache consumes are modelled; everything else in the
//! payload is ignored during deserialization.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

// ===== Persons =====

#[derive(Debug, Clone, Deserialize)]
pub struct PersonRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Identity URL on the person's home server.
    pub actor_id: String,
    #[serde(default)]
    pub local: bool,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(deserialize_with = "timestamp")]
    pub published: DateTime<Utc>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonAggregates {
    #[serde(default)]
    pub post_count: i64,
    #[serde(default)]
    pub comment_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonView {
    pub person: PersonRecord,
    #[serde(default)]
    pub counts: PersonAggregates,
    #[serde(default)]
    pub is_admin: bool,
}

/// Response of the person lookup: the person plus their recent posts.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonDetails {
    pub person_view: PersonView,
    #[serde(default)]
    pub posts: Vec<PostView>,
}

// ===== Communities =====

#[derive(Debug, Clone, Deserialize)]
pub struct CommunityRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommunityView {
    pub community: CommunityRecord,
}

// ===== Posts =====

#[derive(Debug, Clone, Deserialize)]
pub struct PostRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub community_id: i64,
    pub creator_id: i64,
    #[serde(deserialize_with = "timestamp")]
    pub published: DateTime<Utc>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub featured_local: bool,
    #[serde(default)]
    pub featured_community: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostAggregates {
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub comments: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostView {
    pub post: PostRecord,
    pub creator: PersonRecord,
    pub community: CommunityRecord,
    #[serde(default)]
    pub counts: PostAggregates,
    #[serde(default)]
    pub creator_is_admin: bool,
    #[serde(default)]
    pub creator_is_moderator: bool,
}

// ===== Comments =====

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRecord {
    pub id: i64,
    pub creator_id: i64,
    pub post_id: i64,
    #[serde(default)]
    pub content: String,
    /// Dot separated ancestry, top-level comments look like `0.57`.
    pub path: String,
    #[serde(deserialize_with = "timestamp")]
    pub published: DateTime<Utc>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentAggregates {
    #[serde(default)]
    pub upvotes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentView {
    pub comment: CommentRecord,
    pub creator: PersonRecord,
    /// The post the comment belongs to; only its creator matters here.
    pub post: PostRecord,
    #[serde(default)]
    pub counts: CommentAggregates,
    #[serde(default)]
    pub creator_is_admin: bool,
    #[serde(default)]
    pub creator_is_moderator: bool,
}

// ===== Timestamps =====

/// Older upstream versions send naive UTC timestamps without an offset.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}

fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_offset_and_naive_timestamps() {
        let with_offset = parse_timestamp("2023-07-01T12:30:00.123456Z").unwrap();
        let naive = parse_timestamp("2023-07-01T12:30:00.123456").unwrap();

        assert_eq!(with_offset, naive);
        assert_eq!(naive.year(), 2023);
        assert_eq!(naive.minute(), 30);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn decodes_comment_view() {
        let payload = r#"{
            "comment": {
                "id": 12,
                "creator_id": 3,
                "post_id": 42,
                "content": "hello",
                "path": "0.9.12",
                "published": "2023-07-01T12:30:00",
                "updated": null,
                "ap_id": "ignored"
            },
            "creator": {
                "id": 3,
                "name": "alice",
                "actor_id": "https://hexbear.net/u/alice",
                "local": true,
                "published": "2021-01-01T00:00:00Z"
            },
            "post": {
                "id": 42,
                "name": "A post",
                "community_id": 7,
                "creator_id": 3,
                "published": "2023-07-01T10:00:00Z"
            },
            "counts": { "upvotes": 5, "downvotes": 1 }
        }"#;

        let view: CommentView = serde_json::from_str(payload).unwrap();
        assert_eq!(view.comment.id, 12);
        assert_eq!(view.comment.path, "0.9.12");
        assert!(view.comment.updated.is_none());
        assert_eq!(view.post.creator_id, 3);
        assert_eq!(view.counts.upvotes, 5);
        assert!(!view.creator_is_admin);
    }

    #[test]
    fn rejects_garbage_timestamp() {
        let payload = r#"{
            "id": 1,
            "name": "bob",
            "actor_id": "https://example.com/u/bob",
            "published": "not a date"
        }"#;

        assert!(serde_json::from_str::<PersonRecord>(payload).is_err());
    }
}
