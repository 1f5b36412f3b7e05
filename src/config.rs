use chrono::Duration;
use std::env;

use crate::models::MAX_PAGE_SIZE;

pub(crate) fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_duration_millis(key: &str, default_millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(env_u64(key, default_millis))
}

/// Seconds as a `chrono::Duration`; values too large to represent fall back
/// to `default_secs`.
fn env_duration_secs(key: &str, default_secs: u64) -> Duration {
    duration_secs_or(env_u64(key, default_secs), default_secs)
}

fn duration_secs_or(secs: u64, default_secs: u64) -> Duration {
    secs_to_duration(secs)
        .or_else(|| secs_to_duration(default_secs))
        .unwrap_or_else(Duration::zero)
}

fn secs_to_duration(secs: u64) -> Option<Duration> {
    i64::try_from(secs).ok().and_then(Duration::try_seconds)
}

pub(crate) fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Comma separated list, blank entries dropped.
pub(crate) fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    match env::var(key) {
        Ok(value) => split_list(&value),
        Err(_) => default.iter().map(|item| item.to_string()).collect(),
    }
}

pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub const DEFAULT_IMAGE_PREFIX: &str = "https://hexbear.net/pictrs/image/";

/// Freshness and paging settings for the cache.
///
/// Comment sets have no TTL: they stay valid until the owning post is
/// refreshed.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub post_ttl: Duration,
    pub page_ttl: Duration,
    pub person_ttl: Duration,
    /// Items requested per listing call, at most [`MAX_PAGE_SIZE`].
    pub page_size: u32,
    /// URL prefixes of the site's own image host.
    pub image_prefixes: Vec<String>,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        let page_size = env_u64("HEX_PAGE_SIZE", MAX_PAGE_SIZE as u64)
            .clamp(1, MAX_PAGE_SIZE as u64) as u32;

        Self {
            post_ttl: env_duration_secs("HEX_POST_TTL_SECS", 15 * 60),
            page_ttl: env_duration_secs("HEX_PAGE_TTL_SECS", 15 * 60),
            person_ttl: env_duration_secs("HEX_PERSON_TTL_SECS", 40 * 60),
            page_size,
            image_prefixes: env_list("HEX_IMAGE_PREFIXES", &[DEFAULT_IMAGE_PREFIX]),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
