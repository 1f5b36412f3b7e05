use chrono::{DateTime, Duration, Utc};

/// Whether a value fetched at `fetched_at` has outlived `ttl`.
pub fn is_expired(fetched_at: DateTime<Utc>, ttl: Duration) -> bool {
    is_expired_at(fetched_at, ttl, Utc::now())
}

/// [`is_expired`] against an explicit `now`.
pub fn is_expired_at(fetched_at: DateTime<Utc>, ttl: Duration, now: DateTime<Utc>) -> bool {
    now - fetched_at > ttl
}
