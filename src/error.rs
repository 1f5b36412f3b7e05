use std::fmt;
use thiserror::Error;

use crate::render::RenderError;
use crate::upstream::FetchError;

pub type CacheResult<T> = Result<T, CacheError>;

/// Entity kinds held by the cache, used to label errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    HomePage,
    Community,
    CommunityPage,
    Post,
    Comments,
    Person,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::HomePage => "home page",
            EntityKind::Community => "community",
            EntityKind::CommunityPage => "community page",
            EntityKind::Post => "post",
            EntityKind::Comments => "comments",
            EntityKind::Person => "person",
        })
    }
}

/// Failures surfaced by the public cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("{kind} {key} not found")]
    NotFound { kind: EntityKind, key: String },
    #[error("upstream fetch failed: {0}")]
    Transport(#[from] FetchError),
    #[error("failed to normalize {kind} {id}: {source}")]
    Normalization {
        kind: EntityKind,
        id: String,
        source: RenderError,
    },
}

impl CacheError {
    pub fn not_found(kind: EntityKind, key: impl ToString) -> Self {
        CacheError::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub fn normalization(kind: EntityKind, id: impl ToString, source: RenderError) -> Self {
        CacheError::Normalization {
            kind,
            id: id.to_string(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound { .. })
    }
}
