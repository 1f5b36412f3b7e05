pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod store;
pub mod threading;
pub mod upstream;

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support;

use env_logger::Env;
use std::sync::Once;

pub use cache::{Cache, CacheStats};
pub use config::CacheConfig;
pub use error::{CacheError, CacheResult, EntityKind};
pub use models::{
    Comment, CommentSortType, Community, Page, Paging, Person, Post, PostComments, SortType,
};
pub use render::{MarkdownRenderer, RenderConfig, RenderError, TextRenderer};
pub use upstream::{FetchError, ForumApi, HttpForumApi, UpstreamConfig};

static LOGGER: Once = Once::new();

/// Install the `env_logger` backend once; `RUST_LOG` overrides the default filter.
pub fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    });
}
