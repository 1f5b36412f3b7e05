//! Text rendering: raw markdown bodies to safe display markup.

pub mod config;
pub mod markdown;
pub mod replace;

use thiserror::Error;

pub use config::RenderConfig;
pub use markdown::MarkdownRenderer;
pub use replace::{EmojiReplacer, LinkRewriter};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render failed: {0}")]
    Render(String),
}

/// Converts raw user-authored text into markup that is safe to embed.
pub trait TextRenderer: Send + Sync {
    fn render(&self, raw: &str) -> Result<String, RenderError>;
}
