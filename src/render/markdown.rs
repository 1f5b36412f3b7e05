use super::config::RenderConfig;
use super::replace::{EmojiReplacer, LinkRewriter};
use super::{RenderError, TextRenderer};

/// Markdown to sanitised HTML, followed by emoji and link substitutions.
pub struct MarkdownRenderer {
    options: comrak::Options<'static>,
    emoji: EmojiReplacer,
    links: LinkRewriter,
}

impl MarkdownRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        let mut options = comrak::Options::default();
        let ext = &mut options.extension;
        ext.strikethrough = true;
        ext.table = true;
        ext.autolink = true;

        Self {
            options,
            emoji: EmojiReplacer::new(&config.emoji_base_url, config.emojis.iter().cloned()),
            links: LinkRewriter::new(&config.canonical_domains, &config.site_url),
        }
    }
}

impl TextRenderer for MarkdownRenderer {
    fn render(&self, raw: &str) -> Result<String, RenderError> {
        if raw.contains('\0') {
            return Err(RenderError::Render("input contains NUL bytes".to_string()));
        }
        if raw.trim().is_empty() {
            return Ok(String::new());
        }

        let html = comrak::markdown_to_html(raw, &self.options);
        let clean = ammonia::clean(&html);
        Ok(self.links.rewrite(&self.emoji.replace(&clean)))
    }
}
