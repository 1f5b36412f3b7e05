use crate::config::{env_list, env_string};

/// Settings for markdown rendering and the text substitutions applied after it.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Origins whose links are rewritten to `site_url`.
    pub canonical_domains: Vec<String>,
    /// Origin of the local front end. Empty disables link rewriting.
    pub site_url: String,
    pub emoji_base_url: String,
    /// Shortcodes (without colons) that have an image under `emoji_base_url`.
    pub emojis: Vec<String>,
}

impl RenderConfig {
    pub fn from_env() -> Self {
        Self {
            canonical_domains: env_list(
                "HEX_CANONICAL_DOMAINS",
                &["https://hexbear.net", "https://www.hexbear.net"],
            ),
            site_url: env_string("HEX_SITE_URL", ""),
            emoji_base_url: env_string("HEX_EMOJI_BASE_URL", "/emoji"),
            emojis: env_list("HEX_EMOJIS", &[]),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
