//! Plain-text substitutions applied to rendered markup.

use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::OnceLock;

static SHORTCODE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Matches `:name:` with a name made of letters, digits, `_` and `-`.
fn shortcode_regex() -> &'static Regex {
    SHORTCODE_REGEX
        .get_or_init(|| Regex::new(r":([A-Za-z0-9_-]+):").expect("Invalid shortcode regex"))
}

/// Paths on the canonical site that have a local equivalent.
const REWRITTEN_PATHS: &[&str] = &["/communities", "/ppb", "/post/", "/c/", "/u/"];

/// Swaps known `:shortcode:` occurrences for inline images.
#[derive(Debug, Clone)]
pub struct EmojiReplacer {
    base_url: String,
    known: HashSet<String>,
}

impl EmojiReplacer {
    pub fn new(base_url: &str, emojis: impl IntoIterator<Item = String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            known: emojis.into_iter().collect(),
        }
    }

    /// Replace shortcodes in text content. Tags and their attribute values
    /// are copied through untouched.
    pub fn replace(&self, html: &str) -> String {
        if self.known.is_empty() {
            return html.to_string();
        }

        let mut out = String::with_capacity(html.len());
        let mut rest = html;
        while let Some(open) = rest.find('<') {
            out.push_str(&self.replace_text(&rest[..open]));
            let tag_end = rest[open..]
                .find('>')
                .map(|close| open + close + 1)
                .unwrap_or(rest.len());
            out.push_str(&rest[open..tag_end]);
            rest = &rest[tag_end..];
        }
        out.push_str(&self.replace_text(rest));
        out
    }

    fn replace_text(&self, text: &str) -> String {
        shortcode_regex()
            .replace_all(text, |caps: &Captures| {
                let name = &caps[1];
                if self.known.contains(name) {
                    format!(
                        r#"<img class="emoji" src="{}/{}.png" alt=":{}:" title=":{}:">"#,
                        self.base_url, name, name, name
                    )
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned()
    }
}

/// Points links at the canonical site back at the local front end.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    pairs: Vec<(String, String)>,
}

impl LinkRewriter {
    pub fn new(canonical_domains: &[String], site_url: &str) -> Self {
        let site = site_url.trim_end_matches('/');
        if site.is_empty() {
            return Self { pairs: Vec::new() };
        }

        let pairs = canonical_domains
            .iter()
            .map(|domain| domain.trim_end_matches('/'))
            .filter(|domain| !domain.is_empty() && *domain != site)
            .flat_map(|domain| {
                REWRITTEN_PATHS
                    .iter()
                    .map(move |path| (format!("{domain}{path}"), format!("{site}{path}")))
            })
            .collect();

        Self { pairs }
    }

    pub fn rewrite(&self, text: &str) -> String {
        let mut rewritten = text.to_string();
        for (from, to) in &self.pairs {
            if rewritten.contains(from.as_str()) {
                rewritten = rewritten.replace(from.as_str(), to);
            }
        }
        rewritten
    }
}
