use std::sync::LazyLock;

use lol_html::{HtmlRewriter, Settings, doc_comments, element};
use regex::Regex;
use tracing::debug;

use crate::scoring::{BOILERPLATE_RE, POSITIVE_RE, UNLIKELY_RE};

static HIDDEN_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(display\s*:\s*none|visibility\s*:\s*hidden)").expect("hidden style pattern is valid")
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Configuration for boilerplate removal ahead of structural scoring
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Tags removed together with their content
    pub strip_tags: Vec<&'static str>,
    /// Whether to remove HTML comments
    pub remove_comments: bool,
    /// Whether to remove comment threads and ad slots together with their content
    pub remove_boilerplate: bool,
    /// Whether to unwrap elements whose class/id look like page furniture
    pub remove_unlikely: bool,
    /// Whether to keep unlikely-looking elements that also carry a content-like name
    pub keep_positive: bool,
    /// Whether to remove elements hidden with an inline style
    pub remove_hidden: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            strip_tags: vec![
                "script", "style", "noscript", "iframe", "svg", "canvas", "template", "nav", "aside", "form",
            ],
            remove_comments: true,
            remove_boilerplate: true,
            remove_unlikely: true,
            keep_positive: true,
            remove_hidden: true,
        }
    }
}

/// Strips boilerplate markup in one streaming pass.
///
/// Comment threads and ad slots are removed outright. Other unlikely
/// candidates are unwrapped rather than removed: their children may still
/// hold article text. If the rewriter rejects the input, the original
/// HTML is used instead. Whitespace is collapsed either way.
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let mut output: Vec<u8> = Vec::with_capacity(html.len());
    let strip_tags = config.strip_tags.clone();
    let remove_boilerplate = config.remove_boilerplate;
    let remove_unlikely = config.remove_unlikely;
    let keep_positive = config.keep_positive;
    let remove_hidden = config.remove_hidden;

    let element_content_handlers = vec![element!("*", move |el| {
        let tag = el.tag_name();
        if strip_tags.contains(&tag.as_str()) {
            el.remove();
            return Ok(());
        }

        if remove_hidden
            && let Some(style) = el.get_attribute("style")
            && HIDDEN_STYLE_RE.is_match(&style)
        {
            el.remove();
            return Ok(());
        }

        if matches!(tag.as_str(), "html" | "body" | "main" | "article") {
            return Ok(());
        }

        let names = [el.get_attribute("id"), el.get_attribute("class")];
        let mut tokens = names.iter().flatten().flat_map(|v| v.split_whitespace());

        if remove_boilerplate && tokens.clone().any(|name| BOILERPLATE_RE.is_match(name)) {
            el.remove();
            return Ok(());
        }

        if remove_unlikely
            && tokens.any(|name| UNLIKELY_RE.is_match(name) && (!keep_positive || !POSITIVE_RE.is_match(name)))
        {
            el.remove_and_keep_content();
        }

        Ok(())
    })];

    let document_content_handlers = if config.remove_comments {
        vec![doc_comments!(|c| {
            c.remove();
            Ok(())
        })]
    } else {
        Vec::new()
    };

    let mut rewriter = HtmlRewriter::new(
        Settings { element_content_handlers, document_content_handlers, ..Settings::new() },
        |chunk: &[u8]| output.extend_from_slice(chunk),
    );

    if let Err(e) = rewriter.write(html.as_bytes()).and_then(|_| rewriter.end()) {
        debug!(error = %e, "preprocessing failed, using original markup");
        return normalize_whitespace(html);
    }

    if output.is_empty() {
        return normalize_whitespace(html);
    }

    normalize_whitespace(&String::from_utf8_lossy(&output))
}

/// Collapses whitespace runs to single spaces and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}
