//! Field-by-field extraction from markup conventions.
//!
//! Each field has an ordered list of [`Probe`]s. The first probe that yields
//! a usable value wins. Probes that fail to match, carry an invalid selector
//! or produce an unusable value are skipped.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::dates::{find_date_in_text, normalize_date};
use crate::fetch::RawDocument;
use crate::fusion::{PartialRecord, Strategy};
use crate::images::ImageRanker;
use crate::parse::{Document, Element};
use crate::preprocess::normalize_whitespace;
use crate::Result;

/// Authors longer than this are almost always a captured paragraph.
const MAX_AUTHOR_LEN: usize = 100;

/// Date text longer than this is a container, not a date.
const MAX_DATE_TEXT_LEN: usize = 100;

const DEFAULT_MIN_CONTENT_CHARS: usize = 500;

const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template", "nav", "header", "footer", "aside", "form", "iframe"];

const SKIP_ROLES: &[&str] = &["navigation", "banner", "contentinfo", "complementary"];

static SKIP_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(ad|ads|advert\w*|advertisement)$|^ad[-_]|sidebar|comment|social|share|menu")
        .expect("boilerplate name pattern is valid")
});

static AUTHOR_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(written\s+by\b|author\s*:|by\b)\s*[:\-]?\s*").expect("author prefix pattern is valid")
});

/// One way of looking up a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// `<meta>` content by name, property or itemprop
    Meta(&'static str),
    /// Whitespace-collapsed text of each matching element
    Text(&'static str),
    /// Attribute value of each matching element carrying it
    Attr(&'static str, &'static str),
}

pub const TITLE_PROBES: &[Probe] = &[
    Probe::Meta("og:title"),
    Probe::Meta("twitter:title"),
    Probe::Text(
        "h1[class*=title], h1[class*=headline], h1[class*=Title], h1[class*=Headline], h1[itemprop=headline]",
    ),
    Probe::Text("article h1"),
    Probe::Text("h1"),
    Probe::Text("title"),
];

pub const SOURCE_PROBES: &[Probe] = &[
    Probe::Meta("og:site_name"),
    Probe::Meta("application-name"),
    Probe::Meta("publisher"),
    Probe::Text("[itemprop=publisher] [itemprop=name]"),
    Probe::Attr("[itemprop=publisher] [itemprop=name]", "content"),
    Probe::Text(".publisher"),
];

pub const AUTHOR_PROBES: &[Probe] = &[
    Probe::Meta("author"),
    Probe::Meta("article:author"),
    Probe::Meta("parsely-author"),
    Probe::Text("[rel=author]"),
    Probe::Text("[itemprop=author]"),
    Probe::Text(".author"),
    Probe::Text("[class*=author]"),
    Probe::Text("[class*=byline]"),
];

pub const DATE_PROBES: &[Probe] = &[
    Probe::Meta("article:published_time"),
    Probe::Meta("og:published_time"),
    Probe::Meta("date"),
    Probe::Meta("pubdate"),
    Probe::Meta("publish-date"),
    Probe::Meta("DC.date.issued"),
    Probe::Attr("time[datetime]", "datetime"),
    Probe::Attr("[datetime]", "datetime"),
    Probe::Text("[class*=date]"),
    Probe::Text("[class*=time]"),
    Probe::Text("time"),
];

pub const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "[role=article]",
    "[role=main]",
    ".article",
    ".article-content",
    ".article-body",
    ".post",
    ".post-content",
    ".entry-content",
    ".story-body",
    ".content",
    "main",
    "#content",
    "#main",
    "#article",
    "#story",
];

impl Probe {
    /// Raw values this probe yields, in document order.
    fn values(&self, doc: &Document) -> Vec<String> {
        match *self {
            Probe::Meta(key) => doc.meta_content(key).into_iter().collect(),
            Probe::Text(css) => doc
                .select(css)
                .unwrap_or_default()
                .iter()
                .map(|el| normalize_whitespace(&el.text()))
                .filter(|text| !text.is_empty())
                .collect(),
            Probe::Attr(css, attr) => doc
                .select(css)
                .unwrap_or_default()
                .iter()
                .filter_map(|el| el.attr(attr))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// First usable value across `probes`.
///
/// `accept` cleans a raw value and returns `None` to reject it, which moves
/// the cascade on to the next value or probe.
pub fn first_match<F>(doc: &Document, probes: &[Probe], accept: F) -> Option<String>
where
    F: Fn(&Probe, String) -> Option<String>,
{
    probes
        .iter()
        .find_map(|probe| probe.values(doc).into_iter().find_map(|value| accept(probe, value)))
}

/// Removes site-name suffixes and trailing boilerplate from a title.
///
/// First a `" | Site"`, `" - Site"` or `" : Site"` tail naming the host's
/// first label is dropped, then everything from the first remaining `|`,
/// separator dash or separator colon. A dash or colon joining two word
/// characters (`Self-driving`, `10:30`) is not a separator. The result may
/// be empty, in which case callers treat the title as missing.
///
/// ```rust
/// use glean_core::clean_title;
///
/// assert_eq!(clean_title("Big Story | NewsSite", "newssite.com"), "Big Story");
/// assert_eq!(clean_title("Self-driving cars - Part 2", "example.org"), "Self-driving cars");
/// assert_eq!(clean_title("| NewsSite", "newssite.com"), "");
/// ```
pub fn clean_title(raw: &str, hostname: &str) -> String {
    let mut title = normalize_whitespace(raw);

    let host = hostname.strip_prefix("www.").unwrap_or(hostname);
    if let Some(name) = host.split('.').next().filter(|n| !n.is_empty())
        && let Ok(suffix) = Regex::new(&format!(r"(?i)\s*[|\-:]\s*{}.*$", regex::escape(name)))
    {
        title = suffix.replace(&title, "").trim().to_string();
    }

    for separator in ['|', '-', ':'] {
        if let Some(pos) = separator_position(&title, separator) {
            title = title[..pos].trim().to_string();
        }
    }

    title
}

fn separator_position(title: &str, separator: char) -> Option<usize> {
    title.char_indices().find_map(|(pos, c)| {
        if c != separator {
            return None;
        }
        if separator == '|' {
            return Some(pos);
        }
        let before = title[..pos].chars().next_back();
        let after = title[pos + c.len_utf8()..].chars().next();
        let joins_words = before.is_some_and(char::is_alphanumeric) && after.is_some_and(char::is_alphanumeric);
        (!joins_words).then_some(pos)
    })
}

/// Drops a leading `By`, `Author:` or `Written by`.
pub fn strip_author_prefix(raw: &str) -> String {
    AUTHOR_PREFIX_RE.replace(raw.trim(), "").trim().to_string()
}

fn accept_author(probe: &Probe, value: String) -> Option<String> {
    if matches!(probe, Probe::Meta("article:author")) && (value.starts_with("http://") || value.starts_with("https://")) {
        return None;
    }
    let author = strip_author_prefix(&value);
    (!author.is_empty() && author.chars().count() <= MAX_AUTHOR_LEN).then_some(author)
}

fn accept_date(probe: &Probe, value: String) -> Option<String> {
    match probe {
        Probe::Text(_) => {
            let raw = find_date_in_text(&value).unwrap_or(&value);
            (raw.chars().count() <= MAX_DATE_TEXT_LEN).then(|| normalize_date(raw))
        }
        _ => Some(normalize_date(&value)),
    }
}

/// Whether an element is page furniture when reading container text.
fn is_boilerplate(el: &Element<'_>) -> bool {
    if SKIP_TAGS.contains(&el.tag_name().as_str()) {
        return true;
    }
    if el.attr("role").is_some_and(|role| SKIP_ROLES.contains(&role.trim().to_ascii_lowercase().as_str())) {
        return true;
    }
    let id = el.attr("id").into_iter();
    let classes = el.attr("class").into_iter().flat_map(str::split_whitespace);
    id.chain(classes).any(|name| SKIP_NAME_RE.is_match(name))
}

/// Selector-cascade extractor.
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    min_content_chars: usize,
}

impl Default for SelectorExtractor {
    fn default() -> Self {
        Self { min_content_chars: DEFAULT_MIN_CONTENT_CHARS }
    }
}

impl SelectorExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the container text length below which the whole `<body>` is used.
    pub fn with_min_content_chars(mut self, min_content_chars: usize) -> Self {
        self.min_content_chars = min_content_chars;
        self
    }

    /// Runs every field cascade over `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`GleanError::ParseError`](crate::GleanError::ParseError) only if no DOM could be built.
    pub fn extract(&self, raw: &RawDocument) -> Result<PartialRecord> {
        let doc = Document::parse(raw.html())?;

        let title = first_match(&doc, TITLE_PROBES, |_, value| {
            let cleaned = clean_title(&value, raw.hostname());
            (!cleaned.is_empty()).then_some(cleaned)
        });
        let source = first_match(&doc, SOURCE_PROBES, |_, value| Some(value));
        let author = first_match(&doc, AUTHOR_PROBES, accept_author);
        let date = first_match(&doc, DATE_PROBES, accept_date).or_else(|| {
            let found = find_date_in_text(raw.html()).map(normalize_date);
            if found.is_some() {
                debug!("date taken from free-text scan");
            }
            found
        });

        let containers = self.containers(&doc);
        let content = self.content(&doc, &containers);
        let images = ImageRanker::new(raw.base_origin()).rank(&doc, &containers);

        debug!(
            title = title.is_some(),
            author = author.is_some(),
            date = date.is_some(),
            content_chars = content.as_deref().map_or(0, |c| c.chars().count()),
            images = images.len(),
            "selector extraction finished"
        );

        Ok(PartialRecord { strategy: Strategy::Selector, title, content, author, date, source, images })
    }

    /// Every element matching a content selector, in selector order.
    fn containers<'a>(&self, doc: &'a Document) -> Vec<Element<'a>> {
        let mut found: Vec<Element<'a>> = Vec::new();
        for css in CONTENT_SELECTORS {
            for el in doc.select(css).unwrap_or_default() {
                if !found.contains(&el) {
                    found.push(el);
                }
            }
        }
        found
    }

    /// Longest cleaned container text, or the cleaned body when that is too short.
    fn content(&self, doc: &Document, containers: &[Element<'_>]) -> Option<String> {
        let longest = containers
            .iter()
            .map(|el| normalize_whitespace(&el.text_excluding(is_boilerplate)))
            .max_by_key(|text| text.chars().count())
            .unwrap_or_default();

        let text = if longest.chars().count() < self.min_content_chars {
            debug!(chars = longest.chars().count(), "containers too short, using body text");
            doc.body()
                .map(|body| normalize_whitespace(&body.text_excluding(is_boilerplate)))
                .filter(|body| !body.is_empty())
                .unwrap_or(longest)
        } else {
            longest
        };

        (!text.is_empty()).then_some(text)
    }
}
