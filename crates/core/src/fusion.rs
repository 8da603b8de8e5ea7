//! Per-field merge of the two extractors' outputs.
//!
//! Body text trusts the structural extractor first, since it measures where
//! the prose actually is. Every other scalar field trusts the selector
//! extractor first, since markup conventions like `og:title` are explicit.
//! Images are the union of both, selector sequence first.

use std::fmt;

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::article::ExtractedArticle;
use crate::fetch::site_name;
use crate::images::{ArticleImage, dedup_images};

/// Placeholder used for a missing author or date.
pub const UNKNOWN: &str = "Unknown";

/// Which extraction strategy produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Structural,
    Selector,
    /// No extractor produced the value; a fallback was used.
    Default,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Structural => write!(f, "structural"),
            Strategy::Selector => write!(f, "selector"),
            Strategy::Default => write!(f, "default"),
        }
    }
}

/// A value for one field, tagged with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCandidate<T> {
    pub value: T,
    pub strategy: Strategy,
}

/// Everything one extractor found. Absent fields mean "no opinion".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialRecord {
    pub strategy: Strategy,
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub source: Option<String>,
    pub images: Vec<ArticleImage>,
}

impl PartialRecord {
    /// A record that contributes nothing.
    pub fn empty(strategy: Strategy) -> Self {
        Self { strategy, title: None, content: None, author: None, date: None, source: None, images: Vec::new() }
    }

    /// Whether every field is absent or blank.
    pub fn is_empty(&self) -> bool {
        [&self.title, &self.content, &self.author, &self.date, &self.source]
            .iter()
            .all(|field| non_blank(field).is_none())
            && self.images.is_empty()
    }

    fn candidate(&self, field: &Option<String>) -> Option<FieldCandidate<String>> {
        non_blank(field).map(|value| FieldCandidate { value: value.to_string(), strategy: self.strategy })
    }
}

/// Which strategy supplied each scalar field of a fused record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub title: Strategy,
    pub content: Strategy,
    pub author: Strategy,
    pub date: Strategy,
    pub source: Strategy,
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn pick(
    name: &str, first: Option<FieldCandidate<String>>, second: Option<FieldCandidate<String>>, fallback: String,
) -> FieldCandidate<String> {
    let chosen = first.or(second).unwrap_or(FieldCandidate { value: fallback, strategy: Strategy::Default });
    debug!(field = name, strategy = %chosen.strategy, "resolved field");
    chosen
}

/// Merges the two partial records into the final article.
pub fn fuse(structural: &PartialRecord, selector: &PartialRecord, url: &Url) -> ExtractedArticle {
    fuse_with_provenance(structural, selector, url).0
}

/// Like [`fuse`], also reporting which strategy won each field.
///
/// ```rust
/// use glean_core::{PartialRecord, Strategy, fuse_with_provenance};
/// use url::Url;
///
/// let url = Url::parse("https://www.example.com/a").unwrap();
/// let structural = PartialRecord::empty(Strategy::Structural);
/// let selector = PartialRecord::empty(Strategy::Selector);
///
/// let (article, provenance) = fuse_with_provenance(&structural, &selector, &url);
/// assert_eq!(article.source, "example.com");
/// assert_eq!(article.author, "Unknown");
/// assert_eq!(provenance.source, Strategy::Default);
/// ```
pub fn fuse_with_provenance(
    structural: &PartialRecord, selector: &PartialRecord, url: &Url,
) -> (ExtractedArticle, Provenance) {
    let content = pick(
        "content",
        structural.candidate(&structural.content),
        selector.candidate(&selector.content),
        String::new(),
    );
    let title = pick("title", selector.candidate(&selector.title), structural.candidate(&structural.title), String::new());
    let author = pick(
        "author",
        selector.candidate(&selector.author),
        structural.candidate(&structural.author),
        UNKNOWN.to_string(),
    );
    let date =
        pick("date", selector.candidate(&selector.date), structural.candidate(&structural.date), UNKNOWN.to_string());
    let source =
        pick("source", selector.candidate(&selector.source), structural.candidate(&structural.source), site_name(url));

    let images = dedup_images(selector.images.iter().chain(&structural.images).cloned());

    let provenance = Provenance {
        title: title.strategy,
        content: content.strategy,
        author: author.strategy,
        date: date.strategy,
        source: source.strategy,
    };

    let article =
        ExtractedArticle::new(url.as_str(), title.value, content.value, source.value, author.value, date.value, images);

    (article, provenance)
}
