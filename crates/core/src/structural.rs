//! Readability-style whole-document extraction.
//!
//! The structural extractor ignores field-specific markup. It strips
//! boilerplate, scores every plausible container, lets scores flow up to
//! parents and grandparents, and reads the body from the best container plus
//! its qualifying siblings. Title, author, date and publisher come from the
//! document's JSON-LD, with `<title>` as the title fallback.
//!
//! # Example
//!
//! ```rust
//! use glean_core::{RawDocument, StructuralConfig, StructuralExtractor};
//!
//! let config = StructuralConfig::builder().min_score(10.0).build();
//! let extractor = StructuralExtractor::with_config(config);
//! let raw = RawDocument::new("<html><body><nav>Home</nav></body></html>", "https://example.com/").unwrap();
//!
//! let record = extractor.extract(&raw).unwrap();
//! assert!(record.content.is_none());
//! ```

use std::cmp::Ordering;

use serde_json::Value;
use tracing::debug;

use crate::Result;
use crate::dates::normalize_date;
use crate::fetch::RawDocument;
use crate::fusion::{PartialRecord, Strategy};
use crate::images::{ImageRanker, dedup_images};
use crate::parse::{Document, Element};
use crate::preprocess::{PreprocessConfig, normalize_whitespace, preprocess_html};
use crate::scoring::{BOILERPLATE_RE, NEGATIVE_RE, POSITIVE_RE, ScoreConfig, link_density, score_element};
use crate::selectors::clean_title;

/// Tags that are considered potential content containers
const CANDIDATE_TAGS: &[&str] = &["div", "article", "section", "main", "p", "td", "pre", "blockquote"];

/// Tags dropped from the body text when most of their text is link text
const LINK_CLUSTER_TAGS: &[&str] = &["div", "p", "section", "aside", "nav", "li", "ul", "ol"];

/// JSON-LD `@type`s describing the page's main article.
const ARTICLE_TYPES: &[&str] = &[
    "Article",
    "NewsArticle",
    "BlogPosting",
    "ReportageNewsArticle",
    "AnalysisNewsArticle",
    "OpinionNewsArticle",
    "TechArticle",
    "ScholarlyArticle",
    "Report",
    "WebPage",
];

/// Configuration for structural extraction.
///
/// # Example
///
/// ```rust
/// use glean_core::StructuralConfig;
///
/// let config = StructuralConfig::builder()
///     .min_score(25.0)
///     .char_threshold(500)
///     .sibling_threshold(0.3)
///     .build();
/// assert_eq!(config.nb_top_candidates, 5);
/// ```
#[derive(Debug, Clone)]
pub struct StructuralConfig {
    /// Minimum score the top candidate needs (default: 20.0).
    pub min_score: f64,

    /// Reference body length; containers need a tenth of it to be scored (default: 500).
    pub char_threshold: usize,

    /// Number of best candidates ranked for the final pick (default: 5).
    pub nb_top_candidates: usize,

    /// Share of the top score a sibling needs to be included (default: 0.2).
    pub sibling_threshold: f64,

    /// Link density above which a nested block is left out of the body text (default: 0.5).
    pub max_link_density: f64,

    /// Boilerplate stripping applied before the DOM is built.
    pub preprocess: PreprocessConfig,
}

impl Default for StructuralConfig {
    fn default() -> Self {
        Self {
            min_score: 20.0,
            char_threshold: 500,
            nb_top_candidates: 5,
            sibling_threshold: 0.2,
            max_link_density: 0.5,
            preprocess: PreprocessConfig::default(),
        }
    }
}

impl StructuralConfig {
    /// Creates a new builder for StructuralConfig.
    pub fn builder() -> StructuralConfigBuilder {
        StructuralConfigBuilder::new()
    }
}

/// Builder for StructuralConfig.
pub struct StructuralConfigBuilder {
    config: StructuralConfig,
}

impl StructuralConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: StructuralConfig::default() }
    }

    /// Sets the minimum score threshold.
    pub fn min_score(mut self, value: f64) -> Self {
        self.config.min_score = value;
        self
    }

    /// Sets the character threshold.
    pub fn char_threshold(mut self, value: usize) -> Self {
        self.config.char_threshold = value;
        self
    }

    /// Sets the number of top candidates.
    pub fn nb_top_candidates(mut self, value: usize) -> Self {
        self.config.nb_top_candidates = value;
        self
    }

    /// Sets the sibling score ratio.
    pub fn sibling_threshold(mut self, value: f64) -> Self {
        self.config.sibling_threshold = value;
        self
    }

    /// Sets the link density cutoff for nested blocks.
    pub fn max_link_density(mut self, value: f64) -> Self {
        self.config.max_link_density = value;
        self
    }

    /// Replaces the preprocessing configuration.
    pub fn preprocess(mut self, value: PreprocessConfig) -> Self {
        self.config.preprocess = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> StructuralConfig {
        self.config
    }
}

impl Default for StructuralConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A candidate element with its accumulated score
#[derive(Debug, Clone)]
struct Candidate<'a> {
    element: Element<'a>,
    score: f64,
}

/// Whole-document heuristic extractor.
#[derive(Debug, Clone, Default)]
pub struct StructuralExtractor {
    config: StructuralConfig,
    score_config: ScoreConfig,
}

impl StructuralExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StructuralConfig) -> Self {
        Self { config, score_config: ScoreConfig::default() }
    }

    pub fn config(&self) -> &StructuralConfig {
        &self.config
    }

    /// Extracts the main content reading of `raw`.
    ///
    /// Returns an empty record when no container reaches `min_score`.
    ///
    /// # Errors
    ///
    /// Returns [`GleanError::ParseError`](crate::GleanError::ParseError) only
    /// if no DOM could be built.
    pub fn extract(&self, raw: &RawDocument) -> Result<PartialRecord> {
        let cleaned = preprocess_html(raw.html(), &self.config.preprocess);
        let doc = Document::parse(&cleaned)?;

        let mut candidates = identify_candidates(&doc, &self.config, &self.score_config);
        propagate_scores(&mut candidates, &self.score_config);

        let Some(top) = select_top_candidate(&candidates, &self.config) else {
            debug!(candidates = candidates.len(), "no readable container");
            return Ok(PartialRecord::empty(Strategy::Structural));
        };
        if top.score < self.config.min_score {
            debug!(score = top.score, threshold = self.config.min_score, "top candidate below threshold");
            return Ok(PartialRecord::empty(Strategy::Structural));
        }

        let blocks = select_blocks(top, &candidates, &self.config);
        debug!(score = top.score, tag = %top.element.tag_name(), blocks = blocks.len(), "selected content blocks");

        let max_link_density = self.config.max_link_density;
        let text = blocks
            .iter()
            .map(|block| block.text_excluding(|el| is_link_cluster(el, max_link_density)))
            .collect::<Vec<_>>()
            .join(" ");
        let content = normalize_whitespace(&text);
        let images = dedup_images(ImageRanker::new(raw.base_origin()).scan(&blocks));

        let original = Document::parse(raw.html())?;
        let metadata = read_metadata(&original, raw.hostname());

        Ok(PartialRecord {
            strategy: Strategy::Structural,
            title: metadata.title,
            content: (!content.is_empty()).then_some(content),
            author: metadata.author,
            date: metadata.date,
            source: metadata.source,
            images,
        })
    }
}

/// Share widgets, related-link lists and similar blocks inside the content.
fn is_link_cluster(element: &Element<'_>, max_link_density: f64) -> bool {
    LINK_CLUSTER_TAGS.contains(&element.tag_name().as_str()) && link_density(element) > max_link_density
}

/// Every container with enough text, scored on its own merits.
fn identify_candidates<'a>(
    doc: &'a Document, config: &StructuralConfig, score_config: &ScoreConfig,
) -> Vec<Candidate<'a>> {
    let min_chars = config.char_threshold / 10;
    let mut candidates = Vec::new();

    for tag in CANDIDATE_TAGS {
        for element in doc.select(tag).unwrap_or_default() {
            let always = matches!(element.tag_name().as_str(), "article" | "section" | "main");
            if !always && element.text().trim().chars().count() < min_chars {
                continue;
            }
            let score = score_element(&element, score_config).total;
            candidates.push(Candidate { element, score });
        }
    }

    candidates
}

/// Adds half of each candidate's own score to its parent and a third to its
/// grandparent. Ancestors that were not candidates yet join with their own
/// base score.
fn propagate_scores<'a>(candidates: &mut Vec<Candidate<'a>>, score_config: &ScoreConfig) {
    let seeds: Vec<(Element<'a>, f64)> = candidates.iter().map(|c| (c.element.clone(), c.score)).collect();

    for (element, score) in seeds {
        let Some(parent) = element.parent() else { continue };
        let grandparent = parent.parent();

        add_score(candidates, parent, score / 2.0, score_config);
        if let Some(grandparent) = grandparent {
            add_score(candidates, grandparent, score / 3.0, score_config);
        }
    }
}

fn add_score<'a>(candidates: &mut Vec<Candidate<'a>>, element: Element<'a>, bonus: f64, score_config: &ScoreConfig) {
    match candidates.iter_mut().find(|c| c.element == element) {
        Some(existing) => existing.score += bonus,
        None => {
            let score = score_element(&element, score_config).total + bonus;
            candidates.push(Candidate { element, score });
        }
    }
}

/// Best of the `nb_top_candidates` highest scores, ties broken by container
/// kind and then text length.
fn select_top_candidate<'a, 'b>(candidates: &'b [Candidate<'a>], config: &StructuralConfig) -> Option<&'b Candidate<'a>> {
    let mut ranked: Vec<&Candidate<'a>> = candidates.iter().collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(config.nb_top_candidates.max(1));
    ranked.into_iter().max_by(|a, b| compare_candidates(a, b))
}

fn compare_candidates(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    a.score
        .partial_cmp(&b.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| candidate_priority(&a.element.tag_name()).cmp(&candidate_priority(&b.element.tag_name())))
        .then_with(|| a.element.text().chars().count().cmp(&b.element.text().chars().count()))
}

fn candidate_priority(tag_name: &str) -> u8 {
    match tag_name {
        "article" | "main" | "section" => 3,
        "div" => 2,
        _ => 1,
    }
}

/// The top candidate plus qualifying siblings, in document order.
///
/// A sibling qualifies when its score reaches `sibling_threshold` of the top
/// score, or when it is a paragraph of more than 80 characters with link
/// density below 0.25.
fn select_blocks<'a>(top: &Candidate<'a>, candidates: &[Candidate<'a>], config: &StructuralConfig) -> Vec<Element<'a>> {
    let Some(parent) = top.element.parent() else {
        return vec![top.element.clone()];
    };
    let threshold = top.score * config.sibling_threshold;

    parent
        .children()
        .filter(|sibling| {
            if *sibling == top.element {
                return true;
            }
            if has_boilerplate_name(sibling) {
                return false;
            }
            let score = candidates.iter().find(|c| c.element == *sibling).map(|c| c.score);
            if score.is_some_and(|s| s >= threshold) {
                return true;
            }
            sibling.tag_name() == "p"
                && sibling.text().trim().chars().count() > 80
                && link_density(sibling) < 0.25
        })
        .collect()
}

/// Whether any class/id token names a comment thread, an ad slot, or
/// other furniture without also naming content.
fn has_boilerplate_name(el: &Element<'_>) -> bool {
    [el.attr("id"), el.attr("class")]
        .into_iter()
        .flatten()
        .flat_map(str::split_whitespace)
        .any(|name| BOILERPLATE_RE.is_match(name) || (NEGATIVE_RE.is_match(name) && !POSITIVE_RE.is_match(name)))
}

#[derive(Debug, Default)]
struct Metadata {
    title: Option<String>,
    author: Option<String>,
    date: Option<String>,
    source: Option<String>,
}

/// Document-level metadata from JSON-LD, falling back to `<title>`.
fn read_metadata(doc: &Document, hostname: &str) -> Metadata {
    let items = doc.json_ld();
    let article = items.iter().find(|item| is_article(item)).or_else(|| items.iter().find(|i| i.get("headline").is_some()));

    let mut metadata = Metadata::default();
    if let Some(article) = article {
        metadata.title = json_str(article, "headline").or_else(|| json_str(article, "name"));
        metadata.author = article.get("author").and_then(author_names);
        metadata.date = json_str(article, "datePublished").map(|d| normalize_date(&d));
        metadata.source = article.get("publisher").and_then(name_of);
    }

    if metadata.title.is_none() {
        metadata.title = doc.title().map(|t| clean_title(&t, hostname)).filter(|t| !t.is_empty());
    }

    metadata
}

fn is_article(item: &Value) -> bool {
    match item.get("@type") {
        Some(Value::String(t)) => ARTICLE_TYPES.contains(&t.as_str()),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(|t| ARTICLE_TYPES.contains(&t)),
        _ => false,
    }
}

fn json_str(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// A name from a string or an object with a `name`.
fn name_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Object(_) => json_str(value, "name"),
        _ => None,
    }
}

/// Author names from a string, an object or an array of either.
fn author_names(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let names: Vec<String> = items.iter().filter_map(name_of).collect();
            (!names.is_empty()).then(|| names.join(", "))
        }
        other => name_of(other),
    }
}
