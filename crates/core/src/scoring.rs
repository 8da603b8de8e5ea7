//! Readability scoring for candidate content containers.

use std::sync::LazyLock;

use regex::Regex;

use crate::parse::Element;

/// Class/id fragments that suggest an element holds the article body.
pub(crate) static POSITIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|hentry|h-entry|main|page|post|text|blog|story)")
        .expect("positive pattern is valid")
});

/// Class/id fragments that suggest page furniture.
pub(crate) static NEGATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(banner|breadcrumbs?|combx|comment|community|disqus|extra|foot|header|menu|related|remark|rss|shoutbox|sidebar|sponsor|ad-break|agegate|pagination|pager|popup|share|social|promo|newsletter)",
    )
    .expect("negative pattern is valid")
});

/// Class/id names of comment threads and ad slots, removed with their content.
pub(crate) static BOILERPLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^ads?$|^ads?[-_]|[-_]ads?$|advert|comment|disqus").expect("boilerplate pattern is valid")
});

/// Class/id fragments whose wrappers are unwrapped before scoring.
pub(crate) static UNLIKELY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(banner|breadcrumbs?|combx|comment|community|cookie|disqus|extra|foot|header|menu|related|remark|rss|shoutbox|sidebar|sponsor|ad-break|agegate|pagination|pager|popup)",
    )
    .expect("unlikely pattern is valid")
});

/// Weights for the scoring formula.
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Added when class or id matches a positive pattern
    pub positive_weight: f64,
    /// Added when class or id matches only a negative pattern
    pub negative_weight: f64,
    /// Cap on the points awarded for text length
    pub max_char_density_score: f64,
    /// Cap on the points awarded for commas
    pub max_comma_density_score: f64,
    /// Characters per length point
    pub chars_per_point: usize,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            positive_weight: 25.0,
            negative_weight: -25.0,
            max_char_density_score: 3.0,
            max_comma_density_score: 3.0,
            chars_per_point: 100,
        }
    }
}

/// Breakdown of one element's score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementScore {
    pub tag_weight: f64,
    pub class_weight: f64,
    pub text_density: f64,
    /// Share of the text that sits inside links, 0.0 to 1.0
    pub link_density: f64,
    pub total: f64,
}

/// Prior for a tag being the article container.
///
/// Containers score positively, list and heading furniture negatively.
pub fn tag_weight(tag_name: &str) -> f64 {
    match tag_name {
        "article" => 10.0,
        "section" => 8.0,
        "div" | "main" => 5.0,
        "td" | "blockquote" => 3.0,
        "form" => -3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" | "header" | "footer" | "nav" | "aside" => -5.0,
        _ => 0.0,
    }
}

/// Class/id adjustment. The id is checked before the classes and a positive
/// match wins over a negative one within the same attribute.
pub fn class_weight(element: &Element<'_>, config: &ScoreConfig) -> f64 {
    let id = element.attr("id").into_iter();
    let classes = element.attr("class").into_iter().flat_map(str::split_whitespace);

    for name in id.chain(classes) {
        if POSITIVE_RE.is_match(name) {
            return config.positive_weight;
        }
        if NEGATIVE_RE.is_match(name) {
            return config.negative_weight;
        }
    }

    0.0
}

/// Points for text length and comma count, each capped.
pub fn text_density(text: &str, config: &ScoreConfig) -> f64 {
    let chars = text.chars().count() / config.chars_per_point.max(1);
    let char_score = (chars as f64).min(config.max_char_density_score);
    let comma_score = (text.matches(',').count() as f64).min(config.max_comma_density_score);

    char_score + comma_score
}

/// Ratio of link text characters to all text characters.
pub fn link_density(element: &Element<'_>) -> f64 {
    let text_length = element.text().chars().count();
    if text_length == 0 {
        return 0.0;
    }

    let link_length: usize = element
        .select("a")
        .unwrap_or_default()
        .iter()
        .map(|link| link.text().chars().count())
        .sum();

    link_length as f64 / text_length as f64
}

/// Scores an element as a potential article container.
///
/// The raw score (tag + class + density) is scaled down by link density.
/// Content-rich or positively named elements only take half the link
/// penalty, since long articles legitimately contain many links.
pub fn score_element(element: &Element<'_>, config: &ScoreConfig) -> ElementScore {
    let text = element.text();
    let tag_weight = tag_weight(&element.tag_name());
    let class_weight = class_weight(element, config);
    let text_density = text_density(&text, config);
    let link_density = link_density(element);

    let lenient = class_weight > 0.0 || text.chars().count() > 500;
    let link_penalty = if lenient { 1.0 - link_density * 0.5 } else { 1.0 - link_density };
    let total = (tag_weight + class_weight + text_density) * link_penalty;

    ElementScore { tag_weight, class_weight, text_density, link_density, total }
}
