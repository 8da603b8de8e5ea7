//! The extracted article record and its renderings.
//!
//! [`ExtractedArticle`] is the single output of extraction. It serializes
//! with camelCase keys (`featuredImage`) and can be rendered as JSON, plain
//! text or Markdown with TOML frontmatter.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::images::ArticleImage;
use crate::{GleanError, Result};

/// Default number of images shown when rendering.
pub const DEFAULT_GALLERY_SIZE: usize = 6;

const WORDS_PER_MINUTE: f64 = 200.0;

const TEXT_WIDTH: usize = 80;

/// Output format for rendering an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The full record as pretty-printed JSON.
    #[default]
    Json,
    /// Header block followed by wrapped body text.
    Text,
    /// Markdown with TOML frontmatter.
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = GleanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(GleanError::Serialize(format!("unknown output format '{}'", other))),
        }
    }
}

/// The clean article record produced by extraction.
///
/// `featured_image` is always the first entry of `images`, so construct
/// records through [`ExtractedArticle::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedArticle {
    pub title: String,
    pub content: String,
    pub source: String,
    pub author: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<ArticleImage>,
    pub images: Vec<ArticleImage>,
    /// The page URL the record was extracted from.
    pub url: String,
}

impl ExtractedArticle {
    pub fn new(
        url: impl Into<String>, title: String, content: String, source: String, author: String, date: String,
        images: Vec<ArticleImage>,
    ) -> Self {
        let featured_image = images.first().cloned();
        Self { title, content, source, author, date, featured_image, images, url: url.into() }
    }

    /// Whether the body holds at least `min` non-whitespace-trimmed characters.
    ///
    /// An empty body is never sufficient, even for `min == 0`.
    pub fn has_sufficient_content(&self, min: usize) -> bool {
        let length = self.content.trim().chars().count();
        length > 0 && length >= min
    }

    /// Gate for callers that need a usable body before continuing.
    ///
    /// # Errors
    ///
    /// Returns [`GleanError::InsufficientContent`] with the measured length.
    pub fn ensure_sufficient_content(&self, min: usize) -> Result<&Self> {
        if self.has_sufficient_content(min) {
            Ok(self)
        } else {
            Err(GleanError::InsufficientContent { length: self.content.trim().chars().count(), min })
        }
    }

    /// Number of whitespace-separated words in the body.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Estimated reading time in minutes at 200 words per minute.
    pub fn reading_time(&self) -> f64 {
        self.word_count() as f64 / WORDS_PER_MINUTE
    }

    /// The first `limit` images, for presentation.
    pub fn gallery(&self, limit: usize) -> &[ArticleImage] {
        &self.images[..self.images.len().min(limit)]
    }

    /// The record as a JSON value.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| GleanError::Serialize(e.to_string()))
    }

    /// Renders the article. JSON always carries every image; the text and
    /// Markdown renderings list at most `gallery` of them.
    pub fn render(&self, format: OutputFormat, gallery: usize) -> Result<String> {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(self).map_err(|e| GleanError::Serialize(e.to_string())),
            OutputFormat::Text => Ok(self.to_text(gallery)),
            OutputFormat::Markdown => Ok(self.to_markdown(gallery)),
        }
    }

    /// Plain text: an underlined title, a byline, the wrapped body and image URLs.
    pub fn to_text(&self, gallery: usize) -> String {
        let mut output = String::new();

        if !self.title.is_empty() {
            output.push_str(&self.title);
            output.push('\n');
            output.push_str(&"=".repeat(self.title.chars().count()));
            output.push('\n');
        }

        let byline = [("By", &self.author), ("Date", &self.date), ("Site", &self.source)]
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect::<Vec<_>>();
        if !byline.is_empty() {
            output.push_str(&byline.join(" | "));
            output.push('\n');
        }

        output.push('\n');
        output.push_str(&wrap_text(&self.content, TEXT_WIDTH));
        output.push('\n');

        let images = self.gallery(gallery);
        if !images.is_empty() {
            output.push_str("\nImages:\n");
            for image in images {
                output.push_str(&format!("- {}\n", image.url));
            }
        }

        output
    }

    /// Markdown with a TOML frontmatter block, the body and an image gallery.
    pub fn to_markdown(&self, gallery: usize) -> String {
        let mut output = String::from("+++");
        output.push_str(&format!("\ntitle = {}", toml_escape_string(&self.title)));
        output.push_str(&format!("\nauthor = {}", toml_escape_string(&self.author)));
        output.push_str(&format!("\ndate = {}", toml_escape_string(&self.date)));
        output.push_str(&format!("\nsite = {}", toml_escape_string(&self.source)));
        output.push_str(&format!("\nurl = {}", toml_escape_string(&self.url)));
        output.push_str(&format!("\nword_count = {}", self.word_count()));
        output.push_str(&format!("\nreading_time_minutes = {:.1}", self.reading_time()));
        output.push_str("\n+++\n\n");

        if !self.title.is_empty() {
            output.push_str(&format!("# {}\n\n", self.title));
        }

        output.push_str(&self.content);
        output.push('\n');

        let images = self.gallery(gallery);
        if !images.is_empty() {
            output.push_str("\n## Images\n\n");
            for image in images {
                output.push_str(&format!("![{}]({})\n", image.alt.replace(['[', ']'], ""), image.url));
            }
        }

        output
    }
}

fn toml_escape_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n"))
}

fn wrap_text(text: &str, width: usize) -> String {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(images: Vec<ArticleImage>) -> ExtractedArticle {
        ExtractedArticle::new(
            "https://example.com/story",
            "Test Article".to_string(),
            "This is a test article with some content.".to_string(),
            "example.com".to_string(),
            "Jane Doe".to_string(),
            "2024-03-15T00:00:00.000Z".to_string(),
            images,
        )
    }

    fn images(n: usize) -> Vec<ArticleImage> {
        (0..n).map(|i| ArticleImage::new(format!("https://example.com/img/{}.jpg", i), format!("alt {}", i))).collect()
    }

    #[test]
    fn test_featured_image_is_first_image() {
        let article = sample(images(3));
        assert_eq!(article.featured_image.as_ref(), article.images.first());

        let bare = sample(Vec::new());
        assert!(bare.featured_image.is_none());
    }

    #[test]
    fn test_serializes_camel_case_and_omits_missing_featured_image() {
        let json = serde_json::to_string(&sample(images(1))).unwrap();
        assert!(json.contains(r#""featuredImage":{"url":"https://example.com/img/0.jpg","alt":"alt 0"}"#));
        assert!(json.contains(r#""title":"Test Article""#));

        let json = serde_json::to_string(&sample(Vec::new())).unwrap();
        assert!(!json.contains("featuredImage"));
        assert!(json.contains(r#""images":[]"#));
    }

    #[test]
    fn test_json_round_trip_preserves_record() {
        let article = sample(images(2));
        let json = article.render(OutputFormat::Json, DEFAULT_GALLERY_SIZE).unwrap();
        let back: ExtractedArticle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, article);
    }

    #[test]
    fn test_content_gate() {
        let article = sample(Vec::new());
        assert!(article.has_sufficient_content(10));
        assert!(article.ensure_sufficient_content(10).is_ok());

        match article.ensure_sufficient_content(1000) {
            Err(GleanError::InsufficientContent { length, min }) => {
                assert_eq!(length, 41);
                assert_eq!(min, 1000);
            }
            other => panic!("expected InsufficientContent, got {:?}", other),
        }

        let mut empty = sample(Vec::new());
        empty.content = "   ".to_string();
        assert!(!empty.has_sufficient_content(0));
    }

    #[test]
    fn test_word_count_and_reading_time() {
        let mut article = sample(Vec::new());
        assert_eq!(article.word_count(), 8);

        article.content = "word ".repeat(400);
        assert_eq!(article.word_count(), 400);
        assert!((article.reading_time() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gallery_caps_images() {
        let article = sample(images(10));
        assert_eq!(article.gallery(DEFAULT_GALLERY_SIZE).len(), 6);
        assert_eq!(article.gallery(DEFAULT_GALLERY_SIZE)[0], article.images[0]);
        assert_eq!(sample(images(2)).gallery(6).len(), 2);
        assert!(article.gallery(0).is_empty());
    }

    #[test]
    fn test_to_text() {
        let text = sample(images(8)).to_text(2);
        assert!(text.starts_with("Test Article\n============\n"));
        assert!(text.contains("By: Jane Doe | Date: 2024-03-15T00:00:00.000Z | Site: example.com"));
        assert!(text.contains("This is a test article with some content."));
        assert_eq!(text.matches("https://example.com/img/").count(), 2);
    }

    #[test]
    fn test_to_markdown() {
        let mut article = sample(images(1));
        article.title = "Quote \"this\"".to_string();
        let md = article.to_markdown(DEFAULT_GALLERY_SIZE);

        assert!(md.starts_with("+++\n"));
        assert!(md.contains(r#"title = "Quote \"this\"""#));
        assert!(md.contains("word_count = 8"));
        assert!(md.contains("# Quote \"this\""));
        assert!(md.contains("![alt 0](https://example.com/img/0.jpg)"));
    }

    #[test]
    fn test_wrap_text() {
        let wrapped = wrap_text(&"lorem ipsum ".repeat(20), 30);
        assert!(wrapped.lines().all(|line| line.chars().count() <= 30));
        assert_eq!(wrapped.split_whitespace().count(), 40);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
