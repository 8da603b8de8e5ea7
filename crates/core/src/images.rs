//! Image discovery, filtering and ranking.
//!
//! Images come from two places: page-level meta tags (`og:image` and
//! friends) and `<img>` elements inside the content. Both pass the same
//! filter and the same URL resolution, and the final sequence never holds two
//! entries with the same URL.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::parse::{Document, Element};

/// Substrings that mark an image URL as site chrome rather than content.
///
/// Matched case-insensitively against the resolved URL.
pub const BLOCKLIST: &[&str] = &["avatar", "logo", "icon", "banner", "ad-", "pixel", "tracker", "1x1"];

const SOURCE_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src", "data-original"];

const META_IMAGE_KEYS: &[&str] = &["og:image", "twitter:image", "twitter:image:src"];

const FEATURED_CLASS_HINTS: &[&str] = &["featured", "hero", "lead-image", "main-image", "wp-post-image"];

/// Sources shorter than this are treated as placeholders.
const MIN_SOURCE_LEN: usize = 10;

/// Size in pixels above which an explicit width or height marks a priority image.
const PRIORITY_DIMENSION: u32 = 300;

/// A content image with an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleImage {
    pub url: String,
    pub alt: String,
}

impl ArticleImage {
    pub fn new(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self { url: url.into(), alt: alt.into() }
    }
}

/// Whether `url` contains a block-listed substring.
pub fn is_blocked(url: &str) -> bool {
    let lower = url.to_lowercase();
    BLOCKLIST.iter().any(|needle| lower.contains(needle))
}

/// Drops repeated URLs, keeping the first occurrence (and its alt text).
pub fn dedup_images<I>(images: I) -> Vec<ArticleImage>
where
    I: IntoIterator<Item = ArticleImage>,
{
    let mut seen = HashSet::new();
    images.into_iter().filter(|img| seen.insert(img.url.clone())).collect()
}

/// Filters, resolves and orders images for one document.
#[derive(Debug, Clone)]
pub struct ImageRanker {
    base: Url,
}

impl ImageRanker {
    /// Creates a ranker resolving relative sources against `base_origin`.
    pub fn new(base_origin: &Url) -> Self {
        Self { base: base_origin.clone() }
    }

    /// Resolves and validates a raw source attribute value.
    ///
    /// Returns `None` for empty, too-short, data-URI, unresolvable or
    /// block-listed sources.
    pub fn resolve(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.len() < MIN_SOURCE_LEN || raw.to_ascii_lowercase().starts_with("data:") {
            return None;
        }

        let resolved = self.base.join(raw).ok()?;
        if !matches!(resolved.scheme(), "http" | "https") {
            return None;
        }

        let resolved = resolved.to_string();
        if is_blocked(&resolved) {
            return None;
        }

        Some(resolved)
    }

    /// Images declared by `og:image`, `twitter:image` and `twitter:image:src`, in that order.
    ///
    /// Alt text comes from `og:image:alt` or `twitter:image:alt`, else the
    /// document title.
    pub fn meta_images(&self, doc: &Document) -> Vec<ArticleImage> {
        let alt = doc
            .meta_content("og:image:alt")
            .or_else(|| doc.meta_content("twitter:image:alt"))
            .or_else(|| doc.title())
            .unwrap_or_default();

        META_IMAGE_KEYS
            .iter()
            .filter_map(|key| doc.meta_content(key))
            .filter_map(|src| self.resolve(&src))
            .map(|url| ArticleImage::new(url, alt.clone()))
            .collect()
    }

    /// Every acceptable `<img>` under `scopes`, priority images first.
    ///
    /// The partition is stable: within each group document order is kept.
    /// Nested scopes may yield the same element twice; callers dedup.
    pub fn scan(&self, scopes: &[Element<'_>]) -> Vec<ArticleImage> {
        let mut priority = Vec::new();
        let mut normal = Vec::new();

        for scope in scopes {
            let imgs = if scope.tag_name() == "img" {
                vec![scope.clone()]
            } else {
                scope.select("img").unwrap_or_default()
            };

            for img in imgs {
                let Some(url) = SOURCE_ATTRS.iter().filter_map(|attr| img.attr(attr)).find_map(|src| self.resolve(src))
                else {
                    continue;
                };
                let is_priority = is_priority(&img, &url);
                let image = ArticleImage::new(url, img.attr("alt").unwrap_or_default().trim());
                if is_priority {
                    priority.push(image);
                } else {
                    normal.push(image);
                }
            }
        }

        priority.extend(normal);
        priority
    }

    /// Meta images followed by the images inside `containers`.
    ///
    /// When the containers hold fewer than two usable images the whole
    /// document is scanned instead.
    pub fn rank(&self, doc: &Document, containers: &[Element<'_>]) -> Vec<ArticleImage> {
        let mut content = dedup_images(self.scan(containers));
        if content.len() < 2 {
            debug!(found = content.len(), "few container images, scanning whole document");
            content = self.scan(&[doc.root()]);
        }

        dedup_images(self.meta_images(doc).into_iter().chain(content))
    }
}

fn is_priority(img: &Element<'_>, url: &str) -> bool {
    let large = ["width", "height"]
        .iter()
        .filter_map(|attr| img.attr(attr))
        .filter_map(parse_dimension)
        .any(|px| px > PRIORITY_DIMENSION);

    let in_figure = img.parent().is_some_and(|p| p.tag_name() == "figure");

    let class = img.attr("class").unwrap_or_default().to_lowercase();
    let featured_class = FEATURED_CLASS_HINTS.iter().any(|hint| class.contains(hint));

    let lower_url = url.to_lowercase();
    let featured_url = lower_url.contains("featured") || lower_url.contains("hero");

    large || in_figure || featured_class || featured_url
}

/// Leading digits of a `width`/`height` value such as `640` or `640px`.
fn parse_dimension(value: &str) -> Option<u32> {
    let digits: String = value.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ranker() -> ImageRanker {
        ImageRanker::new(&Url::parse("https://example.com/").unwrap())
    }

    #[rstest]
    #[case("/images/photo.jpg", Some("https://example.com/images/photo.jpg"))]
    #[case("https://cdn.example.com/a/photo.jpg", Some("https://cdn.example.com/a/photo.jpg"))]
    #[case("//cdn.example.com/photo.jpg", Some("https://cdn.example.com/photo.jpg"))]
    #[case("data:image/png;base64,AAAAAAAAAA", None)]
    #[case("/a.png", None)]
    #[case("/static/Site-LOGO.png", None)]
    #[case("/img/user-avatar-42.jpg", None)]
    #[case("/static/ad-slot-top.gif", None)]
    #[case("/t/tracker.gif?id=1", None)]
    #[case("/media/1x1.gif", None)]
    fn test_resolve(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(ranker().resolve(raw).as_deref(), expected);
    }

    #[test]
    fn test_scan_prefers_lazy_attributes_in_order() {
        let html = r#"<div id="c">
            <img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=" data-src="/lazy/zero.jpg">
            <img src="" data-src="/lazy/one.jpg" data-original="/lazy/ignored.jpg" alt=" One ">
            <img data-lazy-src="/lazy/two.jpg">
            <img alt="no source">
        </div>"#;
        let doc = Document::parse(html).unwrap();
        let scope = doc.select_first("#c").unwrap();

        let images = ranker().scan(&[scope]);
        assert_eq!(
            images,
            vec![
                ArticleImage::new("https://example.com/lazy/zero.jpg", ""),
                ArticleImage::new("https://example.com/lazy/one.jpg", "One"),
                ArticleImage::new("https://example.com/lazy/two.jpg", ""),
            ]
        );
    }

    #[test]
    fn test_scan_stable_priority_partition() {
        let html = r#"<article>
            <img src="/img/plain-1.jpg">
            <figure><img src="/img/figure.jpg"></figure>
            <img src="/img/plain-2.jpg" width="120">
            <img src="/img/wide.jpg" width="800px">
            <img src="/img/hero-shot.jpg">
            <img src="/img/classed.jpg" class="wp-post-image">
        </article>"#;
        let doc = Document::parse(html).unwrap();
        let article = doc.select_first("article").unwrap();

        let urls: Vec<String> = ranker().scan(&[article]).into_iter().map(|i| i.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/img/figure.jpg",
                "https://example.com/img/wide.jpg",
                "https://example.com/img/hero-shot.jpg",
                "https://example.com/img/classed.jpg",
                "https://example.com/img/plain-1.jpg",
                "https://example.com/img/plain-2.jpg",
            ]
        );
    }

    #[test]
    fn test_meta_images_order_and_alt() {
        let html = r#"<html><head>
            <title>Page Title</title>
            <meta name="twitter:image" content="https://example.com/tw.jpg">
            <meta property="og:image" content="/og.jpg">
            <meta property="og:image:alt" content="Cover art">
        </head></html>"#;
        let doc = Document::parse(html).unwrap();

        let images = ranker().meta_images(&doc);
        assert_eq!(
            images,
            vec![
                ArticleImage::new("https://example.com/og.jpg", "Cover art"),
                ArticleImage::new("https://example.com/tw.jpg", "Cover art"),
            ]
        );
    }

    #[test]
    fn test_meta_image_alt_falls_back_to_title() {
        let html = r#"<html><head><title>Page Title</title><meta property="og:image" content="https://example.com/og.jpg"></head></html>"#;
        let doc = Document::parse(html).unwrap();
        assert_eq!(ranker().meta_images(&doc)[0].alt, "Page Title");
    }

    #[test]
    fn test_rank_broadens_when_containers_are_sparse() {
        let html = r#"<html><head><meta property="og:image" content="https://example.com/img/cover.jpg"></head><body>
            <article><p>Text</p><img src="/img/inline.jpg"></article>
            <div class="gallery"><img src="/img/outside.jpg"><img src="/img/cover.jpg" alt="dup"></div>
        </body></html>"#;
        let doc = Document::parse(html).unwrap();
        let article = doc.select_first("article").unwrap();

        let urls: Vec<String> = ranker().rank(&doc, &[article]).into_iter().map(|i| i.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/img/cover.jpg",
                "https://example.com/img/inline.jpg",
                "https://example.com/img/outside.jpg",
            ]
        );
    }

    #[test]
    fn test_rank_keeps_to_containers_when_enough() {
        let html = r#"<body>
            <article><img src="/img/one.jpg"><img src="/img/two.jpg"></article>
            <div><img src="/img/elsewhere.jpg"></div>
        </body>"#;
        let doc = Document::parse(html).unwrap();
        let article = doc.select_first("article").unwrap();

        let images = ranker().rank(&doc, &[article]);
        assert_eq!(images.len(), 2);
        assert!(images.iter().all(|i| !i.url.contains("elsewhere")));
    }

    #[test]
    fn test_dedup_keeps_first_alt() {
        let images = vec![
            ArticleImage::new("https://example.com/a.jpg", "first"),
            ArticleImage::new("https://example.com/b.jpg", "b"),
            ArticleImage::new("https://example.com/a.jpg", "second"),
        ];
        let deduped = dedup_images(images);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].alt, "first");
    }

    #[test]
    fn test_no_blocklisted_output() {
        let html = r#"<article>
            <img src="/brand/logo-dark.svg"><img src="/u/avatar/7.png"><img src="/icons/share-icon.png">
            <img src="/img/photo-large.jpg">
        </article>"#;
        let doc = Document::parse(html).unwrap();
        let images = ranker().rank(&doc, &doc.select("article").unwrap());
        assert_eq!(images.len(), 1);
        assert!(images.iter().all(|i| !is_blocked(&i.url)));
    }
}
