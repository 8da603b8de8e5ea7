//! HTML parsing and DOM queries.
//!
//! This module provides the [`Document`] and [`Element`] types used by both
//! extractors: CSS-selector lookup, attribute and text extraction, parent
//! navigation, and a text walk that skips unwanted subtrees (the read-only
//! equivalent of cloning a node and stripping its boilerplate).
//!
//! # Example
//!
//! ```rust
//! use glean_core::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs[0].text(), "Paragraph");
//! ```

use scraper::{ElementRef, Html, Node, Selector};

use crate::{GleanError, Result};

/// Tags that start a new line of text when rendered.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure", "footer",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table",
    "td", "th", "tr", "ul",
];

/// Represents a parsed HTML document.
///
/// # Example
///
/// ```rust
/// use glean_core::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html).unwrap();
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// html5ever recovers from malformed markup the way browsers do, so
    /// unbalanced or truncated documents still produce a tree.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html })
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`GleanError::ParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use glean_core::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// First element matching `selector`, treating an invalid selector as no match.
    pub fn select_first(&'_ self, selector: &str) -> Option<Element<'_>> {
        let sel = parse_selector(selector).ok()?;
        self.html.select(&sel).next().map(|el| Element { element: el })
    }

    /// The `<html>` element.
    pub fn root(&self) -> Element<'_> {
        Element { element: self.html.root_element() }
    }

    /// The `<body>` element, if the parser produced one.
    pub fn body(&self) -> Option<Element<'_>> {
        self.select_first("body")
    }

    /// Gets the trimmed content of the `<title>` element if present and non-empty.
    pub fn title(&self) -> Option<String> {
        self.select_first("title")
            .map(|el| el.text().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Gets all text content from the document, concatenated as-is.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }

    /// Content of the first `<meta>` whose `name`, `property` or `itemprop` equals `key`.
    ///
    /// Empty or whitespace-only content counts as absent.
    pub fn meta_content(&self, key: &str) -> Option<String> {
        ["name", "property", "itemprop"].iter().find_map(|attr| {
            let selector = format!("meta[{}=\"{}\"]", attr, key);
            self.select(&selector).ok()?.iter().find_map(|el| {
                el.attr("content")
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
            })
        })
    }

    /// Every JSON-LD block that parses as JSON, in document order.
    ///
    /// Top-level arrays and `@graph` containers are flattened into their items.
    pub fn json_ld(&self) -> Vec<serde_json::Value> {
        let mut values = Vec::new();
        if let Ok(elements) = self.select("script[type=\"application/ld+json\"]") {
            for el in elements {
                if let Ok(value) = serde_json::from_str::<serde_json::Value>(el.text().trim()) {
                    flatten_json_ld(value, &mut values);
                }
            }
        }
        values
    }
}

fn flatten_json_ld(value: serde_json::Value, out: &mut Vec<serde_json::Value>) {
    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                flatten_json_ld(item, out);
            }
        }
        serde_json::Value::Object(mut obj) => {
            if let Some(graph) = obj.remove("@graph") {
                flatten_json_ld(graph, out);
            }
            if !obj.is_empty() {
                out.push(serde_json::Value::Object(obj));
            }
        }
        _ => {}
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| GleanError::ParseError(format!("Invalid selector '{}': {}", selector, e)))
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use glean_core::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Parent element, if this is not the root.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(|element| Element { element })
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        self.element.children().filter_map(ElementRef::wrap).map(|element| Element { element })
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`GleanError::ParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Text of this element, skipping every descendant for which `skip`
    /// returns true.
    ///
    /// Block-level boundaries contribute a space so adjacent paragraphs do
    /// not run together. The element itself is never tested against `skip`.
    pub fn text_excluding<F>(&self, skip: F) -> String
    where
        F: Fn(&Element<'a>) -> bool,
    {
        let mut out = String::new();
        collect_text(self.element, &skip, &mut out);
        out
    }
}

fn collect_text<'a, F>(node: ElementRef<'a>, skip: &F, out: &mut String)
where
    F: Fn(&Element<'a>) -> bool,
{
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(element) = ElementRef::wrap(child) else { continue };
                if skip(&Element { element }) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&element.value().name());
                if block {
                    out.push(' ');
                }
                collect_text(element, skip, out);
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}
