//! Main extraction API.
//!
//! [`Extractor`] runs the whole pipeline: fetch, both extraction strategies
//! over the same [`RawDocument`], then fusion. The free function [`extract`]
//! does the same with default settings.
//!
//! # Example
//!
//! ```rust
//! use glean_core::Extractor;
//!
//! let html = r#"<html><head><meta property="og:title" content="Big Story | NewsSite"></head>
//!     <body><article><p>Body text.</p></article></body></html>"#;
//! let article = Extractor::new().extract_html(html, "https://newssite.com/big-story").unwrap();
//!
//! assert_eq!(article.title, "Big Story");
//! assert_eq!(article.source, "newssite.com");
//! assert_eq!(article.author, "Unknown");
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::Result;
use crate::article::ExtractedArticle;
use crate::fetch::{FetchConfig, RawDocument};
#[cfg(feature = "fetch")]
use crate::fetch::fetch_url;
use crate::fusion::{PartialRecord, Provenance, Strategy, fuse_with_provenance};
use crate::selectors::SelectorExtractor;
use crate::structural::{StructuralConfig, StructuralExtractor};

/// Configuration for the whole pipeline.
///
/// # Example
///
/// ```rust
/// use glean_core::ExtractorConfig;
///
/// let config = ExtractorConfig::builder()
///     .timeout(30)
///     .parallel(false)
///     .build();
/// assert_eq!(config.fetch.timeout, 30);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// HTTP settings for [`Extractor::extract`].
    pub fetch: FetchConfig,

    /// Settings for the structural strategy.
    pub structural: StructuralConfig,

    /// Container text length below which the selector strategy reads the whole body (default: 500).
    pub min_content_chars: usize,

    /// Run both strategies on separate threads (default: true).
    pub parallel: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            structural: StructuralConfig::default(),
            min_content_chars: 500,
            parallel: true,
        }
    }
}

impl ExtractorConfig {
    /// Creates a new builder for ExtractorConfig.
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::new()
    }
}

/// Builder for ExtractorConfig.
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ExtractorConfig::default() }
    }

    /// Sets the fetch timeout in seconds.
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.config.fetch.timeout = seconds;
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.user_agent = value.into();
        self
    }

    /// Replaces the structural configuration.
    pub fn structural(mut self, value: StructuralConfig) -> Self {
        self.config.structural = value;
        self
    }

    /// Sets the selector strategy's body fallback threshold.
    pub fn min_content_chars(mut self, value: usize) -> Self {
        self.config.min_content_chars = value;
        self
    }

    /// Sets whether the strategies run in parallel.
    pub fn parallel(mut self, value: bool) -> Self {
        self.config.parallel = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ExtractorConfig {
        self.config
    }
}

impl Default for ExtractorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// How one strategy fared on a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyReport {
    pub elapsed: Duration,
    /// False when the strategy failed or found nothing.
    pub contributed: bool,
}

/// Diagnostics for one extraction: per-field provenance and per-strategy timings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionReport {
    pub provenance: Provenance,
    pub structural: StrategyReport,
    pub selector: StrategyReport,
}

/// Runs both strategies and fuses their output.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractorConfig,
    structural: StructuralExtractor,
    selector: SelectorExtractor,
}

impl Extractor {
    /// Creates an extractor with default settings.
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    /// Creates an extractor with a custom configuration.
    pub fn with_config(config: ExtractorConfig) -> Self {
        let structural = StructuralExtractor::with_config(config.structural.clone());
        let selector = SelectorExtractor::new().with_min_content_chars(config.min_content_chars);
        Self { config, structural, selector }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Fetches `url` and extracts its article.
    ///
    /// # Errors
    ///
    /// Only fetch failures surface: [`GleanError::InvalidUrl`],
    /// [`GleanError::FetchTimeout`] and [`GleanError::FetchError`].
    ///
    /// [`GleanError::InvalidUrl`]: crate::GleanError::InvalidUrl
    /// [`GleanError::FetchTimeout`]: crate::GleanError::FetchTimeout
    /// [`GleanError::FetchError`]: crate::GleanError::FetchError
    #[cfg(feature = "fetch")]
    pub async fn extract(&self, url: &str) -> Result<ExtractedArticle> {
        let raw = fetch_url(url, &self.config.fetch).await.inspect_err(|e| {
            if e.is_fetch_failure() {
                warn!(url, error = %e, "fetch failed");
            }
        })?;
        Ok(self.extract_document(&raw))
    }

    /// Extracts an article from HTML obtained elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`GleanError::InvalidUrl`](crate::GleanError::InvalidUrl) when
    /// `url` is not an absolute http(s) URL.
    pub fn extract_html(&self, html: &str, url: &str) -> Result<ExtractedArticle> {
        let raw = RawDocument::new(html, url)?;
        Ok(self.extract_document(&raw))
    }

    /// Extracts an article from an already fetched document. Never fails:
    /// a strategy that errors or panics contributes nothing.
    pub fn extract_document(&self, raw: &RawDocument) -> ExtractedArticle {
        self.extract_document_with_report(raw).0
    }

    /// Like [`Extractor::extract_document`], also reporting provenance and timings.
    pub fn extract_document_with_report(&self, raw: &RawDocument) -> (ExtractedArticle, ExtractionReport) {
        let run_structural = || timed(Strategy::Structural, || self.structural.extract(raw));
        let run_selector = || timed(Strategy::Selector, || self.selector.extract(raw));

        let ((structural, structural_elapsed), (selector, selector_elapsed)) = if self.config.parallel {
            thread::scope(|scope| {
                let structural = scope.spawn(run_structural);
                let selector = scope.spawn(run_selector);
                (
                    join_or_empty(structural.join(), Strategy::Structural),
                    join_or_empty(selector.join(), Strategy::Selector),
                )
            })
        } else {
            (run_structural(), run_selector())
        };

        let (article, provenance) = fuse_with_provenance(&structural, &selector, raw.url());
        debug!(url = %raw.url(), content_chars = article.content.chars().count(), images = article.images.len(), "extraction complete");

        let report = ExtractionReport {
            provenance,
            structural: StrategyReport { elapsed: structural_elapsed, contributed: !structural.is_empty() },
            selector: StrategyReport { elapsed: selector_elapsed, contributed: !selector.is_empty() },
        };

        (article, report)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one strategy, turning an error or a panic into an empty record.
fn timed<F>(strategy: Strategy, run: F) -> (PartialRecord, Duration)
where
    F: FnOnce() -> Result<PartialRecord>,
{
    let start = Instant::now();
    let record = match catch_unwind(AssertUnwindSafe(run)) {
        Ok(Ok(record)) => record,
        Ok(Err(e)) => {
            warn!(%strategy, error = %e, "extraction strategy failed");
            PartialRecord::empty(strategy)
        }
        Err(_) => {
            warn!(%strategy, "extraction strategy panicked");
            PartialRecord::empty(strategy)
        }
    };

    if record.is_empty() {
        debug!(%strategy, "strategy contributed nothing");
    }

    (record, start.elapsed())
}

fn join_or_empty(
    joined: thread::Result<(PartialRecord, Duration)>, strategy: Strategy,
) -> (PartialRecord, Duration) {
    joined.unwrap_or_else(|_| {
        warn!(%strategy, "extraction worker panicked");
        (PartialRecord::empty(strategy), Duration::ZERO)
    })
}

/// Fetches `url` and extracts its article with default settings.
///
/// # Example
///
/// ```no_run
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let article = glean_core::extract("https://example.com/article").await?;
///     println!("{} ({})", article.title, article.source);
///     Ok(())
/// }
/// ```
#[cfg(feature = "fetch")]
pub async fn extract(url: &str) -> Result<ExtractedArticle> {
    Extractor::new().extract(url).await
}
