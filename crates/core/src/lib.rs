//! Glean turns arbitrary web pages into clean article records.
//!
//! Two independent strategies read the same fetched document: a
//! readability-style [structural](structural) extractor and an ordered
//! [selector](selectors) cascade. Their partial results are merged field by
//! field by [`fuse`] into an [`ExtractedArticle`].
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() -> glean_core::Result<()> {
//!     let article = glean_core::extract("https://example.com/article").await?;
//!     article.ensure_sufficient_content(100)?;
//!     println!("{} by {} ({} words)", article.title, article.author, article.word_count());
//!     Ok(())
//! }
//! ```

pub mod article;
pub mod dates;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod fusion;
pub mod images;
pub mod parse;
pub mod preprocess;
pub mod scoring;
pub mod selectors;
pub mod structural;

pub use article::{DEFAULT_GALLERY_SIZE, ExtractedArticle, OutputFormat};
pub use dates::{find_date_in_text, normalize_date, parse_date};
pub use error::{GleanError, Result};
#[cfg(feature = "fetch")]
pub use extractor::extract;
pub use extractor::{ExtractionReport, Extractor, ExtractorConfig, ExtractorConfigBuilder, StrategyReport};
#[cfg(feature = "fetch")]
pub use fetch::fetch_url;
pub use fetch::{BROWSER_USER_AGENT, FetchConfig, RawDocument, fetch_file, fetch_stdin, validate_url};
pub use fusion::{FieldCandidate, PartialRecord, Provenance, Strategy, fuse, fuse_with_provenance};
pub use images::{ArticleImage, ImageRanker, dedup_images};
pub use parse::{Document, Element};
#[doc(hidden)]
pub use preprocess::PreprocessConfig;
pub use preprocess::preprocess_html;
#[doc(hidden)]
pub use scoring::{ElementScore, ScoreConfig, score_element};
pub use selectors::{Probe, SelectorExtractor, clean_title, strip_author_prefix};
pub use structural::{StructuralConfig, StructuralConfigBuilder, StructuralExtractor};
