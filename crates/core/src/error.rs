//! Error types for Glean operations.
//!
//! This module defines the main error type [`GleanError`]. Only fetch-layer
//! and total-parse-layer failures ever reach the caller of
//! [`extract`](crate::extract); field-level failures inside the extractors
//! degrade the field to its fallback instead.
//!
//! # Example
//!
//! ```rust
//! use glean_core::{GleanError, Result};
//!
//! fn require_url(url: &str) -> Result<()> {
//!     if url.is_empty() {
//!         return Err(GleanError::InvalidUrl("empty".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for extraction operations.
///
/// # Example
///
/// ```rust
/// use glean_core::GleanError;
///
/// let err = GleanError::FetchTimeout { timeout: 15 };
/// match err {
///     GleanError::FetchTimeout { timeout } => println!("site too slow ({}s)", timeout),
///     GleanError::FetchError(reason) => println!("fetch failed: {}", reason),
///     e => println!("Error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum GleanError {
    /// Invalid URL provided.
    ///
    /// Returned before any network call when the input is not an absolute
    /// http(s) URL with a host.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request timeout.
    ///
    /// Returned when the HTTP request exceeds the configured timeout.
    #[error("Request timed out after {timeout} seconds")]
    FetchTimeout { timeout: u64 },

    /// Any non-timeout network or HTTP failure.
    ///
    /// Covers DNS and TLS failures, refused connections, non-2xx statuses
    /// and failures while reading the response body.
    #[error("Fetch failed: {0}")]
    FetchError(String),

    /// DOM construction failed.
    ///
    /// The fusion step treats an extractor returning this as contributing
    /// nothing rather than propagating it.
    #[error("Failed to parse HTML: {0}")]
    ParseError(String),

    /// Extracted content is below the caller's minimum length.
    ///
    /// Never produced by extraction itself; see
    /// [`ExtractedArticle::ensure_sufficient_content`](crate::ExtractedArticle::ensure_sufficient_content).
    #[error("Insufficient content extracted ({length} characters, need at least {min})")]
    InsufficientContent { length: usize, min: usize },

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O errors while reading local input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering the record failed.
    #[error("Serialization failed: {0}")]
    Serialize(String),
}

impl GleanError {
    /// Whether the error came from the network layer.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, GleanError::FetchTimeout { .. } | GleanError::FetchError(_))
    }
}

/// Result type alias for GleanError.
pub type Result<T> = std::result::Result<T, GleanError>;
