//! Retrieving raw HTML from URLs, files, and stdin.
//!
//! Every input ends up as a [`RawDocument`]: the HTML text together with the
//! page URL and the base origin that relative links resolve against.

use std::fs;
use std::path::PathBuf;
#[cfg(feature = "fetch")]
use std::time::Duration;

#[cfg(feature = "fetch")]
use reqwest::Client;
#[cfg(feature = "fetch")]
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA, USER_AGENT};
#[cfg(feature = "fetch")]
use tracing::debug;
use url::Url;

use crate::{GleanError, Result};

/// A desktop Chrome user agent; many publishers serve stripped or blocked
/// pages to anything that looks like a bot.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 15, user_agent: BROWSER_USER_AGENT.to_string() }
    }
}

/// Fetched HTML plus the URL context needed to interpret it.
///
/// Created once per request and only ever read afterwards; both extractors
/// borrow the same instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    html: String,
    url: Url,
    base_origin: Url,
}

impl RawDocument {
    /// Wraps HTML obtained elsewhere (a file, stdin, a cache) with its page URL.
    ///
    /// # Errors
    ///
    /// Returns [`GleanError::InvalidUrl`] when `url` is not an absolute
    /// http(s) URL.
    ///
    /// # Example
    ///
    /// ```rust
    /// use glean_core::RawDocument;
    ///
    /// let raw = RawDocument::new("<html></html>", "https://www.example.com/a/b?c=d").unwrap();
    /// assert_eq!(raw.base_origin().as_str(), "https://www.example.com/");
    /// assert_eq!(raw.site_name(), "example.com");
    /// ```
    pub fn new(html: impl Into<String>, url: &str) -> Result<Self> {
        let url = validate_url(url)?;
        Ok(Self::from_parts(html.into(), url))
    }

    fn from_parts(html: String, url: Url) -> Self {
        let base_origin = origin_of(&url);
        Self { html, url, base_origin }
    }

    /// The raw HTML text.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// The page URL (after redirects when fetched).
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Scheme, host and port of the page, with a root path.
    pub fn base_origin(&self) -> &Url {
        &self.base_origin
    }

    /// Lowercase hostname of the page.
    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Hostname with a leading `www.` removed; the last-resort source name.
    pub fn site_name(&self) -> String {
        site_name(&self.url)
    }
}

/// Hostname of `url` without a leading `www.`.
pub fn site_name(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Checks that `url` is an absolute http(s) URL with a host.
///
/// # Errors
///
/// Returns [`GleanError::InvalidUrl`] describing the first problem found.
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|e| GleanError::InvalidUrl(format!("{}: {}", url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(GleanError::InvalidUrl(format!(
            "unsupported scheme '{}' (expected http or https)",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(GleanError::InvalidUrl(format!("{} has no host", url)));
    }

    Ok(parsed)
}

fn origin_of(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    let _ = origin.set_username("");
    let _ = origin.set_password(None);
    origin
}

/// Fetches HTML from a URL.
///
/// Issues exactly one GET with browser-like, no-cache headers. Redirects are
/// followed and the final URL becomes the document URL.
///
/// # Errors
///
/// - [`GleanError::InvalidUrl`] before any network activity
/// - [`GleanError::FetchTimeout`] when `config.timeout` elapses
/// - [`GleanError::FetchError`] for every other failure, including non-2xx
#[cfg(feature = "fetch")]
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<RawDocument> {
    let parsed_url = validate_url(url)?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(|e| GleanError::FetchError(e.to_string()))?;

    debug!(url = %parsed_url, timeout = config.timeout, "fetching page");

    let response = client
        .get(parsed_url)
        .header(USER_AGENT, &config.user_agent)
        .header(ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
        .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .header(CACHE_CONTROL, "no-cache")
        .header(PRAGMA, "no-cache")
        .send()
        .await
        .map_err(|e| fetch_failure(e, config.timeout))?;

    let status = response.status();
    if !status.is_success() {
        return Err(GleanError::FetchError(format!(
            "HTTP {} for {}",
            status,
            response.url()
        )));
    }

    let final_url = response.url().clone();
    let html = response.text().await.map_err(|e| fetch_failure(e, config.timeout))?;

    debug!(url = %final_url, bytes = html.len(), "fetched page");

    Ok(RawDocument::from_parts(html, final_url))
}

#[cfg(feature = "fetch")]
fn fetch_failure(err: reqwest::Error, timeout: u64) -> GleanError {
    if err.is_timeout() { GleanError::FetchTimeout { timeout } } else { GleanError::FetchError(err.to_string()) }
}

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(GleanError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(GleanError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 15);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/article").is_ok());
        assert!(validate_url("http://example.com").is_ok());
        assert!(matches!(validate_url("example.com"), Err(GleanError::InvalidUrl(_))));
        assert!(matches!(validate_url("ftp://example.com/file"), Err(GleanError::InvalidUrl(_))));
        assert!(matches!(validate_url("not a url"), Err(GleanError::InvalidUrl(_))));
    }

    #[test]
    fn test_raw_document_origin() {
        let raw = RawDocument::new("<p>hi</p>", "https://user:pw@www.news.example.com:8443/a/b.html?x=1#frag").unwrap();
        assert_eq!(raw.base_origin().as_str(), "https://www.news.example.com:8443/");
        assert_eq!(raw.hostname(), "www.news.example.com");
        assert_eq!(raw.site_name(), "news.example.com");
        assert_eq!(raw.html(), "<p>hi</p>");
    }

    #[test]
    fn test_raw_document_rejects_relative_url() {
        assert!(matches!(RawDocument::new("", "/relative/path"), Err(GleanError::InvalidUrl(_))));
    }

    #[test]
    fn test_fetch_file_not_found() {
        let result = fetch_file("/nonexistent/path/file.html");
        assert!(matches!(result, Err(GleanError::FileNotFound(_))));
    }

    #[test]
    fn test_fetch_file_reads_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html><body>saved</body></html>").unwrap();

        let html = fetch_file(path.to_str().unwrap()).unwrap();
        assert!(html.contains("saved"));
    }

    #[cfg(feature = "fetch")]
    mod network {
        use super::super::*;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::{TcpListener, TcpStream};

        async fn read_request(socket: &mut TcpStream) -> String {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            String::from_utf8_lossy(&request).to_string()
        }

        #[tokio::test]
        async fn test_fetch_url_invalid() {
            let result = fetch_url("not-a-url", &FetchConfig::default()).await;
            assert!(matches!(result, Err(GleanError::InvalidUrl(_))));
        }

        #[tokio::test]
        async fn test_fetch_url_success_sends_browser_headers() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let (tx, rx) = tokio::sync::oneshot::channel();

            tokio::spawn(async move {
                let (mut socket, _) = listener.accept().await.unwrap();
                let request = read_request(&mut socket).await;
                let body = "<html><head><title>Local</title></head><body>ok</body></html>";
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = tx.send(request);
            });

            let url = format!("http://{}/story/1", addr);
            let raw = fetch_url(&url, &FetchConfig::default()).await.unwrap();
            assert!(raw.html().contains("<title>Local</title>"));
            assert_eq!(raw.base_origin().as_str(), format!("http://{}/", addr));

            let request = rx.await.unwrap().to_lowercase();
            assert!(request.starts_with("get /story/1"));
            assert!(request.contains("user-agent: mozilla/5.0"));
            assert!(request.contains("cache-control: no-cache"));
            assert!(request.contains("pragma: no-cache"));
        }

        #[tokio::test]
        async fn test_fetch_url_non_success_status() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();

            tokio::spawn(async move {
                let (mut socket, _) = listener.accept().await.unwrap();
                let _ = read_request(&mut socket).await;
                socket
                    .write_all(b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                    .await
                    .unwrap();
            });

            let result = fetch_url(&format!("http://{}/missing", addr), &FetchConfig::default()).await;
            match result {
                Err(GleanError::FetchError(reason)) => assert!(reason.contains("404")),
                other => panic!("expected FetchError, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_fetch_url_timeout() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();

            tokio::spawn(async move {
                let (_socket, _) = listener.accept().await.unwrap();
                tokio::time::sleep(std::time::Duration::from_secs(10)).await;
            });

            let config = FetchConfig { timeout: 1, ..Default::default() };
            let result = fetch_url(&format!("http://{}/slow", addr), &config).await;
            assert!(matches!(result, Err(GleanError::FetchTimeout { timeout: 1 })));
        }

        #[tokio::test]
        async fn test_fetch_url_connection_refused() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            let result = fetch_url(&format!("http://{}/", addr), &FetchConfig::default()).await;
            assert!(matches!(result, Err(GleanError::FetchError(_))));
        }
    }
}
