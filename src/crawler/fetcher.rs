//! HTTP transport used by the crawler
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests that follow redirects
//! - Mapping non-200 statuses and network failures to [`FetchError`]
//! - The process-wide transport lifecycle (`init` / `shutdown`)

use crate::config::HttpConfig;
use crate::FetchError;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Marks the transport layer as initialized for this process
///
/// Returns `true` if this call performed the initialization and `false` if
/// it was already initialized, so repeated calls are harmless.
pub fn init() -> bool {
    let first = INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok();
    if first {
        tracing::debug!("Transport layer initialized");
    }
    first
}

/// Tears down the transport layer; a no-op when it was never initialized
pub fn shutdown() {
    if INITIALIZED.swap(false, Ordering::SeqCst) {
        tracing::debug!("Transport layer shut down");
    }
}

/// Returns true between `init()` and `shutdown()`
pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::SeqCst)
}

/// Performs one HTTP GET per call
///
/// Implementations must be shareable between worker threads. Failures are
/// returned as values; a transport never panics on a bad URL.
pub trait Transport: Send + Sync {
    /// Fetches `url` and returns its body as text
    fn fetch(&self, url: &str) -> Result<String, FetchError>;

    /// Fetches `url` and returns its raw body
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.fetch(url).map(String::into_bytes)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use parallel_crawler::config::HttpConfig;
/// use parallel_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .default_headers(header_map(config))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Converts configured headers, skipping any that are not valid HTTP
fn header_map(config: &HttpConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid header {}: {}", name, value),
        }
    }
    headers
}

/// [`Transport`] backed by a blocking reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Sends the GET and checks the status
    fn get(&self, url: &str) -> Result<Response, FetchError> {
        let response = self.client.get(url).send().map_err(classify_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!("{} returned HTTP {}", url, status.as_u16());
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response)
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.get(url)?
            .text()
            .map_err(|e| FetchError::Body(e.to_string()))
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.get(url)?
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

/// Classifies a reqwest failure
fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else {
        FetchError::Network(e.to_string())
    }
}
