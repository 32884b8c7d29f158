//! Outbound HTTP access behind a small trait.
//!
//! The scraper never talks to `reqwest` directly. It goes through
//! [`FetchPage`], so the extraction and date-fallback logic can be driven
//! from in-memory HTML in tests.
//!
//! - [`FetchPage`]: async "GET this URL within this timeout" capability
//! - [`HttpFetcher`]: the `reqwest` implementation with browser-like headers

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Browser User-Agent sent with every request.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const HTML_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

const POLISH_ACCEPT_LANGUAGE: &str = "pl-PL,pl;q=0.9,en;q=0.8";

/// Trait for fetching a page body as text.
///
/// Implementors must treat non-2xx responses as errors.
pub trait FetchPage {
    /// GET `url` and return the body, failing after `timeout`.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, Box<dyn Error>>;
}

/// [`FetchPage`] backed by a shared `reqwest::Client`.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client that sends a browser User-Agent and Polish
    /// `Accept-Language` on every request.
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(POLISH_ACCEPT_LANGUAGE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }
}

impl fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("user_agent", &BROWSER_USER_AGENT)
            .finish()
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "debug", skip(self), fields(timeout_ms = timeout.as_millis() as u64))]
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let res = async {
            let response = self
                .client
                .get(url)
                .timeout(timeout)
                .send()
                .await?
                .error_for_status()?;
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(body)
        }
        .await;
        let dt = t0.elapsed();

        match res {
            Ok(body) => {
                debug!(elapsed_ms = dt.as_millis() as u64, bytes = body.len(), "GET succeeded");
                Ok(body)
            }
            Err(e) => {
                warn!(elapsed_ms = dt.as_millis() as u64, error = %e, "GET failed");
                Err(Box::new(e))
            }
        }
    }
}
