//! Bankier.pl news section scraper.
//!
//! Walks the first listing pages of <https://www.bankier.pl/wiadomosc/>,
//! extracts candidate articles, and fills in missing publication dates from
//! each article page.
//!
//! # URL Pattern
//!
//! Page 1 is the bare section URL; page N is `?page=N` on the same URL.
//!
//! # Failure handling
//!
//! A failing listing page is logged and skipped. A failing article page only
//! costs that item its source date: the scrape time is used instead.

use crate::http::FetchPage;
use crate::models::{ArticleRecord, ListingItem};
use crate::scrapers::extract::{extract_listing, extract_published_date};
use crate::utils::truncate_for_log;
use chrono::Utc;
use chrono_tz::Tz;
use futures::stream::{self, StreamExt};
use std::error::Error;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Listing page of the news section.
pub const SECTION_URL: &str = "https://www.bankier.pl/wiadomosc/";

/// Listing pages scraped per run.
pub const DEFAULT_PAGES: u32 = 2;

const LISTING_TIMEOUT: Duration = Duration::from_secs(15);
const DETAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause before every article page request.
pub const COURTESY_DELAY: Duration = Duration::from_millis(500);

/// URL of listing page `page` (1-based).
pub fn page_url(page: u32) -> String {
    if page > 1 {
        format!("{SECTION_URL}?page={page}")
    } else {
        SECTION_URL.to_string()
    }
}

/// Sequential scraper for the Bankier.pl news section.
#[derive(Debug)]
pub struct BankierScraper<F> {
    fetcher: F,
    timezone: Tz,
    pages: u32,
    courtesy_delay: Duration,
}

impl<F: FetchPage> BankierScraper<F> {
    /// Create a scraper that reads [`DEFAULT_PAGES`] pages and stamps
    /// undated articles with the current time in `timezone`.
    pub fn new(fetcher: F, timezone: Tz) -> Self {
        Self {
            fetcher,
            timezone,
            pages: DEFAULT_PAGES,
            courtesy_delay: COURTESY_DELAY,
        }
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_courtesy_delay(mut self, delay: Duration) -> Self {
        self.courtesy_delay = delay;
        self
    }

    /// Scrape every listing page in order and return the records found.
    ///
    /// Never fails: page-level errors are logged and the page is skipped.
    #[instrument(level = "info", skip(self), fields(pages = self.pages, tz = %self.timezone))]
    pub async fn scrape(&self) -> Vec<ArticleRecord> {
        let mut records = Vec::new();
        for page in 1..=self.pages {
            let url = page_url(page);
            info!(page, %url, "Scraping listing page");
            match self.scrape_page(&url).await {
                Ok(mut page_records) => {
                    info!(page, count = page_records.len(), "Scraped listing page");
                    records.append(&mut page_records);
                }
                Err(e) => {
                    error!(page, %url, error = %e, "Failed to scrape listing page; skipping");
                }
            }
        }
        info!(count = records.len(), "Scraped articles");
        records
    }

    async fn scrape_page(&self, url: &str) -> Result<Vec<ArticleRecord>, Box<dyn Error>> {
        let html = self.fetcher.fetch(url, LISTING_TIMEOUT).await?;
        let items = extract_listing(&html);
        debug!(count = items.len(), "Listing items extracted");

        let records = stream::iter(items)
            .then(|item| self.complete(item))
            .filter_map(|record| std::future::ready(record))
            .collect::<Vec<_>>()
            .await;
        Ok(records)
    }

    /// Resolve the item's date and turn it into a record.
    async fn complete(&self, item: ListingItem) -> Option<ArticleRecord> {
        let published = match item.published.clone() {
            Some(inline) => inline,
            None => {
                sleep(self.courtesy_delay).await;
                match self.article_date(&item.link).await {
                    Some(found) => found,
                    None => {
                        let now = Utc::now().with_timezone(&self.timezone).to_rfc3339();
                        debug!(link = %item.link, %now, "No source date; using current time");
                        now
                    }
                }
            }
        };

        let title = truncate_for_log(&item.title, 50);
        let record = item.into_record(published)?;
        info!(%title, "Added article");
        Some(record)
    }

    /// Fetch an article page and read its publication date.
    ///
    /// Returns `None` on any failure; the caller substitutes the current time.
    #[instrument(level = "debug", skip(self))]
    pub async fn article_date(&self, url: &str) -> Option<String> {
        match self.fetcher.fetch(url, DETAIL_TIMEOUT).await {
            Ok(html) => extract_published_date(&html),
            Err(e) => {
                warn!(%url, error = %e, "Error getting article date");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory fetcher; unknown URLs fail like a 404.
    #[derive(Default)]
    struct FakeFetcher {
        pages: HashMap<String, String>,
        requests: RefCell<Vec<(String, Duration)>>,
        fetched_at: RefCell<Vec<tokio::time::Instant>>,
    }

    impl FakeFetcher {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requests.borrow().iter().map(|(u, _)| u.clone()).collect()
        }
    }

    impl FetchPage for FakeFetcher {
        async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, Box<dyn Error>> {
            self.requests.borrow_mut().push((url.to_string(), timeout));
            self.fetched_at.borrow_mut().push(tokio::time::Instant::now());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| format!("HTTP status client error (404 Not Found) for url ({url})").into())
        }
    }

    fn scraper(fetcher: FakeFetcher) -> BankierScraper<FakeFetcher> {
        BankierScraper::new(fetcher, chrono_tz::Europe::Warsaw).with_courtesy_delay(Duration::ZERO)
    }

    fn listing(entries: &[(&str, Option<&str>)]) -> String {
        let body: String = entries
            .iter()
            .map(|(slug, date)| {
                let time = date
                    .map(|d| format!(r#"<time datetime="{d}"></time>"#))
                    .unwrap_or_default();
                format!(
                    r#"<article class="entry"><a class="entry__title" href="/wiadomosc/{slug}.html">Title {slug}</a>{time}</article>"#
                )
            })
            .collect();
        format!("<html><body>{body}</body></html>")
    }

    fn article_url(slug: &str) -> String {
        format!("https://www.bankier.pl/wiadomosc/{slug}.html")
    }

    #[test]
    fn test_page_url() {
        assert_eq!(page_url(1), "https://www.bankier.pl/wiadomosc/");
        assert_eq!(page_url(2), "https://www.bankier.pl/wiadomosc/?page=2");
    }

    #[tokio::test]
    async fn test_inline_date_skips_detail_fetch() {
        let fetcher = FakeFetcher::default()
            .with(&page_url(1), &listing(&[("a", Some("2024-01-15T10:30:00Z"))]))
            .with(&page_url(2), &listing(&[]));
        let scraper = scraper(fetcher);

        let records = scraper.scrape().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].published, "2024-01-15T10:30:00Z");
        assert_eq!(scraper.fetcher.requested(), vec![page_url(1), page_url(2)]);
    }

    #[tokio::test]
    async fn test_missing_date_fetched_from_article_page() {
        let detail = r#"<html><head><meta property="article:published_time" content="2024-02-01T12:00:00+01:00"></head></html>"#;
        let fetcher = FakeFetcher::default()
            .with(&page_url(1), &listing(&[("a", None)]))
            .with(&article_url("a"), detail);
        let scraper = scraper(fetcher).with_pages(1);

        let records = scraper.scrape().await;
        assert_eq!(records[0].published, "2024-02-01T12:00:00+01:00");

        let requests = scraper.fetcher.requests.borrow();
        assert_eq!(requests[0], (page_url(1), LISTING_TIMEOUT));
        assert_eq!(requests[1], (article_url("a"), DETAIL_TIMEOUT));
    }

    #[tokio::test]
    async fn test_failed_detail_fetch_uses_current_time_and_continues() {
        let detail = r#"<html><body><time datetime="2024-03-03T03:03:03Z"></time></body></html>"#;
        let fetcher = FakeFetcher::default()
            .with(&page_url(1), &listing(&[("missing", None), ("ok", None)]))
            .with(&article_url("ok"), detail);
        let scraper = scraper(fetcher).with_pages(1);

        let before = Utc::now();
        let records = scraper.scrape().await;
        let after = Utc::now();

        assert_eq!(records.len(), 2);
        let fallback = DateTime::parse_from_rfc3339(&records[0].published).unwrap();
        assert!(fallback >= before - chrono::Duration::seconds(1));
        assert!(fallback <= after + chrono::Duration::seconds(1));
        assert_eq!(records[1].published, "2024-03-03T03:03:03Z");
    }

    #[tokio::test]
    async fn test_failed_listing_page_is_skipped() {
        let fetcher = FakeFetcher::default()
            .with(&page_url(2), &listing(&[("second", Some("2024-01-01T00:00:00Z"))]));
        let scraper = scraper(fetcher);

        let records = scraper.scrape().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].link, article_url("second"));
    }

    #[tokio::test]
    async fn test_pages_processed_in_order() {
        let fetcher = FakeFetcher::default()
            .with(&page_url(1), &listing(&[("p1a", Some("2024-01-01T00:00:00Z")), ("p1b", Some("2024-01-01T00:00:00Z"))]))
            .with(&page_url(2), &listing(&[("p2a", Some("2024-01-01T00:00:00Z"))]));
        let scraper = scraper(fetcher);

        let links: Vec<String> = scraper.scrape().await.into_iter().map(|r| r.link).collect();
        assert_eq!(links, vec![article_url("p1a"), article_url("p1b"), article_url("p2a")]);
    }

    #[tokio::test]
    async fn test_nothing_found_yields_empty() {
        let scraper = scraper(FakeFetcher::default());
        assert!(scraper.scrape().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_courtesy_delay_before_each_detail_fetch() {
        let fetcher = FakeFetcher::default()
            .with(&page_url(1), &listing(&[("a", None), ("dated", Some("2024-01-01T00:00:00Z")), ("b", None)]));
        let scraper = BankierScraper::new(fetcher, chrono_tz::Europe::Warsaw).with_pages(1);

        let start = tokio::time::Instant::now();
        let records = scraper.scrape().await;
        let elapsed = start.elapsed();

        assert_eq!(records.len(), 3);
        assert!(elapsed >= COURTESY_DELAY * 2, "elapsed {elapsed:?}");
        assert!(elapsed < COURTESY_DELAY * 2 + Duration::from_millis(10), "elapsed {elapsed:?}");

        assert_eq!(
            scraper.fetcher.requested(),
            vec![page_url(1), article_url("a"), article_url("b")]
        );
        let fetched_at = scraper.fetcher.fetched_at.borrow();
        assert!(fetched_at[1] - fetched_at[0] >= COURTESY_DELAY);
        assert!(fetched_at[2] - fetched_at[1] >= COURTESY_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_courtesy_delay_when_all_dates_inline() {
        let fetcher = FakeFetcher::default().with(
            &page_url(1),
            &listing(&[("a", Some("2024-01-01T00:00:00Z")), ("b", Some("2024-01-02T00:00:00Z"))]),
        );
        let scraper = BankierScraper::new(fetcher, chrono_tz::Europe::Warsaw).with_pages(1);

        let start = tokio::time::Instant::now();
        let records = scraper.scrape().await;

        assert_eq!(records.len(), 2);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(scraper.fetcher.requested(), vec![page_url(1)]);
    }

    #[tokio::test]
    async fn test_article_date_returns_none_on_error() {
        let scraper = scraper(FakeFetcher::default());
        assert_eq!(scraper.article_date("https://www.bankier.pl/wiadomosc/x.html").await, None);
    }
}
