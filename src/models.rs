//! Data models for scraped listing entries and finished feed records.
//!
//! - [`ListingItem`]: a candidate entry pulled from a listing page
//! - [`ArticleRecord`]: a complete entry ready for the feed builder

/// A candidate article extracted from a listing page.
///
/// The extractor only emits items with a non-empty title and link; the
/// publication date is optional because many listings do not carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    /// Headline text, whitespace-collapsed and trimmed.
    pub title: String,
    /// Absolute article URL.
    pub link: String,
    /// Lead text; empty when the listing has none.
    pub description: String,
    /// Machine-readable `datetime` attribute found inline, if any.
    pub published: Option<String>,
}

/// A finished article entry consumed by the RSS builder.
///
/// `published` is either an ISO-8601 timestamp, a string already in
/// RFC 822 form, or the scrape time when no source date could be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published: String,
}

impl ArticleRecord {
    /// Build a record, trimming every field.
    ///
    /// Returns `None` when the title or link is empty after trimming.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
        published: impl Into<String>,
    ) -> Option<Self> {
        let title = title.into().trim().to_string();
        let link = link.into().trim().to_string();
        if title.is_empty() || link.is_empty() {
            return None;
        }
        Some(Self {
            title,
            link,
            description: description.into().trim().to_string(),
            published: published.into().trim().to_string(),
        })
    }
}

impl ListingItem {
    /// Turn the candidate into a record using the resolved publication time.
    pub fn into_record(self, published: String) -> Option<ArticleRecord> {
        ArticleRecord::new(self.title, self.link, self.description, published)
    }
}
