//! HTML extraction for Bankier.pl listing and article pages.
//!
//! Everything here is pure: functions take an HTML string and return owned
//! data, so no `scraper::Html` value ever lives across an `.await`.
//!
//! Each field is resolved through an ordered strategy table. The first
//! strategy that returns a value wins; later ones are never consulted.
//!
//! # Listing strategies
//!
//! | Order | Item nodes |
//! |-------|------------|
//! | 1 | `article.entry` |
//! | 2 | `div.article` |
//! | 3 | container of every `a[href*="/wiadomosc/"]` (section index excluded) |
//!
//! # Detail page date
//!
//! `meta[property="article:published_time"]`, then `time[datetime]`, then a
//! JSON-LD `datePublished`.

use crate::models::ListingItem;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;

/// Scheme and host every root-relative link is resolved against.
pub const ORIGIN: &str = "https://www.bankier.pl";

/// Path segment shared by every article URL (and the section index itself).
pub const ARTICLE_PATH: &str = "/wiadomosc/";

/// Upper bound on item nodes taken from a single listing page.
pub const MAX_ITEMS_PER_PAGE: usize = 20;

/// Elements that count as the enclosing block of a bare article link.
const CONTAINER_TAGS: [&str; 4] = ["article", "li", "div", "section"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static ENTRY: Lazy<Selector> = Lazy::new(|| selector("article.entry"));
static ARTICLE_DIV: Lazy<Selector> = Lazy::new(|| selector("div.article"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static ENTRY_TITLE: Lazy<Selector> = Lazy::new(|| selector("a.entry__title"));
static HEADINGS: Lazy<[Selector; 6]> = Lazy::new(|| {
    ["h1", "h2", "h3", "h4", "h5", "h6"].map(selector)
});
static ENTRY_LEAD: Lazy<Selector> = Lazy::new(|| selector("div.entry__lead"));
static ARTICLE_LEAD: Lazy<Selector> = Lazy::new(|| selector("p.article__lead"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));
static TIME: Lazy<Selector> = Lazy::new(|| selector("time[datetime]"));
static PUBLISHED_META: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[property="article:published_time"]"#));
static JSON_LD: Lazy<Selector> = Lazy::new(|| selector(r#"script[type="application/ld+json"]"#));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex must parse"));

/// A headline and the raw `href` it points to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TitleLink {
    title: String,
    href: String,
}

type NodeStrategy = for<'a> fn(&'a Html) -> Vec<ElementRef<'a>>;
type TitleStrategy = for<'a> fn(ElementRef<'a>) -> Option<TitleLink>;
type TextStrategy = for<'a> fn(ElementRef<'a>) -> Option<String>;
type DateStrategy = fn(&Html) -> Option<String>;

const NODE_STRATEGIES: &[(&str, NodeStrategy)] = &[
    ("entry", entry_nodes),
    ("article_div", article_div_nodes),
    ("article_links", article_link_nodes),
];

const TITLE_STRATEGIES: &[TitleStrategy] = &[
    title_from_entry_title,
    title_from_heading,
    title_from_article_link,
    title_from_self,
];

const DESCRIPTION_STRATEGIES: &[TextStrategy] = &[
    description_from_entry_lead,
    description_from_article_lead,
    description_from_paragraph,
];

const DATE_STRATEGIES: &[(&str, DateStrategy)] = &[
    ("meta", date_from_meta),
    ("time", date_from_time),
    ("json_ld", date_from_json_ld),
];

/// Extract candidate articles from a listing page, in document order.
///
/// At most [`MAX_ITEMS_PER_PAGE`] item nodes are examined. Nodes without a
/// usable title and link are dropped.
pub fn extract_listing(html: &str) -> Vec<ListingItem> {
    let document = Html::parse_document(html);

    let Some((strategy, nodes)) = NODE_STRATEGIES
        .iter()
        .map(|(name, find)| (*name, find(&document)))
        .find(|(_, nodes)| !nodes.is_empty())
    else {
        debug!("No listing item nodes matched");
        return Vec::new();
    };

    let found = nodes.len();
    let items: Vec<ListingItem> = nodes
        .into_iter()
        .take(MAX_ITEMS_PER_PAGE)
        .filter_map(extract_item)
        .collect();
    debug!(strategy, found, kept = items.len(), "Extracted listing items");
    items
}

/// Extract the publication timestamp from an article page.
pub fn extract_published_date(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    DATE_STRATEGIES.iter().find_map(|(name, find)| {
        let found = find(&document)?;
        debug!(strategy = *name, %found, "Found article date");
        Some(found)
    })
}

/// Resolve a root-relative href against [`ORIGIN`]; other hrefs are kept.
pub fn normalize_link(href: &str) -> String {
    if href.starts_with('/') {
        format!("{ORIGIN}{href}")
    } else {
        href.to_string()
    }
}

fn extract_item(node: ElementRef<'_>) -> Option<ListingItem> {
    let Some(title_link) = TITLE_STRATEGIES.iter().find_map(|find| find(node)) else {
        debug!(tag = node.value().name(), "Item has no title link; skipping");
        return None;
    };

    let description = DESCRIPTION_STRATEGIES
        .iter()
        .find_map(|find| find(node))
        .unwrap_or_default();

    let published = node
        .select(&TIME)
        .next()
        .and_then(|t| t.value().attr("datetime"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Some(ListingItem {
        title: title_link.title,
        link: normalize_link(&title_link.href),
        description,
        published,
    })
}

/// Whitespace-collapsed, trimmed text content of an element.
fn clean_text(element: ElementRef<'_>) -> String {
    let raw = element.text().collect::<String>();
    WHITESPACE.replace_all(&raw, " ").trim().to_string()
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

fn is_article_href(href: &str) -> bool {
    href.contains(ARTICLE_PATH)
}

fn is_section_index(href: &str) -> bool {
    href.strip_prefix(ORIGIN).unwrap_or(href) == ARTICLE_PATH
}

// --- item nodes ---

fn entry_nodes(document: &Html) -> Vec<ElementRef<'_>> {
    document.select(&ENTRY).collect()
}

fn article_div_nodes(document: &Html) -> Vec<ElementRef<'_>> {
    document.select(&ARTICLE_DIV).collect()
}

fn article_link_nodes(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .select(&LINK)
        .filter(|a| {
            a.value()
                .attr("href")
                .map(str::trim)
                .is_some_and(|href| is_article_href(href) && !is_section_index(href))
        })
        .map(|a| closest_container(a).unwrap_or(a))
        .take(MAX_ITEMS_PER_PAGE)
        .collect()
}

fn closest_container(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| CONTAINER_TAGS.contains(&e.value().name()))
}

// --- title / link ---

fn title_link(anchor: ElementRef<'_>) -> Option<TitleLink> {
    let href = anchor.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    let title = non_empty(clean_text(anchor))?;
    Some(TitleLink {
        title,
        href: href.to_string(),
    })
}

fn title_from_entry_title(item: ElementRef<'_>) -> Option<TitleLink> {
    item.select(&ENTRY_TITLE).next().and_then(title_link)
}

fn title_from_heading(item: ElementRef<'_>) -> Option<TitleLink> {
    let heading = HEADINGS.iter().find_map(|h| item.select(h).next())?;
    heading.select(&LINK).next().and_then(title_link)
}

fn title_from_article_link(item: ElementRef<'_>) -> Option<TitleLink> {
    item.select(&LINK)
        .find(|a| a.value().attr("href").is_some_and(is_article_href))
        .and_then(title_link)
}

fn title_from_self(item: ElementRef<'_>) -> Option<TitleLink> {
    if item.value().name() == "a" {
        title_link(item)
    } else {
        None
    }
}

// --- description ---

fn description_from_entry_lead(item: ElementRef<'_>) -> Option<String> {
    item.select(&ENTRY_LEAD).next().map(clean_text)
}

fn description_from_article_lead(item: ElementRef<'_>) -> Option<String> {
    item.select(&ARTICLE_LEAD).next().map(clean_text)
}

fn description_from_paragraph(item: ElementRef<'_>) -> Option<String> {
    item.select(&PARAGRAPH).next().map(clean_text)
}

// --- detail page date ---

fn attr_value(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn date_from_meta(document: &Html) -> Option<String> {
    document
        .select(&PUBLISHED_META)
        .find_map(|m| attr_value(m, "content"))
}

fn date_from_time(document: &Html) -> Option<String> {
    document
        .select(&TIME)
        .next()
        .and_then(|t| attr_value(t, "datetime"))
}

fn date_from_json_ld(document: &Html) -> Option<String> {
    document.select(&JSON_LD).find_map(|script| {
        let raw = script.text().collect::<String>();
        let value: Value = serde_json::from_str(raw.trim()).ok()?;
        date_published(&value)
    })
}

fn date_published(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.iter().find_map(date_published),
        Value::Object(map) => map
            .get("datePublished")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| map.get("@graph").and_then(date_published)),
        _ => None,
    }
}
