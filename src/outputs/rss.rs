//! RSS 2.0 output.
//!
//! Serializes [`ArticleRecord`]s into a pretty-printed RSS document. Item
//! order is the order given. Every `pubDate` is normalized to RFC 822; a
//! timestamp that cannot be parsed falls back to the build instant instead
//! of failing the build.
//!
//! # Output Structure
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
//!   <channel>
//!     <title/> <link/> <description/> <language/> <lastBuildDate/>
//!     <item>
//!       <title/> <link/> <description/> <guid/> <pubDate/>
//!     </item>
//!   </channel>
//! </rss>
//! ```

use crate::models::ArticleRecord;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use regex::Regex;
use std::error::Error;
use std::io::Write;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// `strftime` pattern for RFC 822 dates with a numeric offset.
pub const RFC822_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Naive ISO-8601 layouts accepted when no offset is present.
const NAIVE_ISO_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Date/time separator: a `T` between two digits, so "Tue" and "Thu" never match.
static ISO_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\dT\d").expect("static regex must parse"));

/// Hour-only ISO value such as `2024-01-15T10`.
static ISO_HOUR_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}$").expect("static regex must parse"));

/// Fixed channel metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: String,
}

impl Channel {
    /// Channel block of the Bankier.pl news feed.
    pub fn bankier() -> Self {
        Self {
            title: "Bankier.pl - Wiadomości".to_string(),
            link: crate::scrapers::bankier::SECTION_URL.to_string(),
            description: "Najnowsze wiadomości z Bankier.pl".to_string(),
            language: "pl".to_string(),
        }
    }
}

/// Everything a feed build depends on besides the records.
#[derive(Debug, Clone)]
pub struct FeedContext {
    pub channel: Channel,
    /// Zone attached to timestamps that carry no offset.
    pub timezone: Tz,
    /// Build instant: `lastBuildDate` and the fallback `pubDate`.
    pub now: DateTime<Tz>,
}

impl FeedContext {
    pub fn new(channel: Channel, timezone: Tz, now: DateTime<Tz>) -> Self {
        Self {
            channel,
            timezone,
            now,
        }
    }
}

/// Render `records` as an RSS 2.0 document.
///
/// An empty slice yields a valid feed with channel metadata and no items.
#[instrument(level = "info", skip_all, fields(items = records.len()))]
pub fn generate_feed(records: &[ArticleRecord], ctx: &FeedContext) -> Result<String, Box<dyn Error>> {
    let build_date = ctx.now.format(RFC822_FORMAT).to_string();

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:atom", ATOM_NAMESPACE));
    writer.write_event(Event::Start(rss))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut writer, "title", &ctx.channel.title)?;
    write_text_element(&mut writer, "link", &ctx.channel.link)?;
    write_text_element(&mut writer, "description", &ctx.channel.description)?;
    write_text_element(&mut writer, "language", &ctx.channel.language)?;
    write_text_element(&mut writer, "lastBuildDate", &build_date)?;

    for record in records {
        writer.write_event(Event::Start(BytesStart::new("item")))?;
        write_text_element(&mut writer, "title", &record.title)?;
        write_text_element(&mut writer, "link", &record.link)?;
        write_text_element(&mut writer, "description", &record.description)?;
        write_text_element(&mut writer, "guid", &record.link)?;
        write_text_element(&mut writer, "pubDate", &pub_date(&record.published, ctx))?;
        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    let xml = String::from_utf8(writer.into_inner())?;
    Ok(xml
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Build the feed and write it to `path`.
#[instrument(level = "info", skip(records, ctx), fields(path = %path.display()))]
pub async fn write_feed(
    records: &[ArticleRecord],
    ctx: &FeedContext,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let xml = generate_feed(records, ctx)?;
    fs::write(path, xml).await?;
    info!(items = records.len(), "Wrote RSS feed");
    Ok(())
}

fn write_text_element<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> Result<(), Box<dyn Error>> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// `pubDate` text for a record timestamp, falling back to the build instant.
fn pub_date(raw: &str, ctx: &FeedContext) -> String {
    match normalize_pub_date(raw, &ctx.timezone) {
        Ok(date) => date,
        Err(e) => {
            warn!(raw, error = %e, "Error formatting date; using build time");
            ctx.now.format(RFC822_FORMAT).to_string()
        }
    }
}

/// Normalize a scraped timestamp to RFC 822.
///
/// Strings with a `T` between the date and the time are parsed as ISO-8601
/// (a trailing `Z` means UTC, a missing offset means local time in
/// `timezone`). Anything else is assumed to be display-ready and returned
/// unchanged.
pub fn normalize_pub_date(raw: &str, timezone: &Tz) -> Result<String, Box<dyn Error>> {
    if !ISO_SEPARATOR.is_match(raw) {
        return Ok(raw.to_string());
    }

    let iso = match raw.strip_suffix('Z') {
        Some(rest) => format!("{rest}+00:00"),
        None => raw.to_string(),
    };
    Ok(parse_iso(&iso, timezone)?.format(RFC822_FORMAT).to_string())
}

fn parse_iso(iso: &str, timezone: &Tz) -> Result<DateTime<FixedOffset>, Box<dyn Error>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S%.f%:z") {
        return Ok(dt);
    }

    // chrono needs a minute to build a time, so hour-only values get one.
    let padded = if ISO_HOUR_ONLY.is_match(iso) {
        format!("{iso}:00")
    } else {
        iso.to_string()
    };
    let naive = NAIVE_ISO_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&padded, fmt).ok())
        .ok_or_else(|| format!("unrecognized ISO-8601 timestamp: {iso}"))?;

    let local = timezone
        .from_local_datetime(&naive)
        .latest()
        .ok_or_else(|| format!("{naive} does not exist in {timezone}"))?;
    Ok(local.fixed_offset())
}
