//! Command-line interface definitions for Bankier RSS.
//!
//! All arguments can be provided via command-line flags or environment
//! variables, and every one has a default.

use chrono_tz::Tz;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Bankier RSS scraper.
///
/// # Examples
///
/// ```sh
/// # Defaults: two listing pages, Europe/Warsaw, ./rss.xml
/// bankier_rss
///
/// # Custom output path
/// bankier_rss -o /var/www/feeds/bankier.xml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the RSS file to write
    #[arg(short, long, env = "BANKIER_RSS_OUTPUT", default_value = "rss.xml")]
    pub output: PathBuf,

    /// Number of listing pages to scrape
    #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub pages: u32,

    /// IANA time zone for undated articles and the build date
    #[arg(long, env = "BANKIER_RSS_TZ", default_value = "Europe/Warsaw")]
    pub timezone: Tz,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["bankier_rss"]);

        assert_eq!(cli.output, PathBuf::from("rss.xml"));
        assert_eq!(cli.pages, 2);
        assert_eq!(cli.timezone, chrono_tz::Europe::Warsaw);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["bankier_rss", "-o", "/tmp/feed.xml", "-p", "1"]);

        assert_eq!(cli.output, PathBuf::from("/tmp/feed.xml"));
        assert_eq!(cli.pages, 1);
    }

    #[test]
    fn test_cli_timezone() {
        let cli = Cli::parse_from(["bankier_rss", "--timezone", "UTC"]);
        assert_eq!(cli.timezone, chrono_tz::UTC);
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["bankier_rss", "--timezone", "Mars/Olympus"]).is_err());
        assert!(Cli::try_parse_from(["bankier_rss", "--pages", "0"]).is_err());
    }
}
