//! News source scraping.
//!
//! Scraping follows a two-phase pattern:
//!
//! 1. **Listing**: read the section's listing pages and extract candidate
//!    articles ([`extract::extract_listing`])
//! 2. **Dating**: for candidates without an inline date, fetch the article
//!    page and read its publication time ([`extract::extract_published_date`])
//!
//! # Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`extract`] | Pure HTML extraction with ordered fallback strategies |
//! | [`bankier`] | Sequential page walk, date fallback, courtesy delay |

pub mod bankier;
pub mod extract;
