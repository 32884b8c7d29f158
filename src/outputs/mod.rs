//! Output generation.
//!
//! # Submodules
//!
//! - [`rss`]: Serializes scraped records into an RSS 2.0 feed file
//!
//! # Output Structure
//!
//! ```text
//! rss.xml   # one file per run, overwritten each time
//! ```

pub mod rss;
