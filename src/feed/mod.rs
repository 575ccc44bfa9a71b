//! The scraping pipeline: fetch a page, pull items out of it, write RSS.
//!
//! - [`fetcher`] - bounded HTTP GET of the source page
//! - [`selector`] - CSS selector queries over the parsed page
//! - [`link`] - resolution of item links against the page URL
//! - [`extractor`] - turns a page plus a [`FeedSpec`](crate::config::FeedSpec) into a [`Feed`]
//! - [`encoder`] - serializes a [`Feed`] as an RSS 2.0 document
//!
//! # Example
//!
//! ```ignore
//! use scrapefeed::feed::{encode, extract, fetch_page};
//!
//! let body = fetch_page(&client, &spec.link, timeout).await?;
//! let feed = extract(&spec, &body)?;
//! let xml = encode(&feed)?;
//! ```

mod encoder;
mod extractor;
mod fetcher;
mod link;
pub mod selector;
mod types;

pub use encoder::encode;
pub use extractor::{extract, extract_with, ExtractionError, ItemQueries};
pub use fetcher::{fetch_page, FetchError, MAX_PAGE_SIZE};
pub use link::{resolve, UNRESOLVED_LINK};
pub use types::{ExtractedItem, Feed};
