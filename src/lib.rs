//! Serve RSS feeds scraped from ordinary web pages.
//!
//! Each configured feed names a page and four CSS selectors. On request the
//! page is fetched, every `item` match becomes one RSS item, and the
//! document is returned as RSS 2.0. Nothing is cached or stored between
//! requests.

pub mod config;
pub mod feed;
pub mod server;

pub use config::{Config, FeedSpec, SelectorSpec};
