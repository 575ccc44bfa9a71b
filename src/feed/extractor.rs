use thiserror::Error;
use url::Url;

use crate::config::{FeedSpec, SelectorSpec};
use crate::feed::link::resolve;
use crate::feed::selector::{attr, html, text, BinaryBody, Document, Query, SelectorError};
use crate::feed::types::{ExtractedItem, Feed};

/// Errors that abort extraction of a whole feed.
///
/// Anything scoped to a single item (missing title, missing link, bad href)
/// degrades instead and never shows up here.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The page body is binary data, not an HTML document
    #[error("failed to parse document: {0}")]
    ParseFailed(#[from] BinaryBody),
    /// The feed's `link` is not an absolute URL
    #[error("invalid base URL {url:?}: {source}")]
    BadBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// One of the feed's selectors is not valid CSS
    #[error(transparent)]
    InvalidSelector(#[from] SelectorError),
}

/// The four selectors of a feed, compiled.
#[derive(Debug, Clone)]
pub struct ItemQueries {
    pub item: Query,
    pub title: Query,
    pub description: Query,
    pub link: Query,
}

impl ItemQueries {
    pub fn compile(spec: &SelectorSpec) -> Result<Self, SelectorError> {
        Ok(Self {
            item: Query::parse(&spec.item)?,
            title: Query::parse(&spec.title)?,
            description: Query::parse(&spec.description)?,
            link: Query::parse(&spec.link)?,
        })
    }
}

/// Scrapes `body` into a feed according to `spec`.
///
/// Items appear in the order their `item` matches occur in the page. Zero
/// matches is a valid, empty feed.
///
/// # Errors
///
/// - [`ExtractionError::ParseFailed`] if `body` is binary data
/// - [`ExtractionError::BadBaseUrl`] if `spec.link` does not parse
/// - [`ExtractionError::InvalidSelector`] if a selector is not valid CSS
pub fn extract(spec: &FeedSpec, body: &[u8]) -> Result<Feed, ExtractionError> {
    let queries = ItemQueries::compile(&spec.selectors)?;
    extract_with(spec, &queries, body)
}

/// Like [`extract`], with the selectors of `spec` already compiled.
pub fn extract_with(
    spec: &FeedSpec,
    queries: &ItemQueries,
    body: &[u8],
) -> Result<Feed, ExtractionError> {
    let doc = Document::parse(body)?;

    let base = Url::parse(&spec.link).map_err(|source| ExtractionError::BadBaseUrl {
        url: spec.link.clone(),
        source,
    })?;

    let items: Vec<ExtractedItem> = doc
        .find(&queries.item)
        .into_iter()
        .map(|node| {
            let href = attr(node.find_first(&queries.link), "href", "");
            ExtractedItem {
                title: text(node.find_first(&queries.title)),
                description: html(node.find_first(&queries.description)),
                link: resolve(&base, &href),
            }
        })
        .collect();

    tracing::debug!(url = %spec.link, items = items.len(), "Extracted feed items");

    Ok(Feed {
        title: spec.title.clone(),
        description: spec.description.clone(),
        link: spec.link.clone(),
        items,
    })
}
