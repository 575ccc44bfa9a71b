use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use quick_xml::escape::escape;
use std::fmt::Write;

use crate::config::FeedSpec;
use crate::feed::{encode, extract_with, fetch_page};
use crate::server::error::{AppError, AppResult};
use crate::server::state::AppState;

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf8";
const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf8";

/// Lists every configured feed with a link to its RSS endpoint.
pub async fn home(State(state): State<AppState>) -> Response {
    let page = render_home(state.config.feeds.iter());
    ([(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], page).into_response()
}

fn render_home<'a>(feeds: impl Iterator<Item = (&'a String, &'a FeedSpec)>) -> String {
    let mut page = String::from("<!doctype html>\n<html>\n<h2>Feeds</h2>\n<ul>\n");
    for (slug, feed) in feeds {
        // Writing into a String cannot fail
        let _ = writeln!(
            page,
            "<li><a href=\"/feeds/{}\">{}</a></li>",
            escape(slug.as_str()),
            escape(feed.title.as_str())
        );
    }
    page.push_str("</ul>\n</html>\n");
    page
}

/// Scrapes the configured page for `slug` and returns it as RSS.
pub async fn feed(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let (spec, queries) = state
        .config
        .feeds
        .get(&slug)
        .zip(state.queries.get(&slug))
        .ok_or_else(|| AppError::UnknownSlug(slug.clone()))?;

    let body = fetch_page(&state.client, &spec.link, state.config.fetch_timeout())
        .await
        .map_err(|source| AppError::Fetch {
            slug: slug.clone(),
            source,
        })?;

    // Synchronous from here on; the parsed page never crosses an await
    let feed = extract_with(spec, queries, &body).map_err(|source| AppError::Extraction {
        slug: slug.clone(),
        source,
    })?;
    let xml = encode(&feed).map_err(|cause| AppError::Encode {
        slug: slug.clone(),
        cause,
    })?;

    tracing::info!(slug = %slug, items = feed.items.len(), "Served feed");

    Ok(([(header::CONTENT_TYPE, RSS_CONTENT_TYPE)], xml).into_response())
}
