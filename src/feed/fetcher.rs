use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

/// Largest page body accepted from a source site.
pub const MAX_PAGE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching a source page.
///
/// All of them mean the upstream site did not hand us a usable page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Any response status other than 200 OK
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request plus body read exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
}

/// Fetches the page at `url` and returns its raw body.
///
/// A single attempt, bounded by `timeout` end to end (connect, headers and
/// body). Only `200 OK` is accepted. Retrying is left to whoever asked for
/// the feed.
///
/// # Errors
///
/// - [`FetchError::Network`] - Connection, TLS or body stream errors
/// - [`FetchError::HttpStatus`] - Status other than 200
/// - [`FetchError::Timeout`] - `timeout` elapsed
/// - [`FetchError::ResponseTooLarge`] - Body over [`MAX_PAGE_SIZE`]
pub async fn fetch_page(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, FetchError> {
    tokio::time::timeout(timeout, fetch_inner(client, url))
        .await
        .map_err(|_| FetchError::Timeout(timeout))?
}

async fn fetch_inner(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await?;

    if response.status() != reqwest::StatusCode::OK {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    read_limited_bytes(response, MAX_PAGE_SIZE).await
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
