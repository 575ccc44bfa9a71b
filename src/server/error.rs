use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::feed::{ExtractionError, FetchError};

/// Failures of a feed request, each mapped to one HTTP status.
#[derive(Debug, Error)]
pub enum AppError {
    /// No feed is configured under this slug
    #[error("unknown feed: {0}")]
    UnknownSlug(String),

    /// The source page could not be fetched
    #[error("error fetching feed {slug}: {source}")]
    Fetch {
        slug: String,
        #[source]
        source: FetchError,
    },

    /// The source page or the feed's configuration could not be used
    #[error("error parsing the feed {slug}: {source}")]
    Extraction {
        slug: String,
        #[source]
        source: ExtractionError,
    },

    /// Writing the RSS document failed
    #[error("error encoding the feed {slug}: {cause:#}")]
    Encode { slug: String, cause: anyhow::Error },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UnknownSlug(_) => StatusCode::NOT_FOUND,
            AppError::Fetch { .. } => StatusCode::BAD_GATEWAY,
            AppError::Extraction { .. } | AppError::Encode { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::UnknownSlug(slug) => {
                tracing::debug!(slug = %slug, "Unknown feed requested");
            }
            AppError::Fetch { slug, source } => {
                tracing::warn!(slug = %slug, error = %source, "Failed to fetch source page");
            }
            AppError::Extraction { slug, source } => {
                tracing::error!(slug = %slug, error = %source, "Failed to extract feed");
            }
            AppError::Encode { slug, cause } => {
                let error = format!("{:#}", cause);
                tracing::error!(slug = %slug, error = %error, "Failed to encode feed");
            }
        }

        // Details stay in the log; clients only learn the category
        let reason = status.canonical_reason().unwrap_or("Error");
        (status, reason).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
