//! HTTP front end: the feed listing and the per-feed RSS endpoint.
//!
//! Routes:
//!
//! - `GET /` - HTML list of configured feeds
//! - `GET /feeds/{slug}` - scrape the feed's page and return RSS
//!
//! Status codes for failures are decided by [`AppError`].

mod error;
mod handlers;
mod state;

pub use error::{AppError, AppResult};
pub use state::AppState;

use axum::{routing::get, Router};
use tokio::net::TcpListener;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/feeds/{slug}", get(handlers::feed))
        .with_state(state)
}

/// Serves requests on `listener` until the process is stopped.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, create_router(state)).await
}
