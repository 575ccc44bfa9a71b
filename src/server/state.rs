use anyhow::Context;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ConfigError};
use crate::feed::ItemQueries;

/// Per-request handle to everything the handlers need.
///
/// Cheap to clone: the config and the compiled selectors sit behind `Arc`s
/// and `reqwest::Client` is itself reference counted. Nothing in here is
/// mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Compiled selectors of every configured feed, keyed by slug
    pub queries: Arc<BTreeMap<String, ItemQueries>>,
    pub client: reqwest::Client,
}

impl AppState {
    /// Builds the shared HTTP client from the config and compiles every feed.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30)) // Close idle connections promptly
            .connect_timeout(config.fetch_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(config, client)?)
    }

    pub fn with_client(config: Config, client: reqwest::Client) -> Result<Self, ConfigError> {
        let queries = config.compile_feeds()?;
        Ok(Self {
            config: Arc::new(config),
            queries: Arc::new(queries),
            client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FeedSpec, SelectorSpec};

    fn feed(item: &str) -> FeedSpec {
        FeedSpec {
            link: "https://example.com/".into(),
            selectors: SelectorSpec {
                item: item.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_queries_compiled_for_every_feed() {
        let mut config = Config::default();
        config.feeds.insert("a".into(), feed("li"));
        config.feeds.insert("b".into(), feed(".entry"));

        let state = AppState::with_client(config, reqwest::Client::new()).unwrap();
        let slugs: Vec<_> = state.queries.keys().map(String::as_str).collect();
        assert_eq!(slugs, vec!["a", "b"]);
        assert!(!state.queries["a"].item.matches_nothing());
    }

    #[test]
    fn test_invalid_selector_rejected_without_config_load() {
        // A config assembled in code skips Config::parse validation
        let mut config = Config::default();
        config.feeds.insert("bad".into(), feed("div >"));

        match AppState::with_client(config, reqwest::Client::new()) {
            Err(ConfigError::InvalidSelector { slug, .. }) => assert_eq!(slug, "bad"),
            Err(e) => panic!("Expected InvalidSelector, got {:?}", e),
            Ok(_) => panic!("Expected InvalidSelector, got a state"),
        }
    }
}
