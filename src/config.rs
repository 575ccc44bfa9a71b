//! Configuration file parser.
//!
//! The config file is optional: running without one yields
//! `Config::default()`, an empty feed list served on 127.0.0.1:9977.
//! Unknown top-level keys are accepted (with a warning) so a typo does not
//! take the server down. Inside a feed table unknown keys are an error, as
//! are selectors that are not valid CSS and a zero fetch timeout.
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::feed::selector::SelectorError;
use crate::feed::ItemQueries;

/// Listen address used when the config does not set one.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:9977";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A zero timeout would fail every fetch.
    #[error("fetch_timeout_secs must be at least 1")]
    ZeroTimeout,

    /// A feed selector is not valid CSS.
    #[error("Feed '{slug}': {source}")]
    InvalidSelector {
        slug: String,
        #[source]
        source: SelectorError,
    },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    pub listen: String,

    /// Upper bound on fetching one source page, in seconds.
    pub fetch_timeout_secs: u64,

    /// User-Agent header sent to source sites.
    pub user_agent: String,

    /// Configured feeds keyed by slug. Sorted, so listings are stable.
    pub feeds: BTreeMap<String, FeedSpec>,
}

/// How to scrape one page into one feed.
///
/// Unknown keys are rejected: a misspelled key would otherwise leave a
/// field silently empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedSpec {
    /// Channel title
    pub title: String,
    /// Channel description
    pub description: String,
    /// Page to scrape; also the base for relative item links
    pub link: String,
    /// Where the items are on the page
    #[serde(rename = "spec")]
    pub selectors: SelectorSpec,
}

/// CSS selectors locating the items of a feed.
///
/// `item` is matched against the whole page; the other three are matched
/// inside each item, first match wins. An empty selector matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorSpec {
    pub item: String,
    pub title: String,
    pub description: String,
    pub link: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            fetch_timeout_secs: 30,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            feeds: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 4] = ["listen", "fetch_timeout_secs", "user_agent", "feeds"];

    /// Load configuration from a TOML file, or from stdin if `path` is `-`.
    ///
    /// - Missing or unreadable file → `Err(ConfigError::Io)`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Invalid selector → `Err(ConfigError::InvalidSelector)`
    /// - Unknown top-level keys → accepted, logged as warning
    /// - Unknown keys in a feed table → `Err(ConfigError::Parse)`
    /// - Zero `fetch_timeout_secs` → `Err(ConfigError::ZeroTimeout)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.as_os_str() == "-" {
            return Self::from_reader(std::io::stdin().lock());
        }

        // Check file size before reading to prevent memory exhaustion
        let meta = std::fs::metadata(path)?;
        if meta.len() > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "Config file is {} bytes (max {} bytes)",
                meta.len(),
                Self::MAX_FILE_SIZE
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            feeds = config.feeds.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Load configuration from a stream, reading at most 1 MB.
    pub fn from_reader(reader: impl Read) -> Result<Self, ConfigError> {
        let mut content = String::new();
        reader
            .take(Self::MAX_FILE_SIZE + 1)
            .read_to_string(&mut content)?;
        if content.len() as u64 > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "Config stream exceeds {} bytes",
                Self::MAX_FILE_SIZE
            )));
        }
        Self::parse(&content)
    }

    /// Parse configuration from TOML text and validate every feed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        for (slug, spec) in &self.feeds {
            if spec.selectors.item.trim().is_empty() {
                tracing::warn!(slug = %slug, "Feed has no item selector and will always be empty");
            }
        }
        self.compile_feeds()?;
        Ok(())
    }

    /// Compiles the selectors of every feed, keyed by slug.
    pub fn compile_feeds(&self) -> Result<BTreeMap<String, ItemQueries>, ConfigError> {
        self.feeds
            .iter()
            .map(|(slug, spec)| {
                ItemQueries::compile(&spec.selectors)
                    .map(|queries| (slug.clone(), queries))
                    .map_err(|source| ConfigError::InvalidSelector {
                        slug: slug.clone(),
                        source,
                    })
            })
            .collect()
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================
