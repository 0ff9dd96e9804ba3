mod datamuse;
mod free_dictionary;

use async_trait::async_trait;
use std::time::Duration;

pub use datamuse::DatamuseProvider;
pub use free_dictionary::FreeDictionaryProvider;

/// Result type for dictionary lookups
pub type DictionaryResult<T> = Result<T, DictionaryError>;

/// Errors that can occur while asking a dictionary service about a word
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Response parsing failed: {0}")]
    ParseError(String),
}

/// Answer from a dictionary provider
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    /// Whether the provider returned any entry at all
    pub found: bool,
    /// Headword of the best entry, if any
    pub headword: Option<String>,
}

impl Lookup {
    pub fn not_found() -> Self {
        Self {
            found: false,
            headword: None,
        }
    }

    pub fn entry(headword: impl Into<String>) -> Self {
        Self {
            found: true,
            headword: Some(headword.into()),
        }
    }

    /// True when the returned headword is exactly `word`, ignoring case
    pub fn confirms(&self, word: &str) -> bool {
        self.found
            && self
                .headword
                .as_deref()
                .is_some_and(|h| h.to_lowercase() == word.to_lowercase())
    }
}

/// Trait that all dictionary providers must implement
#[async_trait]
pub trait DictionaryProvider: Send + Sync {
    /// Look up a single lower-cased word
    async fn lookup(&self, word: &str) -> DictionaryResult<Lookup>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Configuration for dictionary providers
#[derive(Debug, Clone)]
pub struct DictionaryConfig {
    /// Datamuse words endpoint (primary provider)
    pub datamuse_url: Option<String>,
    /// Free Dictionary entries endpoint (fallback provider)
    pub free_dictionary_url: Option<String>,
    /// Timeout for a single lookup
    pub timeout: Duration,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            datamuse_url: Some(DatamuseProvider::DEFAULT_URL.to_string()),
            free_dictionary_url: Some(FreeDictionaryProvider::DEFAULT_URL.to_string()),
            timeout: Duration::from_secs(5),
        }
    }
}

impl DictionaryConfig {
    /// Load configuration from environment variables.
    ///
    /// An unset URL falls back to the public endpoint; a set-but-empty URL
    /// disables that provider.
    pub fn from_env() -> Self {
        let endpoint = |var: &str, default: &str| match std::env::var(var) {
            Ok(url) => {
                let trimmed = url.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Err(_) => Some(default.to_string()),
        };

        Self {
            datamuse_url: endpoint("DATAMUSE_URL", DatamuseProvider::DEFAULT_URL),
            free_dictionary_url: endpoint(
                "FREE_DICTIONARY_URL",
                FreeDictionaryProvider::DEFAULT_URL,
            ),
            timeout: std::env::var("DICTIONARY_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(5)),
        }
    }

    /// Build the configured providers in lookup order (primary first)
    pub fn build_providers(&self) -> DictionaryResult<Vec<Box<dyn DictionaryProvider>>> {
        let mut providers: Vec<Box<dyn DictionaryProvider>> = Vec::new();

        if let Some(url) = &self.datamuse_url {
            providers.push(Box::new(DatamuseProvider::new(url.clone(), self.timeout)?));
        }

        if let Some(url) = &self.free_dictionary_url {
            providers.push(Box::new(FreeDictionaryProvider::new(
                url.clone(),
                self.timeout,
            )?));
        }

        if providers.is_empty() {
            return Err(DictionaryError::ConfigError(
                "No dictionary providers configured. Set DATAMUSE_URL or FREE_DICTIONARY_URL"
                    .to_string(),
            ));
        }

        Ok(providers)
    }
}

/// Shared reqwest client with the lookup timeout applied
fn http_client(timeout: Duration) -> DictionaryResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DictionaryError::ConfigError(format!("Failed to build HTTP client: {}", e)))
}
