use super::*;
use reqwest::StatusCode;
use serde::Deserialize;

/// dictionaryapi.dev entries lookup, used as the fallback dictionary
pub struct FreeDictionaryProvider {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct FreeDictionaryEntry {
    word: String,
}

impl FreeDictionaryProvider {
    pub const DEFAULT_URL: &'static str = "https://api.dictionaryapi.dev/api/v2/entries/en";

    pub fn new(base_url: String, timeout: Duration) -> DictionaryResult<Self> {
        Ok(Self {
            base_url,
            timeout,
            client: http_client(timeout)?,
        })
    }

    /// `{base_url}/{word}` with the word percent-encoded as a path segment
    fn entry_url(&self, word: &str) -> DictionaryResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| DictionaryError::ConfigError(format!("Invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| DictionaryError::ConfigError("Base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .push(word);
        Ok(url)
    }
}

#[async_trait]
impl DictionaryProvider for FreeDictionaryProvider {
    async fn lookup(&self, word: &str) -> DictionaryResult<Lookup> {
        let url = self.entry_url(word)?;

        let response = tokio::time::timeout(self.timeout, self.client.get(url).send())
            .await
            .map_err(|_| DictionaryError::Timeout(self.timeout))?
            .map_err(|e| DictionaryError::ApiError(e.to_string()))?;

        // Unknown words come back as 404 with a "No Definitions Found" body
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Lookup::not_found());
        }

        if !response.status().is_success() {
            return Err(DictionaryError::ApiError(format!(
                "Free Dictionary API returned status: {}",
                response.status()
            )));
        }

        let entries: Vec<FreeDictionaryEntry> = response
            .json()
            .await
            .map_err(|e| DictionaryError::ParseError(e.to_string()))?;

        Ok(match entries.into_iter().next() {
            Some(entry) => Lookup::entry(entry.word),
            None => Lookup::not_found(),
        })
    }

    fn name(&self) -> &str {
        "free_dictionary"
    }
}
