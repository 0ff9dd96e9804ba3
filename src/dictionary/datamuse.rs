use super::*;
use serde::Deserialize;

/// Datamuse spelling lookup, used as the primary dictionary
pub struct DatamuseProvider {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DatamuseWord {
    word: String,
}

impl DatamuseProvider {
    pub const DEFAULT_URL: &'static str = "https://api.datamuse.com/words";

    pub fn new(base_url: String, timeout: Duration) -> DictionaryResult<Self> {
        Ok(Self {
            base_url,
            timeout,
            client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl DictionaryProvider for DatamuseProvider {
    async fn lookup(&self, word: &str) -> DictionaryResult<Lookup> {
        let request = self
            .client
            .get(&self.base_url)
            .query(&[("sp", word), ("md", "f"), ("max", "1")]);

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| DictionaryError::Timeout(self.timeout))?
            .map_err(|e| DictionaryError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DictionaryError::ApiError(format!(
                "Datamuse API returned status: {}",
                response.status()
            )));
        }

        let words: Vec<DatamuseWord> = response
            .json()
            .await
            .map_err(|e| DictionaryError::ParseError(e.to_string()))?;

        Ok(match words.into_iter().next() {
            Some(best) => Lookup::entry(best.word),
            None => Lookup::not_found(),
        })
    }

    fn name(&self) -> &str {
        "datamuse"
    }
}
