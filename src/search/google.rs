//! Google Custom Search JSON API provider.
//!
//! Sends `GET <endpoint>?key=..&cx=..&q=..&num=..` and reads the `link` of
//! each object in the `items` array.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{SearchError, SearchProvider};
use crate::config::SearchConfig;
use crate::user_agent;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    link: String,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Search provider backed by the Google Custom Search JSON API.
///
/// Built from [`SearchConfig`]. When credentials are missing or still
/// placeholders, every query fails with [`SearchError::MissingCredentials`]
/// before any request is sent.
pub struct GoogleSearchProvider {
    client: Client,
    endpoint: Url,
    credentials: Option<(String, String)>,
}

impl GoogleSearchProvider {
    /// Creates a provider from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidEndpoint`] for an unparseable endpoint and
    /// [`SearchError::Transport`] if the HTTP client cannot be built.
    #[tracing::instrument(skip_all, fields(endpoint = %config.endpoint))]
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let endpoint =
            Url::parse(&config.endpoint).map_err(|source| SearchError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                source,
            })?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(user_agent::default_search_user_agent())
            .build()
            .map_err(|source| SearchError::Transport { source })?;
        let credentials = config
            .credentials()
            .map(|(key, cx)| (key.to_string(), cx.to_string()));
        if credentials.is_none() {
            debug!("search credentials missing; searches will fail fast");
        }

        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }

    fn request_url(&self, key: &str, cx: &str, query: &str, num_results: u8) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", key)
            .append_pair("cx", cx)
            .append_pair("q", query)
            .append_pair("num", &num_results.to_string());
        url
    }
}

impl std::fmt::Debug for GoogleSearchProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSearchProvider")
            .field("endpoint", &self.endpoint.as_str())
            .field("configured", &self.credentials.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    #[tracing::instrument(skip(self), fields(provider = "google"))]
    async fn query(&self, query: &str, num_results: u8) -> Result<Vec<String>, SearchError> {
        let Some((key, cx)) = &self.credentials else {
            return Err(SearchError::MissingCredentials);
        };
        let url = self.request_url(key, cx, query, num_results);

        let response = self.client.get(url).send().await.map_err(|source| {
            warn!(error = %source, "search request failed");
            SearchError::Transport { source }
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(SearchError::QuotaExceeded);
        }
        let body = response
            .bytes()
            .await
            .map_err(|source| SearchError::Transport { source })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .and_then(|detail| detail.message);
            debug!(status = status.as_u16(), ?message, "search API error");
            return Err(SearchError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SearchResponse =
            serde_json::from_slice(&body).map_err(|e| SearchError::InvalidResponse {
                message: e.to_string(),
            })?;
        let items = parsed.items.ok_or(SearchError::NoResults)?;
        debug!(count = items.len(), "search returned items");
        Ok(items
            .into_iter()
            .map(|item| item.link)
            .filter(|link| !link.is_empty())
            .collect())
    }
}
