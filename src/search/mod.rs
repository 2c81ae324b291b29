//! Search fallback for entries without a usable link of their own.
//!
//! [`SearchClient`] builds a `"<title>" filetype:pdf` query, hands it to a
//! [`SearchProvider`], and picks the first result that clearly points at a
//! PDF. It never falls back to weaker heuristics: an HTML landing page is
//! worse than no result.
//!
//! Candidate rules, checked per result in result order (first match wins):
//! 1. Link ending in `.pdf` (any case): returned unchanged.
//! 2. arXiv abstract page: rewritten to the canonical PDF URL.
//! 3. arXiv PDF link: returned unchanged.

mod error;
mod google;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::SearchConfig;
use crate::resolver::arxiv::{self, ArxivLink};

pub use error::SearchError;
pub use google::GoogleSearchProvider;

/// A web search backend: query in, candidate links out.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Runs `query`, asking for at most `num_results` results.
    ///
    /// Returns the result links in ranking order. A response without a
    /// results list is [`SearchError::NoResults`].
    async fn query(&self, query: &str, num_results: u8) -> Result<Vec<String>, SearchError>;
}

/// Finds a PDF link for a title through a [`SearchProvider`].
#[derive(Clone)]
pub struct SearchClient {
    provider: Arc<dyn SearchProvider>,
    num_results: u8,
}

impl SearchClient {
    #[must_use]
    pub fn new(provider: Arc<dyn SearchProvider>, num_results: u8) -> Self {
        Self {
            provider,
            num_results,
        }
    }

    /// Builds a client over [`GoogleSearchProvider`].
    ///
    /// # Errors
    ///
    /// Propagates provider construction errors.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        let provider = GoogleSearchProvider::new(config)?;
        Ok(Self::new(Arc::new(provider), config.num_results))
    }

    /// Searches for a PDF of `title`.
    ///
    /// # Errors
    ///
    /// Returns the provider's error, or [`SearchError::NoPdfLink`] when none
    /// of the top results matches a candidate rule.
    #[tracing::instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn search_for_pdf(&self, title: &str) -> Result<String, SearchError> {
        let query = pdf_query(title);
        let links = self.provider.query(&query, self.num_results).await?;
        debug!(results = links.len(), "search results received");

        select_candidate(links.iter().take(usize::from(self.num_results)))
            .ok_or(SearchError::NoPdfLink)
    }
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("provider", &self.provider.name())
            .field("num_results", &self.num_results)
            .finish()
    }
}

fn pdf_query(title: &str) -> String {
    format!("\"{title}\" filetype:pdf")
}

fn select_candidate<'a, I>(links: I) -> Option<String>
where
    I: IntoIterator<Item = &'a String>,
{
    links.into_iter().find_map(|link| candidate(link))
}

fn candidate(link: &str) -> Option<String> {
    if link.to_ascii_lowercase().ends_with(".pdf") {
        return Some(link.to_string());
    }
    match arxiv::classify(link)? {
        abs @ ArxivLink::Abstract(_) => Some(abs.pdf_url()),
        ArxivLink::Pdf(_) => Some(link.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Provider returning canned results and recording queries.
    struct FakeProvider {
        response: Mutex<Option<Result<Vec<String>, SearchError>>>,
        queries: Mutex<Vec<(String, u8)>>,
    }

    impl FakeProvider {
        fn new(response: Result<Vec<String>, SearchError>) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(response)),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn links(links: &[&str]) -> Arc<Self> {
            Self::new(Ok(links.iter().map(ToString::to_string).collect()))
        }
    }

    #[async_trait]
    impl SearchProvider for FakeProvider {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn query(&self, query: &str, num_results: u8) -> Result<Vec<String>, SearchError> {
            self.queries
                .lock()
                .unwrap()
                .push((query.to_string(), num_results));
            self.response.lock().unwrap().take().unwrap()
        }
    }

    #[tokio::test]
    async fn test_query_shape_and_result_count() {
        let provider = FakeProvider::links(&["https://x.example/a.pdf"]);
        let client = SearchClient::new(provider.clone(), 3);
        client.search_for_pdf("Deep Residual Learning").await.unwrap();
        assert_eq!(
            provider.queries.lock().unwrap().as_slice(),
            &[("\"Deep Residual Learning\" filetype:pdf".to_string(), 3)]
        );
    }

    #[tokio::test]
    async fn test_first_pdf_link_wins() {
        let client = SearchClient::new(
            FakeProvider::links(&[
                "https://first.example/paper.PDF",
                "https://second.example/other.pdf",
            ]),
            3,
        );
        assert_eq!(
            client.search_for_pdf("t").await.unwrap(),
            "https://first.example/paper.PDF"
        );
    }

    #[tokio::test]
    async fn test_result_order_beats_rule_order() {
        let client = SearchClient::new(
            FakeProvider::links(&[
                "https://arxiv.org/abs/1512.03385",
                "https://later.example/paper.pdf",
            ]),
            3,
        );
        assert_eq!(
            client.search_for_pdf("t").await.unwrap(),
            "https://arxiv.org/pdf/1512.03385.pdf"
        );
    }

    #[tokio::test]
    async fn test_arxiv_pdf_link_returned_unchanged() {
        let client = SearchClient::new(
            FakeProvider::links(&[
                "https://example.com/landing",
                "https://arxiv.org/pdf/1512.03385v1",
            ]),
            3,
        );
        assert_eq!(
            client.search_for_pdf("t").await.unwrap(),
            "https://arxiv.org/pdf/1512.03385v1"
        );
    }

    #[tokio::test]
    async fn test_no_candidate_is_no_pdf_link() {
        let client = SearchClient::new(
            FakeProvider::links(&["https://example.com/landing", "https://example.org/page.html"]),
            3,
        );
        let err = client.search_for_pdf("t").await.unwrap_err();
        assert!(matches!(err, SearchError::NoPdfLink));
    }

    #[tokio::test]
    async fn test_only_top_results_are_considered() {
        let client = SearchClient::new(
            FakeProvider::links(&[
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/c.pdf",
            ]),
            2,
        );
        let err = client.search_for_pdf("t").await.unwrap_err();
        assert!(matches!(err, SearchError::NoPdfLink));
    }

    #[tokio::test]
    async fn test_provider_errors_pass_through() {
        let client = SearchClient::new(FakeProvider::new(Err(SearchError::NoResults)), 3);
        let err = client.search_for_pdf("t").await.unwrap_err();
        assert_eq!(err.to_string(), "search found no results");
    }

    #[test]
    fn test_candidate_rules() {
        assert_eq!(candidate("https://x.org/a.pdf").as_deref(), Some("https://x.org/a.pdf"));
        assert_eq!(
            candidate("http://www.arxiv.org/abs/2101.00001").as_deref(),
            Some("https://arxiv.org/pdf/2101.00001.pdf")
        );
        assert_eq!(candidate("https://arxiv.org/list/cs.LG/recent"), None);
        assert_eq!(candidate("https://notarxiv.org/abs/1"), None);
    }
}
