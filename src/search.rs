use crate::fetch::RateLimitedFetcher;
use crate::types::SearchResult;
use crate::{PipelineError, Result, MAX_SEARCH_RESULTS};
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// The CSS selector matching result-title anchors on the search results page.
const RESULT_TITLE_SELECTOR: &str = ".result_title a";

/// The `CaseSearchClient` struct queries the case-law search endpoint and
/// parses the result listing into titles and absolute case URLs.
pub struct CaseSearchClient {
    /// The gated fetcher shared with the rest of the pipeline.
    fetcher: Arc<RateLimitedFetcher>,
    /// The base URL of the search source.
    base_url: String,
    /// The selector for result-title anchors, parsed once.
    result_selector: Selector,
}

impl CaseSearchClient {
    /// Creates a new `CaseSearchClient`.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The shared rate-limited fetcher.
    /// * `base_url` - The base URL of the search source, without a trailing slash.
    ///
    /// # Returns
    ///
    /// A `Result` containing the client, or an error if the result selector
    /// fails to parse.
    pub fn new(fetcher: Arc<RateLimitedFetcher>, base_url: impl Into<String>) -> Result<Self> {
        let result_selector = Selector::parse(RESULT_TITLE_SELECTOR)
            .map_err(|e| PipelineError::SelectorError(e.to_string()))?;

        Ok(Self {
            fetcher,
            base_url: base_url.into(),
            result_selector,
        })
    }

    /// Searches the source for cases matching the query.
    ///
    /// A non-success response status is not an error: it yields an empty
    /// sequence, the same as a results page with no matches.
    ///
    /// # Arguments
    ///
    /// * `query` - The free-text legal query.
    ///
    /// # Returns
    ///
    /// A `Result` containing at most ten `SearchResult`s in source ranking
    /// order, or an error if the search request itself failed.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = format!(
            "{}/search/?formInput={}",
            self.base_url,
            urlencoding::encode(query)
        );
        debug!("Search URL: {}", url);

        let page = self.fetcher.fetch(&url).await?;
        if !page.is_success() {
            warn!("Search returned status {}", page.status);
            return Ok(Vec::new());
        }

        Ok(self.parse_results(&page.body))
    }

    /// Parses the search results page into titles and absolute URLs.
    ///
    /// Takes the first ten result-title anchors; anchors lacking an href are
    /// skipped without failing the whole search.
    #[instrument(skip(self, html), fields(html_length = html.len()))]
    fn parse_results(&self, html: &str) -> Vec<SearchResult> {
        let document = Html::parse_document(html);

        let results: Vec<SearchResult> = document
            .select(&self.result_selector)
            .take(MAX_SEARCH_RESULTS)
            .filter_map(|link| {
                let href = link.value().attr("href")?;
                let title = link.text().collect::<String>().trim().to_string();
                Some(SearchResult {
                    title,
                    url: format!("{}{}", self.base_url, href),
                })
            })
            .collect();

        debug!("Parsed {} search results", results.len());
        results
    }
}
