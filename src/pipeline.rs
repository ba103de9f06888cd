use crate::config::PipelineConfig;
use crate::fetch::RateLimitedFetcher;
use crate::llm::{Summarizer, TextGenerator};
use crate::scraper::CaseExtractor;
use crate::search::CaseSearchClient;
use crate::types::{CaseSummary, SearchResult};
use crate::Result;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info};

/// The `CasePipeline` struct orchestrates one query run: search, then one
/// concurrent extract-and-summarize task per case, then an ordered fan-in.
///
/// Per-case failures are isolated: extraction never fails (it produces
/// sentinel documents) and summarization always returns a string, so no
/// case can abort its siblings.
pub struct CasePipeline {
    /// The search client.
    search: CaseSearchClient,
    /// The per-case extractor.
    extractor: CaseExtractor,
    /// The worker-pooled summarizer.
    summarizer: Summarizer,
}

impl CasePipeline {
    /// Creates a new `CasePipeline` wired from the given configuration and
    /// generation engine handle.
    ///
    /// # Arguments
    ///
    /// * `config` - The pipeline configuration settings.
    /// * `generator` - The generation engine the summarizer delegates to.
    ///
    /// # Returns
    ///
    /// A `Result` containing the pipeline, or an error if a component could
    /// not be created.
    pub fn new(config: &PipelineConfig, generator: Arc<dyn TextGenerator>) -> Result<Self> {
        let fetcher = Arc::new(RateLimitedFetcher::new(config)?);
        let search = CaseSearchClient::new(Arc::clone(&fetcher), config.search_base_url.clone())?;
        let extractor = CaseExtractor::new(Arc::clone(&fetcher), config.max_case_text_length)?;
        let summarizer = Summarizer::new(generator, &config.generation);

        Ok(Self {
            search,
            extractor,
            summarizer,
        })
    }

    /// Runs the pipeline for one query.
    ///
    /// # Arguments
    ///
    /// * `query` - The free-text legal query.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the search yielded no results, otherwise `Ok(Some(..))`
    /// with exactly one `CaseSummary` per search result, in search order
    /// regardless of per-case completion order. An error is returned only if
    /// the search request itself failed.
    pub async fn run(&self, query: &str) -> Result<Option<Vec<CaseSummary>>> {
        let cases = self.search.search(query).await?;
        if cases.is_empty() {
            info!("No cases found for query '{}'", query);
            return Ok(None);
        }

        info!("Processing {} cases for query '{}'", cases.len(), query);
        let tasks = cases.iter().map(|case| self.process_case(case));
        let summaries = join_all(tasks).await;

        Ok(Some(summaries))
    }

    /// Processes a single case: extract its document, then summarize unless
    /// the text is empty or the fetch failed.
    async fn process_case(&self, case: &SearchResult) -> CaseSummary {
        let document = self.extractor.extract(&case.url).await;

        if !document.has_text() {
            debug!("Skipping summarization for '{}': no case text", case.title);
            return CaseSummary::unavailable(case.title.clone());
        }

        debug!("Summarizing '{}'", case.title);
        let summary = self.summarizer.summarize(&document.text).await;

        CaseSummary {
            title: case.title.clone(),
            summary,
        }
    }
}
