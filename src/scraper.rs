use crate::fetch::RateLimitedFetcher;
use crate::types::{CaseDocument, NO_CASE_TEXT};
use crate::{PipelineError, Result};
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{instrument, warn};

/// The CSS selector matching the expanded-headline fragments that carry the
/// case text on a document page.
const FRAGMENT_SELECTOR: &str = ".expanded_headline .fragment";

/// The `CaseExtractor` struct retrieves a single case page and extracts its
/// plain case text, truncated to a maximum length. Fetch problems never
/// surface as errors: they produce a sentinel document instead.
pub struct CaseExtractor {
    /// The gated fetcher shared with the rest of the pipeline.
    fetcher: Arc<RateLimitedFetcher>,
    /// The selector for case-text fragments, parsed once.
    fragment_selector: Selector,
    /// The selector for paragraphs within a fragment, parsed once.
    paragraph_selector: Selector,
    /// The maximum number of characters of case text kept.
    max_text_length: usize,
}

impl CaseExtractor {
    /// Creates a new `CaseExtractor`.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The shared rate-limited fetcher.
    /// * `max_text_length` - The maximum number of characters of case text kept.
    ///
    /// # Returns
    ///
    /// A `Result` containing the extractor, or an error if a selector fails
    /// to parse.
    pub fn new(fetcher: Arc<RateLimitedFetcher>, max_text_length: usize) -> Result<Self> {
        let fragment_selector = Selector::parse(FRAGMENT_SELECTOR)
            .map_err(|e| PipelineError::SelectorError(e.to_string()))?;
        let paragraph_selector =
            Selector::parse("p").map_err(|e| PipelineError::SelectorError(e.to_string()))?;

        Ok(Self {
            fetcher,
            fragment_selector,
            paragraph_selector,
            max_text_length,
        })
    }

    /// Fetches a case page and extracts its text.
    ///
    /// Never fails: a non-success status, a transport error or a timeout all
    /// yield the fetch-failure sentinel document, and a page without case
    /// text yields the no-text sentinel. The title is always the "Unknown"
    /// placeholder; the pipeline carries the search-result title instead.
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL of the case page.
    ///
    /// # Returns
    ///
    /// The extracted `CaseDocument`.
    pub async fn extract(&self, url: &str) -> CaseDocument {
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to fetch case page {}: {}", url, e);
                return CaseDocument::fetch_failed(url);
            }
        };

        if !page.is_success() {
            warn!("Case page {} returned status {}", url, page.status);
            return CaseDocument::fetch_failed(url);
        }

        let text = self
            .case_text_from_html(&page.body)
            .unwrap_or_else(|| NO_CASE_TEXT.to_string());

        CaseDocument::new(text, url)
    }

    /// Extracts the case text from a document page's markup.
    ///
    /// Collects every paragraph nested under an expanded-headline fragment,
    /// joins the trimmed text pieces with single spaces, and truncates the
    /// result to the maximum length.
    ///
    /// # Returns
    ///
    /// `Some(text)` if at least one paragraph was found, `None` otherwise.
    #[instrument(skip(self, html), fields(html_length = html.len()))]
    fn case_text_from_html(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);

        let paragraphs: Vec<String> = document
            .select(&self.fragment_selector)
            .flat_map(|fragment| fragment.select(&self.paragraph_selector))
            .map(|paragraph| {
                paragraph
                    .text()
                    .map(str::trim)
                    .filter(|piece| !piece.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|text| !text.is_empty())
            .collect();

        if paragraphs.is_empty() {
            return None;
        }

        Some(
            paragraphs
                .join(" ")
                .chars()
                .take(self.max_text_length)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FETCH_FAILURE_TEXT, UNKNOWN_TITLE};
    use crate::PipelineConfig;

    fn extractor_with_cap(max_text_length: usize) -> CaseExtractor {
        let config = PipelineConfig::default();
        let fetcher = Arc::new(RateLimitedFetcher::new(&config).unwrap());
        CaseExtractor::new(fetcher, max_text_length).unwrap()
    }

    /// Tests extraction of paragraphs nested under expanded-headline
    /// fragments, with trimmed pieces joined by single spaces.
    #[test]
    fn test_case_text_extraction() {
        let html = r#"
            <div class="expanded_headline">
                <div class="fragment">
                    <p>  The appellant was convicted </p>
                    <p>under <b>Section 304A</b> of the IPC.</p>
                </div>
                <div class="fragment">
                    <p>The appeal was allowed.</p>
                </div>
            </div>
            <p>Navigation text outside the fragments.</p>
        "#;

        let extractor = extractor_with_cap(9500);
        let text = extractor.case_text_from_html(html).unwrap();

        assert_eq!(
            text,
            "The appellant was convicted under Section 304A of the IPC. The appeal was allowed."
        );
    }

    /// Tests that a page without matching paragraphs yields no text.
    #[test]
    fn test_no_fragments_found() {
        let html = "<html><body><div class='headline'><p>Listing only.</p></div></body></html>";

        let extractor = extractor_with_cap(9500);
        assert!(extractor.case_text_from_html(html).is_none());
    }

    /// Tests that extracted text is truncated to exactly the maximum length.
    #[test]
    fn test_text_truncated_to_maximum() {
        let body = "word ".repeat(4000);
        let html = format!(
            r#"<div class="expanded_headline"><div class="fragment"><p>{}</p></div></div>"#,
            body
        );

        let extractor = extractor_with_cap(9500);
        let text = extractor.case_text_from_html(&html).unwrap();

        assert_eq!(text.chars().count(), 9500);
    }

    /// Tests that a non-success case page yields the sentinel document
    /// rather than an error.
    #[tokio::test]
    async fn test_fetch_failure_sentinel() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/doc/404/")
            .with_status(404)
            .create_async()
            .await;

        let extractor = extractor_with_cap(9500);
        let url = format!("{}/doc/404/", server.url());
        let document = extractor.extract(&url).await;

        assert_eq!(document.title, UNKNOWN_TITLE);
        assert_eq!(document.text, FETCH_FAILURE_TEXT);
        assert!(document.is_fetch_failure());
    }

    /// Tests that a fetched page without case text yields the no-text
    /// sentinel.
    #[tokio::test]
    async fn test_no_case_text_sentinel() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/doc/9/")
            .with_status(200)
            .with_body("<html><body><p>No fragments here.</p></body></html>")
            .create_async()
            .await;

        let extractor = extractor_with_cap(9500);
        let url = format!("{}/doc/9/", server.url());
        let document = extractor.extract(&url).await;

        assert_eq!(document.text, NO_CASE_TEXT);
        assert!(document.has_text());
    }
}
