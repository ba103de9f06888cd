use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The placeholder title used when a case page does not yield one.
pub const UNKNOWN_TITLE: &str = "Unknown";
/// The sentinel text stored when a case page could not be fetched.
pub const FETCH_FAILURE_TEXT: &str = "Failed to fetch case details.";
/// The sentinel text stored when a case page held no recognizable case text.
pub const NO_CASE_TEXT: &str = "No case text found.";
/// The summary recorded for cases whose text never made it out of extraction.
pub const MISSING_TEXT_SUMMARY: &str = "Summary unavailable due to missing case text.";

/// One entry from the search results page: a case title and the absolute URL
/// of its document page, in source ranking order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The trimmed title of the case as shown in the result listing.
    pub title: String,
    /// The absolute URL of the case document.
    pub url: String,
}

/// The plain-text content extracted from one case page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDocument {
    /// The title carried by this document. Extraction does not enrich it;
    /// the pipeline keeps the search-result title instead.
    pub title: String,
    /// The case text, truncated to the configured maximum length, or a
    /// sentinel when fetching or extraction came up empty.
    pub text: String,
    /// The URL the document was fetched from.
    pub url: String,
    /// When the document was produced.
    pub fetched_at: DateTime<Utc>,
}

impl CaseDocument {
    /// Creates a document carrying the given case text.
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: UNKNOWN_TITLE.to_string(),
            text: text.into(),
            url: url.into(),
            fetched_at: Utc::now(),
        }
    }

    /// Creates the sentinel document recorded when a case page could not be
    /// fetched.
    pub fn fetch_failed(url: impl Into<String>) -> Self {
        Self::new(FETCH_FAILURE_TEXT, url)
    }

    /// Returns `true` if this document carries the fetch-failure sentinel.
    pub fn is_fetch_failure(&self) -> bool {
        self.text == FETCH_FAILURE_TEXT
    }

    /// Returns `true` if this document has text worth summarizing.
    ///
    /// The "No case text found." sentinel counts as text here and flows into
    /// summarization; only an empty body or a fetch failure is skipped.
    pub fn has_text(&self) -> bool {
        !self.text.is_empty() && !self.is_fetch_failure()
    }
}

/// The final per-case output: the search-result title paired with either a
/// generated summary or the unavailable-summary sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSummary {
    /// The title of the case, carried from the search result.
    pub title: String,
    /// The generated summary, or a sentinel explaining its absence.
    pub summary: String,
}

impl CaseSummary {
    /// Creates the sentinel summary for a case whose text was missing.
    pub fn unavailable(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: MISSING_TEXT_SUMMARY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests the skip classification of the document sentinels.
    #[test]
    fn test_document_classification() {
        let failed = CaseDocument::fetch_failed("https://example.com/doc/1/");
        assert!(failed.is_fetch_failure());
        assert!(!failed.has_text());
        assert_eq!(failed.title, UNKNOWN_TITLE);

        let empty = CaseDocument::new("", "https://example.com/doc/2/");
        assert!(!empty.has_text());

        // The no-text sentinel is ordinary text as far as the pipeline is
        // concerned and still reaches the summarizer.
        let no_text = CaseDocument::new(NO_CASE_TEXT, "https://example.com/doc/3/");
        assert!(no_text.has_text());
    }

    #[test]
    fn test_unavailable_summary() {
        let summary = CaseSummary::unavailable("State v. Example");
        assert_eq!(summary.title, "State v. Example");
        assert_eq!(summary.summary, MISSING_TEXT_SUMMARY);
    }
}
