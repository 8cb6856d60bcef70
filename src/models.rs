//! Defines the core data structures used in the email-extractor application.

/// A single raw search hit, reduced to its base URL and ranked within its query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchResult {
    /// Scheme and host of the hit (e.g. "https://example.se"), no path or query.
    pub base_url: String,
    /// The query that produced this hit.
    pub search_query: String,
    /// 1-based rank within the query, after skipping already-kept domains.
    pub search_rank: u32,
}

/// One domain to visit, tagged with the best rank it earned across all queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DedupedTarget {
    pub base_url: String,
    pub best_rank: u32,
    pub originating_query: String,
}

impl From<SearchResult> for DedupedTarget {
    fn from(result: SearchResult) -> Self {
        Self {
            base_url: result.base_url,
            best_rank: result.search_rank,
            originating_query: result.search_query,
        }
    }
}

/// One spreadsheet row, produced for every target whose homepage could be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResultRecord {
    /// The base URL of the visited site.
    pub company: String,
    /// Content of the page's description meta tag, empty when absent.
    pub description: String,
    /// Comma-separated list of the addresses found, empty when none.
    pub emails: String,
    pub search_rank: u32,
    pub search_query: String,
}

/// Totals reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    /// Number of unique domains selected for crawling.
    pub targets: usize,
    /// Number of rows written to the report.
    pub harvested: usize,
    /// Number of targets skipped because their homepage was unreachable.
    pub skipped: usize,
    /// Number of harvested rows without any email address.
    pub without_emails: usize,
}
