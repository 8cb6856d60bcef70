//! Utility functions for handling domain names and URLs.

use crate::error::{AppError, Result};
use url::Url;

/// Reduces a search hit to its base URL: scheme and host (plus an explicit
/// port), with path, query string and fragment removed.
///
/// # Arguments
/// * `raw_url` - A result URL as returned by the search provider.
///
/// # Returns
/// * `Ok(String)` such as `"https://example.se"`.
/// * `Err(AppError)` if the URL is empty, cannot be parsed or has no host.
pub(crate) fn base_url(raw_url: &str) -> Result<String> {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return Err(AppError::DomainExtraction("Result URL is empty".to_string()));
    }

    let url = Url::parse(trimmed)?;
    let host = url.host_str().ok_or_else(|| {
        tracing::debug!("Result URL has no host: {}", trimmed);
        AppError::DomainExtraction(format!("Result URL has no host: {}", trimmed))
    })?;

    let base = match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    };
    Ok(base)
}

/// Returns the top-level suffix of a base URL's host ("se" for
/// "https://www.example.se"). Falls back to the last dot-separated label of the
/// raw string when it does not parse as a URL.
pub(crate) fn top_level_suffix(base_url: &str) -> String {
    let host = Url::parse(base_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| base_url.to_string());

    host.trim_end_matches('.')
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}
