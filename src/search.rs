//! Issues search-engine queries and returns result URLs in ranked order.

use crate::config::Config;
use crate::error::{AppError, Result};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

/// Most results the search page will return in a single response.
const MAX_RESULTS_PER_PAGE: usize = 100;

static RESULTS_CONTAINER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div#search").unwrap());
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Anything that can turn a query into an ordered list of result URLs.
pub(crate) trait SearchProvider {
    /// Returns at most `limit` result URLs for `query`, best match first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>>;
}

/// Scrapes the HTML result pages of Google's regional host.
#[derive(Debug, Clone)]
pub(crate) struct GoogleSearch {
    http_client: Client,
    base: Url,
    pause: Duration,
}

impl GoogleSearch {
    pub(crate) fn new(config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Generic(anyhow::anyhow!("Failed to build search client: {}", e)))?;

        Ok(Self {
            http_client,
            base: search_base_url(&config.region)?,
            pause: config.search_pause,
        })
    }

    async fn fetch_page(&self, query: &str, start: usize, num: usize) -> Result<String> {
        let search_url = self.base.join("/search")?;
        let num = num.to_string();
        let start = start.to_string();
        let response = self
            .http_client
            .get(search_url)
            .query(&[
                ("q", query),
                ("hl", "en"),
                ("num", num.as_str()),
                ("start", start.as_str()),
                ("safe", "off"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::Search {
                query: query.to_string(),
                message: "rate limited by the search engine (429)".to_string(),
            });
        }
        if !status.is_success() {
            return Err(AppError::Search {
                query: query.to_string(),
                message: format!("unexpected status {}", status),
            });
        }

        Ok(response.text().await?)
    }
}

impl SearchProvider for GoogleSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let mut results: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut start = 0;

        while results.len() < limit {
            tracing::debug!(target: "search_task", "Pausing {:?} before searching '{}'", self.pause, query);
            sleep(self.pause).await;

            let num = limit.min(MAX_RESULTS_PER_PAGE);
            tracing::info!(target: "search_task", "Searching '{}' (start={}, num={})", query, start, num);
            let html = self.fetch_page(query, start, num).await?;

            let mut added = 0;
            for link in parse_result_links(&html) {
                if results.len() >= limit {
                    break;
                }
                if seen.insert(link.clone()) {
                    results.push(link);
                    added += 1;
                }
            }

            if added == 0 {
                tracing::debug!(target: "search_task", "No new results for '{}' at start={}", query, start);
                break;
            }
            start += num;
        }

        tracing::info!(target: "search_task", "Query '{}' returned {} results.", query, results.len());
        Ok(results)
    }
}

/// The regional search host for a region hint: `se` → `https://www.google.se`.
fn search_base_url(region: &str) -> Result<Url> {
    let host = match region {
        "" | "com" => "www.google.com".to_string(),
        region => format!("www.google.{}", region),
    };
    Ok(Url::parse(&format!("https://{}", host))?)
}

/// Extracts organic result links from a search result page, in page order.
/// Redirect links (`/url?q=...`) are unwrapped; links back to the search
/// engine itself are dropped.
pub(crate) fn parse_result_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let anchors: Vec<ElementRef> = match document.select(&RESULTS_CONTAINER_SELECTOR).next() {
        Some(container) => container.select(&LINK_SELECTOR).collect(),
        None => document.select(&LINK_SELECTOR).collect(),
    };

    anchors
        .into_iter()
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(unwrap_result_href)
        .collect()
}

fn unwrap_result_href(href: &str) -> Option<String> {
    let link = if href.starts_with("/url?") {
        let redirect = Url::parse("https://www.google.com").ok()?.join(href).ok()?;
        redirect
            .query_pairs()
            .find(|(key, _)| key == "q" || key == "url")
            .map(|(_, value)| value.into_owned())?
    } else {
        href.to_string()
    };

    let url = Url::parse(&link).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    let host = url.host_str()?;
    if is_search_engine_host(host) {
        return None;
    }
    Some(link)
}

fn is_search_engine_host(host: &str) -> bool {
    let host = host.to_lowercase();
    host.starts_with("google.")
        || host.contains(".google.")
        || host.ends_with(".googleusercontent.com")
        || host.ends_with(".gstatic.com")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULT_PAGE: &str = r#"
        <html><body>
          <a href="https://www.google.se/preferences">Inställningar</a>
          <div id="search">
            <a href="/url?q=https://byra-ett.se/tjanster&amp;sa=U&amp;ved=abc">Byrå Ett</a>
            <a href="https://byra-tva.se/">Byrå Två</a>
            <a href="https://webcache.googleusercontent.com/search?q=cache:x">Cached</a>
            <a href="/search?q=webbyr%C3%A5&amp;start=10">Nästa</a>
            <a href="https://maps.google.se/maps?q=byra">Karta</a>
            <a href="mailto:info@byra-tva.se">Mail</a>
            <a href="http://byra-tre.nu/kontakt?x=1">Byrå Tre</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_result_links_in_page_order() {
        assert_eq!(
            parse_result_links(RESULT_PAGE),
            vec![
                "https://byra-ett.se/tjanster",
                "https://byra-tva.se/",
                "http://byra-tre.nu/kontakt?x=1",
            ]
        );
    }

    #[test]
    fn test_parse_result_links_without_container() {
        let html = r#"<a href="https://a.se/">A</a><a href="https://www.google.com/">G</a>"#;
        assert_eq!(parse_result_links(html), vec!["https://a.se/"]);
    }

    #[test]
    fn test_parse_result_links_empty_page() {
        assert!(parse_result_links("").is_empty());
        assert!(parse_result_links("<html><body><p>No results</p></body></html>").is_empty());
    }

    #[test]
    fn test_search_base_url_for_region() {
        assert_eq!(search_base_url("se").unwrap().as_str(), "https://www.google.se/");
        assert_eq!(search_base_url("com").unwrap().as_str(), "https://www.google.com/");
    }

    #[test]
    fn test_search_engine_hosts() {
        assert!(is_search_engine_host("www.google.se"));
        assert!(is_search_engine_host("google.com"));
        assert!(is_search_engine_host("maps.google.com"));
        assert!(is_search_engine_host("webcache.googleusercontent.com"));
        assert!(!is_search_engine_host("googleplex-fans.se"));
        assert!(!is_search_engine_host("byra.se"));
    }
}
