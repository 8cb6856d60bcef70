//! Fetches each target's homepage and turns it into a report row.

use crate::config::Config;
use crate::domain::top_level_suffix;
use crate::error::{AppError, Result};
use crate::extractor::EmailExtractor;
use crate::models::{DedupedTarget, ResultRecord};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::time::Instant;

static META_NAME_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("meta[name]").unwrap());

/// Result of trying to download a homepage.
#[derive(Debug)]
pub(crate) enum FetchOutcome {
    /// The server answered; the body is returned whatever the status.
    Page { status: StatusCode, body: String },
    /// Host unreachable, request or body read failed, or the URL was malformed.
    Unreachable(String),
}

/// Downloads homepages one at a time and builds [`ResultRecord`]s from them.
#[derive(Debug, Clone)]
pub(crate) struct Harvester {
    http_client: Client,
    extractor: EmailExtractor,
}

impl Harvester {
    pub(crate) fn new(config: &Config, extractor: EmailExtractor) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Generic(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            extractor,
        })
    }

    /// GETs `url`. Connection-level failures, and failures while reading the
    /// body, become [`FetchOutcome::Unreachable`]; any other error is returned
    /// to the caller.
    pub(crate) async fn fetch(&self, url: &str) -> Result<FetchOutcome> {
        tracing::debug!(target: "harvest_task", "Attempting to GET: {}", url);

        let response = match self.http_client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() || e.is_connect() || e.is_timeout() => {
                return Ok(FetchOutcome::Unreachable(e.to_string()));
            }
            Err(e) => return Err(AppError::Request(e)),
        };

        let status = response.status();
        tracing::debug!(target: "harvest_task", "GET {} status: {}", url, status);
        match response.text().await {
            Ok(body) => Ok(FetchOutcome::Page { status, body }),
            Err(e) => {
                tracing::warn!(target: "harvest_task", "Failed to read text content from {}: {}", url, e);
                Ok(FetchOutcome::Unreachable(e.to_string()))
            }
        }
    }

    /// Visits one target. Returns `Ok(None)` when its homepage could not be reached.
    pub(crate) async fn harvest(&self, target: &DedupedTarget) -> Result<Option<ResultRecord>> {
        let start_time = Instant::now();
        tracing::info!(target: "harvest_task", "Crawling URL {}", target.base_url);

        let body = match self.fetch(&target.base_url).await? {
            FetchOutcome::Page { status, body } => {
                if !status.is_success() {
                    tracing::warn!(target: "harvest_task",
                        "{} answered with {}, scanning the body anyway", target.base_url, status
                    );
                }
                body
            }
            FetchOutcome::Unreachable(reason) => {
                tracing::warn!(target: "harvest_task", "Skipping {}: {}", target.base_url, reason);
                return Ok(None);
            }
        };

        let record = build_record(target, &body, &self.extractor);
        tracing::debug!(target: "harvest_task",
            "Harvested {} in {:.2?}", target.base_url, start_time.elapsed()
        );
        Ok(Some(record))
    }
}

/// Builds the report row for a fetched page. Emails are scanned for the base
/// suffixes plus the target's own top-level suffix.
pub(crate) fn build_record(
    target: &DedupedTarget,
    body: &str,
    extractor: &EmailExtractor,
) -> ResultRecord {
    let suffix = top_level_suffix(&target.base_url);
    let emails: BTreeSet<String> = extractor.extract_emails(body, &suffix);

    if emails.is_empty() {
        tracing::info!(target: "harvest_task", "No emails found on {}.", target.base_url);
    } else {
        tracing::info!(target: "harvest_task",
            "Found {} emails on {}.", emails.len(), target.base_url
        );
    }

    ResultRecord {
        company: target.base_url.clone(),
        description: extract_description(body),
        emails: emails.into_iter().collect::<Vec<_>>().join(", "),
        search_rank: target.best_rank,
        search_query: target.originating_query.clone(),
    }
}

/// Returns the `content` of the page's `<meta name="description">` tag, or an
/// empty string when the tag or its content attribute is missing.
pub(crate) fn extract_description(html: &str) -> String {
    let document = Html::parse_document(html);
    let meta = document.select(&META_NAME_SELECTOR).find(|element| {
        element
            .value()
            .attr("name")
            .is_some_and(|name| name.trim().eq_ignore_ascii_case("description"))
    });

    match meta {
        Some(element) => match element.value().attr("content") {
            Some(content) => content.to_string(),
            None => {
                tracing::info!(target: "harvest_task",
                    "Description meta tag has no content. Setting description to empty string."
                );
                String::new()
            }
        },
        None => {
            tracing::debug!(target: "harvest_task",
                "No description meta tag found. Setting description to empty string."
            );
            String::new()
        }
    }
}
