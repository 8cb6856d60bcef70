use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod dedup;
mod domain;
mod error;
mod extractor;
mod harvester;
mod models;
mod processor;
mod report;
mod search;

use extractor::EmailExtractor;
use harvester::Harvester;
use report::ReportWriter;
use search::GoogleSearch;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let args = config::parse_args();
    let config = config::build_config(&args)?;
    let report_path = config.report_path()?;

    let extractor = EmailExtractor::new(&config.email_suffixes)?;
    info!(
        "Searching {} queries ({} results each), scanning for suffixes {:?}",
        config.queries.len(),
        config.results_per_query,
        extractor.base_suffixes()
    );

    let search = GoogleSearch::new(&config)?;
    let targets =
        processor::collect_targets(&search, &config.queries, config.results_per_query).await?;

    let harvester = Harvester::new(&config, extractor)?;
    let mut report = ReportWriter::new();
    let summary = processor::harvest_targets(&harvester, &targets, &mut report).await?;

    report
        .save(&report_path)
        .with_context(|| format!("Failed to write report to {}", report_path.display()))?;

    info!(
        "Crawled {} domains: {} rows written ({} without emails), {} unreachable. Saved to {}",
        summary.targets,
        summary.harvested,
        summary.without_emails,
        summary.skipped,
        report_path.display()
    );

    Ok(())
}
