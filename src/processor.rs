//! Drives a run: search every query, rank the domains, then harvest them in order.

use crate::dedup::RankedTargets;
use crate::error::Result;
use crate::harvester::Harvester;
use crate::models::{DedupedTarget, RunSummary};
use crate::report::ReportWriter;
use crate::search::SearchProvider;

/// Runs each query through `provider`, one after another, and returns the
/// deduplicated targets in the order they were admitted.
///
/// # Arguments
/// * `provider` - The search backend.
/// * `queries` - Queries in submission order.
/// * `limit` - Number of results requested per query.
pub(crate) async fn collect_targets<P: SearchProvider>(
    provider: &P,
    queries: &[String],
    limit: usize,
) -> Result<Vec<DedupedTarget>> {
    let mut ranked = RankedTargets::new();

    for query in queries {
        let urls = provider.search(query, limit).await?;
        tracing::debug!(target: "search_task", "'{}' returned {} raw URLs", query, urls.len());
        ranked.ingest_query(query, &urls);
    }

    if ranked.is_empty() {
        tracing::warn!("No usable search results for any query.");
    }
    tracing::info!("Selected {} unique domains to crawl.", ranked.len());
    Ok(ranked.into_targets())
}

/// Visits every target sequentially and appends a row for each reachable one.
pub(crate) async fn harvest_targets(
    harvester: &Harvester,
    targets: &[DedupedTarget],
    report: &mut ReportWriter,
) -> Result<RunSummary> {
    let mut summary = RunSummary {
        targets: targets.len(),
        ..RunSummary::default()
    };

    let progress_bar = indicatif::ProgressBar::new(targets.len() as u64);
    if let Ok(style) = indicatif::ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
    {
        progress_bar.set_style(style.progress_chars("##-"));
    }

    for target in targets {
        progress_bar.set_message(target.base_url.clone());
        match harvester.harvest(target).await? {
            Some(record) => {
                if record.emails.is_empty() {
                    summary.without_emails += 1;
                }
                report.push(record);
                summary.harvested += 1;
            }
            None => summary.skipped += 1,
        }
        progress_bar.inc(1);
    }

    progress_bar.finish_with_message("Crawling complete");
    Ok(summary)
}
