//! Rank-aware deduplication of search hits across several queries.

use crate::domain::base_url;
use crate::models::{DedupedTarget, SearchResult};
use std::collections::HashMap;

/// What happened to a single hit offered to [`RankedTargets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// First time this base URL was seen.
    Inserted,
    /// The base URL was known with a worse rank and has been replaced.
    Replaced { previous_rank: u32 },
    /// The base URL is already kept with an equal or better rank.
    Skipped { kept_rank: u32 },
}

#[derive(Debug, Clone)]
struct Entry {
    /// Insertion sequence; a replacement counts as a fresh insertion.
    seq: u64,
    target: DedupedTarget,
}

/// The shared list of domains to visit, one entry per base URL.
#[derive(Debug, Default)]
pub(crate) struct RankedTargets {
    entries: HashMap<String, Entry>,
    next_seq: u64,
}

impl RankedTargets {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feeds one query's results, in search order, into the shared list.
    ///
    /// Ranks start at 1 for every query and advance only for hits that are
    /// inserted or replace a worse-ranked entry. Hits that cannot be reduced to
    /// a base URL are logged and ignored.
    ///
    /// # Returns
    /// * The ranked results that were admitted, in the order they were admitted.
    pub(crate) fn ingest_query<I, S>(&mut self, query: &str, raw_urls: I) -> Vec<SearchResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut admitted = Vec::new();
        let mut rank: u32 = 0;

        for raw_url in raw_urls {
            let raw_url = raw_url.as_ref();
            let base = match base_url(raw_url) {
                Ok(base) => base,
                Err(e) => {
                    tracing::warn!(target: "search_task", "Ignoring result '{}': {}", raw_url, e);
                    continue;
                }
            };

            let candidate = SearchResult {
                base_url: base,
                search_query: query.to_string(),
                search_rank: rank + 1,
            };

            match self.offer(candidate.clone()) {
                Admission::Skipped { kept_rank } => {
                    tracing::debug!(target: "search_task",
                        "Skipping {} (already kept at rank {})", candidate.base_url, kept_rank
                    );
                }
                Admission::Replaced { previous_rank } => {
                    tracing::debug!(target: "search_task",
                        "Re-ranked {} from {} to {} under '{}'",
                        candidate.base_url, previous_rank, candidate.search_rank, query
                    );
                    rank += 1;
                    admitted.push(candidate);
                }
                Admission::Inserted => {
                    rank += 1;
                    admitted.push(candidate);
                }
            }
        }

        tracing::info!(target: "search_task",
            "Query '{}' contributed {} domains ({} unique in total).",
            query,
            admitted.len(),
            self.entries.len()
        );
        admitted
    }

    /// Offers a single ranked hit. A strictly lower rank replaces the kept entry,
    /// an equal rank keeps the first one seen.
    pub(crate) fn offer(&mut self, result: SearchResult) -> Admission {
        let admission = match self.entries.get(&result.base_url) {
            Some(existing) if existing.target.best_rank <= result.search_rank => {
                return Admission::Skipped {
                    kept_rank: existing.target.best_rank,
                };
            }
            Some(existing) => Admission::Replaced {
                previous_rank: existing.target.best_rank,
            },
            None => Admission::Inserted,
        };

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            result.base_url.clone(),
            Entry {
                seq,
                target: DedupedTarget::from(result),
            },
        );
        admission
    }

    #[cfg(test)]
    pub(crate) fn get(&self, base_url: &str) -> Option<&DedupedTarget> {
        self.entries.get(base_url).map(|entry| &entry.target)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the list, returning targets in insertion order.
    pub(crate) fn into_targets(self) -> Vec<DedupedTarget> {
        let mut entries: Vec<Entry> = self.entries.into_values().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.target).collect()
    }
}
